//! Core types and rules for the recidivism classification engine.
//!
//! This crate is pure and synchronous: it performs no I/O, and every result
//! is recomputed from the conviction and operation records it is handed.
//! The CLI (`recidiv-cli`) is the only outer surface.

pub mod assessment;
pub mod catalogue;
pub mod classifier;
pub mod consolidation;
pub mod conviction;
pub mod date;
pub mod docket;
pub mod eligibility;
pub mod error;
pub mod expungement;
pub mod graph;
pub mod offence;
pub mod punishment;

pub use error::{Error, Result};
