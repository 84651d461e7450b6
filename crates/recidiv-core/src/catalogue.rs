//! Criminal-code article catalogue, used only to validate offence references.
//!
//! Classification never consults the catalogue; an offence's category is
//! recorded on the offence itself.

use serde::{Deserialize, Serialize};

use crate::{
  error::{Error, Result},
  offence::ArticleRef,
};

/// One part of an article, with its lettered points (possibly none).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
  pub id:     String,
  #[serde(default)]
  pub points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
  pub id:    String,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub parts: Vec<Part>,
}

impl Article {
  pub fn part(&self, id: &str) -> Option<&Part> { self.parts.iter().find(|p| p.id == id) }
}

/// Lookup of articles by number.
pub trait ArticleCatalogue {
  fn article(&self, id: &str) -> Option<&Article>;

  /// Check that `reference` names an existing article, part and point.
  ///
  /// An empty reference is valid. A part is only checked when the article
  /// lists parts, and a point only when the part lists points.
  fn validate_reference(&self, reference: &ArticleRef) -> Result<()> {
    if reference.is_empty() {
      return Ok(());
    }
    let article = self
      .article(&reference.article)
      .ok_or_else(|| Error::UnknownArticle(reference.article.clone()))?;

    let Some(part_id) = &reference.part else {
      return Ok(());
    };
    if article.parts.is_empty() {
      return Ok(());
    }
    let part = article.part(part_id).ok_or_else(|| Error::UnknownPart {
      article: article.id.clone(),
      part:    part_id.clone(),
    })?;

    match &reference.point {
      Some(point) if !part.points.is_empty() && !part.points.contains(point) => {
        Err(Error::UnknownPoint {
          article: article.id.clone(),
          part:    part.id.clone(),
          point:   point.clone(),
        })
      }
      _ => Ok(()),
    }
  }
}

/// An in-memory catalogue built from a list of articles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticCatalogue {
  articles: Vec<Article>,
}

impl StaticCatalogue {
  pub fn new(articles: Vec<Article>) -> Self { Self { articles } }

  pub fn articles(&self) -> &[Article] { &self.articles }

  pub fn len(&self) -> usize { self.articles.len() }

  pub fn is_empty(&self) -> bool { self.articles.is_empty() }
}

impl ArticleCatalogue for StaticCatalogue {
  fn article(&self, id: &str) -> Option<&Article> { self.articles.iter().find(|a| a.id == id) }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn catalogue() -> StaticCatalogue {
    StaticCatalogue::new(vec![
      Article {
        id:    "159".into(),
        title: "Fraud".into(),
        parts: vec![
          Part { id: "1".into(), points: vec![] },
          Part { id: "3".into(), points: vec!["a".into(), "b".into()] },
        ],
      },
      Article { id: "322.3".into(), title: String::new(), parts: vec![] },
    ])
  }

  #[test]
  fn known_references_validate() {
    let c = catalogue();
    assert!(c.validate_reference(&ArticleRef::new("159").part("3").point("b")).is_ok());
    assert!(c.validate_reference(&ArticleRef::new("159").part("1").point("z")).is_ok());
    assert!(c.validate_reference(&ArticleRef::new("322.3").part("9")).is_ok());
    assert!(c.validate_reference(&ArticleRef::default()).is_ok());
  }

  #[test]
  fn unknown_parts_of_reference_are_reported() {
    let c = catalogue();
    assert_eq!(
      c.validate_reference(&ArticleRef::new("999")),
      Err(Error::UnknownArticle("999".into()))
    );
    assert!(matches!(
      c.validate_reference(&ArticleRef::new("159").part("7")),
      Err(Error::UnknownPart { .. })
    ));
    assert!(matches!(
      c.validate_reference(&ArticleRef::new("159").part("3").point("c")),
      Err(Error::UnknownPoint { ref point, .. }) if point == "c"
    ));
  }

  #[test]
  fn deserialises_from_a_plain_list() {
    let c: StaticCatalogue = serde_json::from_str(
      r#"[{"id":"158","title":"Theft","parts":[{"id":"2","points":["a","b","c","d"]}]}]"#,
    )
    .unwrap();
    assert_eq!(c.len(), 1);
    assert!(c.validate_reference(&ArticleRef::new("158").part("2").point("d")).is_ok());
  }
}
