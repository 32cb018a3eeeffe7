//! Catalog records and the create form.
//!
//! Wire names follow the backend (`nome`, `descricao`, `nota`, `diretor`).
//! Decoding rules at this boundary:
//! - `id` is required; JSON strings and numbers are both accepted.
//! - Missing or `null` text fields become `""`.
//! - Missing or `null` rating becomes `None`.

use std::fmt;
use std::str::FromStr;

use filmes_client::Resource;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CatalogError;

/// Lowest and highest accepted rating.
pub const RATING_RANGE: std::ops::RangeInclusive<i64> = 0..=5;

// ── MovieId ─────────────────────────────────────────────────────────

/// Opaque, server-assigned identifier. Kept as its canonical text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MovieId(String);

impl MovieId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MovieId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        let id = match RawId::deserialize(deserializer)? {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        };
        if id.is_empty() {
            return Err(serde::de::Error::custom("empty id"));
        }
        Ok(MovieId(id))
    }
}

// ── MovieRecord ─────────────────────────────────────────────────────

/// A catalog entry as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: MovieId,
    #[serde(rename = "nome", default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(rename = "descricao", default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(rename = "nota", default)]
    pub rating: Option<i64>,
    #[serde(rename = "diretor", default, deserialize_with = "null_as_empty")]
    pub director: String,
}

impl Resource for MovieRecord {
    fn resource_path() -> &'static str {
        "filmes"
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ── NewMovie ────────────────────────────────────────────────────────

/// Create request body. Empty fields are sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMovie {
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub nota: Option<i64>,
    pub diretor: Option<String>,
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

// ── DraftForm ───────────────────────────────────────────────────────

/// The create form. Every field is held as typed text, like the inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftForm {
    pub name: String,
    pub description: String,
    pub rating: String,
    pub director: String,
}

/// One editable field of [`DraftForm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Description,
    Rating,
    Director,
}

impl DraftField {
    pub const ALL: [DraftField; 4] = [
        DraftField::Name,
        DraftField::Description,
        DraftField::Rating,
        DraftField::Director,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DraftField::Name => "name",
            DraftField::Description => "description",
            DraftField::Rating => "rating",
            DraftField::Director => "director",
        }
    }
}

impl FromStr for DraftField {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" | "nome" => Ok(DraftField::Name),
            "description" | "descricao" => Ok(DraftField::Description),
            "rating" | "nota" => Ok(DraftField::Rating),
            "director" | "diretor" => Ok(DraftField::Director),
            other => Err(CatalogError::Validation(format!("unknown field: {}", other))),
        }
    }
}

impl DraftForm {
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Name => &self.name,
            DraftField::Description => &self.description,
            DraftField::Rating => &self.rating,
            DraftField::Director => &self.director,
        }
    }

    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::Name => self.name = value,
            DraftField::Description => self.description = value,
            DraftField::Rating => self.rating = value,
            DraftField::Director => self.director = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        DraftField::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    /// Check required fields and the rating range, producing the request body.
    pub fn validate(&self) -> Result<NewMovie, CatalogError> {
        let missing: Vec<&str> = DraftField::ALL
            .iter()
            .filter(|f| self.get(**f).trim().is_empty())
            .map(|f| f.label())
            .collect();
        if !missing.is_empty() {
            return Err(CatalogError::Validation(format!(
                "required field(s) missing: {}",
                missing.join(", ")
            )));
        }

        let rating: i64 = self.rating.trim().parse().map_err(|_| {
            CatalogError::Validation(format!("rating must be a whole number, got {:?}", self.rating))
        })?;
        if !RATING_RANGE.contains(&rating) {
            return Err(CatalogError::Validation(format!(
                "rating must be between {} and {}, got {}",
                RATING_RANGE.start(),
                RATING_RANGE.end(),
                rating
            )));
        }

        Ok(NewMovie {
            nome: non_empty(&self.name),
            descricao: non_empty(&self.description),
            nota: Some(rating),
            diretor: non_empty(&self.director),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune_draft() -> DraftForm {
        DraftForm {
            name: "Dune".into(),
            description: "Spice.".into(),
            rating: "5".into(),
            director: "Villeneuve".into(),
        }
    }

    #[test]
    fn record_decodes_wire_names() {
        let rec: MovieRecord = serde_json::from_value(serde_json::json!({
            "id": 1, "nome": "Dune", "descricao": "...", "nota": 5, "diretor": "Villeneuve"
        }))
        .unwrap();
        assert_eq!(rec.id, MovieId::new("1"));
        assert_eq!(rec.name, "Dune");
        assert_eq!(rec.rating, Some(5));
        assert_eq!(rec.director, "Villeneuve");
    }

    #[test]
    fn record_defaults_nulls() {
        let rec: MovieRecord = serde_json::from_value(serde_json::json!({
            "id": "abc", "nome": null, "nota": null
        }))
        .unwrap();
        assert_eq!(rec.id.as_str(), "abc");
        assert_eq!(rec.name, "");
        assert_eq!(rec.description, "");
        assert_eq!(rec.rating, None);
        assert_eq!(rec.director, "");
    }

    #[test]
    fn record_without_id_is_rejected() {
        let res: Result<MovieRecord, _> = serde_json::from_value(serde_json::json!({"nome": "Dune"}));
        assert!(res.is_err());
        let res: Result<MovieRecord, _> = serde_json::from_value(serde_json::json!({"id": ""}));
        assert!(res.is_err());
    }

    #[test]
    fn valid_draft_builds_body() {
        let body = dune_draft().validate().unwrap();
        assert_eq!(body, NewMovie {
            nome: Some("Dune".into()),
            descricao: Some("Spice.".into()),
            nota: Some(5),
            diretor: Some("Villeneuve".into()),
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["nome"], "Dune");
        assert_eq!(json["nota"], 5);
    }

    #[test]
    fn empty_director_fails_validation() {
        let mut draft = dune_draft();
        draft.director = "   ".into();
        match draft.validate().unwrap_err() {
            CatalogError::Validation(msg) => assert!(msg.contains("director"), "got: {}", msg),
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn rating_must_be_integer_in_range() {
        let mut draft = dune_draft();
        draft.rating = "4.5".into();
        assert!(matches!(draft.validate(), Err(CatalogError::Validation(_))));
        draft.rating = "6".into();
        assert!(matches!(draft.validate(), Err(CatalogError::Validation(_))));
        draft.rating = "-1".into();
        assert!(matches!(draft.validate(), Err(CatalogError::Validation(_))));
        draft.rating = "0".into();
        assert_eq!(draft.validate().unwrap().nota, Some(0));
    }

    #[test]
    fn draft_field_parsing() {
        assert_eq!("Nome".parse::<DraftField>().unwrap(), DraftField::Name);
        assert_eq!("rating".parse::<DraftField>().unwrap(), DraftField::Rating);
        assert!("year".parse::<DraftField>().is_err());

        let mut draft = DraftForm::default();
        assert!(draft.is_empty());
        draft.set(DraftField::Director, "Nolan");
        assert_eq!(draft.get(DraftField::Director), "Nolan");
        assert!(!draft.is_empty());
    }
}
