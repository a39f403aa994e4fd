//! Question catalog types and loader
//!
//! The catalog is a static JSON document: ordered weighted categories, each
//! holding ordered questions with an optional impact multiplier and guidance
//! text. It is loaded once at startup and treated as immutable configuration;
//! the scoring engine receives it by reference rather than through a global.

use crate::{Error, Result};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::info;

/// Built-in catalog used when the root folder carries no override file
pub const DEFAULT_CATALOG_JSON: &str = include_str!("catalog/default_categories.json");

/// Full catalog document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<Category>,
    /// Reserved for future scoring parameters; parsed but not yet consumed
    #[serde(default)]
    pub scoring: serde_json::Map<String, serde_json::Value>,
}

/// A weighted grouping of related questions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub weight: f64,
    pub questions: Vec<Question>,
}

/// A single yes/partial/no question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub text: String,
    /// Per-question multiplier; absent means 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
}

impl Question {
    /// Effective impact multiplier (defaults to 1.0 when unset)
    pub fn impact(&self) -> f64 {
        self.impact.unwrap_or(1.0)
    }
}

impl Catalog {
    /// Validate structural invariants: non-negative weights and impacts,
    /// no duplicate category ids, no duplicate question ids within a category.
    pub fn validate(&self) -> Result<()> {
        let mut category_ids = HashSet::new();
        for category in &self.categories {
            if !category_ids.insert(category.id.as_str()) {
                return Err(Error::Config(format!(
                    "Duplicate category id in catalog: {}",
                    category.id
                )));
            }
            if !category.weight.is_finite() || category.weight < 0.0 {
                return Err(Error::Config(format!(
                    "Category '{}' has invalid weight {}",
                    category.id, category.weight
                )));
            }
            let mut question_ids = HashSet::new();
            for question in &category.questions {
                if !question_ids.insert(question.id.as_str()) {
                    return Err(Error::Config(format!(
                        "Duplicate question id in category '{}': {}",
                        category.id, question.id
                    )));
                }
                if let Some(impact) = question.impact {
                    if !impact.is_finite() || impact < 0.0 {
                        return Err(Error::Config(format!(
                            "Question '{}' has invalid impact {}",
                            question.id, impact
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Load the catalog from an override file, falling back to the built-in document
pub fn load_catalog(override_path: &Path) -> Result<Catalog> {
    if override_path.exists() {
        info!("Loading question catalog from {}", override_path.display());
        let raw = std::fs::read_to_string(override_path)?;
        parse_catalog(&raw)
    } else {
        info!(
            "No catalog override at {}, using built-in catalog",
            override_path.display()
        );
        parse_catalog(DEFAULT_CATALOG_JSON)
    }
}

/// Parse and validate a catalog document
pub fn parse_catalog(raw: &str) -> Result<Catalog> {
    let catalog: Catalog = serde_json::from_str(raw)
        .map_err(|e| Error::Config(format!("Invalid catalog JSON: {}", e)))?;
    catalog.validate()?;
    Ok(catalog)
}

/// Accept catalog ids written either as JSON strings or bare numbers
fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl<'de> de::Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string or integer id")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}
