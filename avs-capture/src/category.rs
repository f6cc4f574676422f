//! Category catalog and step definitions
//!
//! A category key selects a fixed, ordered sequence of photo steps. An
//! unrecognized category is a terminal input error, never a silent default.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One required photo position within a category's sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// 1-based position in the sequence
    pub index: u32,
    /// Human-readable label, e.g. "Sole"
    pub label: String,
}

/// Config-backed category entry: key plus ordered step labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    pub steps: Vec<String>,
}

/// Default category set: shoes, clothing, accessories
pub fn default_categories() -> Vec<CategoryConfig> {
    fn entry(name: &str, steps: &[&str]) -> CategoryConfig {
        CategoryConfig {
            name: name.to_string(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
        }
    }

    vec![
        entry(
            "shoes",
            &["Outer side", "Inner side", "Sole", "Insole", "Size tag", "Box label"],
        ),
        entry(
            "clothing",
            &["Front", "Back", "Brand tag", "Care label", "Stitching detail"],
        ),
        entry("accessories", &["Front", "Back", "Logo engraving", "Serial number"]),
    ]
}

/// Catalog mapping category keys to their ordered step sequences
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    categories: Vec<(String, Vec<StepDefinition>)>,
}

impl CategoryCatalog {
    /// Build a catalog from config entries.
    ///
    /// Validates that category names are unique and every category carries a
    /// non-empty sequence of distinct labels.
    pub fn new(entries: &[CategoryConfig]) -> Result<Self> {
        let mut categories: Vec<(String, Vec<StepDefinition>)> = Vec::with_capacity(entries.len());

        for entry in entries {
            if categories.iter().any(|(name, _)| name == &entry.name) {
                return Err(avs_common::Error::Config(format!(
                    "duplicate category '{}'",
                    entry.name
                ))
                .into());
            }
            if entry.steps.is_empty() {
                return Err(avs_common::Error::Config(format!(
                    "category '{}' has no steps",
                    entry.name
                ))
                .into());
            }

            let mut steps = Vec::with_capacity(entry.steps.len());
            for (i, label) in entry.steps.iter().enumerate() {
                if entry.steps[..i].contains(label) {
                    return Err(avs_common::Error::Config(format!(
                        "category '{}' repeats step label '{}'",
                        entry.name, label
                    ))
                    .into());
                }
                steps.push(StepDefinition {
                    index: i as u32 + 1,
                    label: label.clone(),
                });
            }

            categories.push((entry.name.clone(), steps));
        }

        Ok(Self { categories })
    }

    /// Ordered step definitions for a category key
    pub fn steps(&self, category: &str) -> Result<&[StepDefinition]> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, steps)| steps.as_slice())
            .ok_or_else(|| Error::Category(category.to_string()))
    }

    /// Configured category keys, in catalog order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(name, _)| name.as_str())
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        // The built-in entries satisfy the catalog invariants by
        // construction, so build directly rather than revalidating.
        let categories = default_categories()
            .into_iter()
            .map(|entry| {
                let steps = entry
                    .steps
                    .iter()
                    .enumerate()
                    .map(|(i, label)| StepDefinition {
                        index: i as u32 + 1,
                        label: label.clone(),
                    })
                    .collect();
                (entry.name, steps)
            })
            .collect();
        Self { categories }
    }
}
