//! Category catalog: category keys, display labels and monthly budgets
//!
//! The catalog is loaded once at startup and never mutated afterwards.
//! Entry order from the config file is preserved and drives the order of
//! budget alerts and category listings.
//!
//! ## Configuration Resolution
//!
//! 1. Explicit path (CLI `--categories`, or the `OUTLAY_CATEGORIES` env var)
//! 2. Override in data dir (~/.local/share/outlay/config/categories.toml)
//! 3. Embedded defaults (compiled into binary)

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default catalog (compiled into binary)
const DEFAULT_CATALOG: &str = include_str!("../../../config/categories.toml");

/// Environment variable pointing at a catalog file
pub const CATALOG_PATH_ENV: &str = "OUTLAY_CATEGORIES";

/// One configured category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryEntry {
    pub key: String,
    pub label: String,
    /// Monthly ceiling in major units; `None` means no budget tracking
    pub budget: Option<f64>,
}

/// Immutable, ordered category configuration
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    entries: Vec<CategoryEntry>,
}

impl CategoryCatalog {
    /// Resolve and load the catalog (explicit path, env var, data dir, embedded)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }

        if let Ok(env_path) = std::env::var(CATALOG_PATH_ENV) {
            if !env_path.trim().is_empty() {
                return Self::from_path(Path::new(env_path.trim()));
            }
        }

        if let Some(default_path) = default_catalog_path() {
            if default_path.exists() {
                return Self::from_path(&default_path);
            }
        }

        Self::embedded()
    }

    /// The defaults compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(DEFAULT_CATALOG)
    }

    /// Load from a TOML file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read category config {}: {}",
                path.display(),
                e
            ))
        })?;
        debug!("Loading category catalog from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Parse catalog TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawCatalog = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid category config TOML: {}", e)))?;

        let entries = raw
            .categories
            .into_iter()
            .map(|c| CategoryEntry {
                key: c.key.trim().to_lowercase(),
                label: c.label.unwrap_or_default(),
                budget: c.budget,
            })
            .collect();

        Self::from_entries(entries)
    }

    /// Build from explicit entries (empty labels default to the capitalized key)
    pub fn from_entries(entries: Vec<CategoryEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(entries.len());

        for mut entry in entries {
            if entry.key.is_empty() {
                return Err(Error::Config("Category key cannot be empty".into()));
            }
            if !seen.insert(entry.key.clone()) {
                return Err(Error::Config(format!(
                    "Duplicate category key: {}",
                    entry.key
                )));
            }
            if let Some(budget) = entry.budget {
                if !budget.is_finite() || budget < 0.0 {
                    return Err(Error::Config(format!(
                        "Invalid budget for {}: {}",
                        entry.key, budget
                    )));
                }
            }
            if entry.label.trim().is_empty() {
                entry.label = capitalize(&entry.key);
            }
            normalized.push(entry);
        }

        Ok(Self {
            entries: normalized,
        })
    }

    /// Ordered category -> display label
    pub fn labels(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.key.as_str(), e.label.as_str()))
            .collect()
    }

    /// Ordered category -> monthly budget (categories without a budget are absent)
    pub fn budgets(&self) -> Vec<(&str, f64)> {
        self.entries
            .iter()
            .filter_map(|e| e.budget.map(|b| (e.key.as_str(), b)))
            .collect()
    }

    /// Ordered category keys
    pub fn valid_category_keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// Budget for a category, 0 when unknown or unbudgeted
    pub fn budget_for(&self, key: &str) -> f64 {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .and_then(|e| e.budget)
            .unwrap_or(0.0)
    }

    /// Display label, falling back to the capitalized key
    pub fn label_for(&self, key: &str) -> String {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.label.clone())
            .unwrap_or_else(|| capitalize(key))
    }

    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }
}

/// Default catalog override path
pub fn default_catalog_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("outlay").join("config").join("categories.toml"))
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    categories: Vec<RawCategory>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    key: String,
    label: Option<String>,
    budget: Option<f64>,
}
