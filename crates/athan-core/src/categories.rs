//! Category configuration registry.
//!
//! Categories are loaded from `config/categories.json` (git-ignored,
//! user-customizable) with a fallback to `config/categories.example.json`.
//! The registry is an explicit value passed to the components that need it
//! rather than ambient global state, so prompt construction and schema
//! validation stay testable with fixed inputs.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::defaults;
use crate::error::{Error, Result};

/// Category label. Dynamically configured, so a plain string rather than a
/// closed enum.
pub type Category = String;

/// One configured category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct CategoriesFile {
    categories: Vec<CategoryConfig>,
}

/// Validated set of configured categories.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: Vec<CategoryConfig>,
}

impl CategoryRegistry {
    /// Create a registry from already-parsed categories, validating the set.
    ///
    /// An empty set or a category missing any field is a configuration
    /// error: the prompt and the response schema are both built from this
    /// list, so a defective registry must fail before first use.
    pub fn new(categories: Vec<CategoryConfig>) -> Result<Self> {
        if categories.is_empty() {
            return Err(Error::Config(
                "\"categories\" array cannot be empty".to_string(),
            ));
        }

        for (index, category) in categories.iter().enumerate() {
            if category.name.is_empty() {
                return Err(Error::Config(format!(
                    "category at index {} missing \"name\"",
                    index
                )));
            }
            if category.icon.is_empty() {
                return Err(Error::Config(format!(
                    "category \"{}\" missing \"icon\"",
                    category.name
                )));
            }
            if category.description.is_empty() {
                return Err(Error::Config(format!(
                    "category \"{}\" missing \"description\"",
                    category.name
                )));
            }
        }

        Ok(Self { categories })
    }

    /// Parse a registry from the JSON config format.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CategoriesFile = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("failed to parse categories config: {}", e)))?;
        Self::new(file.categories)
    }

    /// Load a registry from a specific config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "failed to read categories config {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }

    /// Load the registry from the default config locations.
    ///
    /// Tries the user's `config/categories.json` first, falling back to the
    /// shipped `config/categories.example.json`. Absence of both is a fatal
    /// configuration error.
    pub fn load() -> Result<Self> {
        let user_path = Path::new(defaults::CATEGORIES_CONFIG_PATH);
        if user_path.exists() {
            return Self::from_path(user_path);
        }

        let example_path = Path::new(defaults::CATEGORIES_EXAMPLE_PATH);
        if example_path.exists() {
            warn!(
                path = defaults::CATEGORIES_EXAMPLE_PATH,
                "No config/categories.json found, using the example config"
            );
            return Self::from_path(example_path);
        }

        Err(Error::Config(format!(
            "no category configuration file found; create {} or restore {}",
            defaults::CATEGORIES_CONFIG_PATH,
            defaults::CATEGORIES_EXAMPLE_PATH
        )))
    }

    /// Configured category names, in config order.
    pub fn names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    /// Emoji icon for a category, or the default icon when unknown.
    pub fn icon(&self, name: &str) -> &str {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.icon.as_str())
            .unwrap_or(defaults::DEFAULT_CATEGORY_ICON)
    }

    /// Description for a category (used in AI prompts), empty when unknown.
    pub fn description(&self, name: &str) -> &str {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.description.as_str())
            .unwrap_or("")
    }

    /// All configured categories.
    pub fn all(&self) -> &[CategoryConfig] {
        &self.categories
    }

    /// Exact, case-sensitive membership check.
    pub fn is_valid(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name == name)
    }

    /// Map an arbitrary label to a configured category.
    ///
    /// Exact matches pass through unchanged; anything else falls back to
    /// "Personal" with a warning. The model is expected to return exact
    /// names already (the response schema enforces it), but arbitrary
    /// downstream callers must not be able to break persistence with an
    /// invalid category.
    pub fn validate_or_fallback(&self, candidate: &str) -> Category {
        if self.is_valid(candidate) {
            return candidate.to_string();
        }

        warn!(
            rejected = candidate,
            fallback = defaults::FALLBACK_CATEGORY,
            "Invalid category, falling back"
        );
        defaults::FALLBACK_CATEGORY.to_string()
    }
}
