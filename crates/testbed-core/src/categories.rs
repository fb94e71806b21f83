use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::filter::SearchFilter;
use crate::ConfigError;

const DEFAULT_MIN_SCORE: u32 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    pub tags: Vec<String>,
    /// Maximum number of questions kept for this category.
    pub count: u32,
    #[serde(default)]
    pub min_score: Option<u32>,
    #[serde(default)]
    pub require_accepted_answer: Option<bool>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub max_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CategoriesFile {
    pub categories: Vec<CategoryConfig>,
}

/// A validated category: its name, the filter used to fetch it, and the
/// post-fetch cap on how many results are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub filter: SearchFilter,
    pub count: usize,
}

impl CategoryConfig {
    fn to_category(&self) -> Result<Category, ConfigError> {
        let min_score = self.min_score.unwrap_or(DEFAULT_MIN_SCORE);
        let require_accepted = self.require_accepted_answer.unwrap_or(true);

        let derived = SearchFilter::for_count(&self.tags, self.count, min_score, require_accepted)
            .map_err(|e| scoped(&self.name, e))?;

        let filter = if self.page_size.is_some() || self.max_pages.is_some() {
            SearchFilter::new(
                &self.tags,
                min_score,
                require_accepted,
                self.page_size.unwrap_or(derived.page_size()),
                self.max_pages.unwrap_or(derived.max_pages()),
            )
            .map_err(|e| scoped(&self.name, e))?
        } else {
            derived
        };

        Ok(Category {
            name: self.name.clone(),
            filter,
            count: self.count as usize,
        })
    }
}

fn scoped(name: &str, err: ConfigError) -> ConfigError {
    match err {
        ConfigError::Validation(msg) => ConfigError::Validation(format!("category '{name}': {msg}")),
        other => other,
    }
}

/// Load and validate the category definitions from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_categories(path: &Path) -> Result<Vec<Category>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_categories(&content)
}

/// Parse and validate category definitions from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_categories(content: &str) -> Result<Vec<Category>, ConfigError> {
    let file: CategoriesFile =
        serde_yaml::from_str(content).map_err(ConfigError::CategoriesFileParse)?;
    validate_categories(&file)?;
    file.categories
        .iter()
        .map(CategoryConfig::to_category)
        .collect()
}

fn validate_categories(file: &CategoriesFile) -> Result<(), ConfigError> {
    if file.categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one category must be defined".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for category in &file.categories {
        if category.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category name must be non-empty".to_string(),
            ));
        }
        if !seen.insert(category.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category name: '{}'",
                category.name
            )));
        }
    }

    Ok(())
}
