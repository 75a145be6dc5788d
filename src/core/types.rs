//! RC-001: Recipe record, column names, and submission validation.
//!
//! A recipe is three required text fields. The serde names double as the
//! persisted-file header and the JSON API keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column/key holding the recipe name.
pub const COL_NAME: &str = "Nosaukums";
/// Column/key holding the comma-space-delimited ingredient list.
pub const COL_INGREDIENTS: &str = "Sastāvdaļas";
/// Column/key holding the preparation text.
pub const COL_PREPARATION: &str = "Pagatavošana";

/// Required columns, in persisted-file order.
pub const REQUIRED_COLUMNS: [&str; 3] = [COL_NAME, COL_INGREDIENTS, COL_PREPARATION];

/// Delimiter between ingredient names inside the ingredients field.
pub const INGREDIENT_DELIMITER: &str = ", ";

/// A JSON-like mapping submitted for a new recipe.
pub type Submission = serde_json::Map<String, Value>;

/// A single recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Recipe name (lookup key, case-insensitive)
    #[serde(rename = "Nosaukums")]
    pub name: String,

    /// Ingredient list, `", "`-delimited
    #[serde(rename = "Sastāvdaļas")]
    pub ingredients: String,

    /// Free-text preparation steps
    #[serde(rename = "Pagatavošana")]
    pub preparation: String,
}

impl Recipe {
    pub fn new(
        name: impl Into<String>,
        ingredients: impl Into<String>,
        preparation: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ingredients: ingredients.into(),
            preparation: preparation.into(),
        }
    }

    /// Trimmed, non-empty ingredient names in field order.
    pub fn ingredient_names(&self) -> impl Iterator<Item = &str> {
        self.ingredients
            .split(INGREDIENT_DELIMITER)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Case-insensitive substring match against name or ingredients.
    /// `needle` must already be lowercased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.ingredients.to_lowercase().contains(needle)
    }

    /// Validate a submission and build a recipe from it.
    ///
    /// A field is missing when its key is absent or null. Numbers and booleans
    /// are taken as their text form; arrays and objects are rejected.
    pub fn from_submission(submission: &Submission) -> Result<Self, ValidationError> {
        let mut missing = Vec::new();
        let mut invalid = Vec::new();
        let mut values = Vec::with_capacity(REQUIRED_COLUMNS.len());

        for column in REQUIRED_COLUMNS {
            match submission.get(column) {
                None | Some(Value::Null) => missing.push(column),
                Some(Value::String(s)) => values.push(s.clone()),
                Some(Value::Number(n)) => values.push(n.to_string()),
                Some(Value::Bool(b)) => values.push(b.to_string()),
                Some(Value::Array(_)) | Some(Value::Object(_)) => invalid.push(column),
            }
        }

        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }
        if !invalid.is_empty() {
            return Err(ValidationError::NotText(invalid));
        }

        let mut values = values.into_iter();
        match (values.next(), values.next(), values.next()) {
            (Some(name), Some(ingredients), Some(preparation)) => {
                Ok(Self::new(name, ingredients, preparation))
            }
            _ => Err(ValidationError::MissingFields(REQUIRED_COLUMNS.to_vec())),
        }
    }
}

/// A submission rejected before it reaches the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("submission must be a JSON object")]
    NotAnObject,

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("fields must be text: {}", .0.join(", "))]
    NotText(Vec<&'static str>),
}

/// Interpret an arbitrary JSON value as a submission.
pub fn submission_from_value(value: Value) -> Result<Submission, ValidationError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ValidationError::NotAnObject),
    }
}
