//! RC-004: Recipe store — authoritative in-memory table with CSV write-through.
//!
//! Readers take an `Arc` snapshot of the table, so a concurrent `add` never
//! exposes a half-built table. Mutations are serialized by a writer lock that
//! is held across the append and the file rewrite.

use super::defaults::default_recipes;
use super::persist::{self, LoadError};
use super::types::{Recipe, Submission, ValidationError};
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Where the initial table came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource {
    /// Loaded from the persisted file
    File,
    /// Built-in defaults; carries the reason the file was not used
    Defaults(String),
}

/// Result of a successful `add`.
#[derive(Debug, Clone)]
pub struct Added {
    pub recipe: Recipe,
    /// False when the in-memory append succeeded but the file rewrite failed.
    pub persisted: bool,
    /// Table length after the append
    pub len: usize,
}

/// Why `add` rejected a submission. The table is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// The recipe table and its persisted mirror.
pub struct RecipeStore {
    path: PathBuf,
    table: RwLock<Arc<Vec<Recipe>>>,
    writer: Mutex<()>,
    source: TableSource,
}

impl RecipeStore {
    /// Open the store from a persisted file, falling back to built-in defaults
    /// when the file is absent, empty, lacks a required column, or fails to parse.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match persist::load_table(&path) {
            Ok(table) => {
                info!(path = %path.display(), recipes = table.len(), "loaded recipe table");
                Self::with_source(path, table, TableSource::File)
            }
            Err(LoadError::Missing(_)) => {
                info!(path = %path.display(), "no recipe file, using built-in defaults");
                Self::with_source(
                    path,
                    default_recipes(),
                    TableSource::Defaults("file does not exist".to_string()),
                )
            }
            Err(e) => {
                warn!(error = %e, "recipe file unusable, using built-in defaults");
                Self::with_source(path, default_recipes(), TableSource::Defaults(e.to_string()))
            }
        }
    }

    /// Build a store over an explicit table. An empty table is replaced by the defaults.
    pub fn from_table(path: impl Into<PathBuf>, table: Vec<Recipe>) -> Self {
        if table.is_empty() {
            return Self::with_source(
                path.into(),
                default_recipes(),
                TableSource::Defaults("empty table".to_string()),
            );
        }
        Self::with_source(path.into(), table, TableSource::File)
    }

    fn with_source(path: PathBuf, table: Vec<Recipe>, source: TableSource) -> Self {
        Self {
            path,
            table: RwLock::new(Arc::new(table)),
            writer: Mutex::new(()),
            source,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &TableSource {
        &self.source
    }

    /// Consistent view of the whole table.
    pub fn snapshot(&self) -> Arc<Vec<Recipe>> {
        Arc::clone(&*self.table.read())
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All recipes in table order.
    pub fn get_all(&self) -> Vec<Recipe> {
        (*self.snapshot()).clone()
    }

    /// Recipe at `index`, or `None` outside `[0, len)`.
    pub fn get_by_index(&self, index: i64) -> Option<Recipe> {
        let index = usize::try_from(index).ok()?;
        self.snapshot().get(index).cloned()
    }

    /// First recipe whose name equals `name`, ignoring case.
    pub fn get_by_name(&self, name: &str) -> Option<Recipe> {
        let wanted = name.to_lowercase();
        self.snapshot()
            .iter()
            .find(|r| r.name.to_lowercase() == wanted)
            .cloned()
    }

    /// Recipes whose name or ingredients contain `query`, ignoring case.
    /// An empty query matches nothing.
    pub fn search(&self, query: &str) -> Vec<Recipe> {
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.snapshot()
            .iter()
            .filter(|r| r.matches_lowercase(&needle))
            .cloned()
            .collect()
    }

    /// Validate and append a recipe, then rewrite the persisted file.
    ///
    /// A failed rewrite is logged and reported through [`Added::persisted`];
    /// the in-memory append is kept. Outside the crate, adds go through
    /// `Catalog::add`, which also refreshes the chart.
    pub(crate) fn add(&self, submission: &Submission) -> Result<Added, AddError> {
        let recipe = Recipe::from_submission(submission)?;

        let _writer = self.writer.lock();
        let snapshot = {
            let mut table = self.table.write();
            Arc::make_mut(&mut *table).push(recipe.clone());
            Arc::clone(&*table)
        };

        let persisted = match persist::save_table(&self.path, &snapshot) {
            Ok(()) => {
                info!(name = %recipe.name, recipes = snapshot.len(), "recipe added");
                true
            }
            Err(e) => {
                error!(
                    name = %recipe.name,
                    error = %e,
                    "recipe added in memory but not persisted"
                );
                false
            }
        };

        Ok(Added {
            recipe,
            persisted,
            len: snapshot.len(),
        })
    }
}
