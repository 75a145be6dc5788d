//! RC-030: Catalog — the application context tying the recipe store to its chart.
//!
//! Built once at startup and handed to every caller (CLI commands, HTTP
//! handlers). A successful `add` forces a synchronous chart refresh before
//! returning.

use crate::chart::manager::{ChartError, ChartManager, Refresh};
use crate::config::Config;
use crate::core::store::{AddError, Added, RecipeStore};
use crate::core::types::Submission;
use std::sync::Arc;
use tracing::{info, warn};

/// Store plus derived chart.
pub struct Catalog {
    store: Arc<RecipeStore>,
    charts: ChartManager,
}

/// A stored recipe and what happened to the chart afterwards.
#[derive(Debug)]
pub struct AddOutcome {
    pub added: Added,
    pub chart: Result<Refresh, ChartError>,
}

impl Catalog {
    pub fn new(store: Arc<RecipeStore>, charts: ChartManager) -> Self {
        Self { store, charts }
    }

    /// Open the store and chart manager described by `config`.
    pub fn open(config: &Config) -> Self {
        let store = Arc::new(RecipeStore::open(&config.csv_path));
        let charts = ChartManager::new(
            Arc::clone(&store),
            config.chart_settings(),
            config.chart_format.renderer(),
        );
        Self::new(store, charts)
    }

    pub fn store(&self) -> &RecipeStore {
        &self.store
    }

    pub fn charts(&self) -> &ChartManager {
        &self.charts
    }

    /// Force an initial chart. Failure is logged; the catalog stays usable.
    pub fn startup(&self) -> Option<Refresh> {
        match self.charts.ensure_current(true) {
            Ok(refresh) => {
                info!(path = %refresh.path().display(), "initial chart ready");
                Some(refresh)
            }
            Err(e) => {
                warn!(error = %e, "failed to generate chart during startup");
                None
            }
        }
    }

    /// Add a recipe and force-regenerate the chart.
    ///
    /// Only validation rejects the call. A chart failure is reported in the
    /// outcome; the recipe stays stored.
    pub fn add(&self, submission: &Submission) -> Result<AddOutcome, AddError> {
        let added = self.store.add(submission)?;
        let chart = self.charts.ensure_current(true);
        if let Err(e) = &chart {
            warn!(name = %added.recipe.name, error = %e, "recipe stored but chart not refreshed");
        }
        Ok(AddOutcome { added, chart })
    }
}
