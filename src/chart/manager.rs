//! RC-012: Chart artifact manager — staleness policy, regeneration, cleanup.
//!
//! Artifacts are named `<prefix>_<unix-seconds>.<ext>`. A new artifact is
//! written (temp file + rename) before older ones are removed, so a glob for
//! the pattern never comes back empty once the first chart exists.
//! Regeneration is lazy: nothing runs unless `ensure_current` is called.

use super::render::{ChartFormat, ChartRenderer, RenderError};
use super::summary::IngredientSummary;
use crate::core::store::RecipeStore;
use parking_lot::Mutex;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Default freshness interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3600);

/// Source of "now" for staleness checks and artifact names.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Artifact lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    NoArtifact,
    Fresh,
    Stale,
}

impl std::fmt::Display for ArtifactState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoArtifact => write!(f, "no-artifact"),
            Self::Fresh => write!(f, "fresh"),
            Self::Stale => write!(f, "stale"),
        }
    }
}

/// Outcome of a successful `ensure_current`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    /// Existing artifact is fresh; nothing was written
    UpToDate(PathBuf),
    /// A new artifact was written at this path
    Regenerated(PathBuf),
}

impl Refresh {
    pub fn path(&self) -> &Path {
        match self {
            Self::UpToDate(p) | Self::Regenerated(p) => p,
        }
    }
}

/// Regeneration failure. Existing artifacts are left untouched.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("no ingredients to chart")]
    EmptySummary,

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("chart I/O on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid artifact pattern: {0}")]
    Pattern(String),
}

/// Where artifacts live and how long they stay fresh.
#[derive(Debug, Clone)]
pub struct ChartSettings {
    pub dir: PathBuf,
    pub prefix: String,
    pub interval: Duration,
}

#[derive(Debug, Default)]
struct Generation {
    last_generated: Option<SystemTime>,
    current: Option<PathBuf>,
    /// Set when a regeneration attempt failed after a prior success
    invalidated: bool,
}

/// Keeps one on-disk chart in sync with the recipe table.
pub struct ChartManager {
    store: Arc<RecipeStore>,
    settings: ChartSettings,
    renderer: Box<dyn ChartRenderer>,
    clock: Arc<dyn Clock>,
    generation: Mutex<Generation>,
}

impl ChartManager {
    pub fn new(
        store: Arc<RecipeStore>,
        settings: ChartSettings,
        renderer: Box<dyn ChartRenderer>,
    ) -> Self {
        Self::with_clock(store, settings, renderer, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<RecipeStore>,
        settings: ChartSettings,
        renderer: Box<dyn ChartRenderer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            settings,
            renderer,
            clock,
            generation: Mutex::new(Generation::default()),
        }
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    pub fn extension(&self) -> &'static str {
        self.renderer.extension()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ArtifactState {
        let generation = self.generation.lock();
        self.evaluate(&generation, self.clock.now())
    }

    /// Time of the last successful generation in this process.
    pub fn last_generated(&self) -> Option<SystemTime> {
        self.generation.lock().last_generated
    }

    fn evaluate(&self, generation: &Generation, now: SystemTime) -> ArtifactState {
        let Some(last) = generation.last_generated else {
            return ArtifactState::NoArtifact;
        };
        let missing = generation.current.as_ref().is_none_or(|p| !p.exists());
        let elapsed = now.duration_since(last).unwrap_or_default();
        if generation.invalidated || missing || elapsed > self.settings.interval {
            ArtifactState::Stale
        } else {
            ArtifactState::Fresh
        }
    }

    /// Regenerate the chart if it is stale, missing, or `force` is set.
    pub fn ensure_current(&self, force: bool) -> Result<Refresh, ChartError> {
        let mut generation = self.generation.lock();
        let now = self.clock.now();
        let state = self.evaluate(&generation, now);

        if !force && state == ArtifactState::Fresh {
            if let Some(path) = &generation.current {
                debug!(path = %path.display(), "chart is fresh");
                return Ok(Refresh::UpToDate(path.clone()));
            }
        }

        match self.regenerate(now) {
            Ok(path) => {
                generation.last_generated = Some(now);
                generation.current = Some(path.clone());
                generation.invalidated = false;
                Ok(Refresh::Regenerated(path))
            }
            Err(e) => {
                if generation.last_generated.is_some() {
                    generation.invalidated = true;
                }
                warn!(error = %e, ?state, force, "chart regeneration failed");
                Err(e)
            }
        }
    }

    fn regenerate(&self, now: SystemTime) -> Result<PathBuf, ChartError> {
        let snapshot = self.store.snapshot();
        let summary = IngredientSummary::from_recipes(&snapshot);
        if summary.is_empty() {
            return Err(ChartError::EmptySummary);
        }
        let bars = summary.ranked();

        let dir = &self.settings.dir;
        std::fs::create_dir_all(dir).map_err(|e| ChartError::Io {
            path: dir.clone(),
            source: e,
        })?;

        let stamp = now
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let ext = self.renderer.extension();
        let name = format!("{}_{}.{}", self.settings.prefix, stamp, ext);
        let path = dir.join(&name);
        // Leading dot keeps the temp file out of the artifact glob.
        let tmp_path = dir.join(format!(".{name}.tmp"));

        if let Err(e) = self.renderer.render(&bars, &tmp_path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        std::fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            ChartError::Io {
                path: path.clone(),
                source: e,
            }
        })?;

        self.remove_superseded(&path);
        info!(path = %path.display(), ingredients = bars.len(), "chart regenerated");
        Ok(path)
    }

    /// Delete every artifact except `keep`, in any chart format, so a
    /// format switch does not leave the previous chart behind. Failures are
    /// logged, not returned.
    fn remove_superseded(&self, keep: &Path) {
        let mut extensions: Vec<&str> = ChartFormat::ALL.iter().map(|f| f.extension()).collect();
        let own = self.renderer.extension();
        if !extensions.contains(&own) {
            extensions.push(own);
        }

        for ext in extensions {
            let artifacts = match list_artifacts(&self.settings.dir, &self.settings.prefix, ext) {
                Ok(a) => a,
                Err(e) => {
                    warn!(error = %e, ext, "cannot list old charts");
                    continue;
                }
            };
            for (_, old) in artifacts {
                if old == keep {
                    continue;
                }
                match std::fs::remove_file(&old) {
                    Ok(()) => debug!(path = %old.display(), "removed superseded chart"),
                    Err(e) => warn!(path = %old.display(), error = %e, "cannot remove old chart"),
                }
            }
        }
    }

    /// Newest artifact on disk, found by pattern.
    pub fn current_artifact(&self) -> Option<PathBuf> {
        match list_artifacts(
            &self.settings.dir,
            &self.settings.prefix,
            self.renderer.extension(),
        ) {
            Ok(artifacts) => artifacts.into_iter().last().map(|(_, p)| p),
            Err(e) => {
                warn!(error = %e, "cannot list charts");
                None
            }
        }
    }
}

/// Artifacts named `<prefix>_<digits>.<ext>` in `dir`, oldest first.
pub fn list_artifacts(
    dir: &Path,
    prefix: &str,
    ext: &str,
) -> Result<Vec<(u64, PathBuf)>, ChartError> {
    let pattern = format!(
        "{}/{}_*.{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        glob::Pattern::escape(prefix),
        glob::Pattern::escape(ext)
    );
    let name_re = Regex::new(&format!(
        r"^{}_(\d+)\.{}$",
        regex::escape(prefix),
        regex::escape(ext)
    ))
    .map_err(|e| ChartError::Pattern(e.to_string()))?;

    let entries = glob::glob(&pattern).map_err(|e| ChartError::Pattern(e.to_string()))?;
    let mut artifacts = Vec::new();
    for entry in entries.flatten() {
        let Some(name) = entry.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(stamp) = name_re
            .captures(name)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
        else {
            continue;
        };
        artifacts.push((stamp, entry));
    }
    artifacts.sort();
    Ok(artifacts)
}
