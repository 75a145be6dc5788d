//! RC-020: Service configuration — defaults, optional YAML file, environment.
//!
//! Precedence, lowest first: built-in defaults, `receptes.yaml`, environment
//! (`CSV_FILE_PATH`, `CHART_INTERVAL`, `RECEPTES_BIND`), CLI flags.

use crate::chart::manager::ChartSettings;
use crate::chart::render::ChartFormat;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "receptes.yaml";

pub const ENV_CSV_PATH: &str = "CSV_FILE_PATH";
pub const ENV_CHART_INTERVAL: &str = "CHART_INTERVAL";
pub const ENV_BIND: &str = "RECEPTES_BIND";

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },

    #[error("{var}={value:?} is not a valid value")]
    Env { var: &'static str, value: String },

    #[error("{0}")]
    Invalid(String),
}

/// Resolved service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Persisted recipe file
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// Directory holding the chart artifact
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Chart file name prefix (`<prefix>_<timestamp>.<ext>`)
    #[serde(default = "default_chart_prefix")]
    pub chart_prefix: String,

    /// Chart image format
    #[serde(default)]
    pub chart_format: ChartFormat,

    /// Seconds a chart stays fresh
    #[serde(default = "default_chart_interval")]
    pub chart_interval_secs: u64,

    /// Seconds a cached page stays valid (0 disables the cache)
    #[serde(default = "default_page_cache_ttl")]
    pub page_cache_ttl_secs: u64,

    /// HTTP listen address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Optional log file, in addition to stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("recipes.csv")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_chart_prefix() -> String {
    "ingredients_chart".to_string()
}

fn default_chart_interval() -> u64 {
    3600
}

fn default_page_cache_ttl() -> u64 {
    300
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            static_dir: default_static_dir(),
            chart_prefix: default_chart_prefix(),
            chart_format: ChartFormat::default(),
            chart_interval_secs: default_chart_interval(),
            page_cache_ttl_secs: default_page_cache_ttl(),
            bind: default_bind(),
            log_file: None,
        }
    }
}

impl Config {
    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_CSV_PATH).filter(|v| !v.is_empty()) {
            self.csv_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(ENV_CHART_INTERVAL) {
            self.chart_interval_secs = raw.trim().parse().map_err(|_| ConfigError::Env {
                var: ENV_CHART_INTERVAL,
                value: raw.clone(),
            })?;
        }
        if let Some(bind) = lookup(ENV_BIND).filter(|v| !v.is_empty()) {
            self.bind = bind;
        }
        Ok(())
    }

    /// Check invariants the rest of the service relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chart_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "chart_interval_secs must be greater than 0".to_string(),
            ));
        }
        let prefix_re = Regex::new(r"^[A-Za-z0-9_-]+$")
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if !prefix_re.is_match(&self.chart_prefix) {
            return Err(ConfigError::Invalid(format!(
                "chart_prefix {:?} may only contain letters, digits, '_' and '-'",
                self.chart_prefix
            )));
        }
        if self.csv_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("csv_path must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn chart_interval(&self) -> Duration {
        Duration::from_secs(self.chart_interval_secs)
    }

    pub fn page_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.page_cache_ttl_secs)
    }

    pub fn chart_settings(&self) -> ChartSettings {
        ChartSettings {
            dir: self.static_dir.clone(),
            prefix: self.chart_prefix.clone(),
            interval: self.chart_interval(),
        }
    }
}

/// Parse a config from YAML. An empty document yields the defaults.
pub fn parse_config(yaml: &str, origin: &Path) -> Result<Config, ConfigError> {
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml_ng::from_str(yaml).map_err(|e| ConfigError::Parse {
        path: origin.to_path_buf(),
        source: e,
    })
}

/// Parse a config file from disk.
pub fn parse_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config(&content, path)
}

/// Load the file layer: an explicit path must exist; otherwise
/// `receptes.yaml` is used when present, else the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => parse_config_file(path),
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.exists() {
                parse_config_file(path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

/// Template written by `receptes init`.
pub const CONFIG_TEMPLATE: &str = r#"# receptes configuration
csv_path: recipes.csv
static_dir: static
chart_prefix: ingredients_chart
chart_format: svg
chart_interval_secs: 3600
page_cache_ttl_secs: 300
bind: "127.0.0.1:5000"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_rc020_defaults() {
        let c = Config::default();
        assert_eq!(c.csv_path, PathBuf::from("recipes.csv"));
        assert_eq!(c.chart_interval(), Duration::from_secs(3600));
        assert_eq!(c.chart_format, ChartFormat::Svg);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_rc020_template_parses_to_defaults() {
        let c = parse_config(CONFIG_TEMPLATE, Path::new("t.yaml")).unwrap();
        assert_eq!(c, Config::default());
    }

    #[test]
    fn test_rc020_partial_yaml() {
        let c = parse_config("chart_format: png\nchart_interval_secs: 60\n", Path::new("x")).unwrap();
        assert_eq!(c.chart_format, ChartFormat::Png);
        assert_eq!(c.chart_interval_secs, 60);
        assert_eq!(c.bind, "127.0.0.1:5000");
    }

    #[test]
    fn test_rc020_empty_yaml_is_default() {
        assert_eq!(parse_config("  \n", Path::new("x")).unwrap(), Config::default());
    }

    #[test]
    fn test_rc020_unknown_key_rejected() {
        let err = parse_config("chart_intervall: 5\n", Path::new("bad.yaml")).unwrap_err();
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn test_rc020_env_overrides() {
        let mut c = Config::default();
        c.apply_env(env(&[
            ("CSV_FILE_PATH", "/data/r.csv"),
            ("CHART_INTERVAL", " 120 "),
            ("RECEPTES_BIND", "0.0.0.0:8080"),
        ]))
        .unwrap();
        assert_eq!(c.csv_path, PathBuf::from("/data/r.csv"));
        assert_eq!(c.chart_interval_secs, 120);
        assert_eq!(c.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_rc020_env_bad_interval() {
        let mut c = Config::default();
        let err = c.apply_env(env(&[("CHART_INTERVAL", "hourly")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "CHART_INTERVAL", .. }));
    }

    #[test]
    fn test_rc020_validate_rejects() {
        let mut c = Config {
            chart_interval_secs: 0,
            ..Config::default()
        };
        assert!(c.validate().is_err());
        c.chart_interval_secs = 1;
        c.chart_prefix = "../evil".to_string();
        assert!(c.validate().is_err());
        c.chart_prefix = "chart-v2_x".to_string();
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_rc020_load_explicit_missing() {
        let err = load_config(Some(Path::new("/nonexistent/receptes.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_rc020_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receptes.yaml");
        std::fs::write(&path, "static_dir: public\n").unwrap();
        let c = load_config(Some(&path)).unwrap();
        assert_eq!(c.static_dir, PathBuf::from("public"));
    }

    #[test]
    fn test_rc020_chart_settings() {
        let s = Config::default().chart_settings();
        assert_eq!(s.dir, PathBuf::from("static"));
        assert_eq!(s.prefix, "ingredients_chart");
        assert_eq!(s.interval, Duration::from_secs(3600));
    }
}
