//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$LISTSIFT_CONFIG` (environment variable)
//! 2. `~/.config/listsift/config.toml` (Linux/macOS)
//!    `%APPDATA%\listsift\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::normalize::DEFAULT_YEAR_BOUNDS;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Extraction defaults.
    pub extract: ExtractConfig,
    /// Performance tuning.
    pub performance: PerformanceConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
}

/// Extraction defaults.
///
/// The year bounds are the one behaviorally significant tunable: parsed
/// dates with a year outside `[min_year, max_year]` are blanked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Lower inclusive bound for accepted `Date` years.
    pub min_year: i32,
    /// Upper inclusive bound for accepted `Date` years.
    pub max_year: i32,
}

/// Performance tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Read buffer size in bytes (default: 131072 = 128 KB).
    pub read_buffer_size: usize,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            cache_dir: None,
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_year: DEFAULT_YEAR_BOUNDS.0,
            max_year: DEFAULT_YEAR_BOUNDS.1,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: 128 * 1024, // 128 KB
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    // 1. Environment variable override
    if let Ok(env_path) = std::env::var("LISTSIFT_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    // 2. Standard config directory
    dirs::config_dir().map(|d| d.join("listsift").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("listsift")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.extract.min_year, 1970);
        assert_eq!(cfg.extract.max_year, 2020);
        assert_eq!(cfg.performance.read_buffer_size, 128 * 1024);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.extract.min_year, cfg.extract.min_year);
        assert_eq!(parsed.general.log_level, cfg.general.log_level);
        assert_eq!(
            parsed.performance.read_buffer_size,
            cfg.performance.read_buffer_size
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[extract]
max_year = 2005
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.extract.max_year, 2005);
        // Other fields use defaults
        assert_eq!(cfg.extract.min_year, 1970);
        assert_eq!(cfg.general.log_level, "warn");
    }
}
