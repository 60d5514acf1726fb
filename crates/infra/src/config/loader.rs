//! Configuration loader
//!
//! Loads benchmark configuration from a file and/or environment variables.
//!
//! ## Loading Strategy
//! 1. Probes multiple paths for a config file (JSON or TOML)
//! 2. Falls back to built-in defaults when no file exists
//! 3. Applies environment variable overrides on top
//! 4. Validates the result
//!
//! ## Environment Variables
//! - `METERBENCH_WORKERS`: Worker threads for parallel scenarios
//! - `METERBENCH_ITERATIONS`: Iterations for standalone scenario runs
//! - `METERBENCH_EXPOSE_METADATA`: Emit metric metadata (true/false)
//! - `METERBENCH_SAMPLE_SIZE`: Criterion sample size
//! - `METERBENCH_WARM_UP_SECS`: Criterion warm-up time in seconds
//! - `METERBENCH_MEASUREMENT_SECS`: Criterion measurement time in seconds
//! - `METERBENCH_LOG_LEVEL`: Default log filter when `RUST_LOG` is unset
//! - `METERBENCH_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./meterbench.toml` or `./meterbench.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names one and two directories up
//! 4. The same names next to the executable

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use meterbench_domain::{BenchConfig, MeterBenchError, Result};

const ENV_WORKERS: &str = "METERBENCH_WORKERS";
const ENV_ITERATIONS: &str = "METERBENCH_ITERATIONS";
const ENV_EXPOSE_METADATA: &str = "METERBENCH_EXPOSE_METADATA";
const ENV_SAMPLE_SIZE: &str = "METERBENCH_SAMPLE_SIZE";
const ENV_WARM_UP_SECS: &str = "METERBENCH_WARM_UP_SECS";
const ENV_MEASUREMENT_SECS: &str = "METERBENCH_MEASUREMENT_SECS";
const ENV_LOG_LEVEL: &str = "METERBENCH_LOG_LEVEL";
const ENV_LOG_JSON: &str = "METERBENCH_LOG_JSON";

const CONFIG_FILE_NAMES: [&str; 4] =
    ["meterbench.toml", "meterbench.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// Uses the first config file found by [`find_config_path`], or defaults
/// when there is none, then applies environment overrides.
///
/// # Errors
/// Returns `MeterBenchError::Config` if:
/// - A config file exists but cannot be read or parsed
/// - An environment override has an invalid value
/// - The resulting configuration fails validation
pub fn load() -> Result<BenchConfig> {
    let mut config = match find_config_path() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            BenchConfig::default()
        }
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables on top of defaults
///
/// Unset variables keep their default values.
///
/// # Errors
/// Returns `MeterBenchError::Config` if a variable has an invalid value or
/// the result fails validation.
pub fn load_from_env() -> Result<BenchConfig> {
    let mut config = BenchConfig::default();
    apply_env_overrides(&mut config)?;
    config.validate()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Apply `METERBENCH_*` environment overrides to `config`
///
/// # Errors
/// Returns `MeterBenchError::Config` if a set variable cannot be parsed.
pub fn apply_env_overrides(config: &mut BenchConfig) -> Result<()> {
    if let Some(workers) = env_parse::<usize>(ENV_WORKERS)? {
        config.workers = Some(workers);
    }
    if let Some(iterations) = env_parse::<u64>(ENV_ITERATIONS)? {
        config.iterations = iterations;
    }
    if let Some(sample_size) = env_parse::<usize>(ENV_SAMPLE_SIZE)? {
        config.sample_size = sample_size;
    }
    if let Some(secs) = env_parse::<u64>(ENV_WARM_UP_SECS)? {
        config.warm_up_secs = secs;
    }
    if let Some(secs) = env_parse::<u64>(ENV_MEASUREMENT_SECS)? {
        config.measurement_secs = secs;
    }
    if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
        config.logging.level = level;
    }
    config.expose_metadata = env_bool(ENV_EXPOSE_METADATA, config.expose_metadata);
    config.logging.json = env_bool(ENV_LOG_JSON, config.logging.json);
    Ok(())
}

/// Load configuration from a file
///
/// If `path` is `None`, searches multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`find_config_path`].
///
/// # Errors
/// Returns `MeterBenchError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The configuration fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<BenchConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MeterBenchError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_path().ok_or_else(|| {
            MeterBenchError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MeterBenchError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<BenchConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| MeterBenchError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MeterBenchError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(MeterBenchError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its parent and grandparent, then
/// the executable's directory, trying each name in order.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_path() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `MeterBenchError::Config` if the variable is set but invalid.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| MeterBenchError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use parking_lot::Mutex;
    use tempfile::Builder;

    use super::*;

    static ENV_LOCK: Mutex<()> = parking_lot::const_mutex(());

    const ALL_VARS: [&str; 8] = [
        ENV_WORKERS,
        ENV_ITERATIONS,
        ENV_EXPOSE_METADATA,
        ENV_SAMPLE_SIZE,
        ENV_WARM_UP_SECS,
        ENV_MEASUREMENT_SECS,
        ENV_LOG_LEVEL,
        ENV_LOG_JSON,
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock();

        std::env::set_var("METERBENCH_TEST_BOOL_ON", "ON");
        std::env::set_var("METERBENCH_TEST_BOOL_OFF", "off");
        std::env::remove_var("METERBENCH_TEST_BOOL_MISSING");

        assert!(env_bool("METERBENCH_TEST_BOOL_ON", false));
        assert!(!env_bool("METERBENCH_TEST_BOOL_OFF", true));
        assert!(env_bool("METERBENCH_TEST_BOOL_MISSING", true));
        assert!(!env_bool("METERBENCH_TEST_BOOL_MISSING", false));

        std::env::remove_var("METERBENCH_TEST_BOOL_ON");
        std::env::remove_var("METERBENCH_TEST_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_without_vars_uses_defaults() {
        let _guard = ENV_LOCK.lock();
        clear_env();

        let config = load_from_env().unwrap();
        assert_eq!(config, BenchConfig::default());
    }

    #[test]
    fn test_load_from_env_overrides() {
        let _guard = ENV_LOCK.lock();
        clear_env();

        std::env::set_var(ENV_WORKERS, "4");
        std::env::set_var(ENV_ITERATIONS, " 5000 ");
        std::env::set_var(ENV_EXPOSE_METADATA, "false");
        std::env::set_var(ENV_SAMPLE_SIZE, "20");
        std::env::set_var(ENV_LOG_LEVEL, "debug");
        std::env::set_var(ENV_LOG_JSON, "yes");

        let result = load_from_env();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.workers, Some(4));
        assert_eq!(config.iterations, 5_000);
        assert!(!config.expose_metadata);
        assert_eq!(config.sample_size, 20);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock();
        clear_env();

        std::env::set_var(ENV_WORKERS, "many");
        let result = load_from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(matches!(err, MeterBenchError::Config(_)));
        assert!(err.to_string().contains(ENV_WORKERS));
    }

    #[test]
    fn test_load_from_env_rejects_zero_workers() {
        let _guard = ENV_LOCK.lock();
        clear_env();

        std::env::set_var(ENV_WORKERS, "0");
        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(MeterBenchError::Config(_))));
    }

    #[test]
    fn test_parse_config_unsupported_extension() {
        let err = parse_config("workers = 2", Path::new("bench.yaml")).unwrap_err();
        assert!(err.to_string().contains("Unsupported config format: yaml"));
    }

    #[test]
    fn test_parse_config_toml_partial() {
        let config = parse_config(
            "workers = 2\nhistogram_buckets = [1.0, 10.0, 100.0]\n",
            Path::new("meterbench.toml"),
        )
        .unwrap();
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.histogram_buckets, vec![1.0, 10.0, 100.0]);
        assert_eq!(config.sample_size, 100);
    }

    #[test]
    fn test_load_from_file_validates() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{ "histogram_buckets": [] }"#).unwrap();

        let err = load_from_file(Some(file.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }
}
