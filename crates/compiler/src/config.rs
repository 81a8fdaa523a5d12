//! Driver Configuration
//!
//! Defaults come first, then an optional `glift.toml` in the working
//! directory, then the `GLIFT_OUT_DIR` environment variable, then CLI
//! flags (applied by the caller). The file is deliberately small: trial
//! count, seed, heap size, output directory.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment override for the directory graphs and witnesses land in.
pub const OUT_DIR_ENV: &str = "GLIFT_OUT_DIR";

/// The config file name looked up in the working directory.
pub const CONFIG_FILE: &str = "glift.toml";

/// Raw `glift.toml` contents; every key optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConfigFile {
    pub trials: Option<u32>,
    pub seed: Option<u64>,
    pub heap_objs: Option<usize>,
    pub out_dir: Option<PathBuf>,
}

impl ConfigFile {
    /// Parse a config file, if it exists. Unreadable or malformed files
    /// are reported and treated as absent.
    pub fn load(path: &Path) -> ConfigFile {
        let Ok(text) = std::fs::read_to_string(path) else {
            return ConfigFile::default();
        };
        match toml::from_str(&text) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("ignoring malformed {}: {}", path.display(), e);
                ConfigFile::default()
            }
        }
    }
}

/// Resolved driver settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig {
    pub trials: u32,
    pub seed: u64,
    pub heap_objs: usize,
    pub out_dir: PathBuf,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            trials: 200,
            seed: 1234,
            heap_objs: 6,
            out_dir: PathBuf::from("out"),
        }
    }
}

impl DriverConfig {
    /// Layer a config file and an env-var override onto the defaults.
    pub fn resolve(file: ConfigFile, env_out_dir: Option<PathBuf>) -> DriverConfig {
        let mut config = DriverConfig::default();
        if let Some(trials) = file.trials {
            config.trials = trials;
        }
        if let Some(seed) = file.seed {
            config.seed = seed;
        }
        if let Some(heap_objs) = file.heap_objs {
            config.heap_objs = heap_objs;
        }
        if let Some(out_dir) = file.out_dir {
            config.out_dir = out_dir;
        }
        if let Some(out_dir) = env_out_dir {
            config.out_dir = out_dir;
        }
        config
    }

    /// Resolve from the process environment and working directory.
    pub fn from_environment() -> DriverConfig {
        let file = ConfigFile::load(Path::new(CONFIG_FILE));
        let env_out_dir = std::env::var_os(OUT_DIR_ENV).map(PathBuf::from);
        DriverConfig::resolve(file, env_out_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = DriverConfig::resolve(ConfigFile::default(), None);
        assert_eq!(config, DriverConfig::default());
        assert_eq!(config.trials, 200);
        assert_eq!(config.seed, 1234);
        assert_eq!(config.heap_objs, 6);
        assert_eq!(config.out_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_file_keys_override_defaults() {
        let file: ConfigFile =
            toml::from_str("trials = 50\nseed = 9\nout-dir = \"graphs\"").unwrap();
        let config = DriverConfig::resolve(file, None);
        assert_eq!(config.trials, 50);
        assert_eq!(config.seed, 9);
        assert_eq!(config.heap_objs, 6);
        assert_eq!(config.out_dir, PathBuf::from("graphs"));
    }

    #[test]
    fn test_env_outranks_file() {
        let file: ConfigFile = toml::from_str("out-dir = \"from-file\"").unwrap();
        let config = DriverConfig::resolve(file, Some(PathBuf::from("from-env")));
        assert_eq!(config.out_dir, PathBuf::from("from-env"));
    }

    #[test]
    fn test_unknown_keys_tolerated() {
        let file: ConfigFile = toml::from_str("trials = 3\nfuture-knob = true").unwrap();
        assert_eq!(file.trials, Some(3));
    }

    #[test]
    #[serial]
    fn test_from_environment_reads_env_var() {
        // SAFETY: serialized test; no other thread reads the environment.
        unsafe { std::env::set_var(OUT_DIR_ENV, "env-out") };
        let config = DriverConfig::from_environment();
        unsafe { std::env::remove_var(OUT_DIR_ENV) };
        assert_eq!(config.out_dir, PathBuf::from("env-out"));
    }
}
