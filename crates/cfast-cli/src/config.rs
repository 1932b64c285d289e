//! Configuration file management for cfast.
//!
//! Provides a TOML-based config file at `~/.config/cfast/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const ENV_SEED: &str = "CFAST_SEED";
pub const ENV_DIFFICULTY: &str = "CFAST_DIFFICULTY";
pub const ENV_OUTPUT_DIR: &str = "CFAST_OUTPUT_DIR";

pub const DEFAULT_DIFFICULTY: f64 = 0.5;

/// File name of the attempt log inside the output directory.
pub const ATTEMPTS_FILE: &str = "attempts.jsonl";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub run: RunSection,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunSection {
    /// Fixed seed for every run. Omit to draw a fresh seed per run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the cfast config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/cfast` or `~/.config/cfast`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("cfast");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("cfast")
}

/// Return the path to the cfast config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Where attempts go when nothing else says otherwise.
pub fn default_output_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cfast")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(config, &config_path())
}

pub fn save_config_to(config: &ConfigFile, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }
    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;
    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line, if any.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub seed: Option<u64>,
    pub difficulty: Option<f64>,
    pub output_dir: Option<PathBuf>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone, PartialEq)]
pub struct CfastConfig {
    /// `None` means "draw a fresh seed".
    pub seed: Option<u64>,
    pub difficulty: f64,
    pub output_dir: PathBuf,
}

impl CfastConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Seed: `--seed` > `CFAST_SEED` > `run.seed` > fresh per run
    /// - Difficulty: `--difficulty` > `CFAST_DIFFICULTY` > `run.difficulty` > 0.5
    /// - Output dir: `--output-dir` > `CFAST_OUTPUT_DIR` > `run.output_dir` > data dir
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let file_config = load_config().ok();
        Self::resolve_with(cli, |key| std::env::var(key).ok(), file_config.as_ref())
    }

    /// [`resolve`](Self::resolve) with the environment and config file
    /// supplied by the caller.
    pub fn resolve_with(
        cli: &CliOverrides,
        env: impl Fn(&str) -> Option<String>,
        file: Option<&ConfigFile>,
    ) -> Result<Self> {
        let run = file.map(|f| f.run.clone()).unwrap_or_default();

        let seed = if let Some(seed) = cli.seed {
            Some(seed)
        } else if let Some(raw) = env(ENV_SEED) {
            Some(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("{ENV_SEED} is not a valid seed: {raw:?}"))?,
            )
        } else {
            run.seed
        };

        let difficulty = if let Some(d) = cli.difficulty {
            d
        } else if let Some(raw) = env(ENV_DIFFICULTY) {
            raw.trim()
                .parse::<f64>()
                .with_context(|| format!("{ENV_DIFFICULTY} is not a number: {raw:?}"))?
        } else {
            run.difficulty.unwrap_or(DEFAULT_DIFFICULTY)
        };

        let output_dir = if let Some(dir) = &cli.output_dir {
            dir.clone()
        } else if let Some(dir) = env(ENV_OUTPUT_DIR) {
            PathBuf::from(dir)
        } else {
            run.output_dir.unwrap_or_else(default_output_dir)
        };

        Ok(Self {
            seed,
            difficulty,
            output_dir,
        })
    }

    pub fn attempts_path(&self) -> PathBuf {
        self.output_dir.join(ATTEMPTS_FILE)
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn file_config() -> ConfigFile {
        ConfigFile {
            run: RunSection {
                seed: Some(11),
                difficulty: Some(0.2),
                output_dir: Some(PathBuf::from("/from/file")),
            },
        }
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("cfast").join("config.toml");

        let original = file_config();
        save_config_to(&original, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn missing_optional_keys_parse() {
        let loaded: ConfigFile = toml::from_str("[run]\ndifficulty = 0.9\n").unwrap();
        assert_eq!(loaded.run.seed, None);
        assert_eq!(loaded.run.difficulty, Some(0.9));
        assert_eq!(loaded.run.output_dir, None);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = load_config_from(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let cli = CliOverrides {
            seed: Some(1),
            difficulty: Some(0.75),
            output_dir: Some(PathBuf::from("/from/cli")),
        };
        let env = env_of(&[
            (ENV_SEED, "2"),
            (ENV_DIFFICULTY, "0.1"),
            (ENV_OUTPUT_DIR, "/from/env"),
        ]);
        let config = CfastConfig::resolve_with(&cli, env, Some(&file_config())).unwrap();
        assert_eq!(config.seed, Some(1));
        assert_eq!(config.difficulty, 0.75);
        assert_eq!(config.output_dir, PathBuf::from("/from/cli"));
    }

    #[test]
    fn resolve_with_env_var_overrides_config_file() {
        let env = env_of(&[(ENV_SEED, " 2 "), (ENV_OUTPUT_DIR, "/from/env")]);
        let config =
            CfastConfig::resolve_with(&CliOverrides::default(), env, Some(&file_config())).unwrap();
        assert_eq!(config.seed, Some(2));
        assert_eq!(config.difficulty, 0.2);
        assert_eq!(config.output_dir, PathBuf::from("/from/env"));
        assert_eq!(
            config.attempts_path(),
            PathBuf::from("/from/env").join(ATTEMPTS_FILE)
        );
    }

    #[test]
    fn resolve_defaults_when_nothing_set() {
        let config = CfastConfig::resolve_with(&CliOverrides::default(), env_of(&[]), None).unwrap();
        assert_eq!(config.seed, None);
        assert_eq!(config.difficulty, DEFAULT_DIFFICULTY);
        assert_eq!(config.output_dir, default_output_dir());
    }

    #[test]
    fn resolve_rejects_malformed_env_values() {
        let err = CfastConfig::resolve_with(
            &CliOverrides::default(),
            env_of(&[(ENV_SEED, "seven")]),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains(ENV_SEED), "unexpected error: {err}");

        let err = CfastConfig::resolve_with(
            &CliOverrides::default(),
            env_of(&[(ENV_DIFFICULTY, "hard")]),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains(ENV_DIFFICULTY), "unexpected error: {err}");
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("cfast/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
