// execdemo/src/config/mod.rs
//
// Copyright (c) 2025 Arcella Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{ExecError, Result as ExecdemoResult};
use crate::log::LogConfig;

pub const CONFIG_FILE_NAME: &str = "execdemo.toml";
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/exec";

/// Non-critical problems found while loading the configuration.
///
/// Collected before the logger exists and logged by the caller afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigLoadWarning {
    /// General-purpose warning for unexpected conditions.
    Internal(String),

    /// No configuration file at the default location; built-in defaults are used.
    DefaultsUsed { path: PathBuf },
}

impl std::fmt::Display for ConfigLoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigLoadWarning::Internal(msg) => {
                write!(f, "{}", msg)
            }
            ConfigLoadWarning::DefaultsUsed { path } => {
                write!(f, "Config file {:?} not found, using defaults", path)
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ExecConfig {
    /// Directory the config was resolved from; not read from the file.
    #[serde(skip)]
    pub base_dir: PathBuf,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub package: PackageConfig,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            client: ClientConfig::default(),
            log: LogConfig::default(),
            package: PackageConfig::default(),
        }
    }
}

/// `[client]` section.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Canned queries offered by the `samples` / `sample` subcommands.
    #[serde(default = "default_samples")]
    pub samples: Vec<String>,
}

fn default_endpoint() -> String { DEFAULT_ENDPOINT.to_string() }

fn default_samples() -> Vec<String> {
    vec!["insert into product(name) values ('mouse'), ('keyboard')".to_string()]
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            samples: default_samples(),
        }
    }
}

/// `[package]` section.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PackageConfig {
    /// Project root holding `package.json`, `build/` and `package/`.
    #[serde(default = "default_package_root")]
    pub root: PathBuf,
}

fn default_package_root() -> PathBuf { PathBuf::from(".") }

impl Default for PackageConfig {
    fn default() -> Self {
        Self { root: default_package_root() }
    }
}

/// Determines the base directory based on the executable location or environment.
///
/// Priority:
/// 1. The parent of `bin` when the executable lives in a `bin` directory.
/// 2. The executable's directory if it contains a `config` subdirectory.
/// 3. `~/.execdemo`.
pub async fn find_base_dir() -> ExecdemoResult<PathBuf> {
    if let Ok(current_exe) = env::current_exe() {
        if let Some(parent) = current_exe.parent() {
            if parent.file_name() == Some(std::ffi::OsStr::new("bin")) {
                if let Some(root) = parent.parent() {
                    return Ok(root.to_path_buf());
                }
            }

            if fs::metadata(parent.join("config")).await.map(|m| m.is_dir()).unwrap_or(false) {
                return Ok(parent.to_path_buf());
            }
        }
    }

    dirs::home_dir()
        .map(|d| d.join(".execdemo"))
        .ok_or_else(|| ExecError::Internal("Cannot determine home directory".into()))
}

/// Parses configuration text. Missing sections and keys fall back to defaults.
pub fn parse(contents: &str, source: &Path) -> ExecdemoResult<ExecConfig> {
    toml::from_str(contents)
        .map_err(|e| ExecError::Config(format!("{}: {}", source.display(), e)))
}

/// Loads the configuration.
///
/// An explicit path must exist. Without one, `<base>/config/execdemo.toml` is
/// used when present, otherwise the defaults with a [`ConfigLoadWarning`].
pub async fn load(explicit: Option<&Path>) -> ExecdemoResult<(ExecConfig, Vec<ConfigLoadWarning>)> {
    let mut warnings = vec![];

    let (config_path, base_dir) = match explicit {
        Some(path) => {
            let base = path
                .parent()
                .and_then(|p| p.parent())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            (path.to_path_buf(), base)
        }
        None => {
            let base = find_base_dir().await?;
            (base.join("config").join(CONFIG_FILE_NAME), base)
        }
    };

    let mut config = match fs::read_to_string(&config_path).await {
        Ok(contents) => parse(&contents, &config_path)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
            warnings.push(ConfigLoadWarning::DefaultsUsed { path: config_path.clone() });
            ExecConfig::default()
        }
        Err(e) => return Err(ExecError::io_with_path(&config_path, e)),
    };

    config.base_dir = base_dir;
    if config.log.dir.is_relative() {
        config.log.dir = config.base_dir.join(&config.log.dir);
    }

    if config.client.samples.is_empty() {
        warnings.push(ConfigLoadWarning::Internal(
            "client.samples is empty, `sample` subcommand has nothing to submit".to_string(),
        ));
    }

    Ok((config, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = parse("", Path::new("empty.toml")).unwrap();
        assert_eq!(config.client.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.client.samples.len(), 1);
        assert_eq!(config.log, LogConfig::default());
        assert_eq!(config.package.root, PathBuf::from("."));
    }

    #[test]
    fn test_parse_partial_fills_from_defaults() {
        let config = parse(
            r#"
            [client]
            endpoint = "http://demo:9000/exec"

            [log]
            level = "debug"
            "#,
            Path::new("partial.toml"),
        )
        .unwrap();

        assert_eq!(config.client.endpoint, "http://demo:9000/exec");
        assert_eq!(config.client.samples, default_samples());
        assert_eq!(config.log.level, LevelFilter::DEBUG);
        assert!(config.log.stderr);
    }

    #[test]
    fn test_parse_invalid_toml_is_config_error() {
        let err = parse("[client\nendpoint = ", Path::new("broken.toml")).unwrap_err();
        match err {
            ExecError::Config(msg) => assert!(msg.contains("broken.toml")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_explicit_path_resolves_log_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_dir = temp_dir.path().join("config");
        std::fs::create_dir_all(&config_dir).unwrap();
        let path = config_dir.join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[client]\nsamples = [\"select 1\", \"select 2\"]\n[log]\ndir = \"logs\"\n",
        )
        .unwrap();

        let (config, warnings) = load(Some(&path)).await.unwrap();

        assert!(warnings.is_empty());
        assert_eq!(config.base_dir, temp_dir.path());
        assert_eq!(config.log.dir, temp_dir.path().join("logs"));
        assert_eq!(config.client.samples, vec!["select 1", "select 2"]);
    }

    #[tokio::test]
    async fn test_load_explicit_missing_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config").join("nope.toml");

        let err = load(Some(&path)).await.unwrap_err();
        assert!(matches!(err, ExecError::IoWithPath { .. }));
    }

    #[tokio::test]
    async fn test_load_warns_on_empty_samples() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[client]\nsamples = []\n").unwrap();

        let (_, warnings) = load(Some(&path)).await.unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ConfigLoadWarning::Internal(_)));
    }
}
