// execdemo/src/log/mod.rs
//
// Copyright (c) 2025 Arcella Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer,
};

use crate::error::{ExecError, Result as ExecdemoResult};

pub const LOG_FILE_NAME: &str = "execdemo.log";

/// Initializes the global tracing subscriber.
///
/// Returns the file writer guard when file logging is enabled; the caller must
/// keep it alive until shutdown or buffered lines are lost.
pub fn init(cfg: &LogConfig) -> ExecdemoResult<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let mut file_guard: Option<tracing_appender::non_blocking::WorkerGuard> = None;

    let env_filter = build_filter(cfg)?;

    let mut layers = Vec::new();

    // 1. File layer
    if cfg.file {
        std::fs::create_dir_all(&cfg.dir)
            .map_err(|e| ExecError::io_with_path(&cfg.dir, e))?;

        let file_appender = tracing_appender::rolling::never(&cfg.dir, LOG_FILE_NAME);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = if cfg.structured {
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false)
                .boxed()
        } else {
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .boxed()
        };
        layers.push(file_layer);
        file_guard = Some(guard);
    }

    // 2. StdErr layer
    if cfg.stderr {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
            .boxed();
        layers.push(console_layer);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| ExecError::Internal(format!("failed to init tracing: {}", e)))?;

    Ok(file_guard)
}

/// Builds `execdemo=<level>` plus one directive per module override.
pub fn filter_directives(cfg: &LogConfig) -> String {
    let mut directives = vec![format!("execdemo={}", cfg.level)];

    let mut modules: Vec<_> = cfg.modules.iter().collect();
    modules.sort_by(|a, b| a.0.cmp(b.0));
    for (target, level) in modules {
        directives.push(format!("{}={}", target, level));
    }

    directives.join(",")
}

fn build_filter(cfg: &LogConfig) -> ExecdemoResult<EnvFilter> {
    EnvFilter::try_new(filter_directives(cfg))
        .map_err(|e| ExecError::Config(format!("invalid log filter: {}", e)))
}

/// Helper: deserialize LevelFilter from string (e.g., "info", "debug")
fn deserialize_level_filter<'de, D>(deserializer: D) -> Result<LevelFilter, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<LevelFilter>().map_err(serde::de::Error::custom)
}

fn deserialize_module_levels<'de, D>(deserializer: D) -> Result<HashMap<String, LevelFilter>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: HashMap<String, String> = Deserialize::deserialize(deserializer)?;
    let mut result = HashMap::new();
    for (target, level_str) in map {
        let level = level_str
            .parse::<LevelFilter>()
            .map_err(serde::de::Error::custom)?;
        result.insert(target, level);
    }
    Ok(result)
}

/// `[log]` section of the configuration file.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_level", deserialize_with = "deserialize_level_filter")]
    pub level: LevelFilter,

    /// JSON lines in the log file instead of plain text.
    #[serde(default)]
    pub structured: bool,

    #[serde(default = "default_stderr")]
    pub stderr: bool,

    #[serde(default)]
    pub file: bool,

    /// Directory for `execdemo.log`. Relative paths are resolved against the base dir.
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    #[serde(default, deserialize_with = "deserialize_module_levels")]
    pub modules: HashMap<String, LevelFilter>,
}

fn default_log_level() -> LevelFilter { LevelFilter::INFO }
fn default_stderr() -> bool { true }
fn default_log_dir() -> PathBuf { PathBuf::from("log") }

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            structured: false,
            stderr: default_stderr(),
            file: false,
            dir: default_log_dir(),
            modules: HashMap::new(),
        }
    }
}
