//! Configuration for signature checking runs.
//!
//! ```toml
//! baseline = "signatures/java18.sig"
//! ignores = ["org.objectweb.*", "com.example.Generated"]
//! malformed_classes = "continue"
//!
//! [logging]
//! level = "debug"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Once;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;

/// Annotations that exempt a method (or a whole class) from checking when no
/// explicit list is configured.
pub const DEFAULT_SUPPRESSION_ANNOTATIONS: &[&str] = &[
    "org.jvnet.animal_sniffer.IgnoreJRERequirement",
    "org.codehaus.mojo.animal_sniffer.IgnoreJRERequirement",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnifferConfig {
    /// Path to the gzip-compressed signature baseline. Relative paths are
    /// resolved against the directory of the config file.
    #[serde(default)]
    pub baseline: Option<PathBuf>,

    /// Class or package names excluded from checking, dotted or slashed, with
    /// optional `*`/`?` wildcards (`org.objectweb.*`).
    #[serde(default)]
    pub ignores: Vec<String>,

    /// Annotation types whose presence on a method or class suppresses checks.
    #[serde(default = "SnifferConfig::default_suppression_annotations")]
    pub suppression_annotations: Vec<String>,

    /// What to do when a class file cannot be parsed.
    #[serde(default)]
    pub malformed_classes: MalformedClassPolicy,

    /// Check classes on a worker pool instead of one at a time.
    #[serde(default)]
    pub parallel: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SnifferConfig {
    fn default_suppression_annotations() -> Vec<String> {
        DEFAULT_SUPPRESSION_ANNOTATIONS
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

impl Default for SnifferConfig {
    fn default() -> Self {
        Self {
            baseline: None,
            ignores: Vec::new(),
            suppression_annotations: Self::default_suppression_annotations(),
            malformed_classes: MalformedClassPolicy::default(),
            parallel: false,
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedClassPolicy {
    /// Stop at the first class that cannot be parsed.
    #[default]
    Halt,
    /// Log the class, remember it, and keep checking the rest.
    Continue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A simple level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr. When disabled, events are still filtered but discarded.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            "off" | "none" => "off".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// The effective filter: the configured level, with `RUST_LOG` merged in
    /// when it is set.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.message().to_owned())
    }
}

impl SnifferConfig {
    /// Load a config file from TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::load_from_str(&text)?;
        if let (Some(baseline), Some(dir)) = (config.baseline.as_mut(), path.parent()) {
            if baseline.is_relative() {
                *baseline = dir.join(&*baseline);
            }
        }
        tracing::debug!(
            path = %path.display(),
            ignores = config.ignores.len(),
            "loaded sniffer config"
        );
        Ok(config)
    }

    /// Load a config from a TOML string. Relative paths are left untouched.
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

static TRACING_INIT: Once = Once::new();

/// Install a global `tracing` subscriber configured from `config`.
///
/// Safe to call more than once; only the first call has an effect. Returns
/// `true` if this call installed the subscriber.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let mut installed = false;
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();

        let writer = if config.stderr {
            // `TestWriter` plays nicely with `cargo test` output capture.
            if cfg!(debug_assertions) {
                BoxMakeWriter::new(tracing_subscriber::fmt::writer::TestWriter::with_stderr)
            } else {
                BoxMakeWriter::new(std::io::stderr)
            }
        } else {
            BoxMakeWriter::new(std::io::sink)
        };

        let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if config.json {
            Box::new(tracing_subscriber::fmt::layer().json().with_writer(writer))
        } else {
            Box::new(tracing_subscriber::fmt::layer().with_writer(writer))
        };

        installed = tracing_subscriber::registry()
            .with(layer)
            .with(filter)
            .try_init()
            .is_ok();
    });
    installed
}
