//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::policy::{PolicyError, PolicyFragment, DIRECTIVE_MESSAGE_FILE};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("{scope}: {source}")]
    Policy {
        scope: String,
        #[source]
        source: PolicyError,
    },

    #[error("invalid override \"{0}\", expected DIRECTIVE=VALUE")]
    Override(String),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A `directive=value` setting applied to the global scope after the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub directive: String,
    pub value: String,
}

impl FromStr for Override {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((directive, value)) if !directive.trim().is_empty() => Ok(Self {
                directive: directive.trim().to_string(),
                value: value.to_string(),
            }),
            _ => Err(ConfigError::Override(s.to_string())),
        }
    }
}

/// Where a configuration generation comes from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    /// TOML file; `None` runs on built-in defaults plus overrides.
    pub path: Option<PathBuf>,
    pub overrides: Vec<Override>,
}

impl ConfigSource {
    pub fn new(path: Option<PathBuf>, overrides: Vec<Override>) -> Self {
        Self { path, overrides }
    }

    /// Load, apply overrides and validate one configuration generation.
    pub fn load(&self) -> Result<GateConfig, ConfigError> {
        let (content, base_dir) = match &self.path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                (content, base_dir_of(path))
            }
            None => (String::new(), PathBuf::from(".")),
        };

        let mut config = parse_config(&content, &base_dir)?;
        apply_overrides(&mut config, &self.overrides, &base_dir)?;
        validate_config(&config).map_err(ConfigError::Validation)?;

        Ok(config)
    }

    /// Files a reload depends on: the configuration file and every message file it names.
    ///
    /// A file that does not parse contributes only itself.
    pub fn watched_files(&self) -> Vec<PathBuf> {
        let Some(path) = &self.path else {
            return Vec::new();
        };
        let base_dir = base_dir_of(path);
        let mut files = vec![path.clone()];

        let parsed = fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str::<GateConfig>(&content).ok());
        if let Some(config) = parsed {
            let fragments = std::iter::once(&config.policy).chain(config.hosts.iter().flat_map(|host| {
                std::iter::once(&host.policy).chain(host.locations.iter().map(|l| &l.policy))
            }));
            files.extend(
                fragments
                    .filter_map(|f| f.custom_message_file.as_ref())
                    .map(|file| base_dir.join(file)),
            );
        }

        files.extend(
            self.overrides
                .iter()
                .filter(|o| o.directive == DIRECTIVE_MESSAGE_FILE)
                .map(|o| base_dir.join(&o.value)),
        );
        files
    }
}

fn base_dir_of(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    ConfigSource::new(Some(path.to_path_buf()), Vec::new()).load()
}

/// Parse TOML text and inline every scope's message file.
///
/// Relative message file paths are resolved against `base_dir`.
pub fn parse_config(content: &str, base_dir: &Path) -> Result<GateConfig, ConfigError> {
    let mut config: GateConfig = toml::from_str(content)?;

    load_message_file(&mut config.policy, "global", base_dir)?;
    for host in &mut config.hosts {
        load_message_file(&mut host.policy, &format!("host {}", host.name), base_dir)?;
        for location in &mut host.locations {
            let scope = format!("host {} location {}", host.name, location.path_prefix);
            load_message_file(&mut location.policy, &scope, base_dir)?;
        }
    }

    Ok(config)
}

/// Apply command-line overrides to the global scope, in order.
pub fn apply_overrides(
    config: &mut GateConfig,
    overrides: &[Override],
    base_dir: &Path,
) -> Result<(), ConfigError> {
    for o in overrides {
        config
            .policy
            .apply(&o.directive, &o.value, base_dir)
            .map_err(|source| ConfigError::Policy {
                scope: "global".to_string(),
                source,
            })?;
    }
    Ok(())
}

fn load_message_file(fragment: &mut PolicyFragment, scope: &str, base_dir: &Path) -> Result<(), ConfigError> {
    fragment
        .load_message_file(base_dir)
        .map_err(|source| ConfigError::Policy {
            scope: scope.to_string(),
            source,
        })
}
