//! Per-scope policy settings as authored in configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::policy::{
    PolicyError, Toggle, DIRECTIVE_BLOCK_HTTP09, DIRECTIVE_BLOCK_HTTP10, DIRECTIVE_BLOCK_HTTP11,
    DIRECTIVE_ENABLE, DIRECTIVE_MESSAGE, DIRECTIVE_MESSAGE_FILE,
};

/// The five settings one scope may declare. Anything left unset is inherited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyFragment {
    /// Whether this scope participates in blocking at all.
    #[serde(rename = "block_legacy_http")]
    pub enabled: Toggle,

    pub block_http09: Toggle,

    pub block_http10: Toggle,

    pub block_http11: Toggle,

    /// Full rejection body replacing the built-in template.
    #[serde(rename = "legacy_http_message", skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,

    /// File whose contents become `custom_message` at load time.
    #[serde(rename = "legacy_http_message_file", skip_serializing_if = "Option::is_none")]
    pub custom_message_file: Option<PathBuf>,
}

impl PolicyFragment {
    /// Set the custom rejection body. A scope may set it only once.
    pub fn set_custom_message(&mut self, message: impl Into<String>) -> Result<(), PolicyError> {
        if self.custom_message.is_some() {
            return Err(PolicyError::DuplicateCustomMessage);
        }
        self.custom_message = Some(message.into());
        Ok(())
    }

    /// Apply one named directive with a textual value.
    ///
    /// Relative message file paths are resolved against `base_dir`.
    pub fn apply(&mut self, directive: &str, value: &str, base_dir: &Path) -> Result<(), PolicyError> {
        match directive {
            DIRECTIVE_ENABLE => self.enabled = value.parse()?,
            DIRECTIVE_BLOCK_HTTP09 => self.block_http09 = value.parse()?,
            DIRECTIVE_BLOCK_HTTP10 => self.block_http10 = value.parse()?,
            DIRECTIVE_BLOCK_HTTP11 => self.block_http11 = value.parse()?,
            DIRECTIVE_MESSAGE => self.set_custom_message(value)?,
            DIRECTIVE_MESSAGE_FILE => {
                let message = read_message_file(&base_dir.join(value))?;
                self.set_custom_message(message)?;
            }
            other => {
                return Err(PolicyError::UnknownDirective {
                    name: other.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Inline the contents of `legacy_http_message_file`, if one was given.
    ///
    /// Declaring both an inline message and a message file in the same scope
    /// counts as setting the message twice.
    pub fn load_message_file(&mut self, base_dir: &Path) -> Result<(), PolicyError> {
        let Some(path) = self.custom_message_file.take() else {
            return Ok(());
        };
        let message = read_message_file(&base_dir.join(path))?;
        self.set_custom_message(message)
    }
}

fn read_message_file(path: &Path) -> Result<String, PolicyError> {
    fs::read_to_string(path).map_err(|source| PolicyError::MessageFile {
        path: path.to_path_buf(),
        source,
    })
}
