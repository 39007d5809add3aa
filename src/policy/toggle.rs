//! Three-valued configuration flag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::policy::PolicyError;

/// A flag as written in one configuration scope.
///
/// `Inherit` means the scope did not set the flag; the value comes from the
/// nearest enclosing scope that did, or from the system default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "ToggleRepr", into = "ToggleRepr")]
pub enum Toggle {
    On,
    Off,
    #[default]
    Inherit,
}

impl Toggle {
    /// Resolve against the value inherited from the parent scope.
    pub fn or(self, inherited: bool) -> bool {
        match self {
            Toggle::On => true,
            Toggle::Off => false,
            Toggle::Inherit => inherited,
        }
    }
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        if value {
            Toggle::On
        } else {
            Toggle::Off
        }
    }
}

impl FromStr for Toggle {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" | "true" => Ok(Toggle::On),
            "off" | "false" => Ok(Toggle::Off),
            "inherit" => Ok(Toggle::Inherit),
            _ => Err(PolicyError::InvalidFlag {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Toggle::On => f.write_str("on"),
            Toggle::Off => f.write_str("off"),
            Toggle::Inherit => f.write_str("inherit"),
        }
    }
}

/// Accepted on-disk forms: a TOML boolean or one of the words above.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
enum ToggleRepr {
    Bool(bool),
    Word(String),
}

impl TryFrom<ToggleRepr> for Toggle {
    type Error = PolicyError;

    fn try_from(repr: ToggleRepr) -> Result<Self, Self::Error> {
        match repr {
            ToggleRepr::Bool(b) => Ok(b.into()),
            ToggleRepr::Word(w) => w.parse(),
        }
    }
}

impl From<Toggle> for ToggleRepr {
    fn from(toggle: Toggle) -> Self {
        match toggle {
            Toggle::On => ToggleRepr::Bool(true),
            Toggle::Off => ToggleRepr::Bool(false),
            Toggle::Inherit => ToggleRepr::Word("inherit".to_string()),
        }
    }
}
