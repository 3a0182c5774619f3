// History change type value objects

use serde::{Deserialize, Serialize};

/// How a client expressed a quantity update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    #[default]
    Absolute,
    Relative,
}

impl UpdateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateType::Absolute => "absolute",
            UpdateType::Relative => "relative",
        }
    }
}

/// Kind of change recorded in a history row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Absolute,
    Relative,
    Transfer,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Absolute => "absolute",
            ChangeType::Relative => "relative",
            ChangeType::Transfer => "transfer",
        }
    }
}

impl From<UpdateType> for ChangeType {
    fn from(value: UpdateType) -> Self {
        match value {
            UpdateType::Absolute => ChangeType::Absolute,
            UpdateType::Relative => ChangeType::Relative,
        }
    }
}

impl From<&str> for ChangeType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "relative" => ChangeType::Relative,
            "transfer" => ChangeType::Transfer,
            _ => ChangeType::Absolute,
        }
    }
}
