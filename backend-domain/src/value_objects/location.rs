// Storage location value objects

use serde::{Deserialize, Serialize};

/// Which base quantity an update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QuantityField {
    #[default]
    #[serde(rename = "quantityHagga")]
    Hagga,
    #[serde(rename = "quantityDeepDesert")]
    DeepDesert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    ToDeepDesert,
    ToHagga,
}

impl TransferDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferDirection::ToDeepDesert => "to_deep_desert",
            TransferDirection::ToHagga => "to_hagga",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "to_deep_desert" => Some(TransferDirection::ToDeepDesert),
            "to_hagga" => Some(TransferDirection::ToHagga),
            _ => None,
        }
    }
}
