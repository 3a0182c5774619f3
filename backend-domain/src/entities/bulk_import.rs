// Bulk CSV import entities

use serde::{Deserialize, Serialize};

pub const CSV_HEADER: [&str; 5] = [
    "id",
    "name",
    "quantityHagga",
    "quantityDeepDesert",
    "targetQuantity",
];

/// One uploaded CSV row, kept as raw text until validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvRow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity_hagga: String,
    #[serde(default)]
    pub quantity_deep_desert: String,
    #[serde(default)]
    pub target_quantity: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantitySnapshot {
    #[serde(rename = "quantityHagga")]
    pub quantity_hagga: i64,
    #[serde(rename = "quantityDeepDesert")]
    pub quantity_deep_desert: i64,
    #[serde(rename = "targetQuantity", default)]
    pub target_quantity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuantities {
    pub quantity_hagga: String,
    pub quantity_deep_desert: String,
    pub target_quantity: String,
}

/// Proposed values: parsed for valid rows, echoed verbatim for invalid ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiffValues {
    Parsed(QuantitySnapshot),
    Raw(RawQuantities),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_hagga: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_deep_desert: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_quantity: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.quantity_hagga.is_none()
            && self.quantity_deep_desert.is_none()
            && self.target_quantity.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    NotFound,
    Invalid,
    Changed,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDiffRow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub status: ImportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<QuantitySnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<DiffValues>,
}

/// A validated change ready to be written by the confirm step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkUpdate {
    pub id: String,
    pub values: QuantitySnapshot,
}
