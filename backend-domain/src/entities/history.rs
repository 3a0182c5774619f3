// Resource history entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ChangeType, TransferDirection};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceHistoryEntry {
    pub id: String,
    pub resource_id: String,
    pub previous_quantity_hagga: i64,
    pub new_quantity_hagga: i64,
    pub change_amount_hagga: i64,
    pub previous_quantity_deep_desert: i64,
    pub new_quantity_deep_desert: i64,
    pub change_amount_deep_desert: i64,
    pub change_type: ChangeType,
    pub updated_by: String,
    pub reason: Option<String>,
    pub transfer_amount: Option<i64>,
    pub transfer_direction: Option<TransferDirection>,
    pub created_at: DateTime<Utc>,
}

/// A history row joined with its resource, used for activity feeds and exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    #[serde(flatten)]
    pub entry: ResourceHistoryEntry,
    pub resource_name: String,
    pub resource_category: Option<String>,
    pub change_amount: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityFilter {
    /// `None` lists everyone's activity.
    pub identifiers: Option<Vec<String>>,
    pub since: Option<DateTime<Utc>>,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErasureMode {
    Anonymize,
    Delete,
}

impl ErasureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErasureMode::Anonymize => "anonymization",
            ErasureMode::Delete => "deletion",
        }
    }
}
