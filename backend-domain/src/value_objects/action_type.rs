// Leaderboard action value object

use serde::{Deserialize, Serialize};

use super::UpdateType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    #[serde(rename = "ADD")]
    Add,
    #[serde(rename = "SET")]
    Set,
    #[serde(rename = "REMOVE")]
    Remove,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Add => "ADD",
            ActionType::Set => "SET",
            ActionType::Remove => "REMOVE",
        }
    }

    /// Classifies a quantity change for point awarding. No change, no action.
    pub fn for_change(update_type: UpdateType, total_change: i64) -> Option<Self> {
        if total_change == 0 {
            return None;
        }
        match update_type {
            UpdateType::Absolute => Some(ActionType::Set),
            UpdateType::Relative if total_change > 0 => Some(ActionType::Add),
            UpdateType::Relative => Some(ActionType::Remove),
        }
    }
}

impl From<&str> for ActionType {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "ADD" => ActionType::Add,
            "REMOVE" => ActionType::Remove,
            _ => ActionType::Set,
        }
    }
}
