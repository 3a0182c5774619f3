// Leaderboard entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ActionType, ResourceStatus};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsCalculation {
    pub base_points: f64,
    pub resource_multiplier: f64,
    pub status_bonus: f64,
    pub final_points: f64,
}

impl PointsCalculation {
    pub fn zero(multiplier: f64) -> Self {
        Self {
            base_points: 0.0,
            resource_multiplier: multiplier,
            status_bonus: 0.0,
            final_points: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub user_id: String,
    pub resource_id: String,
    pub action_type: ActionType,
    pub quantity_changed: i64,
    pub base_points: f64,
    pub resource_multiplier: f64,
    pub status_bonus: f64,
    pub final_points: f64,
    pub resource_name: String,
    pub resource_category: String,
    pub resource_status: ResourceStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRow {
    pub rank: i64,
    pub user_id: String,
    pub total_points: f64,
    pub total_actions: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingPage {
    pub rankings: Vec<RankingRow>,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionSummary {
    pub total_points: f64,
    pub total_actions: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionPage {
    pub contributions: Vec<LeaderboardEntry>,
    pub summary: ContributionSummary,
    pub total: i64,
}
