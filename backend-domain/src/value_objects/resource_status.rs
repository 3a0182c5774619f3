// Resource stock status value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    Critical,
    BelowTarget,
    AtTarget,
    AboveTarget,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Critical => "critical",
            ResourceStatus::BelowTarget => "below_target",
            ResourceStatus::AtTarget => "at_target",
            ResourceStatus::AboveTarget => "above_target",
        }
    }

    /// Derives the status from the combined stock of both bases.
    ///
    /// Resources without a positive target are always considered at target.
    pub fn from_quantities(total: i64, target: Option<i64>) -> Self {
        let Some(target) = target.filter(|value| *value > 0) else {
            return ResourceStatus::AtTarget;
        };
        let percentage = total as f64 / target as f64 * 100.0;
        if percentage >= 150.0 {
            ResourceStatus::AboveTarget
        } else if percentage >= 100.0 {
            ResourceStatus::AtTarget
        } else if percentage >= 50.0 {
            ResourceStatus::BelowTarget
        } else {
            ResourceStatus::Critical
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "critical" => Some(ResourceStatus::Critical),
            "below_target" => Some(ResourceStatus::BelowTarget),
            "at_target" => Some(ResourceStatus::AtTarget),
            "above_target" => Some(ResourceStatus::AboveTarget),
            _ => None,
        }
    }
}

impl From<&str> for ResourceStatus {
    fn from(s: &str) -> Self {
        ResourceStatus::parse(s).unwrap_or(ResourceStatus::AtTarget)
    }
}
