// Resource entity

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::ResourceStatus;

pub const RESOURCE_CATEGORIES: [&str; 5] = ["Raw", "Refined", "Components", "Blueprints", "Other"];

pub const PRIORITY_UPDATE_THRESHOLD_HOURS: i64 = 24;
pub const NON_PRIORITY_UPDATE_THRESHOLD_HOURS: i64 = 48;

/// Upper bound for any stored count, per base or as a target.
pub const MAX_QUANTITY: i64 = i32::MAX as i64;

pub fn quantity_in_range(value: i64) -> bool {
    (0..=MAX_QUANTITY).contains(&value)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub tier: Option<i64>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub image_url: Option<String>,
    pub quantity_hagga: i64,
    pub quantity_deep_desert: i64,
    pub target_quantity: Option<i64>,
    pub multiplier: f64,
    pub is_priority: bool,
    pub last_updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    pub fn total_quantity(&self) -> i64 {
        self.quantity_hagga.saturating_add(self.quantity_deep_desert)
    }

    pub fn status(&self) -> ResourceStatus {
        ResourceStatus::from_quantities(self.total_quantity(), self.target_quantity)
    }

    pub fn category_or_other(&self) -> &str {
        self.category.as_deref().unwrap_or("Other")
    }

    /// Priority resources go stale after a day, everything else after two.
    pub fn needs_update(&self, now: DateTime<Utc>) -> bool {
        let threshold = if self.is_priority {
            PRIORITY_UPDATE_THRESHOLD_HOURS
        } else {
            NON_PRIORITY_UPDATE_THRESHOLD_HOURS
        };
        self.updated_at < now - Duration::hours(threshold)
    }
}

/// Resource with its derived status, as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    #[serde(flatten)]
    pub resource: Resource,
    pub status: ResourceStatus,
    pub needs_update: bool,
}

impl ResourceView {
    pub fn new(resource: Resource, now: DateTime<Utc>) -> Self {
        let status = resource.status();
        let needs_update = resource.needs_update(now);
        Self {
            resource,
            status,
            needs_update,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceFilters {
    pub status: Option<ResourceStatus>,
    pub category: Option<String>,
    pub needs_update: bool,
    pub priority: bool,
    pub search_term: Option<String>,
}

impl ResourceFilters {
    pub fn is_empty(&self) -> bool {
        self == &ResourceFilters::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewResource {
    pub name: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub tier: Option<i64>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub image_url: Option<String>,
    pub quantity_hagga: i64,
    pub quantity_deep_desert: i64,
    pub target_quantity: Option<i64>,
    pub multiplier: f64,
    pub is_priority: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceMetadataUpdate {
    pub id: String,
    pub name: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub tier: Option<i64>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub image_url: Option<String>,
    pub multiplier: f64,
    pub is_priority: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(is_priority: bool, updated_hours_ago: i64) -> Resource {
        let now = Utc::now();
        Resource {
            id: "r1".to_string(),
            name: "Spice".to_string(),
            category: Some("Raw".to_string()),
            subcategory: None,
            tier: None,
            description: None,
            icon: None,
            image_url: None,
            quantity_hagga: 10,
            quantity_deep_desert: 5,
            target_quantity: Some(100),
            multiplier: 1.0,
            is_priority,
            last_updated_by: "tester".to_string(),
            created_at: now,
            updated_at: now - Duration::hours(updated_hours_ago),
        }
    }

    #[test]
    fn staleness_depends_on_priority() {
        let now = Utc::now();
        assert!(resource(true, 30).needs_update(now));
        assert!(!resource(false, 30).needs_update(now));
        assert!(resource(false, 49).needs_update(now));
    }

    #[test]
    fn view_carries_status_from_both_bases() {
        let view = ResourceView::new(resource(false, 1), Utc::now());
        assert_eq!(view.status, ResourceStatus::Critical);
        let json = serde_json::to_value(&view).expect("serialize view");
        assert_eq!(json["status"], "critical");
        assert_eq!(json["quantityHagga"], 10);
    }

    #[test]
    fn oversized_rows_still_render() {
        let mut huge = resource(false, 1);
        huge.quantity_hagga = i64::MAX;
        huge.quantity_deep_desert = i64::MAX;
        assert_eq!(huge.total_quantity(), i64::MAX);
        assert_eq!(ResourceView::new(huge, Utc::now()).status, ResourceStatus::AboveTarget);
    }

    #[test]
    fn quantities_are_bounded() {
        assert!(quantity_in_range(0));
        assert!(quantity_in_range(MAX_QUANTITY));
        assert!(!quantity_in_range(MAX_QUANTITY + 1));
        assert!(!quantity_in_range(-1));
    }
}
