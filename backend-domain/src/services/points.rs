// Leaderboard points calculation

use crate::entities::PointsCalculation;
use crate::utils::round_to_cents;
use crate::value_objects::{ActionType, ResourceStatus};

pub const BASE_POINTS_PER_THOUSAND: f64 = 100.0;
pub const SET_ACTION_POINTS: f64 = 1.0;
pub const REFINED_FLAT_POINTS: f64 = 2.0;
pub const POINT_ELIGIBLE_CATEGORIES: [&str; 3] = ["Raw", "Components", "Refined"];

/// Bonus fraction granted for contributing to a resource in short supply.
pub fn status_bonus(status: ResourceStatus) -> f64 {
    match status {
        ResourceStatus::Critical => 0.10,
        ResourceStatus::BelowTarget => 0.05,
        ResourceStatus::AtTarget | ResourceStatus::AboveTarget => 0.0,
    }
}

pub fn calculate_points(
    action: ActionType,
    amount: i64,
    multiplier: f64,
    status: ResourceStatus,
    category: &str,
) -> PointsCalculation {
    match action {
        ActionType::Remove => PointsCalculation::zero(multiplier),
        ActionType::Set => PointsCalculation {
            base_points: SET_ACTION_POINTS,
            resource_multiplier: 1.0,
            status_bonus: 0.0,
            final_points: SET_ACTION_POINTS,
        },
        ActionType::Add => {
            if !POINT_ELIGIBLE_CATEGORIES.contains(&category) {
                return PointsCalculation::zero(multiplier);
            }
            if category == "Refined" {
                return PointsCalculation {
                    base_points: REFINED_FLAT_POINTS,
                    resource_multiplier: 1.0,
                    status_bonus: 0.0,
                    final_points: REFINED_FLAT_POINTS,
                };
            }
            let base_points = amount.max(0) as f64 / 1000.0 * BASE_POINTS_PER_THOUSAND;
            let multiplied = base_points * multiplier;
            let bonus = status_bonus(status);
            // The bonus is stored as a fraction; only the final total is rounded.
            PointsCalculation {
                base_points,
                resource_multiplier: multiplier,
                status_bonus: bonus,
                final_points: round_to_cents(multiplied + multiplied * bonus),
            }
        }
    }
}
