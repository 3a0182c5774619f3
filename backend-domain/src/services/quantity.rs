// Quantity change and transfer planning
//
// Repositories read the current resource inside a transaction, ask these
// functions what to write, then persist the plan together with its history
// row so the pair is atomic.

use serde::Serialize;

use crate::entities::{PointsCalculation, Resource, MAX_QUANTITY};
use crate::error::DomainError;
use crate::services::points::calculate_points;
use crate::value_objects::{ActionType, QuantityField, ResourceStatus, TransferDirection, UpdateType};

#[derive(Debug, Clone, PartialEq)]
pub struct QuantityChange {
    pub resource_id: String,
    pub update_type: UpdateType,
    pub field: QuantityField,
    /// Target value for absolute updates.
    pub quantity: Option<i64>,
    /// Signed delta for relative updates.
    pub change_value: Option<i64>,
    pub reason: Option<String>,
    /// Identity stamped on `last_updated_by`.
    pub acting_user: String,
    /// Identity credited in history and on the leaderboard.
    pub effective_user: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityPlan {
    pub previous_hagga: i64,
    pub new_hagga: i64,
    pub change_hagga: i64,
    pub previous_deep_desert: i64,
    pub new_deep_desert: i64,
    pub change_deep_desert: i64,
}

impl QuantityPlan {
    pub fn total_change(&self) -> i64 {
        self.change_hagga.saturating_add(self.change_deep_desert)
    }
}

fn out_of_range() -> DomainError {
    DomainError::InvalidInput(format!("Quantity cannot exceed {}", MAX_QUANTITY))
}

/// A leaderboard award derived from a quantity change.
#[derive(Debug, Clone, PartialEq)]
pub struct PointsAward {
    pub action: ActionType,
    pub amount: i64,
    pub status: ResourceStatus,
    pub category: String,
    pub calculation: PointsCalculation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityChangeOutcome {
    pub resource: Resource,
    pub points_earned: f64,
    pub points_calculation: Option<PointsCalculation>,
}

pub fn plan_quantity_change(
    resource: &Resource,
    update_type: UpdateType,
    field: QuantityField,
    quantity: Option<i64>,
    change_value: Option<i64>,
) -> Result<QuantityPlan, DomainError> {
    let current = match field {
        QuantityField::Hagga => resource.quantity_hagga,
        QuantityField::DeepDesert => resource.quantity_deep_desert,
    };
    let delta = match update_type {
        UpdateType::Absolute => {
            let target = quantity.ok_or_else(|| {
                DomainError::InvalidInput("quantity is required for absolute updates".to_string())
            })?;
            if target < 0 {
                return Err(DomainError::InvalidInput(
                    "Quantity cannot be negative".to_string(),
                ));
            }
            if target > MAX_QUANTITY {
                return Err(out_of_range());
            }
            target.checked_sub(current).ok_or_else(out_of_range)?
        }
        UpdateType::Relative => change_value.ok_or_else(|| {
            DomainError::InvalidInput("changeValue is required for relative updates".to_string())
        })?,
    };
    let updated = current.checked_add(delta).ok_or_else(out_of_range)?;
    if updated < 0 {
        return Err(DomainError::InvalidInput(
            "Quantity cannot be negative".to_string(),
        ));
    }
    if updated > MAX_QUANTITY {
        return Err(out_of_range());
    }

    let mut plan = QuantityPlan {
        previous_hagga: resource.quantity_hagga,
        new_hagga: resource.quantity_hagga,
        change_hagga: 0,
        previous_deep_desert: resource.quantity_deep_desert,
        new_deep_desert: resource.quantity_deep_desert,
        change_deep_desert: 0,
    };
    match field {
        QuantityField::Hagga => {
            plan.new_hagga = updated;
            plan.change_hagga = delta;
        }
        QuantityField::DeepDesert => {
            plan.new_deep_desert = updated;
            plan.change_deep_desert = delta;
        }
    }
    Ok(plan)
}

/// Points owed for a planned change, evaluated against the pre-change stock.
/// Returns `None` when nothing should be written to the leaderboard.
pub fn award_for_change(
    resource: &Resource,
    update_type: UpdateType,
    plan: &QuantityPlan,
) -> Option<PointsAward> {
    let total_change = plan.total_change();
    let action = ActionType::for_change(update_type, total_change)?;
    let amount = total_change.saturating_abs();
    let status = resource.status();
    let category = resource.category_or_other().to_string();
    let calculation = calculate_points(action, amount, resource.multiplier, status, &category);
    if calculation.final_points <= 0.0 {
        return None;
    }
    Some(PointsAward {
        action,
        amount,
        status,
        category,
        calculation,
    })
}

pub fn plan_transfer(
    resource: &Resource,
    amount: i64,
    direction: TransferDirection,
) -> Result<QuantityPlan, DomainError> {
    if amount <= 0 {
        return Err(DomainError::InvalidInput(
            "Transfer amount must be a positive integer".to_string(),
        ));
    }
    let (change_hagga, change_deep_desert) = match direction {
        TransferDirection::ToDeepDesert => {
            if resource.quantity_hagga < amount {
                return Err(DomainError::InvalidInput(
                    "Insufficient quantity in Hagga base".to_string(),
                ));
            }
            (-amount, amount)
        }
        TransferDirection::ToHagga => {
            if resource.quantity_deep_desert < amount {
                return Err(DomainError::InvalidInput(
                    "Insufficient quantity in Deep Desert base".to_string(),
                ));
            }
            (amount, -amount)
        }
    };
    let new_hagga = resource
        .quantity_hagga
        .checked_add(change_hagga)
        .filter(|value| *value <= MAX_QUANTITY)
        .ok_or_else(out_of_range)?;
    let new_deep_desert = resource
        .quantity_deep_desert
        .checked_add(change_deep_desert)
        .filter(|value| *value <= MAX_QUANTITY)
        .ok_or_else(out_of_range)?;
    Ok(QuantityPlan {
        previous_hagga: resource.quantity_hagga,
        new_hagga,
        change_hagga,
        previous_deep_desert: resource.quantity_deep_desert,
        new_deep_desert,
        change_deep_desert,
    })
}

pub fn transfer_reason(amount: i64, direction: TransferDirection) -> String {
    format!("Transfer {} {}", amount, direction.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn resource(hagga: i64, deep: i64, target: Option<i64>, category: &str) -> Resource {
        let now = Utc::now();
        Resource {
            id: "r1".to_string(),
            name: "Plastanium".to_string(),
            category: Some(category.to_string()),
            subcategory: None,
            tier: None,
            description: None,
            icon: None,
            image_url: None,
            quantity_hagga: hagga,
            quantity_deep_desert: deep,
            target_quantity: target,
            multiplier: 1.0,
            is_priority: false,
            last_updated_by: "tester".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn absolute_update_computes_delta_on_selected_base() {
        let current = resource(100, 40, None, "Raw");
        let plan = plan_quantity_change(
            &current,
            UpdateType::Absolute,
            QuantityField::DeepDesert,
            Some(25),
            None,
        )
        .expect("plan");
        assert_eq!(plan.new_deep_desert, 25);
        assert_eq!(plan.change_deep_desert, -15);
        assert_eq!(plan.new_hagga, 100);
        assert_eq!(plan.change_hagga, 0);
    }

    #[test]
    fn relative_update_rejects_negative_result() {
        let current = resource(10, 0, None, "Raw");
        let err = plan_quantity_change(&current, UpdateType::Relative, QuantityField::Hagga, None, Some(-11))
            .expect_err("negative stock");
        assert_eq!(err, DomainError::InvalidInput("Quantity cannot be negative".to_string()));
    }

    #[test]
    fn missing_values_are_rejected() {
        let current = resource(10, 0, None, "Raw");
        assert!(plan_quantity_change(&current, UpdateType::Absolute, QuantityField::Hagga, None, Some(3)).is_err());
        assert!(plan_quantity_change(&current, UpdateType::Relative, QuantityField::Hagga, Some(3), None).is_err());
    }

    #[test]
    fn extreme_values_are_rejected_without_overflow() {
        let current = resource(10, 0, None, "Raw");
        let err = plan_quantity_change(&current, UpdateType::Absolute, QuantityField::Hagga, Some(i64::MIN), None)
            .expect_err("negative absolute");
        assert_eq!(err, DomainError::InvalidInput("Quantity cannot be negative".to_string()));
        assert!(plan_quantity_change(&current, UpdateType::Absolute, QuantityField::Hagga, Some(i64::MAX), None).is_err());
        assert!(plan_quantity_change(&current, UpdateType::Relative, QuantityField::Hagga, None, Some(i64::MAX)).is_err());
        assert!(plan_quantity_change(&current, UpdateType::Relative, QuantityField::Hagga, None, Some(i64::MIN)).is_err());

        let full = resource(MAX_QUANTITY, 0, None, "Raw");
        let err = plan_quantity_change(&full, UpdateType::Relative, QuantityField::Hagga, None, Some(1))
            .expect_err("above bound");
        assert_eq!(err, DomainError::InvalidInput(format!("Quantity cannot exceed {}", MAX_QUANTITY)));
    }

    #[test]
    fn transfer_of_huge_amounts_is_rejected() {
        let current = resource(5, MAX_QUANTITY, None, "Raw");
        assert!(plan_transfer(&current, i64::MAX, TransferDirection::ToDeepDesert).is_err());
        assert!(plan_transfer(&current, 1, TransferDirection::ToDeepDesert).is_err());
        let plan = plan_transfer(&current, MAX_QUANTITY - 5, TransferDirection::ToHagga).expect("transfer");
        assert_eq!(plan.new_hagga, MAX_QUANTITY);
    }

    #[test]
    fn award_uses_pre_change_status() {
        let current = resource(0, 0, Some(10_000), "Raw");
        let plan = plan_quantity_change(&current, UpdateType::Relative, QuantityField::Hagga, None, Some(1000))
            .expect("plan");
        let award = award_for_change(&current, UpdateType::Relative, &plan).expect("award");
        assert_eq!(award.action, ActionType::Add);
        assert_eq!(award.status, ResourceStatus::Critical);
        assert_eq!(award.calculation.final_points, 110.0);
    }

    #[test]
    fn removals_and_no_ops_award_nothing() {
        let current = resource(500, 0, None, "Raw");
        let removal = plan_quantity_change(&current, UpdateType::Relative, QuantityField::Hagga, None, Some(-100))
            .expect("plan");
        assert!(award_for_change(&current, UpdateType::Relative, &removal).is_none());

        let unchanged = plan_quantity_change(&current, UpdateType::Absolute, QuantityField::Hagga, Some(500), None)
            .expect("plan");
        assert!(award_for_change(&current, UpdateType::Absolute, &unchanged).is_none());
    }

    #[test]
    fn transfer_moves_stock_between_bases() {
        let current = resource(30, 5, None, "Raw");
        let plan = plan_transfer(&current, 20, TransferDirection::ToDeepDesert).expect("transfer");
        assert_eq!((plan.new_hagga, plan.new_deep_desert), (10, 25));
        assert_eq!(plan.total_change(), 0);

        let err = plan_transfer(&current, 6, TransferDirection::ToHagga).expect_err("insufficient");
        assert_eq!(
            err,
            DomainError::InvalidInput("Insufficient quantity in Deep Desert base".to_string())
        );
        assert_eq!(transfer_reason(20, TransferDirection::ToDeepDesert), "Transfer 20 to_deep_desert");
    }
}
