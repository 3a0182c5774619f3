use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::dtos::{
    ActivitySummary, DataExport, DataExportFile, DataExportUser, DataRetention, PrivacyRights,
};
use crate::queries::session_queries::SessionContext;
use crate::{AppError, AppState};
use backend_domain::{ActivityEntry, ActivityFilter, ChangeType, User};

const EXPORT_VERSION: &str = "1.0";
const EXPORT_ACTIVITY_LIMIT: usize = 100_000;

/// GDPR export of the caller's own data.
pub async fn export_own_data(
    state: &AppState,
    ctx: &SessionContext,
) -> Result<DataExportFile, AppError> {
    ctx.require_resource_access()?;
    let session = &ctx.session;
    build_export_file(state, &session.user, &session.roles, session.is_in_guild).await
}

/// GDPR export of another user's data, for user managers.
pub async fn export_user_data(
    state: &AppState,
    ctx: &SessionContext,
    user_id: &str,
) -> Result<DataExportFile, AppError> {
    if !ctx.permissions.has_user_management_access {
        return Err(AppError::Unauthorized);
    }
    let user = state
        .user_repo
        .find_user(user_id)
        .await
        .map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    info!("{} exported data of user {}", ctx.identifier(), user.id);
    build_export_file(state, &user, &user.roles, false).await
}

async fn build_export_file(
    state: &AppState,
    user: &User,
    roles: &[String],
    is_in_guild: bool,
) -> Result<DataExportFile, AppError> {
    let filter = ActivityFilter {
        identifiers: Some(user.activity_identifiers()),
        since: None,
        limit: EXPORT_ACTIVITY_LIMIT,
    };
    let activity = state
        .history_repo
        .list_activity(&filter)
        .await
        .map_err(|err| {
            error!("failed to load activity for export: {}", err);
            AppError::Internal(err)
        })?;

    let now = Utc::now();
    let export = build_export(user, roles, is_in_guild, activity, now);
    let body = serde_json::to_string_pretty(&export).map_err(|err| AppError::Internal(err.into()))?;
    Ok(DataExportFile {
        filename: export_filename(&export.user.current_identifier, now),
        body,
    })
}

pub fn build_export(
    user: &User,
    roles: &[String],
    is_in_guild: bool,
    activity: Vec<ActivityEntry>,
    now: DateTime<Utc>,
) -> DataExport {
    DataExport {
        export_date: now,
        export_version: EXPORT_VERSION,
        user: DataExportUser {
            id: user.id.clone(),
            name: user.username.clone(),
            image: user.avatar.clone(),
            discord_nickname: user.discord_nickname.clone(),
            roles: roles.to_vec(),
            is_in_guild,
            current_identifier: user.identifier(),
        },
        summary: summarize(&activity),
        resource_activity: activity,
        data_retention: DataRetention {
            resource_activity: "Indefinitely (until deletion request)",
            session_tokens: "30 days",
            discord_profile: "Refreshed on each login",
        },
        privacy_rights: PrivacyRights {
            right_to_access: "This export",
            right_to_rectification: "Contact administrators",
            right_to_erasure: "Available via Privacy & Data page",
            right_to_portability: "This JSON export",
            right_to_object: "Contact administrators",
        },
    }
}

/// Activity arrives newest first.
fn summarize(activity: &[ActivityEntry]) -> ActivitySummary {
    ActivitySummary {
        total_changes: activity.len(),
        first_activity: activity.last().map(|item| item.entry.created_at),
        last_activity: activity.first().map(|item| item.entry.created_at),
        total_additions: activity.iter().filter(|item| item.change_amount > 0).count(),
        total_removals: activity.iter().filter(|item| item.change_amount < 0).count(),
        total_absolute_changes: activity
            .iter()
            .filter(|item| item.entry.change_type == ChangeType::Absolute)
            .count(),
        total_relative_changes: activity
            .iter()
            .filter(|item| item.entry.change_type == ChangeType::Relative)
            .count(),
    }
}

fn export_filename(identifier: &str, now: DateTime<Utc>) -> String {
    let safe: String = identifier
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "resource-tracker-data-{}-{}.json",
        safe,
        now.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::ResourceHistoryEntry;
    use chrono::{Duration, TimeZone};

    fn user() -> User {
        let now = Utc::now();
        User {
            id: "u-1".to_string(),
            discord_id: "42".to_string(),
            username: "stilgar".to_string(),
            avatar: None,
            custom_nickname: None,
            discord_nickname: Some("Stil gar".to_string()),
            roles: vec!["100".to_string()],
            created_at: now,
            last_login: now,
        }
    }

    fn activity(change: i64, change_type: ChangeType, at: DateTime<Utc>) -> ActivityEntry {
        ActivityEntry {
            entry: ResourceHistoryEntry {
                id: format!("h{}", change),
                resource_id: "r1".to_string(),
                previous_quantity_hagga: 0,
                new_quantity_hagga: change.max(0),
                change_amount_hagga: change,
                previous_quantity_deep_desert: 0,
                new_quantity_deep_desert: 0,
                change_amount_deep_desert: 0,
                change_type,
                updated_by: "stilgar".to_string(),
                reason: None,
                transfer_amount: None,
                transfer_direction: None,
                created_at: at,
            },
            resource_name: "Spice".to_string(),
            resource_category: Some("Raw".to_string()),
            change_amount: change,
        }
    }

    #[test]
    fn summary_counts_direction_and_kind() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).single().expect("timestamp");
        let rows = vec![
            activity(5, ChangeType::Relative, now),
            activity(-2, ChangeType::Relative, now - Duration::days(1)),
            activity(10, ChangeType::Absolute, now - Duration::days(2)),
        ];
        let export = build_export(&user(), &["100".to_string()], true, rows, now);
        let summary = &export.summary;
        assert_eq!(summary.total_changes, 3);
        assert_eq!(summary.total_additions, 2);
        assert_eq!(summary.total_removals, 1);
        assert_eq!(summary.total_absolute_changes, 1);
        assert_eq!(summary.total_relative_changes, 2);
        assert_eq!(summary.last_activity, Some(now));
        assert_eq!(summary.first_activity, Some(now - Duration::days(2)));

        let json = serde_json::to_value(&export).expect("serialize export");
        assert_eq!(json["exportVersion"], "1.0");
        assert_eq!(json["user"]["currentIdentifier"], "Stil gar");
        assert_eq!(json["privacyRights"]["rightToPortability"], "This JSON export");
        assert_eq!(json["resourceActivity"][0]["resourceName"], "Spice");
    }

    #[test]
    fn filename_is_sanitized_and_dated() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).single().expect("timestamp");
        assert_eq!(
            export_filename("Stil gar/../x", now),
            "resource-tracker-data-Stil_gar____x-2025-03-01.json"
        );
    }
}
