// Discord role hierarchy entity
//
// Role configuration is supplied as a JSON array, typically through the
// DISCORD_ROLES_CONFIG environment variable. Each entry maps a Discord role
// id to a level and a set of capability flags.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

use crate::entities::{DiscordGuildRole, EnrichedRole};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub level: i64,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub can_edit_targets: bool,
    #[serde(default)]
    pub can_access_resources: bool,
    #[serde(default)]
    pub can_view_reports: bool,
    #[serde(default)]
    pub can_manage_users: bool,
    #[serde(default)]
    pub can_export_data: bool,
}

impl RoleConfig {
    /// Human readable labels for every capability this role grants.
    pub fn permission_labels(&self) -> Vec<String> {
        let flags = [
            (self.is_admin, "Administrator"),
            (self.can_edit_targets, "Edit Targets"),
            (self.can_access_resources, "View Resources"),
            (self.can_view_reports, "View Reports"),
            (self.can_manage_users, "Manage Users"),
            (self.can_export_data, "Export Data"),
        ];
        flags
            .iter()
            .filter(|(enabled, _)| *enabled)
            .map(|(_, label)| label.to_string())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPermissions {
    pub has_resource_access: bool,
    pub has_resource_admin_access: bool,
    pub has_target_edit_access: bool,
    pub has_report_access: bool,
    pub has_user_management_access: bool,
    pub has_data_export_access: bool,
}

#[derive(Debug, Error)]
pub enum RoleConfigError {
    #[error("roles config is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("roles config must be a JSON array")]
    NotAnArray,
}

/// An entry dropped while parsing the roles config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleConfigIssue {
    NotAnObject { index: usize },
    MissingField { index: usize, field: &'static str },
    Malformed { index: usize, reason: String },
}

impl fmt::Display for RoleConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleConfigIssue::NotAnObject { index } => {
                write!(f, "role entry {} is not an object", index)
            }
            RoleConfigIssue::MissingField { index, field } => {
                write!(f, "role entry {} is missing a non-empty '{}'", index, field)
            }
            RoleConfigIssue::Malformed { index, reason } => {
                write!(f, "role entry {} is malformed: {}", index, reason)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoleParseReport {
    pub hierarchy: RoleHierarchy,
    pub issues: Vec<RoleConfigIssue>,
}

/// Permission resolver built from the roles config.
#[derive(Debug, Clone, Default)]
pub struct RoleHierarchy {
    roles: Vec<RoleConfig>,
}

impl RoleHierarchy {
    pub fn new(roles: Vec<RoleConfig>) -> Self {
        Self { roles }
    }

    /// Parses a JSON roles document, dropping and reporting invalid entries.
    pub fn parse(raw: &str) -> Result<RoleParseReport, RoleConfigError> {
        let value: Value = serde_json::from_str(raw)?;
        let Value::Array(entries) = value else {
            return Err(RoleConfigError::NotAnArray);
        };

        let mut roles = Vec::with_capacity(entries.len());
        let mut issues = Vec::new();
        for (index, entry) in entries.into_iter().enumerate() {
            match validate_entry(index, entry) {
                Ok(role) => roles.push(role),
                Err(issue) => {
                    warn!("dropping invalid role config entry: {}", issue);
                    issues.push(issue);
                }
            }
        }
        if roles.is_empty() {
            warn!("no valid roles found in roles config");
        }

        Ok(RoleParseReport {
            hierarchy: RoleHierarchy { roles },
            issues,
        })
    }

    /// Lenient loader: any failure is logged and yields an empty hierarchy.
    pub fn from_config(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            warn!("DISCORD_ROLES_CONFIG is not set, no roles will grant permissions");
            return Self::default();
        };
        match Self::parse(raw) {
            Ok(report) => report.hierarchy,
            Err(err) => {
                error!("failed to load roles config: {}", err);
                Self::default()
            }
        }
    }

    pub fn roles(&self) -> &[RoleConfig] {
        &self.roles
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn role(&self, role_id: &str) -> Option<&RoleConfig> {
        self.roles.iter().find(|role| role.id == role_id)
    }

    pub fn role_name(&self, role_id: &str) -> String {
        self.role(role_id)
            .map(|role| role.name.clone())
            .unwrap_or_else(|| format!("Unknown Role ({})", role_id))
    }

    /// Highest-level configured role among `user_roles`; ties keep the first seen.
    pub fn highest_role(&self, user_roles: &[String]) -> Option<&RoleConfig> {
        let mut highest: Option<&RoleConfig> = None;
        for role in user_roles.iter().filter_map(|id| self.role(id)) {
            match highest {
                Some(current) if role.level <= current.level => {}
                _ => highest = Some(role),
            }
        }
        highest
    }

    pub fn hierarchy_roles(&self, user_roles: &[String]) -> Vec<&RoleConfig> {
        let mut roles: Vec<&RoleConfig> =
            user_roles.iter().filter_map(|id| self.role(id)).collect();
        roles.sort_by(|a, b| b.level.cmp(&a.level));
        roles
    }

    pub fn has_resource_access(&self, user_roles: &[String]) -> bool {
        self.check_flag(user_roles, "resource access", |role| role.can_access_resources)
    }

    pub fn has_resource_admin_access(&self, user_roles: &[String]) -> bool {
        self.check_flag(user_roles, "resource admin access", |role| role.is_admin)
    }

    pub fn has_target_edit_access(&self, user_roles: &[String]) -> bool {
        self.check_flag(user_roles, "target edit access", |role| role.can_edit_targets)
    }

    pub fn has_report_access(&self, user_roles: &[String]) -> bool {
        self.any_role(user_roles, |role| role.can_view_reports)
    }

    pub fn has_user_management_access(&self, user_roles: &[String]) -> bool {
        self.any_role(user_roles, |role| role.can_manage_users)
    }

    pub fn has_data_export_access(&self, user_roles: &[String]) -> bool {
        self.any_role(user_roles, |role| role.can_export_data)
    }

    pub fn permissions_for(&self, user_roles: &[String]) -> UserPermissions {
        UserPermissions {
            has_resource_access: self.has_resource_access(user_roles),
            has_resource_admin_access: self.has_resource_admin_access(user_roles),
            has_target_edit_access: self.has_target_edit_access(user_roles),
            has_report_access: self.has_report_access(user_roles),
            has_user_management_access: self.has_user_management_access(user_roles),
            has_data_export_access: self.has_data_export_access(user_roles),
        }
    }

    /// Guild roles that are configured here, labelled with their capabilities
    /// and ordered by Discord position, highest first.
    pub fn enrich(&self, mut guild_roles: Vec<DiscordGuildRole>) -> Vec<EnrichedRole> {
        guild_roles.sort_by(|a, b| b.position.cmp(&a.position));
        guild_roles
            .into_iter()
            .filter_map(|guild_role| {
                let configured = self.role(&guild_role.id)?;
                Some(EnrichedRole {
                    id: guild_role.id,
                    name: guild_role.name,
                    color: guild_role.color,
                    permissions: configured.permission_labels(),
                })
            })
            .collect()
    }

    fn check_flag(
        &self,
        user_roles: &[String],
        label: &str,
        flag: impl Fn(&RoleConfig) -> bool,
    ) -> bool {
        if !self.roles.iter().any(&flag) {
            warn!("no configured role grants {}", label);
            return false;
        }
        self.any_role(user_roles, flag)
    }

    fn any_role(&self, user_roles: &[String], flag: impl Fn(&RoleConfig) -> bool) -> bool {
        user_roles
            .iter()
            .filter_map(|id| self.role(id))
            .any(|role| flag(role))
    }
}

fn validate_entry(index: usize, entry: Value) -> Result<RoleConfig, RoleConfigIssue> {
    let Value::Object(map) = entry else {
        return Err(RoleConfigIssue::NotAnObject { index });
    };
    for field in ["id", "name"] {
        let present = map
            .get(field)
            .and_then(Value::as_str)
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false);
        if !present {
            return Err(RoleConfigIssue::MissingField { index, field });
        }
    }
    let mut role: RoleConfig = serde_json::from_value(Value::Object(map))
        .map_err(|err| RoleConfigIssue::Malformed {
            index,
            reason: err.to_string(),
        })?;
    role.id = role.id.trim().to_string();
    role.name = role.name.trim().to_string();
    Ok(role)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLES: &str = r#"[
        {"id": "100", "name": "Member", "level": 1, "canAccessResources": true},
        {"id": "200", "name": "Officer", "level": 50, "canAccessResources": true, "canEditTargets": true, "canViewReports": true},
        {"id": "300", "name": "Leader", "level": 100, "isAdmin": true, "canManageUsers": true, "canExportData": true}
    ]"#;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn hierarchy() -> RoleHierarchy {
        RoleHierarchy::parse(ROLES).expect("parse roles").hierarchy
    }

    #[test]
    fn entries_missing_id_or_name_are_dropped_with_one_issue_each() {
        let raw = r#"[
            {"id": "1", "name": "Valid", "level": 1},
            {"name": "No id"},
            {"id": "3"},
            {"id": "", "name": "Blank id"},
            "not an object",
            {"id": "6", "name": "Also valid"}
        ]"#;
        let report = RoleHierarchy::parse(raw).expect("parse roles");
        let kept: Vec<&str> = report
            .hierarchy
            .roles()
            .iter()
            .map(|role| role.id.as_str())
            .collect();
        assert_eq!(kept, vec!["1", "6"]);
        assert_eq!(report.issues.len(), 4);
        assert_eq!(
            report.issues[1],
            RoleConfigIssue::MissingField { index: 2, field: "name" }
        );
        assert_eq!(report.issues[3], RoleConfigIssue::NotAnObject { index: 4 });
    }

    #[test]
    fn non_array_or_invalid_json_is_an_error() {
        assert!(matches!(
            RoleHierarchy::parse(r#"{"id": "1"}"#),
            Err(RoleConfigError::NotAnArray)
        ));
        assert!(matches!(
            RoleHierarchy::parse("[{"),
            Err(RoleConfigError::InvalidJson(_))
        ));
        assert!(RoleHierarchy::from_config(Some("not json")).is_empty());
        assert!(RoleHierarchy::from_config(None).is_empty());
    }

    #[test]
    fn highest_role_prefers_level_and_keeps_first_on_ties() {
        let roles = hierarchy();
        let highest = roles.highest_role(&ids(&["100", "300", "200"]));
        assert_eq!(highest.map(|role| role.id.as_str()), Some("300"));

        let tied = RoleHierarchy::new(vec![
            RoleConfig {
                id: "a".to_string(),
                name: "A".to_string(),
                level: 5,
                is_admin: false,
                can_edit_targets: false,
                can_access_resources: false,
                can_view_reports: false,
                can_manage_users: false,
                can_export_data: false,
            },
            RoleConfig {
                id: "b".to_string(),
                name: "B".to_string(),
                level: 5,
                is_admin: false,
                can_edit_targets: false,
                can_access_resources: false,
                can_view_reports: false,
                can_manage_users: false,
                can_export_data: false,
            },
        ]);
        let winner = tied.highest_role(&ids(&["b", "a"]));
        assert_eq!(winner.map(|role| role.id.as_str()), Some("b"));
        assert!(tied.highest_role(&ids(&["unknown"])).is_none());
    }

    #[test]
    fn hierarchy_roles_are_sorted_by_level_descending() {
        let roles = hierarchy();
        let sorted: Vec<&str> = roles
            .hierarchy_roles(&ids(&["100", "300", "200", "999"]))
            .into_iter()
            .map(|role| role.name.as_str())
            .collect();
        assert_eq!(sorted, vec!["Leader", "Officer", "Member"]);
    }

    #[test]
    fn permissions_are_granted_when_any_role_has_the_flag() {
        let roles = hierarchy();
        let member = roles.permissions_for(&ids(&["100"]));
        assert!(member.has_resource_access);
        assert!(!member.has_target_edit_access);
        assert!(!member.has_resource_admin_access);

        let officer_and_leader = roles.permissions_for(&ids(&["200", "300"]));
        assert!(officer_and_leader.has_target_edit_access);
        assert!(officer_and_leader.has_resource_admin_access);
        assert!(officer_and_leader.has_user_management_access);
        assert!(officer_and_leader.has_report_access);

        let stranger = roles.permissions_for(&ids(&["42"]));
        assert_eq!(stranger, UserPermissions::default());
    }

    #[test]
    fn enrich_skips_unconfigured_roles_and_orders_by_position() {
        let roles = hierarchy();
        let guild = vec![
            DiscordGuildRole {
                id: "100".to_string(),
                name: "Member".to_string(),
                color: 1,
                position: 1,
            },
            DiscordGuildRole {
                id: "555".to_string(),
                name: "Bots".to_string(),
                color: 2,
                position: 9,
            },
            DiscordGuildRole {
                id: "300".to_string(),
                name: "Leader".to_string(),
                color: 3,
                position: 5,
            },
        ];
        let enriched = roles.enrich(guild);
        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].id, "300");
        assert_eq!(
            enriched[0].permissions,
            vec!["Administrator", "Manage Users", "Export Data"]
        );
        assert_eq!(enriched[1].permissions, vec!["View Resources"]);
    }

    #[test]
    fn unknown_role_names_are_labelled() {
        let roles = hierarchy();
        assert_eq!(roles.role_name("200"), "Officer");
        assert_eq!(roles.role_name("777"), "Unknown Role (777)");
    }
}
