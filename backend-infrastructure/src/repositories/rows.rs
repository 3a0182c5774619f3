use sqlx::FromRow;
use tracing::warn;

use backend_domain::utils::millis_to_utc;
use backend_domain::{
    ActionType, ActivityEntry, AuthSession, ChangeType, LeaderboardEntry, RankingRow, Resource,
    ResourceHistoryEntry, ResourceStatus, TransferDirection, User,
};

pub(crate) const RESOURCE_COLUMNS: &str = "id, name, category, subcategory, tier, description, icon, \
    image_url, quantity_hagga, quantity_deep_desert, target_quantity, multiplier, is_priority, \
    last_updated_by, created_at, updated_at";

pub(crate) const HISTORY_COLUMNS: &str = "h.id AS id, h.resource_id AS resource_id, \
    h.previous_quantity_hagga AS previous_quantity_hagga, h.new_quantity_hagga AS new_quantity_hagga, \
    h.change_amount_hagga AS change_amount_hagga, \
    h.previous_quantity_deep_desert AS previous_quantity_deep_desert, \
    h.new_quantity_deep_desert AS new_quantity_deep_desert, \
    h.change_amount_deep_desert AS change_amount_deep_desert, h.change_type AS change_type, \
    h.updated_by AS updated_by, h.reason AS reason, h.transfer_amount AS transfer_amount, \
    h.transfer_direction AS transfer_direction, h.created_at AS created_at";

pub(crate) const USER_COLUMNS: &str = "id, discord_id, username, avatar, custom_nickname, \
    discord_nickname, roles, created_at, last_login";

#[derive(Debug, Clone, FromRow)]
pub struct ResourceRow {
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
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<ResourceRow> for Resource {
    fn from(row: ResourceRow) -> Self {
        Resource {
            id: row.id,
            name: row.name,
            category: row.category,
            subcategory: row.subcategory,
            tier: row.tier,
            description: row.description,
            icon: row.icon,
            image_url: row.image_url,
            quantity_hagga: row.quantity_hagga,
            quantity_deep_desert: row.quantity_deep_desert,
            target_quantity: row.target_quantity,
            multiplier: row.multiplier,
            is_priority: row.is_priority,
            last_updated_by: row.last_updated_by,
            created_at: millis_to_utc(row.created_at),
            updated_at: millis_to_utc(row.updated_at),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct HistoryRow {
    pub id: String,
    pub resource_id: String,
    pub previous_quantity_hagga: i64,
    pub new_quantity_hagga: i64,
    pub change_amount_hagga: i64,
    pub previous_quantity_deep_desert: i64,
    pub new_quantity_deep_desert: i64,
    pub change_amount_deep_desert: i64,
    pub change_type: String,
    pub updated_by: String,
    pub reason: Option<String>,
    pub transfer_amount: Option<i64>,
    pub transfer_direction: Option<String>,
    pub created_at: i64,
}

impl From<HistoryRow> for ResourceHistoryEntry {
    fn from(row: HistoryRow) -> Self {
        ResourceHistoryEntry {
            id: row.id,
            resource_id: row.resource_id,
            previous_quantity_hagga: row.previous_quantity_hagga,
            new_quantity_hagga: row.new_quantity_hagga,
            change_amount_hagga: row.change_amount_hagga,
            previous_quantity_deep_desert: row.previous_quantity_deep_desert,
            new_quantity_deep_desert: row.new_quantity_deep_desert,
            change_amount_deep_desert: row.change_amount_deep_desert,
            change_type: ChangeType::from(row.change_type.as_str()),
            updated_by: row.updated_by,
            reason: row.reason,
            transfer_amount: row.transfer_amount,
            transfer_direction: row
                .transfer_direction
                .as_deref()
                .and_then(TransferDirection::parse),
            created_at: millis_to_utc(row.created_at),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ActivityRow {
    #[sqlx(flatten)]
    pub history: HistoryRow,
    pub resource_name: String,
    pub resource_category: Option<String>,
}

impl From<ActivityRow> for ActivityEntry {
    fn from(row: ActivityRow) -> Self {
        let entry = ResourceHistoryEntry::from(row.history);
        let change_amount = entry.change_amount_hagga + entry.change_amount_deep_desert;
        ActivityEntry {
            entry,
            resource_name: row.resource_name,
            resource_category: row.resource_category,
            change_amount,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct LeaderboardRow {
    pub id: String,
    pub user_id: String,
    pub resource_id: String,
    pub action_type: String,
    pub quantity_changed: i64,
    pub base_points: f64,
    pub resource_multiplier: f64,
    pub status_bonus: f64,
    pub final_points: f64,
    pub resource_name: String,
    pub resource_category: String,
    pub resource_status: String,
    pub created_at: i64,
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(row: LeaderboardRow) -> Self {
        LeaderboardEntry {
            id: row.id,
            user_id: row.user_id,
            resource_id: row.resource_id,
            action_type: ActionType::from(row.action_type.as_str()),
            quantity_changed: row.quantity_changed,
            base_points: row.base_points,
            resource_multiplier: row.resource_multiplier,
            status_bonus: row.status_bonus,
            final_points: row.final_points,
            resource_name: row.resource_name,
            resource_category: row.resource_category,
            resource_status: ResourceStatus::from(row.resource_status.as_str()),
            created_at: millis_to_utc(row.created_at),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RankingDbRow {
    pub rank: i64,
    pub user_id: String,
    pub total_points: f64,
    pub total_actions: i64,
}

impl From<RankingDbRow> for RankingRow {
    fn from(row: RankingDbRow) -> Self {
        RankingRow {
            rank: row.rank,
            user_id: row.user_id,
            total_points: row.total_points,
            total_actions: row.total_actions,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub discord_id: String,
    pub username: String,
    pub avatar: Option<String>,
    pub custom_nickname: Option<String>,
    pub discord_nickname: Option<String>,
    pub roles: String,
    pub created_at: i64,
    pub last_login: i64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            roles: decode_roles(&row.roles),
            id: row.id,
            discord_id: row.discord_id,
            username: row.username,
            avatar: row.avatar,
            custom_nickname: row.custom_nickname,
            discord_nickname: row.discord_nickname,
            created_at: millis_to_utc(row.created_at),
            last_login: millis_to_utc(row.last_login),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub session_id: String,
    pub session_roles: String,
    pub is_in_guild: bool,
    pub access_token: String,
    pub session_created_at: i64,
    pub expires_at: i64,
    #[sqlx(flatten)]
    pub user: UserRow,
}

impl From<SessionRow> for AuthSession {
    fn from(row: SessionRow) -> Self {
        AuthSession {
            session_id: row.session_id,
            roles: decode_roles(&row.session_roles),
            is_in_guild: row.is_in_guild,
            access_token: row.access_token,
            created_at: millis_to_utc(row.session_created_at),
            expires_at: millis_to_utc(row.expires_at),
            user: User::from(row.user),
        }
    }
}

pub(crate) fn encode_roles(roles: &[String]) -> String {
    serde_json::to_string(roles).unwrap_or_else(|_| "[]".to_string())
}

pub(crate) fn decode_roles(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        warn!("ignoring malformed roles column: {}", err);
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_column_round_trips_and_tolerates_garbage() {
        let roles = vec!["100".to_string(), "300".to_string()];
        assert_eq!(decode_roles(&encode_roles(&roles)), roles);
        assert!(decode_roles("not json").is_empty());
    }

    #[test]
    fn activity_change_amount_sums_both_bases() {
        let row = ActivityRow {
            history: HistoryRow {
                id: "h1".to_string(),
                resource_id: "r1".to_string(),
                previous_quantity_hagga: 30,
                new_quantity_hagga: 10,
                change_amount_hagga: -20,
                previous_quantity_deep_desert: 0,
                new_quantity_deep_desert: 20,
                change_amount_deep_desert: 20,
                change_type: "transfer".to_string(),
                updated_by: "paul".to_string(),
                reason: None,
                transfer_amount: Some(20),
                transfer_direction: Some("to_deep_desert".to_string()),
                created_at: 0,
            },
            resource_name: "Spice".to_string(),
            resource_category: Some("Raw".to_string()),
        };
        let entry = ActivityEntry::from(row);
        assert_eq!(entry.change_amount, 0);
        assert_eq!(entry.entry.change_type, ChangeType::Transfer);
        assert_eq!(entry.entry.transfer_direction, Some(TransferDirection::ToDeepDesert));
    }
}
