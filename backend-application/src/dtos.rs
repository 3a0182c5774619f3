// Request and response shapes shared by commands, queries and HTTP handlers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use backend_domain::{
    ActivityEntry, ContributionSummary, LeaderboardEntry, PointsCalculation, QuantityField,
    RankingRow, ResourceFilters, ResourceStatus, ResourceView, RoleConfig, UpdateType, User,
    UserPermissions,
};

/// Query-string filters accepted by the resource list and CSV export.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceListQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub needs_update: Option<String>,
    pub priority: Option<String>,
    pub search_term: Option<String>,
}

impl ResourceListQuery {
    pub fn into_filters(self) -> ResourceFilters {
        let non_blank = |value: Option<String>| {
            value
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty() && raw != "all")
        };
        ResourceFilters {
            status: non_blank(self.status).and_then(|raw| ResourceStatus::parse(&raw)),
            category: non_blank(self.category),
            needs_update: is_true(self.needs_update.as_deref()),
            priority: is_true(self.priority.as_deref()),
            search_term: self
                .search_term
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty()),
        }
    }
}

pub fn is_true(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true") | Some("1"))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub tier: Option<i64>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub image_url: Option<String>,
    /// Legacy alias for `quantityHagga`.
    pub quantity: Option<i64>,
    pub quantity_hagga: Option<i64>,
    pub quantity_deep_desert: Option<i64>,
    pub target_quantity: Option<i64>,
    pub multiplier: Option<f64>,
    pub is_priority: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadataRequest {
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub tier: Option<i64>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub image_url: Option<String>,
    pub multiplier: Option<f64>,
    pub is_priority: Option<bool>,
}

/// Body of `PUT /resources`: either a metadata edit or a batch of quantity updates.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesPutRequest {
    pub resource_metadata: Option<ResourceMetadataRequest>,
    pub resource_updates: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityUpdateRequest {
    pub quantity: Option<i64>,
    pub update_type: Option<String>,
    #[serde(alias = "value")]
    pub change_value: Option<i64>,
    pub reason: Option<String>,
    pub quantity_field: Option<String>,
    pub on_behalf_of: Option<String>,
}

impl QuantityUpdateRequest {
    pub fn update_type(&self) -> UpdateType {
        match self.update_type.as_deref().map(str::trim) {
            Some("relative") => UpdateType::Relative,
            _ => UpdateType::Absolute,
        }
    }

    /// Anything other than the Deep Desert field targets Hagga.
    pub fn quantity_field(&self) -> QuantityField {
        match self.quantity_field.as_deref().map(str::trim) {
            Some("quantityDeepDesert") => QuantityField::DeepDesert,
            _ => QuantityField::Hagga,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchQuantityUpdate {
    pub id: String,
    #[serde(flatten)]
    pub update: QuantityUpdateRequest,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateResponse {
    pub resources: Vec<ResourceView>,
    pub total_points_earned: f64,
    pub points_breakdown: Vec<PointsCalculation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetUpdateRequest {
    pub target_quantity: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub transfer_amount: Option<i64>,
    pub transfer_direction: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteEntryResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkConfirmResponse {
    pub message: String,
    pub updated: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    pub time_filter: Option<String>,
    pub limit: Option<usize>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Resolved paging window for leaderboard queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub offset: usize,
}

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 500;
/// Offsets are bound into SQLite as `i64`.
const MAX_OFFSET: usize = i64::MAX as usize;

impl Pagination {
    pub fn from_query(query: &LeaderboardQuery) -> Self {
        let page = query.page.filter(|page| *page > 0).unwrap_or(1);
        let page_size = query
            .page_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let limit = query
            .limit
            .filter(|limit| *limit > 0)
            .unwrap_or(page_size)
            .min(MAX_PAGE_SIZE);
        Self {
            page,
            limit,
            offset: (page - 1)
                .saturating_mul(page_size.min(MAX_PAGE_SIZE))
                .min(MAX_OFFSET),
        }
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        let total = total.max(0);
        (total + self.limit as i64 - 1) / self.limit as i64
    }

    pub fn has_next_page(&self, total: i64) -> bool {
        i64::try_from(self.offset.saturating_add(self.limit)).unwrap_or(i64::MAX) < total
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 1
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<RankingRow>,
    pub time_filter: String,
    pub total: i64,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLeaderboardResponse {
    pub user_id: String,
    pub rank: Option<i64>,
    pub contributions: Vec<LeaderboardEntry>,
    pub summary: ContributionSummary,
    pub time_filter: String,
    pub total: i64,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityQuery {
    pub days: Option<i64>,
    pub global: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub discord_id: String,
    pub name: String,
    pub image: Option<String>,
    pub discord_nickname: Option<String>,
    pub custom_nickname: Option<String>,
    pub roles: Vec<String>,
    pub is_in_guild: bool,
    pub identifier: String,
}

impl SessionUser {
    pub fn new(user: &User, roles: &[String], is_in_guild: bool) -> Self {
        Self {
            id: user.id.clone(),
            discord_id: user.discord_id.clone(),
            name: user.username.clone(),
            image: user.avatar.clone(),
            discord_nickname: user.discord_nickname.clone(),
            custom_nickname: user.custom_nickname.clone(),
            roles: roles.to_vec(),
            is_in_guild,
            identifier: user.identifier(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: SessionUser,
    pub permissions: UserPermissions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: SessionUser,
    pub expires_at: DateTime<Utc>,
    pub highest_role: Option<RoleConfig>,
    pub hierarchy_roles: Vec<RoleConfig>,
    pub permissions: UserPermissions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataExportUser {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub discord_nickname: Option<String>,
    pub roles: Vec<String>,
    pub is_in_guild: bool,
    pub current_identifier: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub total_changes: usize,
    pub first_activity: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    pub total_additions: usize,
    pub total_removals: usize,
    pub total_absolute_changes: usize,
    pub total_relative_changes: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRetention {
    pub resource_activity: &'static str,
    pub session_tokens: &'static str,
    pub discord_profile: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyRights {
    pub right_to_access: &'static str,
    pub right_to_rectification: &'static str,
    pub right_to_erasure: &'static str,
    pub right_to_portability: &'static str,
    pub right_to_object: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataExport {
    pub export_date: DateTime<Utc>,
    pub export_version: &'static str,
    pub user: DataExportUser,
    pub resource_activity: Vec<ActivityEntry>,
    pub summary: ActivitySummary,
    pub data_retention: DataRetention,
    pub privacy_rights: PrivacyRights,
}

/// Serialized export plus the attachment name it should be served under.
#[derive(Debug, Clone)]
pub struct DataExportFile {
    pub filename: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDeletionResponse {
    pub message: String,
    pub records_affected: u64,
    pub method: String,
    pub timestamp: DateTime<Utc>,
}
