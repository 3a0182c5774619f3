use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    ActivityEntry, ActivityFilter, AuthSession, BulkUpdate, ContributionPage, ErasureMode,
    LoginProfile, NewResource, NewSession, RankingPage, Resource, ResourceFilters,
    ResourceHistoryEntry, ResourceMetadataUpdate, User,
};
use crate::services::{QuantityChange, QuantityChangeOutcome};
use crate::value_objects::TransferDirection;

/// Resource store. Every mutation writes its history row in the same transaction.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn list_resources(
        &self,
        filters: &ResourceFilters,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Resource>>;
    async fn find_resource(&self, id: &str) -> anyhow::Result<Option<Resource>>;
    async fn find_resources_by_ids(&self, ids: &[String]) -> anyhow::Result<Vec<Resource>>;
    async fn create_resource(&self, resource: NewResource, actor: &str) -> anyhow::Result<Resource>;
    async fn update_metadata(
        &self,
        update: ResourceMetadataUpdate,
        actor: &str,
    ) -> anyhow::Result<Option<Resource>>;
    async fn update_target(
        &self,
        id: &str,
        target_quantity: Option<i64>,
        actor: &str,
    ) -> anyhow::Result<Option<Resource>>;
    /// Applies a quantity change, its history row and any leaderboard award atomically.
    async fn apply_quantity_change(
        &self,
        change: QuantityChange,
    ) -> anyhow::Result<QuantityChangeOutcome>;
    async fn transfer(
        &self,
        id: &str,
        amount: i64,
        direction: TransferDirection,
        actor: &str,
    ) -> anyhow::Result<Resource>;
    /// Deletes the resource and its history. Returns false when it did not exist.
    async fn delete_resource(&self, id: &str) -> anyhow::Result<bool>;
    /// Applies every update in one transaction and returns how many rows were written.
    async fn apply_bulk_import(&self, updates: &[BulkUpdate], actor: &str) -> anyhow::Result<usize>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn list_for_resource(
        &self,
        resource_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> anyhow::Result<Vec<ResourceHistoryEntry>>;
    async fn delete_entry(&self, resource_id: &str, entry_id: &str) -> anyhow::Result<bool>;
    async fn list_activity(&self, filter: &ActivityFilter) -> anyhow::Result<Vec<ActivityEntry>>;
    /// Counts the rows written by `identifiers`, then erases them in the same
    /// transaction. Returns the count matched before erasure.
    async fn erase_by_identifiers(
        &self,
        identifiers: &[String],
        mode: ErasureMode,
        replacement: &str,
    ) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    async fn rankings(
        &self,
        since: Option<DateTime<Utc>>,
        limit: usize,
        offset: usize,
    ) -> anyhow::Result<RankingPage>;
    async fn contributions(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
        limit: usize,
        offset: usize,
    ) -> anyhow::Result<ContributionPage>;
    async fn user_rank(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Option<i64>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates the user on first login, refreshes profile and roles afterwards.
    async fn upsert_login(&self, profile: LoginProfile, now: DateTime<Utc>) -> anyhow::Result<User>;
    async fn find_user(&self, id: &str) -> anyhow::Result<Option<User>>;
    async fn list_users(&self) -> anyhow::Result<Vec<User>>;
    async fn update_roles(
        &self,
        user_id: &str,
        roles: &[String],
        discord_nickname: Option<&str>,
    ) -> anyhow::Result<()>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, session: NewSession) -> anyhow::Result<()>;
    async fn find_session(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<AuthSession>>;
    async fn update_session_roles(
        &self,
        session_id: &str,
        roles: &[String],
        is_in_guild: bool,
    ) -> anyhow::Result<()>;
    async fn delete_session(&self, session_id: &str) -> anyhow::Result<()>;
    async fn purge_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64>;
}
