use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};
use sqlx::QueryBuilder;
use tracing::{info, warn};

use backend_domain::services::{
    award_for_change, plan_quantity_change, plan_transfer, transfer_reason, PointsAward,
    QuantityChange, QuantityChangeOutcome, QuantityPlan,
};
use backend_domain::utils::new_id;
use backend_domain::{
    BulkUpdate, ChangeType, DomainError, NewResource, Resource, ResourceFilters,
    ResourceMetadataUpdate, ResourceRepository, TransferDirection,
    NON_PRIORITY_UPDATE_THRESHOLD_HOURS, PRIORITY_UPDATE_THRESHOLD_HOURS,
};

use crate::repositories::rows::{ResourceRow, RESOURCE_COLUMNS};

const HOUR_MS: i64 = 60 * 60 * 1000;
const ID_CHUNK: usize = 500;

/// Derived status, mirroring `ResourceStatus::from_quantities`.
const STATUS_SQL: &str = "(CASE \
    WHEN target_quantity IS NULL OR target_quantity <= 0 THEN 'at_target' \
    WHEN (quantity_hagga + quantity_deep_desert) * 1.0 / target_quantity * 100.0 >= 150.0 THEN 'above_target' \
    WHEN (quantity_hagga + quantity_deep_desert) * 1.0 / target_quantity * 100.0 >= 100.0 THEN 'at_target' \
    WHEN (quantity_hagga + quantity_deep_desert) * 1.0 / target_quantity * 100.0 >= 50.0 THEN 'below_target' \
    ELSE 'critical' END)";

#[derive(Clone)]
pub struct SqliteResourceRepository {
    pool: SqlitePool,
}

impl SqliteResourceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// One audit row, written inside the caller's transaction.
pub(crate) struct HistoryRecord<'a> {
    pub resource_id: &'a str,
    pub plan: QuantityPlan,
    pub change_type: ChangeType,
    pub updated_by: &'a str,
    pub reason: Option<&'a str>,
    pub transfer: Option<(i64, TransferDirection)>,
    pub created_at: i64,
}

pub(crate) async fn insert_history(
    conn: &mut SqliteConnection,
    record: HistoryRecord<'_>,
) -> sqlx::Result<()> {
    let plan = record.plan;
    sqlx::query(
        "INSERT INTO resource_history \
        (id, resource_id, previous_quantity_hagga, new_quantity_hagga, change_amount_hagga, \
        previous_quantity_deep_desert, new_quantity_deep_desert, change_amount_deep_desert, \
        change_type, updated_by, reason, transfer_amount, transfer_direction, created_at) \
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(new_id())
    .bind(record.resource_id)
    .bind(plan.previous_hagga)
    .bind(plan.new_hagga)
    .bind(plan.change_hagga)
    .bind(plan.previous_deep_desert)
    .bind(plan.new_deep_desert)
    .bind(plan.change_deep_desert)
    .bind(record.change_type.as_str())
    .bind(record.updated_by)
    .bind(record.reason)
    .bind(record.transfer.map(|(amount, _)| amount))
    .bind(record.transfer.map(|(_, direction)| direction.as_str()))
    .bind(record.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

async fn insert_award(
    conn: &mut SqliteConnection,
    user_id: &str,
    resource: &Resource,
    award: &PointsAward,
    created_at: i64,
) -> sqlx::Result<()> {
    sqlx::query(
        "INSERT INTO leaderboard \
        (id, user_id, resource_id, action_type, quantity_changed, base_points, \
        resource_multiplier, status_bonus, final_points, resource_name, resource_category, \
        resource_status, created_at) \
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(new_id())
    .bind(user_id)
    .bind(&resource.id)
    .bind(award.action.as_str())
    .bind(award.amount)
    .bind(award.calculation.base_points)
    .bind(award.calculation.resource_multiplier)
    .bind(award.calculation.status_bonus)
    .bind(award.calculation.final_points)
    .bind(&resource.name)
    .bind(&award.category)
    .bind(award.status.as_str())
    .bind(created_at)
    .execute(conn)
    .await?;
    Ok(())
}

async fn load_resource(conn: &mut SqliteConnection, id: &str) -> sqlx::Result<Option<Resource>> {
    let row = sqlx::query_as::<_, ResourceRow>(&format!(
        "SELECT {} FROM resources WHERE id = ?",
        RESOURCE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(Resource::from))
}

async fn write_quantities(
    conn: &mut SqliteConnection,
    id: &str,
    plan: &QuantityPlan,
    actor: &str,
    now_ms: i64,
) -> sqlx::Result<()> {
    sqlx::query(
        "UPDATE resources SET quantity_hagga = ?, quantity_deep_desert = ?, \
        last_updated_by = ?, updated_at = ? WHERE id = ?",
    )
    .bind(plan.new_hagga)
    .bind(plan.new_deep_desert)
    .bind(actor)
    .bind(now_ms)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[async_trait]
impl ResourceRepository for SqliteResourceRepository {
    async fn list_resources(
        &self,
        filters: &ResourceFilters,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Resource>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM resources WHERE 1 = 1",
            RESOURCE_COLUMNS
        ));
        if let Some(status) = filters.status {
            query
                .push(" AND ")
                .push(STATUS_SQL)
                .push(" = ")
                .push_bind(status.as_str());
        }
        if let Some(category) = &filters.category {
            query
                .push(" AND category = ")
                .push_bind(category.clone())
                .push(" COLLATE NOCASE");
        }
        if filters.priority {
            query.push(" AND is_priority = 1");
        }
        if filters.needs_update {
            let now_ms = now.timestamp_millis();
            query
                .push(" AND updated_at < (CASE WHEN is_priority = 1 THEN ")
                .push_bind(now_ms - PRIORITY_UPDATE_THRESHOLD_HOURS * HOUR_MS)
                .push(" ELSE ")
                .push_bind(now_ms - NON_PRIORITY_UPDATE_THRESHOLD_HOURS * HOUR_MS)
                .push(" END)");
        }
        match &filters.search_term {
            Some(term) => {
                let term = term.to_lowercase();
                let escaped = escape_like(&term);
                let contains = format!("%{}%", escaped);
                query
                    .push(" AND (LOWER(name) LIKE ")
                    .push_bind(contains.clone())
                    .push(" ESCAPE '\\' OR LOWER(COALESCE(description, '')) LIKE ")
                    .push_bind(contains.clone())
                    .push(" ESCAPE '\\' OR LOWER(COALESCE(category, '')) LIKE ")
                    .push_bind(contains.clone())
                    .push(" ESCAPE '\\')");
                // Name matches rank above description or category matches:
                // exact, then prefix, then substring.
                query
                    .push(" ORDER BY CASE WHEN LOWER(name) = ")
                    .push_bind(term)
                    .push(" THEN 0 WHEN LOWER(name) LIKE ")
                    .push_bind(format!("{}%", escaped))
                    .push(" ESCAPE '\\' THEN 1 WHEN LOWER(name) LIKE ")
                    .push_bind(contains)
                    .push(" ESCAPE '\\' THEN 2 ELSE 3 END, name COLLATE NOCASE");
            }
            None => {
                query.push(" ORDER BY name COLLATE NOCASE");
            }
        }

        let rows = query
            .build_query_as::<ResourceRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Resource::from).collect())
    }

    async fn find_resource(&self, id: &str) -> anyhow::Result<Option<Resource>> {
        let mut conn = self.pool.acquire().await?;
        Ok(load_resource(&mut conn, id).await?)
    }

    async fn find_resources_by_ids(&self, ids: &[String]) -> anyhow::Result<Vec<Resource>> {
        let mut resources = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(ID_CHUNK) {
            let mut query = QueryBuilder::<Sqlite>::new(format!(
                "SELECT {} FROM resources WHERE id IN (",
                RESOURCE_COLUMNS
            ));
            let mut separated = query.separated(", ");
            for id in chunk {
                separated.push_bind(id.clone());
            }
            separated.push_unseparated(")");
            let rows = query
                .build_query_as::<ResourceRow>()
                .fetch_all(&self.pool)
                .await?;
            resources.extend(rows.into_iter().map(Resource::from));
        }
        Ok(resources)
    }

    async fn create_resource(&self, resource: NewResource, actor: &str) -> anyhow::Result<Resource> {
        let id = new_id();
        let now_ms = Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO resources \
            (id, name, category, subcategory, tier, description, icon, image_url, quantity_hagga, \
            quantity_deep_desert, target_quantity, multiplier, is_priority, last_updated_by, \
            created_at, updated_at) \
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&resource.name)
        .bind(&resource.category)
        .bind(&resource.subcategory)
        .bind(resource.tier)
        .bind(&resource.description)
        .bind(&resource.icon)
        .bind(&resource.image_url)
        .bind(resource.quantity_hagga)
        .bind(resource.quantity_deep_desert)
        .bind(resource.target_quantity)
        .bind(resource.multiplier)
        .bind(resource.is_priority)
        .bind(actor)
        .bind(now_ms)
        .bind(now_ms)
        .execute(&mut *tx)
        .await?;

        insert_history(
            &mut tx,
            HistoryRecord {
                resource_id: &id,
                plan: QuantityPlan {
                    previous_hagga: 0,
                    new_hagga: resource.quantity_hagga,
                    change_hagga: resource.quantity_hagga,
                    previous_deep_desert: 0,
                    new_deep_desert: resource.quantity_deep_desert,
                    change_deep_desert: resource.quantity_deep_desert,
                },
                change_type: ChangeType::Absolute,
                updated_by: actor,
                reason: Some("Resource created"),
                transfer: None,
                created_at: now_ms,
            },
        )
        .await?;

        let created = load_resource(&mut tx, &id)
            .await?
            .ok_or_else(DomainError::resource_not_found)?;
        tx.commit().await?;
        Ok(created)
    }

    async fn update_metadata(
        &self,
        update: ResourceMetadataUpdate,
        actor: &str,
    ) -> anyhow::Result<Option<Resource>> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE resources SET name = ?, category = ?, subcategory = ?, tier = ?, \
            description = ?, icon = ?, image_url = ?, multiplier = ?, is_priority = ?, \
            last_updated_by = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&update.name)
        .bind(&update.category)
        .bind(&update.subcategory)
        .bind(update.tier)
        .bind(&update.description)
        .bind(&update.icon)
        .bind(&update.image_url)
        .bind(update.multiplier)
        .bind(update.is_priority)
        .bind(actor)
        .bind(Utc::now().timestamp_millis())
        .bind(&update.id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        let updated = load_resource(&mut tx, &update.id).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn update_target(
        &self,
        id: &str,
        target_quantity: Option<i64>,
        actor: &str,
    ) -> anyhow::Result<Option<Resource>> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE resources SET target_quantity = ?, last_updated_by = ?, updated_at = ? \
            WHERE id = ?",
        )
        .bind(target_quantity)
        .bind(actor)
        .bind(Utc::now().timestamp_millis())
        .bind(id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        let updated = load_resource(&mut tx, id).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn apply_quantity_change(
        &self,
        change: QuantityChange,
    ) -> anyhow::Result<QuantityChangeOutcome> {
        let now_ms = Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;
        let current = load_resource(&mut tx, &change.resource_id)
            .await?
            .ok_or_else(DomainError::resource_not_found)?;
        let plan = plan_quantity_change(
            &current,
            change.update_type,
            change.field,
            change.quantity,
            change.change_value,
        )?;

        write_quantities(&mut tx, &current.id, &plan, &change.acting_user, now_ms).await?;
        insert_history(
            &mut tx,
            HistoryRecord {
                resource_id: &current.id,
                plan,
                change_type: ChangeType::from(change.update_type),
                updated_by: &change.effective_user,
                reason: change.reason.as_deref(),
                transfer: None,
                created_at: now_ms,
            },
        )
        .await?;

        let award = award_for_change(&current, change.update_type, &plan);
        if let Some(award) = &award {
            insert_award(&mut tx, &change.effective_user, &current, award, now_ms).await?;
        }

        let resource = load_resource(&mut tx, &current.id)
            .await?
            .ok_or_else(DomainError::resource_not_found)?;
        tx.commit().await?;

        Ok(QuantityChangeOutcome {
            resource,
            points_earned: award
                .as_ref()
                .map(|award| award.calculation.final_points)
                .unwrap_or(0.0),
            points_calculation: award.map(|award| award.calculation),
        })
    }

    async fn transfer(
        &self,
        id: &str,
        amount: i64,
        direction: TransferDirection,
        actor: &str,
    ) -> anyhow::Result<Resource> {
        let now_ms = Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;
        let current = load_resource(&mut tx, id)
            .await?
            .ok_or_else(DomainError::resource_not_found)?;
        let plan = plan_transfer(&current, amount, direction)?;
        let reason = transfer_reason(amount, direction);

        write_quantities(&mut tx, id, &plan, actor, now_ms).await?;
        insert_history(
            &mut tx,
            HistoryRecord {
                resource_id: id,
                plan,
                change_type: ChangeType::Transfer,
                updated_by: actor,
                reason: Some(&reason),
                transfer: Some((amount, direction)),
                created_at: now_ms,
            },
        )
        .await?;

        let updated = load_resource(&mut tx, id)
            .await?
            .ok_or_else(DomainError::resource_not_found)?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_resource(&self, id: &str) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let history = sqlx::query("DELETE FROM resource_history WHERE resource_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM resources WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Ok(false);
        }
        tx.commit().await?;
        info!(
            "deleted resource {} with {} history rows",
            id,
            history.rows_affected()
        );
        Ok(true)
    }

    async fn apply_bulk_import(&self, updates: &[BulkUpdate], actor: &str) -> anyhow::Result<usize> {
        let now_ms = Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;
        let mut applied = 0;
        for update in updates {
            let Some(current) = load_resource(&mut tx, &update.id).await? else {
                warn!("bulk import skipped missing resource {}", update.id);
                continue;
            };
            let values = &update.values;
            sqlx::query(
                "UPDATE resources SET quantity_hagga = ?, quantity_deep_desert = ?, \
                target_quantity = ?, last_updated_by = ?, updated_at = ? WHERE id = ?",
            )
            .bind(values.quantity_hagga)
            .bind(values.quantity_deep_desert)
            .bind(values.target_quantity)
            .bind(actor)
            .bind(now_ms)
            .bind(&current.id)
            .execute(&mut *tx)
            .await?;
            insert_history(
                &mut tx,
                HistoryRecord {
                    resource_id: &current.id,
                    plan: QuantityPlan {
                        previous_hagga: current.quantity_hagga,
                        new_hagga: values.quantity_hagga,
                        change_hagga: values.quantity_hagga - current.quantity_hagga,
                        previous_deep_desert: current.quantity_deep_desert,
                        new_deep_desert: values.quantity_deep_desert,
                        change_deep_desert: values.quantity_deep_desert
                            - current.quantity_deep_desert,
                    },
                    change_type: ChangeType::Absolute,
                    updated_by: actor,
                    reason: Some("Bulk CSV import"),
                    transfer: None,
                    created_at: now_ms,
                },
            )
            .await?;
            applied += 1;
        }
        tx.commit().await?;
        Ok(applied)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::database::connect_in_memory;
    use backend_domain::{QuantityField, QuantitySnapshot, ResourceStatus, UpdateType};
    use chrono::Duration;

    fn new_resource(name: &str, category: &str, hagga: i64, target: Option<i64>) -> NewResource {
        NewResource {
            name: name.to_string(),
            category: category.to_string(),
            subcategory: None,
            tier: None,
            description: None,
            icon: None,
            image_url: None,
            quantity_hagga: hagga,
            quantity_deep_desert: 0,
            target_quantity: target,
            multiplier: 1.0,
            is_priority: false,
        }
    }

    fn change(resource_id: &str, update_type: UpdateType, quantity: Option<i64>, delta: Option<i64>) -> QuantityChange {
        QuantityChange {
            resource_id: resource_id.to_string(),
            update_type,
            field: QuantityField::Hagga,
            quantity,
            change_value: delta,
            reason: None,
            acting_user: "admin".to_string(),
            effective_user: "paul".to_string(),
        }
    }

    async fn history_count(pool: &SqlitePool, resource_id: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM resource_history WHERE resource_id = ?")
            .bind(resource_id)
            .fetch_one(pool)
            .await
            .expect("count history")
    }

    #[tokio::test]
    async fn create_writes_a_history_row() {
        let pool = connect_in_memory().await.expect("pool");
        let repo = SqliteResourceRepository::new(pool.clone());
        let created = repo
            .create_resource(new_resource("Spice", "Raw", 40, Some(100)), "admin")
            .await
            .expect("create");
        assert_eq!(created.quantity_hagga, 40);
        assert_eq!(created.last_updated_by, "admin");

        let reason: Option<String> =
            sqlx::query_scalar("SELECT reason FROM resource_history WHERE resource_id = ?")
                .bind(&created.id)
                .fetch_one(&pool)
                .await
                .expect("history");
        assert_eq!(reason.as_deref(), Some("Resource created"));
    }

    #[tokio::test]
    async fn relative_add_awards_points_to_effective_user() {
        let pool = connect_in_memory().await.expect("pool");
        let repo = SqliteResourceRepository::new(pool.clone());
        let created = repo
            .create_resource(new_resource("Spice", "Raw", 0, Some(10_000)), "admin")
            .await
            .expect("create");

        let outcome = repo
            .apply_quantity_change(change(&created.id, UpdateType::Relative, None, Some(1000)))
            .await
            .expect("update");
        assert_eq!(outcome.resource.quantity_hagga, 1000);
        assert_eq!(outcome.resource.last_updated_by, "admin");
        assert_eq!(outcome.points_earned, 110.0);

        let (user_id, status): (String, String) =
            sqlx::query_as("SELECT user_id, resource_status FROM leaderboard")
                .fetch_one(&pool)
                .await
                .expect("leaderboard row");
        assert_eq!(user_id, "paul");
        assert_eq!(status, "critical");
        assert_eq!(history_count(&pool, &created.id).await, 2);
    }

    #[tokio::test]
    async fn negative_result_is_rejected_without_writes() {
        let pool = connect_in_memory().await.expect("pool");
        let repo = SqliteResourceRepository::new(pool.clone());
        let created = repo
            .create_resource(new_resource("Spice", "Raw", 5, None), "admin")
            .await
            .expect("create");

        let err = repo
            .apply_quantity_change(change(&created.id, UpdateType::Relative, None, Some(-6)))
            .await
            .expect_err("negative");
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::InvalidInput(_))
        ));
        assert_eq!(history_count(&pool, &created.id).await, 1);

        let missing = repo
            .apply_quantity_change(change("nope", UpdateType::Absolute, Some(1), None))
            .await
            .expect_err("missing");
        assert_eq!(
            missing.downcast_ref::<DomainError>(),
            Some(&DomainError::resource_not_found())
        );
    }

    #[tokio::test]
    async fn transfer_moves_stock_and_records_direction() {
        let pool = connect_in_memory().await.expect("pool");
        let repo = SqliteResourceRepository::new(pool.clone());
        let created = repo
            .create_resource(new_resource("Spice", "Raw", 30, None), "admin")
            .await
            .expect("create");

        let moved = repo
            .transfer(&created.id, 20, TransferDirection::ToDeepDesert, "paul")
            .await
            .expect("transfer");
        assert_eq!((moved.quantity_hagga, moved.quantity_deep_desert), (10, 20));

        let (change_type, direction, reason): (String, Option<String>, Option<String>) = sqlx::query_as(
            "SELECT change_type, transfer_direction, reason FROM resource_history \
            WHERE change_type = 'transfer'",
        )
        .fetch_one(&pool)
        .await
        .expect("transfer row");
        assert_eq!(change_type, "transfer");
        assert_eq!(direction.as_deref(), Some("to_deep_desert"));
        assert_eq!(reason.as_deref(), Some("Transfer 20 to_deep_desert"));

        assert!(repo
            .transfer(&created.id, 50, TransferDirection::ToHagga, "paul")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn search_also_matches_description_and_category() {
        let pool = connect_in_memory().await.expect("pool");
        let repo = SqliteResourceRepository::new(pool.clone());
        let mut stillsuit = new_resource("Stillsuit", "Components", 3, None);
        stillsuit.description = Some("Reclaims body moisture".to_string());
        repo.create_resource(stillsuit, "admin").await.expect("create");
        repo.create_resource(new_resource("Plastanium", "Refined", 0, None), "admin")
            .await
            .expect("create");
        repo.create_resource(new_resource("Refined Spice", "Raw", 0, None), "admin")
            .await
            .expect("create");

        let search = |term: &str| ResourceFilters {
            search_term: Some(term.to_string()),
            ..ResourceFilters::default()
        };
        let now = Utc::now();
        let refined = repo.list_resources(&search("refined"), now).await.expect("search");
        let names: Vec<&str> = refined.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Refined Spice", "Plastanium"]);

        let moisture = repo.list_resources(&search("MOISTURE"), now).await.expect("search");
        assert_eq!(moisture.len(), 1);
        assert_eq!(moisture[0].name, "Stillsuit");

        let literal = repo.list_resources(&search("100%"), now).await.expect("search");
        assert!(literal.is_empty());
    }

    #[tokio::test]
    async fn filters_combine_status_search_and_staleness() {
        let pool = connect_in_memory().await.expect("pool");
        let repo = SqliteResourceRepository::new(pool.clone());
        for (name, hagga) in [("Spice Melange", 10), ("Spice", 200), ("Raw Spice", 100)] {
            repo.create_resource(new_resource(name, "Raw", hagga, Some(100)), "admin")
                .await
                .expect("create");
        }
        repo.create_resource(new_resource("Plastanium", "Refined", 0, None), "admin")
            .await
            .expect("create");

        let now = Utc::now();
        let searched = repo
            .list_resources(
                &ResourceFilters {
                    search_term: Some("SPICE".to_string()),
                    ..ResourceFilters::default()
                },
                now,
            )
            .await
            .expect("search");
        let names: Vec<&str> = searched.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Spice", "Spice Melange", "Raw Spice"]);

        let critical = repo
            .list_resources(
                &ResourceFilters {
                    status: Some(ResourceStatus::Critical),
                    ..ResourceFilters::default()
                },
                now,
            )
            .await
            .expect("status filter");
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].name, "Spice Melange");

        let refined = repo
            .list_resources(
                &ResourceFilters {
                    category: Some("refined".to_string()),
                    ..ResourceFilters::default()
                },
                now,
            )
            .await
            .expect("category filter");
        assert_eq!(refined.len(), 1);

        let stale_now = repo
            .list_resources(
                &ResourceFilters {
                    needs_update: true,
                    ..ResourceFilters::default()
                },
                now,
            )
            .await
            .expect("stale filter");
        assert!(stale_now.is_empty());

        let stale_later = repo
            .list_resources(
                &ResourceFilters {
                    needs_update: true,
                    ..ResourceFilters::default()
                },
                now + Duration::hours(49),
            )
            .await
            .expect("stale filter");
        assert_eq!(stale_later.len(), 4);
    }

    #[tokio::test]
    async fn bulk_import_skips_missing_and_writes_history() {
        let pool = connect_in_memory().await.expect("pool");
        let repo = SqliteResourceRepository::new(pool.clone());
        let created = repo
            .create_resource(new_resource("Spice", "Raw", 5, Some(10)), "admin")
            .await
            .expect("create");

        let updates = vec![
            BulkUpdate {
                id: created.id.clone(),
                values: QuantitySnapshot {
                    quantity_hagga: 50,
                    quantity_deep_desert: 7,
                    target_quantity: None,
                },
            },
            BulkUpdate {
                id: "ghost".to_string(),
                values: QuantitySnapshot {
                    quantity_hagga: 1,
                    quantity_deep_desert: 1,
                    target_quantity: None,
                },
            },
        ];
        let applied = repo.apply_bulk_import(&updates, "officer").await.expect("import");
        assert_eq!(applied, 1);

        let updated = repo
            .find_resource(&created.id)
            .await
            .expect("find")
            .expect("exists");
        assert_eq!((updated.quantity_hagga, updated.quantity_deep_desert), (50, 7));
        assert_eq!(updated.target_quantity, None);
        assert_eq!(history_count(&pool, &created.id).await, 2);
    }

    #[tokio::test]
    async fn delete_removes_history_but_keeps_points() {
        let pool = connect_in_memory().await.expect("pool");
        let repo = SqliteResourceRepository::new(pool.clone());
        let created = repo
            .create_resource(new_resource("Spice", "Raw", 0, None), "admin")
            .await
            .expect("create");
        repo.apply_quantity_change(change(&created.id, UpdateType::Absolute, Some(10), None))
            .await
            .expect("update");

        assert!(repo.delete_resource(&created.id).await.expect("delete"));
        assert!(!repo.delete_resource(&created.id).await.expect("delete again"));
        assert_eq!(history_count(&pool, &created.id).await, 0);

        let points: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leaderboard")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(points, 1);
    }
}
