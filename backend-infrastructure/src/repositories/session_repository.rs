use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;

use backend_domain::{AuthSession, NewSession, SessionRepository};

use crate::repositories::rows::{encode_roles, SessionRow};

#[derive(Clone)]
pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn create_session(&self, session: NewSession) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO user_sessions \
            (id, user_id, token_hash, roles, is_in_guild, access_token, created_at, expires_at) \
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(&session.token_hash)
        .bind(encode_roles(&session.roles))
        .bind(session.is_in_guild)
        .bind(&session.access_token)
        .bind(session.created_at.timestamp_millis())
        .bind(session.expires_at.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_session(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<AuthSession>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT s.id AS session_id, s.roles AS session_roles, s.is_in_guild AS is_in_guild, \
                s.access_token AS access_token, s.created_at AS session_created_at, \
                s.expires_at AS expires_at, \
                u.id AS id, u.discord_id AS discord_id, u.username AS username, \
                u.avatar AS avatar, u.custom_nickname AS custom_nickname, \
                u.discord_nickname AS discord_nickname, u.roles AS roles, \
                u.created_at AS created_at, u.last_login AS last_login \
            FROM user_sessions s JOIN users u ON u.id = s.user_id \
            WHERE s.token_hash = ? AND s.expires_at > ?",
        )
        .bind(token_hash)
        .bind(now.timestamp_millis())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(AuthSession::from))
    }

    async fn update_session_roles(
        &self,
        session_id: &str,
        roles: &[String],
        is_in_guild: bool,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE user_sessions SET roles = ?, is_in_guild = ? WHERE id = ?")
            .bind(encode_roles(roles))
            .bind(is_in_guild)
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_session(&self, session_id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM user_sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at <= ?")
            .bind(now.timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
