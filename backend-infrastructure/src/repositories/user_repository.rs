use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;

use backend_domain::utils::new_id;
use backend_domain::{LoginProfile, User, UserRepository};

use crate::repositories::rows::{encode_roles, UserRow, USER_COLUMNS};

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn upsert_login(&self, profile: LoginProfile, now: DateTime<Utc>) -> anyhow::Result<User> {
        let now_ms = now.timestamp_millis();
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users \
            (id, discord_id, username, avatar, custom_nickname, discord_nickname, roles, \
            created_at, last_login) \
            VALUES (?, ?, ?, ?, NULL, ?, ?, ?, ?) \
            ON CONFLICT(discord_id) DO UPDATE SET \
                username = excluded.username, \
                avatar = excluded.avatar, \
                discord_nickname = excluded.discord_nickname, \
                roles = excluded.roles, \
                last_login = excluded.last_login \
            RETURNING {}",
            USER_COLUMNS
        ))
        .bind(new_id())
        .bind(&profile.discord_id)
        .bind(&profile.username)
        .bind(&profile.avatar)
        .bind(&profile.discord_nickname)
        .bind(encode_roles(&profile.roles))
        .bind(now_ms)
        .bind(now_ms)
        .fetch_one(&self.pool)
        .await?;
        Ok(User::from(row))
    }

    async fn find_user(&self, id: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY last_login DESC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update_roles(
        &self,
        user_id: &str,
        roles: &[String],
        discord_nickname: Option<&str>,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET roles = ?, discord_nickname = ? WHERE id = ?")
            .bind(encode_roles(roles))
            .bind(discord_nickname)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::database::connect_in_memory;
    use chrono::Duration;

    fn profile(nick: Option<&str>, roles: &[&str]) -> LoginProfile {
        LoginProfile {
            discord_id: "1234".to_string(),
            username: "paul".to_string(),
            avatar: Some("abc".to_string()),
            discord_nickname: nick.map(str::to_string),
            roles: roles.iter().map(|role| role.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn second_login_refreshes_profile_but_keeps_identity() {
        let pool = connect_in_memory().await.expect("pool");
        let repo = SqliteUserRepository::new(pool.clone());
        let first_seen = Utc::now() - Duration::days(3);

        let created = repo
            .upsert_login(profile(None, &["100"]), first_seen)
            .await
            .expect("first login");
        sqlx::query("UPDATE users SET custom_nickname = 'Usul' WHERE id = ?")
            .bind(&created.id)
            .execute(&pool)
            .await
            .expect("set nickname");

        let again = repo
            .upsert_login(profile(Some("Muad'Dib"), &["100", "300"]), Utc::now())
            .await
            .expect("second login");
        assert_eq!(again.id, created.id);
        assert_eq!(again.created_at.timestamp_millis(), first_seen.timestamp_millis());
        assert!(again.last_login > again.created_at);
        assert_eq!(again.roles, vec!["100".to_string(), "300".to_string()]);
        assert_eq!(again.custom_nickname.as_deref(), Some("Usul"));
        assert_eq!(again.identifier(), "Muad'Dib");

        assert_eq!(repo.list_users().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn update_roles_rewrites_cached_membership() {
        let pool = connect_in_memory().await.expect("pool");
        let repo = SqliteUserRepository::new(pool);
        let created = repo
            .upsert_login(profile(Some("Muad'Dib"), &["100"]), Utc::now())
            .await
            .expect("login");

        repo.update_roles(&created.id, &[], None).await.expect("update");
        let reloaded = repo
            .find_user(&created.id)
            .await
            .expect("find")
            .expect("exists");
        assert!(reloaded.roles.is_empty());
        assert_eq!(reloaded.discord_nickname, None);
        assert!(repo.find_user("missing").await.expect("find").is_none());
    }
}
