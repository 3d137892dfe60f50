//! User repository for database operations

use async_trait::async_trait;
use common::password::HASH_VERSION;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::{StoreError, UserStore};
use crate::models::{NewUser, User};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, new_user: &NewUser) -> Result<User, StoreError> {
        info!("Creating new user: {}", new_user.username);

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, hash_version, is_admin)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, password_hash, hash_version, is_admin, created_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(HASH_VERSION)
        .bind(new_user.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                StoreError::Conflict
            }
            _ => StoreError::Database(e),
        })?;

        Ok(user_from_row(&row)?)
    }

    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, hash_version, is_admin, created_at
            FROM users
            WHERE username = $1 OR email = $1
            ORDER BY (username = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, hash_version, is_admin, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?)
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        hash_version: row.try_get("hash_version")?,
        is_admin: row.try_get("is_admin")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::database::{DatabaseConfig, init_pool, run_migrations};

    async fn repository() -> (PgPool, UserRepository) {
        let config = DatabaseConfig::from_env().expect("database config");
        let pool = init_pool(&config).await.expect("database pool");
        run_migrations(&pool).await.expect("migrations");
        (pool.clone(), UserRepository::new(pool))
    }

    #[tokio::test]
    #[ignore = "requires a PostGIS database at DATABASE_URL"]
    async fn test_create_and_find_user() {
        let (pool, repo) = repository().await;
        let suffix = &Uuid::new_v4().simple().to_string()[..12];
        let username = format!("user_{suffix}");
        let email = format!("{suffix}@example.org");

        let new_user = NewUser::new(&username, &email, "S3cret!pass", false).expect("hash");
        let created = repo.create(&new_user).await.expect("insert");
        assert_eq!(created.hash_version.as_deref(), Some(HASH_VERSION));
        assert!(!created.is_admin);

        let by_name = repo
            .find_by_username_or_email(&username)
            .await
            .expect("query")
            .expect("user by name");
        let by_email = repo
            .find_by_username_or_email(&email)
            .await
            .expect("query")
            .expect("user by email");
        assert_eq!(by_name, created);
        assert_eq!(by_email.id, created.id);
        assert_eq!(repo.find_by_id(created.id).await.expect("query"), Some(created.clone()));
        assert!(repo.count().await.expect("count") >= 1);

        let duplicate = repo.create(&new_user).await;
        assert!(matches!(duplicate, Err(StoreError::Conflict)));

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(created.id)
            .execute(&pool)
            .await
            .expect("cleanup");
    }
}
