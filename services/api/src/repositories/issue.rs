//! Issue repository backed by PostgreSQL + PostGIS

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{error, info};

use super::{IssueStore, StoreError};
use crate::models::{Issue, IssueFilter, NewIssue};

/// Issue repository for database operations
#[derive(Clone)]
pub struct IssueRepository {
    pool: PgPool,
}

impl IssueRepository {
    /// Create a new issue repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IssueStore for IssueRepository {
    async fn find_within(&self, filter: &IssueFilter) -> Result<Vec<Issue>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, category, latitude, longitude, status,
                   created_at, updated_at, user_id
            FROM issues
            WHERE ST_DWithin(
                    location::geography,
                    ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography,
                    $3
                  )
              AND ($4::varchar IS NULL OR status = $4)
              AND ($5::varchar IS NULL OR category = $5)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.center.longitude())
        .bind(filter.center.latitude())
        .bind(filter.radius_meters)
        .bind(filter.status.as_deref())
        .bind(filter.category.map(|c| c.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(issue_from_row).collect()
    }

    async fn create(&self, new_issue: &NewIssue) -> Result<Issue, StoreError> {
        info!(category = %new_issue.category, "Creating new issue: {}", new_issue.title);

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO issues (title, description, category, latitude, longitude, location, user_id)
            VALUES ($1, $2, $3, $4, $5, ST_SetSRID(ST_MakePoint($5, $4), 4326), $6)
            RETURNING id, title, description, category, latitude, longitude, status,
                      created_at, updated_at, user_id
            "#,
        )
        .bind(&new_issue.title)
        .bind(&new_issue.description)
        .bind(new_issue.category.as_str())
        .bind(new_issue.coordinates.latitude())
        .bind(new_issue.coordinates.longitude())
        .bind(new_issue.user_id)
        .fetch_one(&mut *tx)
        .await;

        let row = match inserted {
            Ok(row) => row,
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    error!("Failed to roll back issue insert: {}", rollback_error);
                }
                return Err(map_insert_error(e));
            }
        };

        let issue = issue_from_row(&row)?;
        tx.commit().await?;

        Ok(issue)
    }

    async fn ping(&self) -> bool {
        common::database::health_check(&self.pool)
            .await
            .unwrap_or(false)
    }
}

fn map_insert_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db_error) if db_error.is_foreign_key_violation() => {
            StoreError::UnknownUser
        }
        _ => StoreError::Database(e),
    }
}

fn issue_from_row(row: &PgRow) -> Result<Issue, StoreError> {
    let category: String = row.try_get("category")?;

    Ok(Issue {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category: category
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("unknown category '{}'", category)))?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        user_id: row.try_get("user_id")?,
    })
}
