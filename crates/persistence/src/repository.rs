use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use nowplaying_core::{KeyValueStore, StoreError};
use sqlx::{Row, SqlitePool};

/// Key-value record the widget renders from
#[derive(Clone)]
pub struct WidgetDataRepository {
    pool: SqlitePool,
}

impl WidgetDataRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl KeyValueStore for WidgetDataRepository {
    async fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT value FROM widget_data WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        Ok(row.map(|r| r.get(0)))
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO widget_data (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM widget_data WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

/// Widget instances placed by the user
pub struct WidgetInstanceRepository {
    pool: SqlitePool,
}

impl WidgetInstanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a widget id; registering twice is a no-op
    pub async fn register(&self, widget_id: u32) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO widget_instance (widget_id, created_at) VALUES (?, ?)")
            .bind(widget_id as i64)
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn unregister(&self, widget_id: u32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM widget_instance WHERE widget_id = ?")
            .bind(widget_id as i64)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_all(&self) -> Result<Vec<u32>> {
        let rows = sqlx::query("SELECT widget_id FROM widget_instance ORDER BY widget_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|r| r.get::<i64, _>(0) as u32).collect())
    }
}
