use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use wave_catalog::{CatalogError, EventRepository, NewEvent};

/// Published event definitions on Postgres, replayed into the catalog at startup
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn save(&self, definition: &NewEvent) -> Result<(), CatalogError> {
        let id = definition
            .id
            .clone()
            .ok_or_else(|| CatalogError::InvalidEvent("definition has no id".to_string()))?;

        sqlx::query("INSERT INTO events (id, definition) VALUES ($1, $2)")
            .bind(&id)
            .bind(Json(definition))
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => CatalogError::AlreadyExists(id.clone()),
                _ => CatalogError::Storage(e.to_string()),
            })?;

        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<NewEvent>, CatalogError> {
        let rows = sqlx::query_scalar::<_, Json<NewEvent>>("SELECT definition FROM events ORDER BY seq")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CatalogError::Storage(e.to_string()))?;

        Ok(rows.into_iter().map(|Json(definition)| definition).collect())
    }
}
