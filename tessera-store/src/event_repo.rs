use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tessera_core::{repository::EventRepository, CoreResult};
use tessera_shared::models::{Event, NewEvent};
use tracing::debug;

use crate::map_db_error;

pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    title: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    thumbnail: Option<String>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            start_date: row.start_date,
            end_date: row.end_date,
            thumbnail: row.thumbnail,
        }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn list_events(&self) -> CoreResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT id, title, start_date, end_date, thumbnail FROM events ORDER BY start_date, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn get_event(&self, id: i64) -> CoreResult<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(
            "SELECT id, title, start_date, end_date, thumbnail FROM events WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(Event::from))
    }

    async fn create_event(&self, event: &NewEvent) -> CoreResult<Event> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (title, start_date, end_date, thumbnail)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, start_date, end_date, thumbnail
            "#,
        )
        .bind(&event.title)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(&event.thumbnail)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.into())
    }

    async fn update_event(&self, id: i64, event: &NewEvent) -> CoreResult<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events SET title = $1, start_date = $2, end_date = $3, thumbnail = $4
            WHERE id = $5
            RETURNING id, title, start_date, end_date, thumbnail
            "#,
        )
        .bind(&event.title)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(&event.thumbnail)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(Event::from))
    }

    async fn delete_event_cascade(&self, id: i64) -> CoreResult<Option<u64>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Dependents first, then the event, all or nothing
        let removed = sqlx::query("DELETE FROM reservations WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await.map_err(map_db_error)?;
            return Ok(None);
        }

        tx.commit().await.map_err(map_db_error)?;
        debug!("Deleted event {} and {} reservation(s)", id, removed);
        Ok(Some(removed))
    }
}
