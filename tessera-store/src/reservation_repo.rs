use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tessera_core::{repository::ReservationRepository, CoreError, CoreResult};
use tessera_shared::models::{NewReservation, Reservation, ReservationSummary};

use crate::map_db_error;

pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: i64,
    event_id: i64,
    email: String,
    reservation_code: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: i64,
    event_id: i64,
    email: String,
    reservation_code: String,
    event_title: String,
    created_at: DateTime<Utc>,
}

impl From<SummaryRow> for ReservationSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            email: row.email,
            reservation_code: row.reservation_code,
            event_title: row.event_title,
            created_at: row.created_at,
        }
    }
}

const SUMMARY_SELECT: &str = r#"
    SELECT r.id, r.event_id, r.email, r.reservation_code, e.title AS event_title, r.created_at
    FROM reservations r
    JOIN events e ON e.id = r.event_id
"#;

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    async fn insert_reservation(&self, reservation: NewReservation) -> CoreResult<Reservation> {
        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            INSERT INTO reservations (event_id, email, reservation_code)
            VALUES ($1, $2, $3)
            RETURNING id, event_id, email, reservation_code, created_at
            "#,
        )
        .bind(reservation.event_id)
        .bind(&reservation.email)
        .bind(&reservation.reservation_code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match map_db_error(e) {
            CoreError::AlreadyRegistered { .. } => CoreError::AlreadyRegistered {
                event_id: reservation.event_id,
                email: reservation.email.clone(),
            },
            CoreError::NotFound(_) => CoreError::event_not_found(reservation.event_id),
            other => other,
        })?;

        Ok(Reservation {
            id: row.id,
            event_id: row.event_id,
            email: row.email,
            reservation_code: row.reservation_code,
            created_at: row.created_at,
        })
    }

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<ReservationSummary>> {
        let row = sqlx::query_as::<_, SummaryRow>(&format!("{} WHERE r.id = $1", SUMMARY_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.map(ReservationSummary::from))
    }

    async fn find_by_code(&self, code: &str) -> CoreResult<Option<ReservationSummary>> {
        let row = sqlx::query_as::<_, SummaryRow>(&format!("{} WHERE r.reservation_code = $1", SUMMARY_SELECT))
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.map(ReservationSummary::from))
    }

    async fn list_by_email(&self, email: &str) -> CoreResult<Vec<ReservationSummary>> {
        let rows = sqlx::query_as::<_, SummaryRow>(&format!(
            "{} WHERE r.email = $1 ORDER BY r.created_at, r.id",
            SUMMARY_SELECT
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(ReservationSummary::from).collect())
    }

    async fn delete_reservation(&self, id: i64) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
