use async_trait::async_trait;
use sqlx::PgPool;
use tessera_core::{repository::UserRepository, CoreError, CoreResult};
use tessera_shared::{models::{NewUser, User}, Masked};

use crate::map_db_error;

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    is_admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            password_hash: Masked(row.password_hash),
            is_admin: row.is_admin,
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, is_admin FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(User::from))
    }

    async fn create_user(&self, user: NewUser) -> CoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, password_hash, is_admin)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, is_admin
            "#,
        )
        .bind(&user.email)
        .bind(user.password_hash.expose())
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match map_db_error(e) {
            CoreError::EmailTaken(_) => CoreError::EmailTaken(user.email.clone()),
            other => other,
        })?;

        Ok(row.into())
    }
}
