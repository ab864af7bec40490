use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};

use crate::config::Config;
use crate::database::models::user::UserEntity;
use crate::database::{StoreError, UserStore};
use crate::models::user::messages;
use crate::models::{
    CreateUsersResult, DeleteUsersResult, NewUser, UpdateUsersResult, User, UserUpdate,
};

const USER_COLUMNS: &str = "id, name, email, created_at";

/// PostgreSQL 用户存储，表结构：
///
/// ```sql
/// CREATE TABLE users (
///     id         BIGSERIAL PRIMARY KEY,
///     name       VARCHAR(64)  NOT NULL DEFAULT '',
///     email      VARCHAR(128) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ  NOT NULL DEFAULT now()
/// );
/// ```
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 按配置建立连接池
    pub async fn connect(database_url: &str, config: &Config) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .min_connections(config.db_min_connections)
            .max_lifetime(Duration::from_secs(config.db_max_lifetime_secs))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("SET application_name = 'user_api';").await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;

        tracing::info!(
            max = config.db_max_connections,
            min = config.db_min_connections,
            "Postgres pool ready"
        );
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn get(&self, id: i64) -> Result<User, StoreError> {
        sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(User::from)
        .ok_or(StoreError::NotFound(id))
    }

    async fn create_many(&self, inputs: Vec<NewUser>) -> Result<CreateUsersResult, StoreError> {
        let mut result = CreateUsersResult::default();
        let sql = format!("INSERT INTO users (name, email) VALUES ($1, $2) RETURNING {USER_COLUMNS}");

        for input in inputs {
            if !input.is_complete() {
                result.errors.push(messages::FIELDS_REQUIRED.to_string());
                continue;
            }

            let inserted = sqlx::query_as::<_, UserEntity>(&sql)
                .bind(&input.name)
                .bind(&input.email)
                .fetch_one(&self.pool)
                .await;

            match inserted {
                Ok(row) => result.created.push(row.into()),
                Err(e) if is_unique_violation(&e) => {
                    tracing::debug!("Duplicate email rejected: {}", input.email);
                    result.errors.push(messages::EMAIL_EXISTS.to_string());
                }
                Err(e) => {
                    tracing::error!("Failed to create user: {:?}", e);
                    return Err(e.into());
                }
            }
        }

        Ok(result)
    }

    async fn update_many(
        &self,
        inputs: Vec<UserUpdate>,
    ) -> Result<UpdateUsersResult, StoreError> {
        let sql = format!(
            "UPDATE users SET name = $1, email = $2 WHERE id = $3 RETURNING {USER_COLUMNS}"
        );
        let mut result = UpdateUsersResult::default();
        let mut tx = self.pool.begin().await?;

        for input in inputs {
            if input.id <= 0 {
                result.not_found.push(input.id);
                continue;
            }

            let row = sqlx::query_as::<_, UserEntity>(&sql)
                .bind(&input.name)
                .bind(&input.email)
                .bind(input.id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        StoreError::Conflict(format!("{}: {}", messages::EMAIL_EXISTS, input.email))
                    } else {
                        StoreError::Database(e)
                    }
                })?;

            match row {
                Some(row) => result.updated.push(row.into()),
                None => result.not_found.push(input.id),
            }
        }

        // 出错时 tx 被丢弃即回滚
        tx.commit().await?;
        Ok(result)
    }

    async fn delete_many(&self, ids: Vec<i64>) -> Result<DeleteUsersResult, StoreError> {
        let mut deleted: Vec<i64> =
            sqlx::query_scalar::<_, i64>("DELETE FROM users WHERE id = ANY($1) RETURNING id")
                .bind(&ids)
                .fetch_all(&self.pool)
                .await?;
        deleted.sort_unstable();

        Ok(DeleteUsersResult::from_requested(&ids, deleted))
    }
}
