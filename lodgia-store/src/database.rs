use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

use lodgia_domain::repository::StoreError;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

/// Collapse sqlx failures into the domain's store error, keeping the
/// reservation-reference unique violation distinguishable (the admission
/// retry loop keys on it).
pub(crate) fn map_sqlx_err(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db) => {
            if db.is_unique_violation() {
                match db.constraint() {
                    Some("reservations_reference_no_key") => StoreError::DuplicateReference,
                    Some(constraint) => StoreError::Duplicate(constraint.to_string()),
                    None => StoreError::Duplicate("unknown".to_string()),
                }
            } else {
                StoreError::Backend(db.to_string())
            }
        }
        other => StoreError::Backend(other.to_string()),
    }
}
