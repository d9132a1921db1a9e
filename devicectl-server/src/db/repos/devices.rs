//! Device repository
//!
//! - save: INSERT ... RETURNING id, then re-read the row so the result
//!   carries the storage-assigned creation time
//! - update: no re-fetch, zero affected rows means the device is gone
//! - delete: read first, so a missing id surfaces as NotFound

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use super::{DeviceRepository, RepoError};
use crate::models::{Device, NewDevice};

/// PostgreSQL SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL implementation of `DeviceRepository`
#[derive(Clone)]
pub struct PgDeviceRepo {
    pool: PgPool,
}

impl PgDeviceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DeviceRepository for PgDeviceRepo {
    #[instrument(skip(self, device), fields(name = %device.name(), brand = %device.brand()))]
    async fn save(&self, device: NewDevice) -> Result<Device, RepoError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO devices (name, brand, creation_time)
            VALUES ($1, $2, NOW())
            RETURNING id
            "#,
        )
        .bind(device.name())
        .bind(device.brand())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, device.name(), device.brand()))?;

        tracing::debug!(id, "device inserted, re-reading row");

        // A concurrent delete between insert and re-read is a storage failure
        match self.find_by_id(id).await {
            Err(RepoError::NotFound { .. }) => Err(RepoError::Storage(sqlx::Error::RowNotFound)),
            other => other,
        }
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Device, RepoError> {
        sqlx::query_as::<_, Device>(
            r#"
            SELECT id, name, brand, creation_time
            FROM devices
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound { id })
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Device>, RepoError> {
        let devices = sqlx::query_as::<_, Device>(
            r#"
            SELECT id, name, brand, creation_time
            FROM devices
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(devices)
    }

    #[instrument(skip(self))]
    async fn find_by_brand(&self, brand: &str) -> Result<Vec<Device>, RepoError> {
        let devices = sqlx::query_as::<_, Device>(
            r#"
            SELECT id, name, brand, creation_time
            FROM devices
            WHERE brand = $1
            ORDER BY id
            "#,
        )
        .bind(brand)
        .fetch_all(&self.pool)
        .await?;

        Ok(devices)
    }

    #[instrument(skip(self, device), fields(id = device.id))]
    async fn update(&self, device: Device) -> Result<Device, RepoError> {
        let result = sqlx::query("UPDATE devices SET name = $1, brand = $2 WHERE id = $3")
            .bind(&device.name)
            .bind(&device.brand)
            .bind(device.id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify_write_error(e, &device.name, &device.brand))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound { id: device.id });
        }

        Ok(device)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: i64) -> Result<(), RepoError> {
        self.find_by_id(id).await?;

        sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) {
        match sqlx::query("DELETE FROM devices").execute(&self.pool).await {
            Ok(result) => {
                tracing::info!(deleted = result.rows_affected(), "all devices deleted")
            }
            Err(e) => tracing::error!(error = %e, "failed to delete all devices"),
        }
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> Result<(), RepoError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Map a unique_violation on (name, brand) to `ConstraintViolation`.
fn classify_write_error(err: sqlx::Error, name: &str, brand: &str) -> RepoError {
    if is_unique_violation(&err) {
        return RepoError::ConstraintViolation {
            name: name.to_owned(),
            brand: brand.to_owned(),
        };
    }
    RepoError::Storage(err)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}
