//! Schema bootstrap for the devices table

use sqlx::PgPool;

/// Create the devices table if it does not exist yet.
///
/// Idempotent; safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Ensuring devices table exists");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS devices (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            brand TEXT NOT NULL,
            creation_time TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (name, brand)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
