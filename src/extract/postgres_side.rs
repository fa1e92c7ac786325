//! PostgreSQL-side lookups used during the DDL and constraint-install
//! phases: detecting objects already present so re-running a step is safe
//! and existing constraints (by name) are skipped rather than re-created.

use crate::error::{MigrationError, Result};
use sqlx::PgPool;

pub async fn constraint_exists(pool: &PgPool, schema: &str, table: &str, name: &str) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT 1 FROM information_schema.table_constraints \
         WHERE constraint_schema = $1 AND table_name = $2 AND constraint_name = $3",
    )
    .bind(schema)
    .bind(table)
    .bind(name)
    .fetch_optional(pool)
    .await
    .map_err(|e| connectivity_error(&e))?;

    Ok(row.is_some())
}

pub async fn row_count(pool: &PgPool, schema: &str, table: &str) -> Result<u64> {
    let quoted = format!(
        "SELECT COUNT(*) FROM {}.{}",
        crate::ddl::quote_ident(schema),
        crate::ddl::quote_ident(table)
    );
    let (count,): (i64,) = sqlx::query_as(&quoted)
        .fetch_one(pool)
        .await
        .map_err(|e| connectivity_error(&e))?;
    Ok(count as u64)
}

pub async fn truncate(pool: &PgPool, schema: &str, table: &str) -> Result<()> {
    let stmt = format!(
        "TRUNCATE TABLE {}.{}",
        crate::ddl::quote_ident(schema),
        crate::ddl::quote_ident(table)
    );
    sqlx::query(&stmt)
        .execute(pool)
        .await
        .map_err(|e| connectivity_error(&e))?;
    Ok(())
}

fn connectivity_error(err: &sqlx::Error) -> MigrationError {
    MigrationError::Connectivity(anyhow::anyhow!(err.to_string()))
}
