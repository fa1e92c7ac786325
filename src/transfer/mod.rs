//! Streaming Data Transfer: single-producer/single-consumer
//! pipeline with a bounded buffer as the backpressure mechanism. The
//! producer runs on a blocking thread (the `oracle` driver is synchronous);
//! the consumer is an async task feeding `COPY FROM STDIN`.

use crate::cancel::CancellationToken;
use crate::catalog::Catalog;
use crate::error::{DataError, MigrationError, Result};
use crate::model::ident::QualifiedName;
use crate::model::table::Table;
use crate::serialize::{self, DEFAULT_NULL_SENTINEL};
use oracle::Connection as OracleConnection;
use sqlx::postgres::PgPoolCopyExt;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Bounded buffer capacity in records — full writes block the producer,
/// empty reads block the consumer.
pub const DEFAULT_BUFFER_CAPACITY: usize = 512;

pub struct TransferOutcome {
    pub table: QualifiedName,
    pub rows_transferred: u64,
}

/// Transfers one (sourceTable, targetTable) pair end to end: truncate
/// target, stream rows, verify row-count conservation.
pub async fn transfer_table(
    oracle_conn: OracleConnection,
    pg_pool: PgPool,
    table: QualifiedName,
    catalog: &Catalog,
    buffer_capacity: usize,
    cancel: &CancellationToken,
) -> Result<TransferOutcome> {
    cancel.check()?;
    let schema = table.schema.postgres_form();
    let table_name = table.name.to_lowercase();
    crate::extract::postgres_side::truncate(&pg_pool, &schema, &table_name).await?;

    let source_count = catalog.row_count(&table).unwrap_or(0);
    let table_def = catalog
        .find_table(&table)
        .cloned()
        .ok_or_else(|| MigrationError::Metadata {
            object: table.clone(),
            message: "table not present in catalog at transfer time".into(),
        })?;

    let (tx, rx) = mpsc::channel::<Vec<u8>>(buffer_capacity);
    let query = format!("SELECT * FROM {}.{}", table.schema.oracle_form(), table.name);
    let producer_table = table.clone();
    let producer_cancel = cancel.clone();

    let producer = tokio::task::spawn_blocking(move || {
        run_producer(&oracle_conn, &query, &producer_table, &table_def, tx, &producer_cancel)
    });

    let consumer_result = run_consumer(&pg_pool, &schema, &table_name, rx, cancel).await;

    let produced = producer
        .await
        .map_err(|e| MigrationError::Connectivity(anyhow::anyhow!("producer task panicked: {e}")))??;

    let rows_copied = consumer_result?;
    if cancel.is_cancelled() {
        warn!(table = %table, "transfer cancelled mid-flight; target table left truncated");
        return Err(MigrationError::Cancelled);
    }
    if produced != rows_copied {
        error!(table = %table, produced, rows_copied, "producer/consumer row count disagreement");
        return Err(DataError::PartialTransfer { table }.into());
    }

    let target_count = crate::extract::postgres_side::row_count(&pg_pool, &schema, &table_name).await?;
    if target_count != source_count {
        return Err(DataError::RowCountMismatch {
            table,
            source_count,
            target_count,
        }
        .into());
    }

    info!(table = %table_name, rows = target_count, "transfer complete");
    Ok(TransferOutcome {
        table: QualifiedName::new(schema, table_name),
        rows_transferred: target_count,
    })
}

/// Runs on a blocking thread: iterates the source cursor, serializes each
/// row, and hands it to the bounded channel. A closed receiver means
/// the consumer aborted — stop reading and close the source cursor by
/// dropping it.
fn run_producer(
    conn: &OracleConnection,
    query: &str,
    table: &QualifiedName,
    table_def: &Table,
    tx: mpsc::Sender<Vec<u8>>,
    cancel: &CancellationToken,
) -> Result<u64> {
    let rows = conn.query(query, &[]).map_err(|e| MigrationError::Metadata {
        object: table.clone(),
        message: e.to_string(),
    })?;

    let mut count = 0u64;
    for (row_index, row) in rows.enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        let row = row.map_err(|e| DataError::SerializationFailure {
            table: table.clone(),
            row_index: row_index as u64,
            message: e.to_string(),
        })?;

        let mut fields = Vec::with_capacity(table_def.columns.len());
        for (i, column) in table_def.ordered_columns().enumerate() {
            let raw: Option<String> = row.get(i).map_err(|e| DataError::SerializationFailure {
                table: table.clone(),
                row_index: row_index as u64,
                message: e.to_string(),
            })?;
            let value = match raw {
                Some(s) => serialize::Value::Scalar(s),
                None => serialize::Value::Null,
            };
            fields.push(serialize::serialize(&value, &column.type_ref, DEFAULT_NULL_SENTINEL));
        }

        let mut line = fields.join("\t");
        line.push('\n');

        if tx.blocking_send(line.into_bytes()).is_err() {
            break;
        }
        count += 1;
    }

    Ok(count)
}

/// Opens a `COPY FROM STDIN` stream and drains the buffer into it,
/// committing on stream close.
async fn run_consumer(
    pool: &PgPool,
    schema: &str,
    table: &str,
    mut rx: mpsc::Receiver<Vec<u8>>,
    cancel: &CancellationToken,
) -> Result<u64> {
    let copy_stmt = format!(
        "COPY {}.{} FROM STDIN WITH (FORMAT text, NULL '{}')",
        crate::ddl::quote_ident(schema),
        crate::ddl::quote_ident(table),
        DEFAULT_NULL_SENTINEL
    );

    let mut sink = pool
        .copy_in_raw(&copy_stmt)
        .await
        .map_err(|e| MigrationError::Connectivity(anyhow::anyhow!(e.to_string())))?;

    let mut count = 0u64;
    while let Some(chunk) = rx.recv().await {
        if cancel.is_cancelled() {
            break;
        }
        sink.send(chunk)
            .await
            .map_err(|e| MigrationError::Connectivity(anyhow::anyhow!(e.to_string())))?;
        count += 1;
    }

    sink.finish()
        .await
        .map_err(|e| MigrationError::Connectivity(anyhow::anyhow!(e.to_string())))?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_capacity_is_bounded_by_default() {
        assert!(DEFAULT_BUFFER_CAPACITY > 0);
        assert!(DEFAULT_BUFFER_CAPACITY < 100_000);
    }
}
