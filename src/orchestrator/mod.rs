//! The orchestrator contract: the only boundary the core exposes to
//! callers. Each migration step is a `kind`-tagged value with a `run`
//! entry point, a progress callback, and a declared Catalog read/write
//! footprint. The orchestrator itself only sequences steps and collects
//! outcomes; it holds no migration logic of its own.

use crate::cancel::CancellationToken;
use crate::catalog::Catalog;
use crate::config::ConnectionService;
use crate::error::MigrationError;
use crate::model::ident::QualifiedName;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// `(done, total, message)` — incremental progress, reported at whatever
/// granularity the step finds natural.
pub type ProgressFn<'a> = dyn FnMut(u64, u64, &str) + Send + 'a;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogAccess {
    ReadOnly,
    WriteOnly,
    ReadWrite,
    None,
}

/// One of the recognised, non-exhaustive step kinds, grouped by
/// migration phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    OracleSchemaExtract,
    OracleTableExtract,
    OracleSynonymExtract,
    OracleSequenceExtract,
    OracleViewExtract,
    OracleRoutineExtract,
    OracleTypeMethodExtract,
    PostgresRowCountExtract,
    PostgresSchemaCreate,
    PostgresObjectTypeCreate,
    PostgresSequenceCreate,
    PostgresTableCreate,
    PostgresDataTransfer,
    PostgresConstraintCreate,
    PostgresViewStubCreate,
    PostgresFunctionStubCreate,
    PostgresTypeMethodStubCreate,
    PostgresViewImplement,
}

impl StepKind {
    pub fn tag(self) -> &'static str {
        match self {
            StepKind::OracleSchemaExtract => "oracle.schema.extract",
            StepKind::OracleTableExtract => "oracle.table.extract",
            StepKind::OracleSynonymExtract => "oracle.synonym.extract",
            StepKind::OracleSequenceExtract => "oracle.sequence.extract",
            StepKind::OracleViewExtract => "oracle.view.extract",
            StepKind::OracleRoutineExtract => "oracle.function.extract",
            StepKind::OracleTypeMethodExtract => "oracle.type-method.extract",
            StepKind::PostgresRowCountExtract => "postgres.row-count.extract",
            StepKind::PostgresSchemaCreate => "postgres.schema.create",
            StepKind::PostgresObjectTypeCreate => "postgres.object-type.create",
            StepKind::PostgresSequenceCreate => "postgres.sequence.create",
            StepKind::PostgresTableCreate => "postgres.table.create",
            StepKind::PostgresDataTransfer => "postgres.data.transfer",
            StepKind::PostgresConstraintCreate => "postgres.constraint.create",
            StepKind::PostgresViewStubCreate => "postgres.view-stub.create",
            StepKind::PostgresFunctionStubCreate => "postgres.function-stub.create",
            StepKind::PostgresTypeMethodStubCreate => "postgres.type-method-stub.create",
            StepKind::PostgresViewImplement => "postgres.view.implement",
        }
    }

    /// The Catalog footprint a step of this kind declares.
    pub fn catalog_access(self) -> CatalogAccess {
        use StepKind::*;
        match self {
            OracleSchemaExtract | OracleTableExtract | OracleSynonymExtract | OracleSequenceExtract
            | OracleViewExtract | OracleRoutineExtract | OracleTypeMethodExtract | PostgresRowCountExtract => {
                CatalogAccess::WriteOnly
            }
            PostgresSchemaCreate
            | PostgresObjectTypeCreate
            | PostgresSequenceCreate
            | PostgresTableCreate
            | PostgresConstraintCreate
            | PostgresViewStubCreate
            | PostgresFunctionStubCreate
            | PostgresTypeMethodStubCreate
            | PostgresViewImplement => CatalogAccess::ReadOnly,
            PostgresDataTransfer => CatalogAccess::ReadOnly,
        }
    }
}

pub struct StepOutcomeOk {
    pub counts: Vec<(String, u64)>,
    pub durations: Vec<(String, Duration)>,
}

#[derive(Debug, Clone)]
pub struct StepOutcomeError {
    pub category: String,
    pub message: String,
    pub underlying: Option<String>,
}

pub enum StepResult {
    Ok(StepOutcomeOk),
    Error(StepOutcomeError),
}

impl StepResult {
    fn from_table_result(table: &QualifiedName, started: Instant, result: Result<u64, MigrationError>) -> Self {
        match result {
            Ok(rows) => StepResult::Ok(StepOutcomeOk {
                counts: vec![(table.to_string(), rows)],
                durations: vec![(table.to_string(), started.elapsed())],
            }),
            Err(e) => StepResult::Error(StepOutcomeError {
                category: category_of(&e),
                message: e.to_string(),
                underlying: None,
            }),
        }
    }
}

fn category_of(e: &MigrationError) -> String {
    match e {
        MigrationError::Configuration(_) => "Configuration",
        MigrationError::Connectivity(_) => "Connectivity",
        MigrationError::Metadata { .. } => "Metadata",
        MigrationError::Mapping(_) => "Mapping",
        MigrationError::Dependency(_) => "Dependency",
        MigrationError::Transformation(_) => "Transformation",
        MigrationError::Data(_) => "Data",
        MigrationError::Cancelled => "Cancellation",
    }
    .to_string()
}

/// A single migration step: a table's data transfer, grounded directly on
/// [`crate::transfer::transfer_table`]. Additional step kinds (schema
/// extraction, DDL creation, constraint install, view implementation)
/// compose the same way over their own phase's functions; this is the one
/// wired end to end as the orchestrator's reference implementation.
pub struct DataTransferStep<'a> {
    pub table: QualifiedName,
    pub catalog: &'a Catalog,
    pub buffer_capacity: usize,
}

impl<'a> DataTransferStep<'a> {
    pub fn kind(&self) -> StepKind {
        StepKind::PostgresDataTransfer
    }

    pub async fn run<C: ConnectionService>(
        &self,
        connections: &C,
        progress: &mut ProgressFn<'_>,
        cancel: &CancellationToken,
    ) -> StepResult {
        let started = Instant::now();
        progress(0, 0, &format!("transferring {}", self.table));

        let outcome = async {
            cancel.check()?;
            let oracle_conn = connections.open_oracle()?;
            let pg_pool = connections.open_postgres().await?;
            crate::transfer::transfer_table(
                oracle_conn,
                pg_pool,
                self.table.clone(),
                self.catalog,
                self.buffer_capacity,
                cancel,
            )
            .await
            .map(|o| o.rows_transferred)
        }
        .await;

        match &outcome {
            Ok(rows) => info!(table = %self.table, rows, "transfer step complete"),
            Err(e) => error!(table = %self.table, error = %e, "transfer step failed"),
        }

        StepResult::from_table_result(&self.table, started, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_kind_tags_match_the_dotted_naming_convention() {
        assert_eq!(StepKind::PostgresDataTransfer.tag(), "postgres.data.transfer");
        assert_eq!(StepKind::OracleTableExtract.tag(), "oracle.table.extract");
    }

    #[test]
    fn extraction_steps_declare_write_only_access() {
        assert_eq!(StepKind::OracleTableExtract.catalog_access(), CatalogAccess::WriteOnly);
    }

    #[test]
    fn creation_steps_declare_read_only_access() {
        assert_eq!(StepKind::PostgresTableCreate.catalog_access(), CatalogAccess::ReadOnly);
    }
}
