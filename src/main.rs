use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use ora2pg_core::catalog::Catalog;
use ora2pg_core::config::{ConnectionService, RetryPolicy, SchemaFilter, connect_postgres_with_retry};
use ora2pg_core::ddl;
use ora2pg_core::error::{MigrationError, Result as CoreResult};
use ora2pg_core::extract::oracle_side;
use ora2pg_core::model::ident::QualifiedName;
use ora2pg_core::orchestrator::DataTransferStep;
use ora2pg_core::sql::context::TransformContext;
use ora2pg_core::sql::transform::transform_select;
use serde::Serialize;
use sqlx::PgPool;
use std::future::Future;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about = "Translates an Oracle schema and its data to PostgreSQL", long_about = None)]
struct Cli {
    /// Enable verbose output (info level)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress all non-essential output (error level only)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug output (debug level)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct ConnectionArgs {
    /// Oracle connect string, e.g. "user/pass@host:port/service"
    #[arg(long, env = "ORACLE_CONNECT_STRING")]
    oracle: String,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    postgres: String,
}

#[derive(clap::Args, Clone, Default)]
struct FilterArgs {
    /// Glob patterns of schemas to include (default: all non-system schemas)
    #[arg(long, value_delimiter = ',')]
    include_schema: Vec<String>,

    /// Glob patterns of schemas to exclude
    #[arg(long, value_delimiter = ',')]
    exclude_schema: Vec<String>,

    /// Glob patterns of tables to exclude
    #[arg(long, value_delimiter = ',')]
    exclude_table: Vec<String>,
}

impl From<FilterArgs> for SchemaFilter {
    fn from(args: FilterArgs) -> Self {
        SchemaFilter {
            include_schemas: args.include_schema,
            exclude_schemas: args.exclude_schema,
            include_tables: Vec::new(),
            exclude_tables: args.exclude_table,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract Oracle metadata, create the PostgreSQL schema, and transfer data
    Migrate {
        #[command(flatten)]
        connections: ConnectionArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Number of rows buffered between the extraction producer and the
        /// COPY consumer for each table
        #[arg(long, default_value_t = ora2pg_core::transfer::DEFAULT_BUFFER_CAPACITY)]
        buffer_capacity: usize,
    },

    /// Translate a single Oracle SQL statement and print the PostgreSQL
    /// equivalent (the ancillary translation endpoint, as a one-shot CLI form)
    Translate {
        /// The Oracle SQL text to translate
        sql: String,

        /// The schema the statement executes in
        #[arg(long, default_value = "PUBLIC")]
        schema: String,
    },
}

#[derive(Serialize)]
struct TranslationResult {
    success: bool,
    oracle_sql: String,
    postgres_sql: Option<String>,
    error_message: Option<String>,
}

struct LiveConnections {
    oracle_connect_string: String,
    postgres_url: String,
    retry_policy: RetryPolicy,
}

impl ConnectionService for LiveConnections {
    fn open_oracle(&self) -> CoreResult<oracle::Connection> {
        let (credentials, rest) = self
            .oracle_connect_string
            .split_once('@')
            .ok_or_else(|| MigrationError::Configuration("ORACLE_CONNECT_STRING must be user/pass@host".into()))?;
        let (user, password) = credentials
            .split_once('/')
            .ok_or_else(|| MigrationError::Configuration("ORACLE_CONNECT_STRING must be user/pass@host".into()))?;
        oracle::Connection::connect(user, password, rest)
            .map_err(|e| MigrationError::Connectivity(anyhow::anyhow!(e)))
    }

    fn open_postgres(&self) -> impl Future<Output = CoreResult<PgPool>> + Send {
        let url = self.postgres_url.clone();
        let policy = self.retry_policy.clone();
        async move { connect_postgres_with_retry(&url, &policy).await }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    initialize_logging(&cli);

    let cancel = ora2pg_core::cancel::CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("received shutdown signal, finishing the current step then stopping");
        signal_cancel.cancel();
    });

    run_main(cli, cancel).await
}

async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn initialize_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

async fn run_main(cli: Cli, cancel: ora2pg_core::cancel::CancellationToken) -> Result<()> {
    match cli.command {
        Commands::Translate { sql, schema } => cmd_translate(&sql, &schema),
        Commands::Migrate {
            connections,
            filter,
            buffer_capacity,
        } => cmd_migrate(connections, filter.into(), buffer_capacity, &cancel).await,
    }
}

fn cmd_translate(sql: &str, schema: &str) -> Result<()> {
    let catalog = Catalog::new();
    let ctx = TransformContext::new(schema, &catalog);

    let result = match transform_select(sql, &ctx) {
        Ok(postgres_sql) => TranslationResult {
            success: true,
            oracle_sql: sql.to_string(),
            postgres_sql: Some(postgres_sql),
            error_message: None,
        },
        Err(e) => TranslationResult {
            success: false,
            oracle_sql: sql.to_string(),
            postgres_sql: None,
            error_message: Some(e.to_string()),
        },
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn cmd_migrate(
    connections: ConnectionArgs,
    filter: SchemaFilter,
    buffer_capacity: usize,
    cancel: &ora2pg_core::cancel::CancellationToken,
) -> Result<()> {
    let live = LiveConnections {
        oracle_connect_string: connections.oracle,
        postgres_url: connections.postgres,
        retry_policy: RetryPolicy::default(),
    };

    let oracle_conn = live.open_oracle().context("opening Oracle connection")?;
    let pg_pool = live.open_postgres().await.context("opening PostgreSQL connection")?;

    let mut catalog = Catalog::new();
    let mut progress = |_done: u64, _total: Option<u64>| {};

    oracle_side::extract_synonyms(&oracle_conn, &filter, &mut catalog, &mut progress, cancel)
        .context("extracting synonyms")?;
    oracle_side::extract_sequences(&oracle_conn, &filter, &mut catalog, &mut progress, cancel)
        .context("extracting sequences")?;
    oracle_side::extract_tables(&oracle_conn, &filter, &mut catalog, &mut progress, cancel)
        .context("extracting tables")?;

    let schemas: Vec<String> = catalog
        .tables()
        .map(|t| t.name.schema.postgres_form())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    for schema in &schemas {
        let rendered = ddl::schema::create_schema(schema);
        execute(&pg_pool, &rendered.sql).await?;
    }

    for sequence in catalog.sequences() {
        let rendered = ddl::sequence::create_sequence(sequence);
        execute(&pg_pool, &rendered.sql).await?;
    }

    let table_names: Vec<QualifiedName> = catalog.tables().map(|t| t.name.clone()).collect();
    for name in &table_names {
        if cancel.is_cancelled() {
            warn!("migration cancelled before table creation finished");
            return Err(MigrationError::Cancelled.into());
        }
        let table = catalog.find_table(name).expect("just listed from the catalog");
        match ddl::table::create_table(table, &catalog) {
            Ok(rendered) => execute(&pg_pool, &rendered.sql).await?,
            Err(e) => error!(table = %name, error = %e, "skipping table creation"),
        }
    }

    for name in &table_names {
        if cancel.is_cancelled() {
            warn!("migration cancelled before data transfer finished");
            return Err(MigrationError::Cancelled.into());
        }
        let step = DataTransferStep {
            table: name.clone(),
            catalog: &catalog,
            buffer_capacity,
        };
        let mut step_progress = |_done: u64, _total: u64, message: &str| info!("{message}");
        match step.run(&live, &mut step_progress, cancel).await {
            ora2pg_core::orchestrator::StepResult::Ok(outcome) => {
                info!(table = %name, counts = ?outcome.counts, "table transferred")
            }
            ora2pg_core::orchestrator::StepResult::Error(e) => {
                warn!(table = %name, category = %e.category, message = %e.message, "table transfer failed")
            }
        }
    }

    info!("migration run complete");
    Ok(())
}

async fn execute(pool: &PgPool, sql: &str) -> Result<()> {
    sqlx::query(sql)
        .execute(pool)
        .await
        .with_context(|| format!("executing: {sql}"))?;
    Ok(())
}
