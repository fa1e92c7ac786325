//! Configuration: connection strings and the schema
//! inclusion filter are held by an external collaborator, not the core.

use crate::error::{MigrationError, Result};
use glob::Pattern;
use sqlx::PgPool;
use std::time::Duration;

/// Retry policy for opening either side's connection: retried once with
/// backoff, then surfaced.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            initial_delay: Duration::from_millis(200),
        }
    }
}

/// The only way the core touches a live connection: an external
/// collaborator hands out pooled connections per step.
pub trait ConnectionService: Send + Sync {
    fn open_oracle(&self) -> Result<oracle::Connection>;
    fn open_postgres(&self) -> impl Future<Output = Result<PgPool>> + Send;
}

/// Opens a PostgreSQL pool with the retry-with-backoff policy the
/// connectivity error category requires.
pub async fn connect_postgres_with_retry(url: &str, policy: &RetryPolicy) -> Result<PgPool> {
    let mut delay = policy.initial_delay;
    let mut last_error = None;

    for attempt in 0..=policy.max_retries {
        match PgPool::connect(url).await {
            Ok(pool) => return Ok(pool),
            Err(e) => {
                last_error = Some(e);
                if attempt < policy.max_retries {
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    Err(MigrationError::Connectivity(anyhow::anyhow!(
        "failed to connect after {} attempt(s): {}",
        policy.max_retries + 1,
        last_error.unwrap()
    )))
}

/// Include/exclude glob patterns over schema and table names. System
/// schemas are always excluded regardless of these patterns.
#[derive(Debug, Clone, Default)]
pub struct SchemaFilter {
    pub include_schemas: Vec<String>,
    pub exclude_schemas: Vec<String>,
    pub include_tables: Vec<String>,
    pub exclude_tables: Vec<String>,
}

impl SchemaFilter {
    pub fn should_include_schema(&self, schema: &str) -> bool {
        if crate::catalog::utils::is_system_schema(schema) {
            return false;
        }
        if matches_any(&self.exclude_schemas, schema) {
            return false;
        }
        if !self.include_schemas.is_empty() {
            return matches_any(&self.include_schemas, schema);
        }
        true
    }

    pub fn should_include_table(&self, schema: &str, table: &str) -> bool {
        if !self.should_include_schema(schema) {
            return false;
        }
        if matches_any(&self.exclude_tables, table) {
            return false;
        }
        if !self.include_tables.is_empty() {
            return matches_any(&self.include_tables, table);
        }
        true
    }
}

fn matches_any(patterns: &[String], name: &str) -> bool {
    patterns.iter().any(|p| {
        Pattern::new(p)
            .map(|pattern| pattern.matches(name))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_schemas_are_always_excluded() {
        let filter = SchemaFilter::default();
        assert!(!filter.should_include_schema("SYS"));
    }

    #[test]
    fn include_list_restricts_to_named_schemas() {
        let filter = SchemaFilter {
            include_schemas: vec!["HR".into()],
            ..Default::default()
        };
        assert!(filter.should_include_schema("HR"));
        assert!(!filter.should_include_schema("SCOTT"));
    }

    #[test]
    fn exclude_glob_beats_default_inclusion() {
        let filter = SchemaFilter {
            exclude_tables: vec!["TMP_*".into()],
            ..Default::default()
        };
        assert!(!filter.should_include_table("HR", "TMP_STAGING"));
        assert!(filter.should_include_table("HR", "EMPLOYEES"));
    }
}
