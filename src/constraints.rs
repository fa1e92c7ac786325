//! Constraint Installer: executes CREATE/ALTER statements in dependency
//! order. Each constraint is attempted once; existing ones (by name) are
//! skipped. One failure does not abort the remaining constraints.

use crate::cancel::CancellationToken;
use crate::ddl::quote_ident;
use crate::extract::postgres_side::constraint_exists;
use crate::model::constraint::{Constraint, ConstraintKind, OnDelete};
use sqlx::PgPool;
use tracing::{error, info, warn};

#[derive(Debug)]
pub struct InstallOutcome {
    pub installed: usize,
    pub skipped: usize,
    pub failures: Vec<(String, String)>,
    pub cancelled: bool,
}

/// Installs `constraints` in dependency order: all PKs, then UKs, then FKs
/// (already topologically ordered by the caller via
/// `mapping::depgraph`), then CHECKs. Stops before starting the next
/// constraint once `cancel` is observed; constraints already installed or
/// skipped stay that way.
pub async fn install_all(pool: &PgPool, mut constraints: Vec<Constraint>, cancel: &CancellationToken) -> InstallOutcome {
    constraints.sort_by_key(|c| c.install_rank());

    let mut outcome = InstallOutcome {
        installed: 0,
        skipped: 0,
        failures: Vec::new(),
        cancelled: false,
    };

    for constraint in &constraints {
        if cancel.is_cancelled() {
            warn!(remaining = constraints.len() - outcome.installed - outcome.skipped - outcome.failures.len(), "constraint install cancelled");
            outcome.cancelled = true;
            break;
        }

        let schema = constraint.table.schema.postgres_form();
        let table = constraint.table.name.to_lowercase();

        match constraint_exists(pool, &schema, &table, &constraint.name.to_lowercase()).await {
            Ok(true) => {
                outcome.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                outcome.failures.push((constraint.name.clone(), e.to_string()));
                continue;
            }
        }

        let sql = render_add_constraint(constraint);
        match sqlx::query(&sql).execute(pool).await {
            Ok(_) => {
                outcome.installed += 1;
                info!(constraint = %constraint.name, "installed");
            }
            Err(e) => {
                error!(constraint = %constraint.name, error = %e, "constraint install failed");
                outcome.failures.push((constraint.name.clone(), e.to_string()));
            }
        }
    }

    outcome
}

fn render_add_constraint(constraint: &Constraint) -> String {
    let table_ref = constraint.table.postgres_qualified();
    let name = quote_ident(&constraint.name.to_lowercase());

    match &constraint.kind {
        ConstraintKind::PrimaryKey { columns } => format!(
            "ALTER TABLE {table_ref} ADD CONSTRAINT {name} PRIMARY KEY ({})",
            quoted_columns(columns)
        ),
        ConstraintKind::Unique { columns } => format!(
            "ALTER TABLE {table_ref} ADD CONSTRAINT {name} UNIQUE ({})",
            quoted_columns(columns)
        ),
        ConstraintKind::ForeignKey {
            local_columns,
            referenced,
            referenced_columns,
            on_delete,
        } => format!(
            "ALTER TABLE {table_ref} ADD CONSTRAINT {name} FOREIGN KEY ({}) REFERENCES {} ({}) {}",
            quoted_columns(local_columns),
            referenced.postgres_qualified(),
            quoted_columns(referenced_columns),
            match on_delete {
                OnDelete::NoAction => "",
                OnDelete::Cascade => "ON DELETE CASCADE",
                OnDelete::SetNull => "ON DELETE SET NULL",
            }
        ),
        ConstraintKind::Check { expression } => {
            format!("ALTER TABLE {table_ref} ADD CONSTRAINT {name} CHECK ({expression})")
        }
        ConstraintKind::NotNull { .. } => {
            unreachable!("NOT NULL is emitted inline by the DDL emitter, never installed separately")
        }
    }
}

fn quoted_columns(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(&c.to_lowercase()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ident::QualifiedName;

    #[test]
    fn primary_key_renders_column_list() {
        let c = Constraint {
            name: "EMP_PK".into(),
            table: QualifiedName::new("HR", "EMPLOYEES"),
            kind: ConstraintKind::PrimaryKey {
                columns: vec!["ID".into()],
            },
        };
        assert_eq!(
            render_add_constraint(&c),
            "ALTER TABLE hr.employees ADD CONSTRAINT emp_pk PRIMARY KEY (id)"
        );
    }

    #[test]
    fn foreign_key_includes_on_delete_cascade() {
        let c = Constraint {
            name: "DEPT_FK".into(),
            table: QualifiedName::new("HR", "EMPLOYEES"),
            kind: ConstraintKind::ForeignKey {
                local_columns: vec!["DEPT_ID".into()],
                referenced: QualifiedName::new("HR", "DEPARTMENTS"),
                referenced_columns: vec!["ID".into()],
                on_delete: OnDelete::Cascade,
            },
        };
        let sql = render_add_constraint(&c);
        assert!(sql.contains("REFERENCES hr.departments (id)"));
        assert!(sql.contains("ON DELETE CASCADE"));
    }

    #[test]
    fn install_rank_orders_pk_before_fk() {
        let pk = Constraint {
            name: "A".into(),
            table: QualifiedName::new("HR", "T"),
            kind: ConstraintKind::PrimaryKey { columns: vec![] },
        };
        let fk = Constraint {
            name: "B".into(),
            table: QualifiedName::new("HR", "T"),
            kind: ConstraintKind::ForeignKey {
                local_columns: vec![],
                referenced: QualifiedName::new("HR", "T"),
                referenced_columns: vec![],
                on_delete: OnDelete::NoAction,
            },
        };
        assert!(pk.install_rank() < fk.install_rank());
    }
}
