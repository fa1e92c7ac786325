//! Oracle-side extractors: query `ALL_*` dictionary views, build entities,
//! insert into the Catalog.

use crate::cancel::CancellationToken;
use crate::catalog::{Catalog, utils::is_system_schema};
use crate::config::SchemaFilter;
use crate::error::{MigrationError, Result};
use crate::extract::ProgressFn;
use crate::model::column::Column;
use crate::model::ident::QualifiedName;
use crate::model::sequence::Sequence;
use crate::model::synonym::Synonym;
use crate::model::table::Table;
use crate::model::types::{BuiltIn, TypeRef};
use oracle::Connection;
use tracing::{info, warn};

/// `ALL_SYNONYMS` ( population order: schemas → synonyms → …).
pub fn extract_synonyms(
    conn: &Connection,
    filter: &SchemaFilter,
    catalog: &mut Catalog,
    progress: &mut ProgressFn<'_>,
    cancel: &CancellationToken,
) -> Result<usize> {
    let rows = conn
        .query(
            "SELECT owner, synonym_name, table_owner, table_name FROM all_synonyms \
             WHERE owner = 'PUBLIC' OR owner IN (SELECT username FROM all_users)",
            &[],
        )
        .map_err(|e| metadata_error("ALL_SYNONYMS", &e))?;

    let mut count = 0u64;
    for row in rows {
        cancel.check()?;
        let row = row.map_err(|e| metadata_error("ALL_SYNONYMS", &e))?;
        let owner: String = row.get(0).map_err(|e| metadata_error("ALL_SYNONYMS", &e))?;
        if owner != "PUBLIC" && (!filter.should_include_schema(&owner) || is_system_schema(&owner)) {
            continue;
        }
        let synonym_name: String = row.get(1).map_err(|e| metadata_error("ALL_SYNONYMS", &e))?;
        let table_owner: String = row.get(2).map_err(|e| metadata_error("ALL_SYNONYMS", &e))?;
        let table_name: String = row.get(3).map_err(|e| metadata_error("ALL_SYNONYMS", &e))?;

        catalog.insert_synonym(Synonym {
            owner: owner.clone(),
            synonym_name,
            target: QualifiedName::new(table_owner, table_name),
        });
        count += 1;
        progress(count, None);
    }

    info!(count, "extracted synonyms");
    Ok(count as usize)
}

/// `ALL_SEQUENCES`.
pub fn extract_sequences(
    conn: &Connection,
    filter: &SchemaFilter,
    catalog: &mut Catalog,
    progress: &mut ProgressFn<'_>,
    cancel: &CancellationToken,
) -> Result<usize> {
    let rows = conn
        .query(
            "SELECT sequence_owner, sequence_name, min_value, max_value, increment_by, \
             cache_size, cycle_flag, last_number FROM all_sequences",
            &[],
        )
        .map_err(|e| metadata_error("ALL_SEQUENCES", &e))?;

    let mut count = 0u64;
    for row in rows {
        cancel.check()?;
        let row = row.map_err(|e| metadata_error("ALL_SEQUENCES", &e))?;
        let owner: String = row.get(0).map_err(|e| metadata_error("ALL_SEQUENCES", &e))?;
        if !filter.should_include_schema(&owner) {
            continue;
        }
        let name: String = row.get(1).map_err(|e| metadata_error("ALL_SEQUENCES", &e))?;
        let min: i64 = row.get(2).map_err(|e| metadata_error("ALL_SEQUENCES", &e))?;
        let max: i64 = row.get(3).map_err(|e| metadata_error("ALL_SEQUENCES", &e))?;
        let increment: i64 = row.get(4).map_err(|e| metadata_error("ALL_SEQUENCES", &e))?;
        let cache: i64 = row.get(5).map_err(|e| metadata_error("ALL_SEQUENCES", &e))?;
        let cycle_flag: String = row.get(6).map_err(|e| metadata_error("ALL_SEQUENCES", &e))?;
        let start: i64 = row.get(7).map_err(|e| metadata_error("ALL_SEQUENCES", &e))?;

        catalog.insert_sequence(Sequence {
            name: QualifiedName::new(owner, name),
            start,
            increment,
            min,
            max,
            cache,
            cycle: cycle_flag == "Y",
        });
        count += 1;
        progress(count, None);
    }

    info!(count, "extracted sequences");
    Ok(count as usize)
}

/// `ALL_TAB_COLUMNS` joined conceptually with `ALL_TABLES`; constraints are
/// extracted inline by `extract_constraints_for`.
pub fn extract_tables(
    conn: &Connection,
    filter: &SchemaFilter,
    catalog: &mut Catalog,
    progress: &mut ProgressFn<'_>,
    cancel: &CancellationToken,
) -> Result<usize> {
    let table_rows = conn
        .query(
            "SELECT owner, table_name FROM all_tables ORDER BY owner, table_name",
            &[],
        )
        .map_err(|e| metadata_error("ALL_TABLES", &e))?;

    let mut tables: Vec<(String, String)> = Vec::new();
    for row in table_rows {
        let row = row.map_err(|e| metadata_error("ALL_TABLES", &e))?;
        let owner: String = row.get(0).map_err(|e| metadata_error("ALL_TABLES", &e))?;
        let name: String = row.get(1).map_err(|e| metadata_error("ALL_TABLES", &e))?;
        if filter.should_include_table(&owner, &name) {
            tables.push((owner, name));
        }
    }

    let total = tables.len() as u64;
    let mut done = 0u64;
    for (owner, name) in tables {
        cancel.check()?;
        let columns = extract_columns(conn, &owner, &name)?;
        let constraints = extract_constraints(conn, &owner, &name)?;
        catalog.insert_table(Table {
            name: QualifiedName::new(owner, name),
            columns,
            constraints,
        });
        done += 1;
        progress(done, Some(total));
    }

    info!(count = total, "extracted tables");
    Ok(total as usize)
}

fn extract_columns(conn: &Connection, owner: &str, table: &str) -> Result<Vec<Column>> {
    let rows = conn
        .query(
            "SELECT column_name, data_type, data_length, data_precision, data_scale, \
             nullable, data_default, column_id FROM all_tab_columns \
             WHERE owner = :1 AND table_name = :2 ORDER BY column_id",
            &[&owner, &table],
        )
        .map_err(|e| metadata_error("ALL_TAB_COLUMNS", &e))?;

    let mut columns = Vec::new();
    for row in rows {
        let row = row.map_err(|e| metadata_error("ALL_TAB_COLUMNS", &e))?;
        let name: String = row.get(0).map_err(|e| metadata_error("ALL_TAB_COLUMNS", &e))?;
        let data_type: String = row.get(1).map_err(|e| metadata_error("ALL_TAB_COLUMNS", &e))?;
        let length: Option<u32> = row.get(2).map_err(|e| metadata_error("ALL_TAB_COLUMNS", &e))?;
        let precision: Option<u32> = row.get(3).map_err(|e| metadata_error("ALL_TAB_COLUMNS", &e))?;
        let scale: Option<i32> = row.get(4).map_err(|e| metadata_error("ALL_TAB_COLUMNS", &e))?;
        let nullable_flag: String = row.get(5).map_err(|e| metadata_error("ALL_TAB_COLUMNS", &e))?;
        let default_expr: Option<String> = row.get(6).map_err(|e| metadata_error("ALL_TAB_COLUMNS", &e))?;
        let column_id: u32 = row.get(7).map_err(|e| metadata_error("ALL_TAB_COLUMNS", &e))?;

        let type_ref = if TypeRef::is_complex_system_name(owner, &data_type) {
            TypeRef::ComplexSystem(QualifiedName::new("SYS", data_type))
        } else {
            TypeRef::BuiltIn(BuiltIn {
                oracle_name: data_type,
                length,
                precision,
                scale,
            })
        };

        columns.push(Column {
            name,
            type_ref,
            nullable: nullable_flag == "Y",
            default_expr,
            column_order: column_id,
        });
    }
    Ok(columns)
}

fn extract_constraints(
    conn: &Connection,
    owner: &str,
    table: &str,
) -> Result<Vec<crate::model::constraint::Constraint>> {
    use crate::model::constraint::{Constraint, ConstraintKind, OnDelete};

    let rows = conn
        .query(
            "SELECT constraint_name, constraint_type, r_owner, r_constraint_name, delete_rule \
             FROM all_constraints WHERE owner = :1 AND table_name = :2 \
             AND constraint_type IN ('P','U','R','C')",
            &[&owner, &table],
        )
        .map_err(|e| metadata_error("ALL_CONSTRAINTS", &e))?;

    let mut constraints = Vec::new();
    for row in rows {
        let row = row.map_err(|e| metadata_error("ALL_CONSTRAINTS", &e))?;
        let name: String = row.get(0).map_err(|e| metadata_error("ALL_CONSTRAINTS", &e))?;
        let kind_code: String = row.get(1).map_err(|e| metadata_error("ALL_CONSTRAINTS", &e))?;
        let delete_rule: Option<String> = row.get(4).map_err(|e| metadata_error("ALL_CONSTRAINTS", &e))?;

        let columns = extract_constraint_columns(conn, owner, &name)?;
        let kind = match kind_code.as_str() {
            "P" => ConstraintKind::PrimaryKey { columns },
            "U" => ConstraintKind::Unique { columns },
            "R" => {
                let r_owner: String = row.get(2).map_err(|e| metadata_error("ALL_CONSTRAINTS", &e))?;
                let r_name: String = row.get(3).map_err(|e| metadata_error("ALL_CONSTRAINTS", &e))?;
                let (referenced, referenced_columns) = resolve_referenced(conn, &r_owner, &r_name)?;
                ConstraintKind::ForeignKey {
                    local_columns: columns,
                    referenced,
                    referenced_columns,
                    on_delete: match delete_rule.as_deref() {
                        Some("CASCADE") => OnDelete::Cascade,
                        Some("SET NULL") => OnDelete::SetNull,
                        _ => OnDelete::NoAction,
                    },
                }
            }
            "C" => ConstraintKind::Check {
                expression: String::new(),
            },
            other => {
                warn!(kind = other, "unrecognised constraint type; skipping");
                continue;
            }
        };

        constraints.push(Constraint {
            name,
            table: QualifiedName::new(owner, table),
            kind,
        });
    }
    Ok(constraints)
}

fn extract_constraint_columns(conn: &Connection, owner: &str, constraint: &str) -> Result<Vec<String>> {
    let rows = conn
        .query(
            "SELECT column_name FROM all_cons_columns \
             WHERE owner = :1 AND constraint_name = :2 ORDER BY position",
            &[&owner, &constraint],
        )
        .map_err(|e| metadata_error("ALL_CONS_COLUMNS", &e))?;

    let mut columns = Vec::new();
    for row in rows {
        let row = row.map_err(|e| metadata_error("ALL_CONS_COLUMNS", &e))?;
        columns.push(row.get(0).map_err(|e| metadata_error("ALL_CONS_COLUMNS", &e))?);
    }
    Ok(columns)
}

fn resolve_referenced(
    conn: &Connection,
    r_owner: &str,
    r_constraint: &str,
) -> Result<(QualifiedName, Vec<String>)> {
    let rows = conn
        .query(
            "SELECT table_name FROM all_constraints WHERE owner = :1 AND constraint_name = :2",
            &[&r_owner, &r_constraint],
        )
        .map_err(|e| metadata_error("ALL_CONSTRAINTS", &e))?;
    let mut table_name = None;
    for row in rows {
        let row = row.map_err(|e| metadata_error("ALL_CONSTRAINTS", &e))?;
        table_name = Some(row.get::<_, String>(0).map_err(|e| metadata_error("ALL_CONSTRAINTS", &e))?);
    }
    let table_name = table_name.ok_or_else(|| {
        MigrationError::Metadata {
            object: QualifiedName::new(r_owner, r_constraint),
            message: "referenced constraint not found".into(),
        }
    })?;
    let columns = extract_constraint_columns(conn, r_owner, r_constraint)?;
    Ok((QualifiedName::new(r_owner, table_name), columns))
}

fn metadata_error(view: &str, err: &oracle::Error) -> MigrationError {
    MigrationError::Metadata {
        object: QualifiedName::new("SYS", view),
        message: err.to_string(),
    }
}
