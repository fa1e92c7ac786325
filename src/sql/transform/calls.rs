//! Package-function and type-method call disambiguation. Oracle lets a
//! package function be called as `pkg.function(args)` and a type method as
//! `alias.column.method(args)` dispatching on a composite-typed column;
//! PostgreSQL has no package/method namespace, so both are flattened to
//! plain functions at the call site:
//!
//! - `pkg.function(args)` → `pkg__function(args)`
//! - `alias.column.method(args)` → `composite_type__method(alias.column, args)`,
//!   the method's receiver becoming its first argument
//! - a bare `alias.column` reference to a composite column, with no call,
//!   is wrapped `(alias.column)` the way PostgreSQL needs to read a field
//!   off a composite value
//!
//! The alias-to-table binding the last two need comes from
//! [`crate::sql::transform::tree::build_alias_map`], built once per query
//! from the parsed FROM clause.

use crate::model::ident::QualifiedName;
use crate::sql::context::TransformContext;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn dotted_call_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b([A-Za-z_][\w$#]*)\.([A-Za-z_][\w$#]*)\s*\(").expect("valid regex")
    })
}

fn type_method_call_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b([A-Za-z_][\w$#]*)\.([A-Za-z_][\w$#]*)\.([A-Za-z_][\w$#]*)\s*\(").expect("valid regex")
    })
}

fn dotted_reference_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b([A-Za-z_][\w$#]*)\.([A-Za-z_][\w$#]*)\b").expect("valid regex"))
}

/// Runs every call-site dispatch pass: bare composite-column references
/// first, since that pass is also what recognizes (and skips) a
/// dotted chain that continues into a type-method or package-function
/// call; running it first means the call passes never have to worry
/// about their own receiver text getting wrapped afterward.
pub fn rewrite_calls(sql: &str, ctx: &TransformContext, aliases: &HashMap<String, QualifiedName>) -> String {
    let result = rewrite_bare_composite_columns(sql, ctx, aliases);
    let result = rewrite_type_method_calls(&result, ctx, aliases);
    rewrite_package_function_calls(&result, ctx)
}

/// Rewrites `pkg.function(args)` to `pkg__function(args)` wherever
/// `pkg.function` names a known package member routine.
pub fn rewrite_package_function_calls(sql: &str, ctx: &TransformContext) -> String {
    let re = dotted_call_pattern();
    let mut matches: Vec<(usize, usize, String, String)> = Vec::new();

    for caps in re.captures_iter(sql) {
        let whole = caps.get(0).unwrap();
        let package = &caps[1];
        let function = &caps[2];
        if ctx.indices.package_function(package, function) {
            matches.push((
                whole.start(),
                whole.end(),
                package.to_string(),
                function.to_string(),
            ));
        }
    }

    let mut result = sql.to_string();
    for (start, end, package, function) in matches.into_iter().rev() {
        result.replace_range(start..end, &format!("{package}__{function}("));
    }
    result
}

/// Rewrites `alias.column.method(args)` to
/// `composite_type__method(alias.column, args)` wherever `alias` is a
/// bound FROM-alias and `column` is a composite-typed column with a
/// matching type method on its owner type.
pub fn rewrite_type_method_calls(
    sql: &str,
    ctx: &TransformContext,
    aliases: &HashMap<String, QualifiedName>,
) -> String {
    let re = type_method_call_pattern();
    let mut matches: Vec<(usize, usize, String, String, String)> = Vec::new();

    for caps in re.captures_iter(sql) {
        let whole = caps.get(0).unwrap();
        let (alias, column, method) = (&caps[1], &caps[2], &caps[3]);
        let Some(table) = aliases.get(&alias.to_lowercase()) else {
            continue;
        };
        let Some(owner_type) = ctx.indices.column_composite_type(table, column) else {
            continue;
        };
        if ctx.indices.type_method(owner_type, method) {
            matches.push((
                whole.start(),
                whole.end(),
                QualifiedName::flattened(&owner_type.name, method),
                alias.to_string(),
                column.to_string(),
            ));
        }
    }

    let mut result = sql.to_string();
    for (start, end, flattened, alias, column) in matches.into_iter().rev() {
        let receiver = format!("{alias}.{column}");
        let has_more_args = !sql[end..].trim_start().starts_with(')');
        let replacement = if has_more_args {
            format!("{flattened}({receiver}, ")
        } else {
            format!("{flattened}({receiver}")
        };
        result.replace_range(start..end, &replacement);
    }
    result
}

/// Wraps a bare `alias.column` reference to a composite-typed column in
/// parentheses, as PostgreSQL requires to read a field off a composite
/// value (`(alias.column)`). Skipped wherever the reference is actually
/// the start of a longer dotted chain (`alias.column.method`, handled by
/// [`rewrite_type_method_calls`]) or a call (`alias.column(`, handled by
/// [`rewrite_package_function_calls`]).
pub fn rewrite_bare_composite_columns(
    sql: &str,
    ctx: &TransformContext,
    aliases: &HashMap<String, QualifiedName>,
) -> String {
    let re = dotted_reference_pattern();
    let mut matches: Vec<(usize, usize)> = Vec::new();

    for caps in re.captures_iter(sql) {
        let whole = caps.get(0).unwrap();
        let rest = sql[whole.end()..].trim_start();
        if rest.starts_with('.') || rest.starts_with('(') {
            continue;
        }
        let (alias, column) = (&caps[1], &caps[2]);
        let Some(table) = aliases.get(&alias.to_lowercase()) else {
            continue;
        };
        if ctx.indices.column_composite_type(table, column).is_some() {
            matches.push((whole.start(), whole.end()));
        }
    }

    let mut result = sql.to_string();
    for (start, end) in matches.into_iter().rev() {
        let inner = result[start..end].to_string();
        result.replace_range(start..end, &format!("({inner})"));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::model::ident::QualifiedName;
    use crate::model::routine::{Routine, RoutineKind};
    use crate::model::types::TypeRef;

    fn catalog_with_package_function() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert_routine(Routine {
            name: QualifiedName::new("HR", "leave_pkg.days_remaining"),
            kind: RoutineKind::Function,
            package_member: true,
            parameters: Vec::new(),
            return_type: Some(TypeRef::builtin("NUMBER")),
            oracle_body_text: String::new(),
        });
        catalog
    }

    #[test]
    fn package_function_call_is_flattened() {
        let catalog = catalog_with_package_function();
        let ctx = TransformContext::new("HR", &catalog);
        let out = rewrite_package_function_calls("SELECT leave_pkg.days_remaining(emp_id) FROM employees", &ctx);
        assert_eq!(out, "SELECT leave_pkg__days_remaining(emp_id) FROM employees");
    }

    #[test]
    fn unrelated_dotted_reference_is_left_alone() {
        let catalog = catalog_with_package_function();
        let ctx = TransformContext::new("HR", &catalog);
        let out = rewrite_package_function_calls("SELECT a.to_char(col) FROM employees a", &ctx);
        assert_eq!(out, "SELECT a.to_char(col) FROM employees a");
    }

    fn catalog_with_composite_column() -> Catalog {
        use crate::model::column::Column;
        use crate::model::composite::{MethodKind, TypeMethod};
        use crate::model::table::Table;

        let mut catalog = Catalog::new();
        let address_type = QualifiedName::new("HR", "ADDRESS_T");
        catalog.insert_table(Table {
            name: QualifiedName::new("HR", "EMPLOYEES"),
            columns: vec![Column {
                name: "HOME_ADDR".into(),
                type_ref: TypeRef::UserDefined(address_type.clone()),
                nullable: true,
                default_expr: None,
                column_order: 1,
            }],
            constraints: Vec::new(),
        });
        catalog.insert_type_method(TypeMethod {
            owner_type: address_type,
            method_name: "FORMATTED".into(),
            kind: MethodKind::Member,
            parameters: Vec::new(),
            return_type: Some(TypeRef::builtin("VARCHAR2")),
        });
        catalog
    }

    fn aliases_for(alias: &str, table: QualifiedName) -> HashMap<String, QualifiedName> {
        HashMap::from([(alias.to_lowercase(), table)])
    }

    #[test]
    fn type_method_call_becomes_flattened_function_with_receiver_as_first_arg() {
        let catalog = catalog_with_composite_column();
        let ctx = TransformContext::new("HR", &catalog);
        let aliases = aliases_for("e", QualifiedName::new("HR", "EMPLOYEES"));
        let out = rewrite_type_method_calls(
            "SELECT e.home_addr.formatted() FROM employees e",
            &ctx,
            &aliases,
        );
        assert_eq!(out, "SELECT address_t__formatted(e.home_addr) FROM employees e");
    }

    #[test]
    fn type_method_call_with_arguments_prepends_receiver() {
        let catalog = catalog_with_composite_column();
        let ctx = TransformContext::new("HR", &catalog);
        let aliases = aliases_for("e", QualifiedName::new("HR", "EMPLOYEES"));
        let out = rewrite_type_method_calls(
            "SELECT e.home_addr.formatted('short') FROM employees e",
            &ctx,
            &aliases,
        );
        assert_eq!(out, "SELECT address_t__formatted(e.home_addr, 'short') FROM employees e");
    }

    #[test]
    fn bare_composite_column_reference_is_parenthesized() {
        let catalog = catalog_with_composite_column();
        let ctx = TransformContext::new("HR", &catalog);
        let aliases = aliases_for("e", QualifiedName::new("HR", "EMPLOYEES"));
        let out = rewrite_bare_composite_columns("SELECT e.home_addr FROM employees e", &ctx, &aliases);
        assert_eq!(out, "SELECT (e.home_addr) FROM employees e");
    }

    #[test]
    fn bare_composite_pass_skips_call_sites_and_longer_chains() {
        let catalog = catalog_with_composite_column();
        let ctx = TransformContext::new("HR", &catalog);
        let aliases = aliases_for("e", QualifiedName::new("HR", "EMPLOYEES"));
        let sql = "SELECT e.home_addr.formatted() FROM employees e";
        assert_eq!(rewrite_bare_composite_columns(sql, &ctx, &aliases), sql);
    }

    #[test]
    fn rewrite_calls_composes_all_three_passes() {
        let catalog = catalog_with_composite_column();
        let ctx = TransformContext::new("HR", &catalog);
        let aliases = aliases_for("e", QualifiedName::new("HR", "EMPLOYEES"));
        let out = rewrite_calls(
            "SELECT e.home_addr.formatted(), e.home_addr FROM employees e",
            &ctx,
            &aliases,
        );
        assert_eq!(
            out,
            "SELECT address_t__formatted(e.home_addr), (e.home_addr) FROM employees e"
        );
    }
}
