//! Parse-tree-driven structure: wraps [`crate::sql::parser::parse`] and
//! walks its `Pairs` for the decisions that need real syntactic
//! structure rather than a text heuristic — hierarchical-query
//! detection, the FROM-alias-to-table bindings type-method dispatch
//! needs, and ROWNUM presence.
//!
//! The grammar covers a deliberate subset of Oracle `SELECT` syntax
//! (no `CASE`, no scalar subqueries, no analytic `OVER` clauses yet).
//! When a query falls outside that subset, [`query_block`] returns
//! `None` and callers fall back to the pre-existing text-level
//! detection they used before this module existed.

use crate::model::ident::QualifiedName;
use crate::sql::context::TransformContext;
use crate::sql::parser::{self, ParseResult, Rule, StartRule};
use pest::iterators::Pair;
use std::collections::HashMap;

/// Parses `sql` as a `selectStatement` and returns its `queryBlock`
/// pair, or `None` if the grammar doesn't cover this query.
pub fn query_block(sql: &str) -> Option<Pair<'_, Rule>> {
    match parser::parse(sql, StartRule::SelectStatement) {
        ParseResult::Tree(mut pairs) => {
            let stmt = pairs.next()?;
            find_rule(stmt, Rule::queryBlock)
        }
        ParseResult::Errors(_) => None,
    }
}

/// Depth-first search for the first descendant (or self) matching `rule`.
pub fn find_rule(pair: Pair<'_, Rule>, rule: Rule) -> Option<Pair<'_, Rule>> {
    if pair.as_rule() == rule {
        return Some(pair);
    }
    pair.into_inner().find_map(|inner| find_rule(inner, rule))
}

/// Whether `pair` contains a descendant (or is itself) of `rule`.
pub fn contains_rule(pair: &Pair<'_, Rule>, rule: Rule) -> bool {
    if pair.as_rule() == rule {
        return true;
    }
    pair.clone().into_inner().any(|inner| contains_rule(&inner, rule))
}

/// Whether the query references the `ROWNUM` pseudo-column anywhere in
/// its structure (select list, WHERE, ...).
pub fn contains_rownum(pair: &Pair<'_, Rule>) -> bool {
    if pair.as_rule() == Rule::qualifiedName && pair.as_str().eq_ignore_ascii_case("ROWNUM") {
        return true;
    }
    pair.clone().into_inner().any(|inner| contains_rownum(&inner))
}

/// Builds the alias (or bare table name, when no alias is given) to
/// table-name binding from a `queryBlock`'s `fromClause`, resolving
/// synonyms against the current schema. Used for type-method and
/// composite-column dispatch at call sites.
pub fn build_alias_map(query_block: &Pair<'_, Rule>, ctx: &TransformContext) -> HashMap<String, QualifiedName> {
    let mut map = HashMap::new();
    let Some(from_clause) = find_rule(query_block.clone(), Rule::fromClause) else {
        return map;
    };
    for from_item in from_clause.into_inner().filter(|p| p.as_rule() == Rule::fromItem) {
        let mut parts = from_item.into_inner();
        let Some(name_pair) = parts.next() else { continue };
        let qualified = name_pair.as_str();
        let mut alias = None;
        for p in parts {
            if p.as_rule() == Rule::identifier {
                alias = Some(p.as_str().to_string());
            }
        }

        let table = resolve_table_name(qualified, ctx);
        let bare_name = qualified.rsplit('.').next().unwrap_or(qualified).to_string();
        let key = alias.unwrap_or(bare_name).to_lowercase();
        map.insert(key, table);
    }
    map
}

fn resolve_table_name(qualified: &str, ctx: &TransformContext) -> QualifiedName {
    if let Some((schema, name)) = qualified.split_once('.') {
        return QualifiedName::new(schema, name);
    }
    ctx.indices
        .resolve_synonym(&ctx.current_schema, qualified)
        .unwrap_or_else(|| QualifiedName::new(ctx.current_schema.clone(), qualified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn finds_query_block_for_a_valid_select() {
        let qb = query_block("SELECT empno FROM employees");
        assert!(qb.is_some());
        assert_eq!(qb.unwrap().as_rule(), Rule::queryBlock);
    }

    #[test]
    fn returns_none_for_a_construct_outside_the_grammar() {
        assert!(query_block("SELECT CASE WHEN 1=1 THEN 'a' END FROM t").is_none());
    }

    #[test]
    fn detects_hierarchical_clause_structurally() {
        let qb = query_block("SELECT emp_id FROM employees CONNECT BY PRIOR emp_id = manager_id").unwrap();
        assert!(contains_rule(&qb, Rule::hierarchicalClause));
    }

    #[test]
    fn detects_rownum_reference() {
        let qb = query_block("SELECT empno FROM employees WHERE ROWNUM <= 10").unwrap();
        assert!(contains_rownum(&qb));
    }

    #[test]
    fn no_rownum_when_absent() {
        let qb = query_block("SELECT empno FROM employees").unwrap();
        assert!(!contains_rownum(&qb));
    }

    #[test]
    fn alias_map_binds_explicit_alias_to_qualified_table() {
        let catalog = Catalog::new();
        let ctx = TransformContext::new("HR", &catalog);
        let qb = query_block("SELECT e.empno FROM employees e").unwrap();
        let aliases = build_alias_map(&qb, &ctx);
        assert_eq!(aliases.get("e"), Some(&QualifiedName::new("HR", "employees")));
    }

    #[test]
    fn alias_map_falls_back_to_bare_table_name_without_an_alias() {
        let catalog = Catalog::new();
        let ctx = TransformContext::new("HR", &catalog);
        let qb = query_block("SELECT empno FROM employees").unwrap();
        let aliases = build_alias_map(&qb, &ctx);
        assert_eq!(aliases.get("employees"), Some(&QualifiedName::new("HR", "employees")));
    }
}
