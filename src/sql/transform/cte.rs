//! `WITH` clause recursion detection: a CTE
//! whose body references its own name becomes `WITH RECURSIVE`; a `WITH`
//! clause embedding an inline PL/SQL function or procedure is rejected
//! outright since PostgreSQL has no equivalent construct.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePlsqlError {
    pub message: String,
}

fn with_clause_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)^\s*WITH\s+(.+)").expect("valid regex"))
}

fn cte_definition_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)([A-Za-z_][\w$#]*)\s+AS\s*\(((?:[^()]|\([^()]*\))*)\)").expect("valid regex")
    })
}

fn inline_plsql_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)\b(FUNCTION|PROCEDURE)\b\s+[A-Za-z_][\w$#]*\s*(\(.*?\))?\s*(RETURN|IS|AS)\b").expect("valid regex"))
}

/// Returns `Ok(true)` if the `WITH` clause must become `WITH RECURSIVE`
/// because some CTE body references its own name, `Ok(false)` if not, or
/// an error if the clause embeds an inline PL/SQL unit.
pub fn requires_recursive(sql: &str) -> Result<bool, InlinePlsqlError> {
    let Some(caps) = with_clause_pattern().captures(sql) else {
        return Ok(false);
    };
    let body = caps.get(1).unwrap().as_str();

    if inline_plsql_pattern().is_match(body) {
        return Err(InlinePlsqlError {
            message: "inline PL/SQL functions or procedures inside a WITH clause are not supported".into(),
        });
    }

    for def in cte_definition_pattern().captures_iter(body) {
        let name = &def[1];
        let cte_body = &def[2];
        let self_ref = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(name))).expect("valid regex");
        if self_ref.is_match(cte_body) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Inserts `RECURSIVE` immediately after the leading `WITH` keyword.
pub fn add_recursive_keyword(sql: &str) -> String {
    static LEADING_WITH: OnceLock<Regex> = OnceLock::new();
    let re = LEADING_WITH.get_or_init(|| Regex::new(r"(?i)^\s*WITH\s+").expect("valid regex"));
    re.replace(sql, "WITH RECURSIVE ").into_owned()
}
