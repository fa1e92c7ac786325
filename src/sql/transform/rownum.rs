//! `ROWNUM` has no PostgreSQL equivalent: a query that reads it is
//! wrapped in a subquery computing `ROW_NUMBER() OVER ()`, and a
//! top-level `ROWNUM <= n` / `ROWNUM < n` bound in WHERE is hoisted
//! into a filter on that computed column in the outer query.

use regex::Regex;
use std::sync::OnceLock;

fn rownum_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bROWNUM\b").expect("valid regex"))
}

pub fn mentions_rownum(sql: &str) -> bool {
    rownum_word().is_match(sql)
}

fn select_kw() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*SELECT\b").expect("valid regex"))
}

fn from_kw() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bFROM\b").expect("valid regex"))
}

fn from_terminator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(WHERE|GROUP\s+BY|ORDER\s+BY)\b").expect("valid regex"))
}

fn where_terminator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(GROUP\s+BY|ORDER\s+BY)\b").expect("valid regex"))
}

fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    let trimmed = s.trim_start();
    if trimmed.len() < keyword.len() || !trimmed[..keyword.len()].eq_ignore_ascii_case(keyword) {
        return false;
    }
    trimmed.as_bytes().get(keyword.len()).is_none_or(|&b| !(b.is_ascii_alphanumeric() || b == b'_'))
}

fn split_top_level_commas(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in s.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts.into_iter().map(|p| p.trim().to_string()).collect()
}

/// Splits a WHERE body's top-level `AND` conjuncts, pulling out the one
/// that bounds `ROWNUM` (`ROWNUM <= n` / `ROWNUM < n`) from the rest.
fn split_rownum_bound(where_body: &str) -> (Option<(String, String)>, Vec<String>) {
    static AND_SPLIT: OnceLock<Regex> = OnceLock::new();
    let and_re = AND_SPLIT.get_or_init(|| Regex::new(r"(?i)\s+AND\s+").expect("valid regex"));
    static BOUND: OnceLock<Regex> = OnceLock::new();
    let bound_re = BOUND.get_or_init(|| Regex::new(r"(?i)^ROWNUM\s*(<=|<)\s*(.+)$").expect("valid regex"));

    let mut bound = None;
    let mut rest = Vec::new();
    for conjunct in and_re.split(where_body.trim()) {
        let trimmed = conjunct.trim();
        if bound.is_none() {
            if let Some(caps) = bound_re.captures(trimmed) {
                bound = Some((caps[1].to_string(), caps[2].trim().to_string()));
                continue;
            }
        }
        if !trimmed.is_empty() {
            rest.push(trimmed.to_string());
        }
    }
    (bound, rest)
}

fn explicit_as_alias(item: &str) -> Option<String> {
    static AS_ALIAS: OnceLock<Regex> = OnceLock::new();
    let re = AS_ALIAS.get_or_init(|| Regex::new(r"(?i)\bAS\s+([A-Za-z_][\w$#]*)\s*$").expect("valid regex"));
    re.captures(item).map(|c| c[1].to_string())
}

fn is_plain_reference(item: &str) -> bool {
    static PLAIN: OnceLock<Regex> = OnceLock::new();
    let re = PLAIN.get_or_init(|| Regex::new(r"(?i)^[A-Za-z_][\w$#]*(\.[A-Za-z_][\w$#]*)*$").expect("valid regex"));
    re.is_match(item.trim())
}

/// `(inner select-list item, outer-query name to project it under)`.
/// Anything that isn't a bare reference or doesn't already carry an
/// explicit alias gets a synthetic `c{idx}` alias so the outer query can
/// always name it regardless of expression shape.
fn inner_item_and_outer_name(item: &str, idx: usize) -> (String, String) {
    let trimmed = item.trim();
    if let Some(alias) = explicit_as_alias(trimmed) {
        return (trimmed.to_string(), alias);
    }
    if is_plain_reference(trimmed) {
        let name = trimmed.rsplit('.').next().unwrap_or(trimmed).to_string();
        return (trimmed.to_string(), name);
    }
    let synthetic = format!("c{idx}");
    (format!("{trimmed} AS {synthetic}"), synthetic)
}

/// Wraps a query using `ROWNUM` in a subquery computing
/// `ROW_NUMBER() OVER ()`; a top-level `ROWNUM <= n` bound in WHERE
/// becomes a filter on that computed column in the outer query. Leaves
/// `sql` untouched if it doesn't reference `ROWNUM`, or if it isn't a
/// shape this rewrite understands (falls through for a later pass or
/// construct it can't safely restructure).
pub fn rewrite_rownum(sql: &str) -> String {
    if !mentions_rownum(sql) {
        return sql.to_string();
    }
    let Some(sel) = select_kw().find(sql) else {
        return sql.to_string();
    };
    let Some(from) = from_kw().find_at(sql, sel.end()) else {
        return sql.to_string();
    };

    let select_list = sql[sel.end()..from.start()].trim().to_string();
    let from_end = from_terminator()
        .find_at(sql, from.end())
        .map(|m| m.start())
        .unwrap_or(sql.len());
    let from_rest = sql[from.end()..from_end].trim().to_string();

    let has_where = starts_with_keyword(&sql[from_end..], "WHERE");
    let (where_body, tail) = if has_where {
        let where_start = from_end + sql[from_end..].len() - sql[from_end..].trim_start().len() + "WHERE".len();
        let where_end = where_terminator()
            .find_at(sql, where_start)
            .map(|m| m.start())
            .unwrap_or(sql.len());
        (Some(sql[where_start..where_end].to_string()), sql[where_end..].to_string())
    } else {
        (None, sql[from_end..].to_string())
    };

    let (bound, remaining) = match &where_body {
        Some(body) => split_rownum_bound(body),
        None => (None, Vec::new()),
    };

    let items = split_top_level_commas(&select_list);
    let mut inner_items = Vec::with_capacity(items.len());
    let mut outer_names = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let (inner, outer) = inner_item_and_outer_name(item, idx);
        inner_items.push(inner);
        outer_names.push(outer);
    }

    let inner_where = if remaining.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", remaining.join(" AND "))
    };

    let inner = format!(
        "SELECT {}, ROW_NUMBER() OVER () AS rnum_ FROM {}{}",
        inner_items.join(", "),
        from_rest,
        inner_where
    );

    let outer_where = match bound {
        Some((op, limit)) => format!(" WHERE rnum_ {op} {limit}"),
        None => String::new(),
    };

    format!(
        "SELECT {} FROM ( {} ) rownum_wrapped{}{}",
        outer_names.join(", "),
        inner,
        outer_where,
        tail
    )
}
