//! `CONNECT BY` → recursive CTE. A hierarchical query block is rewritten in
//! six steps: extract the base table, `START WITH`, the single `PRIOR`
//! expression and the enclosing `WHERE`; reject unsupported constructs;
//! emit the two-armed `WITH RECURSIVE`; rewrite `LEVEL` and
//! `SYS_CONNECT_BY_PATH` references in base, recursive and outer
//! positions. A `LEVEL <op> bound` conjunct in the enclosing `WHERE` is
//! distributed across both arms (`1 <op> bound` / `h.level+1 <op> bound`)
//! rather than carried through unchanged, since the column means something
//! different in each arm.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyError {
    pub construct: String,
    pub message: String,
}

impl fmt::Display for HierarchyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.construct, self.message)
    }
}

impl std::error::Error for HierarchyError {}

fn reject(construct: &str, message: &str) -> HierarchyError {
    HierarchyError {
        construct: construct.to_string(),
        message: message.to_string(),
    }
}

fn hierarchical_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)\bCONNECT\s+BY\b").expect("valid regex"))
}

pub fn has_hierarchical_clause(sql: &str) -> bool {
    hierarchical_pattern().is_match(sql)
}

struct Parsed<'a> {
    select_list: &'a str,
    table: &'a str,
    start_with: Option<&'a str>,
    prior_condition: &'a str,
    extra_where: Option<&'a str>,
    order_by: Option<&'a str>,
}

fn parse(sql: &str) -> Result<Parsed<'_>, HierarchyError> {
    static SELECT_FROM: OnceLock<Regex> = OnceLock::new();
    static FROM_TABLE: OnceLock<Regex> = OnceLock::new();
    static START_WITH: OnceLock<Regex> = OnceLock::new();
    static CONNECT_BY: OnceLock<Regex> = OnceLock::new();
    static TAIL_WHERE: OnceLock<Regex> = OnceLock::new();
    static ORDER_BY: OnceLock<Regex> = OnceLock::new();

    let select_from = SELECT_FROM
        .get_or_init(|| Regex::new(r"(?is)^\s*SELECT\s+(.+?)\s+FROM\s+(.+)$").expect("valid regex"));
    let from_table = FROM_TABLE
        .get_or_init(|| Regex::new(r"(?is)^([A-Za-z_][\w$#]*)(\s+[A-Za-z_][\w$#]*)?\b").expect("valid regex"));
    let start_with = START_WITH
        .get_or_init(|| Regex::new(r"(?is)\bSTART\s+WITH\s+(.+?)\s+CONNECT\s+BY\b").expect("valid regex"));
    let connect_by = CONNECT_BY.get_or_init(|| {
        Regex::new(r"(?is)\bCONNECT\s+BY\s+(.+?)(?:\s+WHERE\b|\s+ORDER\s+BY\b|$)").expect("valid regex")
    });
    let tail_where = TAIL_WHERE
        .get_or_init(|| Regex::new(r"(?is)\bCONNECT\s+BY\s+.+?\bWHERE\s+(.+?)(?:\s+ORDER\s+BY\b|$)").expect("valid regex"));
    let order_by = ORDER_BY.get_or_init(|| Regex::new(r"(?is)\bORDER\s+BY\s+(.+)$").expect("valid regex"));

    if sql.to_uppercase().contains("NOCYCLE") {
        return Err(reject("NOCYCLE", "NOCYCLE hierarchical queries are not supported"));
    }
    if sql.to_uppercase().contains("ORDER SIBLINGS BY") {
        return Err(reject("ORDER SIBLINGS BY", "sibling ordering is not supported"));
    }
    if sql.contains("(+)") {
        return Err(reject(
            "outer-joined base table",
            "a hierarchical query's base table cannot be outer-joined",
        ));
    }

    let caps = select_from
        .captures(sql.trim())
        .ok_or_else(|| reject("query shape", "expected a single SELECT ... FROM ... query block"))?;
    let select_list = caps.get(1).unwrap().as_str();
    let from_rest = caps.get(2).unwrap().as_str();

    let table_caps = from_table
        .captures(from_rest)
        .ok_or_else(|| reject("base table", "could not identify the hierarchical base table"))?;
    let table = table_caps.get(1).unwrap().as_str();
    if from_rest.trim_start()[table_caps.get(0).unwrap().end()..].trim_start().starts_with(',') {
        return Err(reject("multiple base tables", "a hierarchical query must have a single base table"));
    }

    let start_with_clause = start_with.captures(sql).map(|c| c.get(1).unwrap().as_str());

    let connect_by_caps = connect_by
        .captures(sql)
        .ok_or_else(|| reject("CONNECT BY", "missing CONNECT BY condition"))?;
    let prior_condition = connect_by_caps.get(1).unwrap().as_str().trim();
    if prior_condition.matches("PRIOR").count() != 1 && prior_condition.to_uppercase().matches("PRIOR").count() != 1 {
        return Err(reject(
            "CONNECT BY condition",
            "expected exactly one PRIOR expression in the CONNECT BY condition",
        ));
    }

    let extra_where = tail_where.captures(sql).map(|c| c.get(1).unwrap().as_str());
    let order_by_clause = order_by.captures(sql).map(|c| c.get(1).unwrap().as_str());

    Ok(Parsed {
        select_list,
        table,
        start_with: start_with_clause,
        prior_condition,
        extra_where,
        order_by: order_by_clause,
    })
}

/// `PRIOR x = y` ⇒ recursive join `t.y = h.x`; `x = PRIOR y` ⇒ `t.x = h.y`.
fn join_condition(prior_condition: &str) -> Result<String, HierarchyError> {
    static PRIOR_LEFT: OnceLock<Regex> = OnceLock::new();
    static PRIOR_RIGHT: OnceLock<Regex> = OnceLock::new();
    let prior_left = PRIOR_LEFT.get_or_init(|| {
        Regex::new(r"(?i)^PRIOR\s+([A-Za-z_][\w$#]*)\s*=\s*([A-Za-z_][\w$#]*)$").expect("valid regex")
    });
    let prior_right = PRIOR_RIGHT.get_or_init(|| {
        Regex::new(r"(?i)^([A-Za-z_][\w$#]*)\s*=\s*PRIOR\s+([A-Za-z_][\w$#]*)$").expect("valid regex")
    });

    if let Some(caps) = prior_left.captures(prior_condition) {
        return Ok(format!("t.{} = h.{}", &caps[2], &caps[1]));
    }
    if let Some(caps) = prior_right.captures(prior_condition) {
        return Ok(format!("t.{} = h.{}", &caps[1], &caps[2]));
    }
    Err(reject(
        "CONNECT BY condition",
        "could not locate a PRIOR x = y or x = PRIOR y shape",
    ))
}

/// Splits a bare `LEVEL <op> <bound>` conjunct out of a `WHERE` clause so it
/// can be distributed across the recursive union: the base arm gets
/// `1 <op> bound`, the recursive arm gets `h.level+1 <op> bound`. Returns
/// the remaining where-text (conjuncts joined back with `AND`, `None` if
/// none remain) plus the bound conjunct split into (operator, bound).
fn split_level_bound(where_text: &str) -> (Option<String>, Option<(String, String)>) {
    static LEVEL_BOUND: OnceLock<Regex> = OnceLock::new();
    let re = LEVEL_BOUND
        .get_or_init(|| Regex::new(r"(?i)\bLEVEL\s*(<=|>=|<|>|=)\s*([\w$#]+)\b").expect("valid regex"));

    let mut remaining = Vec::new();
    let mut bound = None;
    for conjunct in split_top_level_and(where_text) {
        if bound.is_none() {
            if let Some(caps) = re.captures(conjunct.trim()) {
                if caps.get(0).unwrap().as_str().trim() == conjunct.trim() {
                    bound = Some((caps[1].to_string(), caps[2].to_string()));
                    continue;
                }
            }
        }
        remaining.push(conjunct.trim().to_string());
    }

    let remaining_text = if remaining.is_empty() {
        None
    } else {
        Some(remaining.join(" AND "))
    };
    (remaining_text, bound)
}

fn split_top_level_and(text: &str) -> Vec<&str> {
    static AND: OnceLock<Regex> = OnceLock::new();
    let re = AND.get_or_init(|| Regex::new(r"(?i)\s+AND\s+").expect("valid regex"));
    re.split(text).collect()
}

fn rewrite_level(text: &str, replacement: &str) -> String {
    static LEVEL: OnceLock<Regex> = OnceLock::new();
    let re = LEVEL.get_or_init(|| Regex::new(r"(?i)\bLEVEL\b").expect("valid regex"));
    re.replace_all(text, replacement).into_owned()
}

/// Finds `SYS_CONNECT_BY_PATH(expr, sep)` occurrences, assigning `path_i`
/// column names in first-seen order for distinct `(expr, sep)` pairs.
fn find_connect_by_paths(text: &str) -> Vec<(String, String, String)> {
    static PATH: OnceLock<Regex> = OnceLock::new();
    let re = PATH.get_or_init(|| {
        Regex::new(r"(?i)SYS_CONNECT_BY_PATH\s*\(\s*([^,]+?)\s*,\s*('[^']*'|[^)]+?)\s*\)").expect("valid regex")
    });
    let mut seen: Vec<(String, String, String)> = Vec::new();
    for caps in re.captures_iter(text) {
        let expr = caps[1].trim().to_string();
        let sep = caps[2].trim().to_string();
        if !seen.iter().any(|(e, s, _)| *e == expr && *s == sep) {
            let name = format!("path_{}", seen.len() + 1);
            seen.push((expr, sep, name));
        }
    }
    seen
}

fn rewrite_paths_to_columns(text: &str, paths: &[(String, String, String)]) -> String {
    let mut result = text.to_string();
    for (expr, sep, name) in paths {
        let pattern = format!(
            r"(?i)SYS_CONNECT_BY_PATH\s*\(\s*{}\s*,\s*{}\s*\)",
            regex::escape(expr),
            regex::escape(sep)
        );
        let re = Regex::new(&pattern).expect("valid regex");
        result = re.replace_all(&result, name.as_str()).into_owned();
    }
    result
}

/// Rewrites a `START WITH ... CONNECT BY PRIOR ...` query block into a
/// `WITH RECURSIVE <table>_hierarchy` CTE.
pub fn rewrite_connect_by(sql: &str, current_schema: &str) -> Result<String, HierarchyError> {
    let parsed = parse(sql)?;
    let table_lower = parsed.table.to_lowercase();
    let schema_lower = current_schema.to_lowercase();
    let qualified_table = format!("{schema_lower}.{table_lower}");
    let cte_name = format!("{table_lower}_hierarchy");

    let join_cond = join_condition(parsed.prior_condition)?;
    let paths = find_connect_by_paths(parsed.select_list);

    let base_cols: Vec<String> = parsed
        .select_list
        .split(',')
        .map(str::trim)
        .filter(|c| !c.eq_ignore_ascii_case("level") && !c.to_uppercase().starts_with("SYS_CONNECT_BY_PATH"))
        .map(str::to_string)
        .collect();

    let mut base_select = base_cols.join(", ");
    base_select.push_str(", 1 AS level");
    for (expr, sep, name) in &paths {
        base_select.push_str(&format!(", {sep} || {expr} AS {name}"));
    }

    let mut recursive_select = base_cols
        .iter()
        .map(|c| format!("t.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    recursive_select.push_str(", h.level+1");
    for (expr, sep, name) in &paths {
        recursive_select.push_str(&format!(", h.{name} || {sep} || {expr}"));
    }

    let (extra_where, level_bound) = match parsed.extra_where {
        Some(w) => split_level_bound(w),
        None => (None, None),
    };

    let mut base_conjuncts: Vec<String> = Vec::new();
    let mut recursive_conjuncts: Vec<String> = vec![join_cond.clone()];

    if let Some(start) = parsed.start_with {
        base_conjuncts.push(start.trim().to_string());
    }
    if let Some(w) = &extra_where {
        base_conjuncts.push(w.clone());
        recursive_conjuncts.push(w.clone());
    }
    if let Some((op, bound)) = &level_bound {
        base_conjuncts.push(format!("1 {op} {bound}"));
        recursive_conjuncts.push(format!("h.level+1 {op} {bound}"));
    }

    let base_where = if base_conjuncts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", base_conjuncts.join(" AND "))
    };
    let recursive_where = format!(" WHERE {}", recursive_conjuncts.join(" AND "));

    let mut outer_select = parsed.select_list.to_string();
    outer_select = rewrite_level(&outer_select, "level");
    outer_select = rewrite_paths_to_columns(&outer_select, &paths);

    let order_by_fragment = parsed
        .order_by
        .map(|o| format!(" ORDER BY {}", rewrite_level(o.trim(), "level")))
        .unwrap_or_default();

    Ok(format!(
        "WITH RECURSIVE {cte_name} AS ( SELECT {base_select} FROM {qualified_table}{base_where} \
UNION ALL SELECT {recursive_select} FROM {qualified_table} t JOIN {cte_name} h ON {join_cond}{recursive_where} ) \
SELECT {outer_select} FROM {cte_name}{order_by_fragment}"
    ))
}
