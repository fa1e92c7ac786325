//! Outer joins: a
//! two-phase pass — collect `(+)` predicates from WHERE into a map keyed by
//! (outer alias, inner alias), then rewrite the comma-join FROM list into
//! explicit `LEFT`/`RIGHT JOIN`s and strip the consumed predicates from
//! WHERE.
//!
//! State machine: `Scanning` (walking WHERE) → `Collected` (all
//! `(+)` preds captured) → `Emitting` (writing FROM) → `Done`. One pass,
//! no back-tracking.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

static OUTER_PRED: OnceLock<Regex> = OnceLock::new();
static WHERE_CLAUSE: OnceLock<Regex> = OnceLock::new();
static FROM_LIST: OnceLock<Regex> = OnceLock::new();

fn outer_pred_pattern() -> &'static Regex {
    OUTER_PRED.get_or_init(|| {
        Regex::new(
            r"(?i)([A-Za-z_][\w$#]*)\.([A-Za-z_][\w$#]*)(\(\+\))?\s*=\s*([A-Za-z_][\w$#]*)\.([A-Za-z_][\w$#]*)(\(\+\))?",
        )
        .expect("valid regex")
    })
}

fn where_clause_pattern() -> &'static Regex {
    WHERE_CLAUSE.get_or_init(|| Regex::new(r"(?is)\bWHERE\b(.*?)(?:\bORDER\s+BY\b|\bGROUP\s+BY\b|$)").expect("valid regex"))
}

fn from_list_pattern() -> &'static Regex {
    FROM_LIST.get_or_init(|| Regex::new(r"(?is)\bFROM\b(.*?)\bWHERE\b").expect("valid regex"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinSide {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct OuterJoinEdge {
    pub outer_alias: String,
    pub inner_alias: String,
    pub side: JoinSide,
    pub condition: String,
}

/// Collects `(+)` predicates from a WHERE clause into a map keyed by
/// (outer alias, inner alias), joined with AND per pair.
pub fn collect_outer_join_predicates(where_body: &str) -> (BTreeMap<(String, String), Vec<String>>, Vec<String>) {
    let mut map: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
    let mut remaining_predicates = Vec::new();

    for raw_pred in split_and_predicates(where_body) {
        let trimmed = raw_pred.trim();
        if let Some(caps) = outer_pred_pattern().captures(trimmed) {
            let left_plus = caps.get(3).is_some();
            let right_plus = caps.get(6).is_some();
            if left_plus || right_plus {
                let (outer_alias, inner_alias, condition) = if right_plus {
                    (
                        caps[1].to_string(),
                        caps[4].to_string(),
                        format!("{}.{} = {}.{}", &caps[1], &caps[2], &caps[4], &caps[5]),
                    )
                } else {
                    (
                        caps[4].to_string(),
                        caps[1].to_string(),
                        format!("{}.{} = {}.{}", &caps[4], &caps[5], &caps[1], &caps[2]),
                    )
                };
                map.entry((outer_alias, inner_alias)).or_default().push(condition);
                continue;
            }
        }
        if !trimmed.is_empty() {
            remaining_predicates.push(trimmed.to_string());
        }
    }

    (map, remaining_predicates)
}

fn split_and_predicates(where_body: &str) -> Vec<String> {
    static AND_SPLIT: OnceLock<Regex> = OnceLock::new();
    let re = AND_SPLIT.get_or_init(|| Regex::new(r"(?i)\s+AND\s+").expect("valid regex"));
    re.split(where_body.trim()).map(str::to_string).collect()
}

/// Rewrites `FROM a, b WHERE a.f1 = b.f1(+)` into
/// `FROM a LEFT JOIN b ON a.f1 = b.f1`, consuming the matched predicates
/// from WHERE.
pub fn rewrite_outer_joins(sql: &str) -> String {
    let Some(where_match) = where_clause_pattern().captures(sql) else {
        return sql.to_string();
    };
    let Some(from_match) = from_list_pattern().captures(sql) else {
        return sql.to_string();
    };

    let where_body = where_match[1].to_string();
    let from_body = from_match[1].trim().to_string();

    let (joins, remaining) = collect_outer_join_predicates(&where_body);
    if joins.is_empty() {
        return sql.to_string();
    }

    let tables: Vec<&str> = from_body.split(',').map(str::trim).collect();
    let mut rewritten_from = tables.first().map(|s| s.to_string()).unwrap_or_default();

    for table in tables.iter().skip(1) {
        let alias = table.split_whitespace().last().unwrap_or(table);
        let mut conditions = Vec::new();
        let mut side = JoinSide::Left;
        for ((outer_alias, inner_alias), conds) in &joins {
            if inner_alias == alias {
                conditions.extend(conds.clone());
                side = JoinSide::Left;
                let _ = outer_alias;
            } else if outer_alias == alias {
                conditions.extend(conds.clone());
                side = JoinSide::Right;
            }
        }
        if conditions.is_empty() {
            rewritten_from.push_str(&format!(", {table}"));
        } else {
            let join_kw = match side {
                JoinSide::Left => "LEFT JOIN",
                JoinSide::Right => "RIGHT JOIN",
            };
            rewritten_from.push_str(&format!(" {join_kw} {table} ON {}", conditions.join(" AND ")));
        }
    }

    let mut result = sql[..from_match.get(1).unwrap().start()].to_string();
    result.push_str(&rewritten_from);
    result.push(' ');

    if remaining.is_empty() {
        result.push_str(&sql[where_match.get(0).unwrap().end()..]);
    } else {
        result.push_str("WHERE ");
        result.push_str(&remaining.join(" AND "));
        result.push(' ');
        result.push_str(&sql[where_match.get(0).unwrap().end()..]);
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_outer_join_becomes_left_join() {
        let sql = "SELECT a.col1, b.col2 FROM a, b WHERE a.f1 = b.f1(+)";
        let rewritten = rewrite_outer_joins(sql);
        assert_eq!(
            rewritten,
            "SELECT a.col1, b.col2 FROM a LEFT JOIN b ON a.f1 = b.f1"
        );
    }

    #[test]
    fn plus_on_left_side_is_a_right_join() {
        let sql = "SELECT a.col1 FROM a, b WHERE a.f1(+) = b.f1";
        let rewritten = rewrite_outer_joins(sql);
        assert_eq!(rewritten, "SELECT a.col1 FROM a RIGHT JOIN b ON a.f1 = b.f1");
    }

    #[test]
    fn no_outer_join_markers_leaves_sql_untouched() {
        let sql = "SELECT * FROM a, b WHERE a.id = b.id";
        assert_eq!(rewrite_outer_joins(sql), sql);
    }
}
