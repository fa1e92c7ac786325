//! Identifier qualification:
//! unqualified table/view/routine references are qualified with the
//! current schema; Oracle synonyms are resolved and replaced.

use crate::sql::context::TransformContext;
use regex::Regex;
use std::sync::OnceLock;

static JOIN_ITEM: OnceLock<Regex> = OnceLock::new();
static FROM_LIST: OnceLock<Regex> = OnceLock::new();

fn join_item_pattern() -> &'static Regex {
    JOIN_ITEM.get_or_init(|| {
        Regex::new(r"(?i)\bJOIN\s+([A-Za-z_][A-Za-z0-9_$#]*)(\.[A-Za-z_][A-Za-z0-9_$#]*)?\b").expect("valid regex")
    })
}

fn from_list_pattern() -> &'static Regex {
    FROM_LIST.get_or_init(|| {
        Regex::new(r"(?is)\bFROM\s+(.+?)(?:\bWHERE\b|\bGROUP\s+BY\b|\bORDER\s+BY\b|\bSTART\s+WITH\b|\bCONNECT\s+BY\b|$)")
            .expect("valid regex")
    })
}

fn qualify_name(name: &str, ctx: &TransformContext) -> String {
    if name.eq_ignore_ascii_case("DUAL") {
        return name.to_string();
    }
    ctx.indices
        .resolve_synonym(&ctx.current_schema, name)
        .map(|q| q.postgres_qualified())
        .unwrap_or_else(|| format!("{}.{}", ctx.current_schema.to_lowercase(), name.to_lowercase()))
}

/// Qualifies every bare table reference in the `FROM` list (comma-joined
/// items and explicit `JOIN`s alike) with the current schema, resolving
/// synonyms first. An alias following the table name is preserved.
pub fn qualify_table_references(sql: &str, ctx: &TransformContext) -> String {
    let Some(from_match) = from_list_pattern().captures(sql) else {
        return sql.to_string();
    };
    let list_span = from_match.get(1).unwrap();
    let list_text = list_span.as_str();

    let qualified_items: Vec<String> = list_text
        .split(',')
        .map(|item| qualify_comma_segment(item, ctx))
        .collect();
    let qualified_list = qualified_items.join(", ");
    let qualified_list = join_item_pattern()
        .replace_all(&qualified_list, |caps: &regex::Captures| {
            if caps.get(2).is_some() {
                return caps[0].to_string();
            }
            format!("JOIN {}", qualify_name(&caps[1], ctx))
        })
        .into_owned();

    format!(
        "{}{}{}",
        &sql[..list_span.start()],
        qualified_list,
        &sql[list_span.end()..]
    )
}

/// A comma-separated FROM-list segment may itself carry an explicit
/// `JOIN` (`a JOIN b ON ...`); only the leading table name is handled
/// here, the `JOIN b` part is qualified separately by
/// [`join_item_pattern`].
fn qualify_comma_segment(segment: &str, ctx: &TransformContext) -> String {
    static JOIN_START: OnceLock<Regex> = OnceLock::new();
    let re = JOIN_START.get_or_init(|| {
        Regex::new(r"(?i)\b(?:LEFT|RIGHT|INNER|FULL|CROSS)\s+JOIN\b|\bJOIN\b").expect("valid regex")
    });

    if let Some(m) = re.find(segment) {
        let leading = &segment[..m.start()];
        let rest = &segment[m.start()..];
        return format!("{} {rest}", qualify_comma_item(leading, ctx));
    }
    qualify_comma_item(segment, ctx)
}

fn qualify_comma_item(item: &str, ctx: &TransformContext) -> String {
    static ITEM: OnceLock<Regex> = OnceLock::new();
    let re = ITEM.get_or_init(|| {
        Regex::new(r"(?i)^\s*([A-Za-z_][A-Za-z0-9_$#]*)(\.[A-Za-z_][A-Za-z0-9_$#]*)?(\s+[A-Za-z_][A-Za-z0-9_$#]*)?\s*$")
            .expect("valid regex")
    });
    let Some(caps) = re.captures(item) else {
        return item.to_string();
    };
    if caps.get(2).is_some() {
        // Already schema-qualified.
        return item.trim().to_string();
    }
    let name = &caps[1];
    let alias = caps.get(3).map(|m| m.as_str()).unwrap_or("");
    format!("{}{alias}", qualify_name(name, ctx))
}
