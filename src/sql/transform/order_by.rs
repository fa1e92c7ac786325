//! ORDER BY NULL ordering: Oracle DESC defaults to `NULLS FIRST`
//! (PostgreSQL defaults `NULLS LAST`), so every DESC key without an
//! explicit NULLS clause gets one appended. Explicit clauses pass through.

use regex::Regex;
use std::sync::OnceLock;

static ORDER_KEY: OnceLock<Regex> = OnceLock::new();

fn order_key_pattern() -> &'static Regex {
    // `regex` has no lookaround, so "not already followed by NULLS" is
    // checked by hand against the text past each match.
    ORDER_KEY.get_or_init(|| Regex::new(r"(?i)\bDESC\b").expect("valid regex"))
}

pub fn fix_null_ordering(order_by_clause: &str) -> String {
    let re = order_key_pattern();
    let mut result = String::with_capacity(order_by_clause.len());
    let mut last = 0;
    for m in re.find_iter(order_by_clause) {
        result.push_str(&order_by_clause[last..m.end()]);
        let has_nulls_clause = order_by_clause[m.end()..]
            .trim_start()
            .to_uppercase()
            .starts_with("NULLS");
        if !has_nulls_clause {
            result.push_str(" NULLS FIRST");
        }
        last = m.end();
    }
    result.push_str(&order_by_clause[last..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desc_without_nulls_clause_gets_nulls_first() {
        assert_eq!(fix_null_ordering("empno DESC"), "empno DESC NULLS FIRST");
    }

    #[test]
    fn explicit_nulls_clause_passes_through() {
        assert_eq!(
            fix_null_ordering("empno DESC NULLS LAST"),
            "empno DESC NULLS LAST"
        );
    }

    #[test]
    fn asc_is_untouched() {
        assert_eq!(fix_null_ordering("empno ASC"), "empno ASC");
    }
}
