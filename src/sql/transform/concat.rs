//! String concatenation: every `||` is rewritten to `CONCAT(...)`
//! because PostgreSQL `||` propagates NULL while Oracle's treats NULL as
//! empty; `CONCAT` matches Oracle semantics. Nested concatenations fold
//! into a single multi-arg call.

/// Rewrites a single top-level `a || b || c` expression (no nested
/// parentheses straddling the splits) into `CONCAT(a, b, c)`.
pub fn rewrite_concat_expression(expr: &str) -> String {
    let parts = split_top_level_concat(expr);
    if parts.len() <= 1 {
        return expr.to_string();
    }
    format!("CONCAT({})", parts.iter().map(|p| p.trim()).collect::<Vec<_>>().join(", "))
}

fn split_top_level_concat(expr: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    let chars: Vec<char> = expr.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            '|' if depth == 0 && i + 1 < chars.len() && chars[i + 1] == '|' => {
                parts.push(std::mem::take(&mut current));
                i += 1;
            }
            _ => current.push(c),
        }
        i += 1;
    }
    parts.push(current);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_operands_become_a_two_arg_concat() {
        assert_eq!(rewrite_concat_expression("first_name || last_name"), "CONCAT(first_name, last_name)");
    }

    #[test]
    fn chained_concatenation_folds_into_one_call() {
        assert_eq!(
            rewrite_concat_expression("a || b || c"),
            "CONCAT(a, b, c)"
        );
    }

    #[test]
    fn no_concat_operator_is_left_unchanged() {
        assert_eq!(rewrite_concat_expression("empno"), "empno");
    }

    #[test]
    fn parenthesised_pipes_are_not_split() {
        assert_eq!(
            rewrite_concat_expression("f(a || b) || c"),
            "CONCAT(f(a || b), c)"
        );
    }
}
