//! Dialect function renames and shape changes. Each Oracle construct gets its own small rewrite function
//! operating on balanced-paren call sites, matching the grammar's
//! "general element" / function-call production.

use regex::Regex;
use std::sync::OnceLock;

/// Finds balanced-paren call sites for `name(...)`, returning
/// `(full_match_range, comma-split top-level arguments)`, scanning right to
/// left so earlier replacements don't invalidate later byte ranges.
fn find_calls(sql: &str, name: &str) -> Vec<(std::ops::Range<usize>, Vec<String>)> {
    let pattern = format!(r"(?i)\b{}\s*\(", regex::escape(name));
    let re = Regex::new(&pattern).expect("valid regex");
    let mut calls = Vec::new();

    for m in re.find_iter(sql) {
        let open_paren = m.end() - 1;
        if let Some(close_paren) = matching_close_paren(sql, open_paren) {
            let args_text = &sql[open_paren + 1..close_paren];
            let args = split_top_level_commas(args_text);
            calls.push((m.start()..close_paren + 1, args));
        }
    }
    calls
}

fn matching_close_paren(sql: &str, open_paren: usize) -> Option<usize> {
    let bytes = sql.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate().skip(open_paren) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
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
    if !current.trim().is_empty() || !parts.is_empty() {
        parts.push(current);
    }
    parts.into_iter().map(|p| p.trim().to_string()).collect()
}

fn apply_rewrite(sql: &str, name: &str, rewrite: impl Fn(&[String]) -> Option<String>) -> String {
    let mut result = sql.to_string();
    let mut calls = find_calls(&result, name);
    calls.sort_by_key(|(range, _)| std::cmp::Reverse(range.start));
    for (range, args) in calls {
        if let Some(replacement) = rewrite(&args) {
            result.replace_range(range, &replacement);
        }
    }
    result
}

pub fn rewrite_nvl(sql: &str) -> String {
    apply_rewrite(sql, "NVL", |args| {
        (args.len() == 2).then(|| format!("COALESCE({}, {})", args[0], args[1]))
    })
}

pub fn rewrite_nvl2(sql: &str) -> String {
    apply_rewrite(sql, "NVL2", |args| {
        (args.len() == 3).then(|| {
            format!(
                "CASE WHEN {} IS NOT NULL THEN {} ELSE {} END",
                args[0], args[1], args[2]
            )
        })
    })
}

/// `DECODE(e, s1,r1, …, [def])`: even arg count (beyond `e`) means the
/// trailing value is a default ELSE.
pub fn rewrite_decode(sql: &str) -> String {
    apply_rewrite(sql, "DECODE", |args| {
        if args.len() < 3 {
            return None;
        }
        let expr = &args[0];
        let rest = &args[1..];
        let has_default = rest.len() % 2 == 1;
        let pairs = if has_default { &rest[..rest.len() - 1] } else { rest };

        let mut out = format!("CASE {expr}");
        for pair in pairs.chunks(2) {
            out.push_str(&format!(" WHEN {} THEN {}", pair[0], pair[1]));
        }
        if has_default {
            out.push_str(&format!(" ELSE {}", rest.last().unwrap()));
        }
        out.push_str(" END");
        Some(out)
    })
}

pub fn rewrite_sysdate(sql: &str) -> String {
    static SYSDATE: OnceLock<Regex> = OnceLock::new();
    let re = SYSDATE.get_or_init(|| Regex::new(r"(?i)\bSYSDATE\b").expect("valid regex"));
    re.replace_all(sql, "CURRENT_TIMESTAMP").into_owned()
}

pub fn rewrite_dual(sql: &str) -> String {
    static FROM_DUAL: OnceLock<Regex> = OnceLock::new();
    let re = FROM_DUAL.get_or_init(|| Regex::new(r"(?i)\s+FROM\s+DUAL\b").expect("valid regex"));
    re.replace_all(sql, "").into_owned()
}

pub fn rewrite_substr(sql: &str) -> String {
    apply_rewrite(sql, "SUBSTR", |args| match args.len() {
        2 => Some(format!("SUBSTRING({} FROM {})", args[0], args[1])),
        3 => Some(format!("SUBSTRING({} FROM {} FOR {})", args[0], args[1], args[2])),
        _ => None,
    })
}

pub fn rewrite_instr(sql: &str) -> String {
    apply_rewrite(sql, "INSTR", |args| match args.len() {
        2 => Some(format!("POSITION({} IN {})", args[1], args[0])),
        3 => {
            let (s, sub, pos) = (&args[0], &args[1], &args[2]);
            Some(format!(
                "CASE WHEN {pos}>0 AND {pos}<=LENGTH({s}) THEN POSITION({sub} IN SUBSTRING({s} FROM {pos})) + ({pos}-1) ELSE 0 END"
            ))
        }
        4 => Some(format!(
            "instr_with_occurrence({}, {}, {}, {})",
            args[0], args[1], args[2], args[3]
        )),
        _ => None,
    })
}

pub fn rewrite_regexp_replace(sql: &str) -> String {
    apply_rewrite(sql, "REGEXP_REPLACE", |args| {
        (args.len() == 3).then(|| {
            format!("REGEXP_REPLACE({}, {}, {}, 'g')", args[0], args[1], args[2])
        })
    })
}

pub fn rewrite_regexp_substr(sql: &str) -> String {
    apply_rewrite(sql, "REGEXP_SUBSTR", |args| {
        (args.len() == 2).then(|| format!("(REGEXP_MATCH({}, {}))[1]", args[0], args[1]))
    })
}

pub fn rewrite_add_months(sql: &str) -> String {
    apply_rewrite(sql, "ADD_MONTHS", |args| {
        (args.len() == 2).then(|| format!("({} + INTERVAL '{} months')", args[0], args[1]))
    })
}

pub fn rewrite_months_between(sql: &str) -> String {
    apply_rewrite(sql, "MONTHS_BETWEEN", |args| {
        (args.len() == 2).then(|| {
            format!(
                "(EXTRACT(YEAR FROM AGE({0},{1}))*12 + EXTRACT(MONTH FROM AGE({0},{1})))",
                args[0], args[1]
            )
        })
    })
}

pub fn rewrite_last_day(sql: &str) -> String {
    apply_rewrite(sql, "LAST_DAY", |args| {
        (args.len() == 1).then(|| {
            format!(
                "(DATE_TRUNC('MONTH', {0}) + INTERVAL '1 month' - INTERVAL '1 day')::DATE",
                args[0]
            )
        })
    })
}

/// `seq.NEXTVAL` / `seq.CURRVAL` pseudo-columns, schema-qualified with the
/// current schema.
pub fn rewrite_sequence_pseudocolumns(sql: &str, current_schema: &str) -> String {
    static SEQ_REF: OnceLock<Regex> = OnceLock::new();
    let re = SEQ_REF.get_or_init(|| {
        Regex::new(r"(?i)\b([A-Za-z_][\w$#]*)\.(NEXTVAL|CURRVAL)\b").expect("valid regex")
    });
    re.replace_all(sql, |caps: &regex::Captures| {
        let seq = &caps[1];
        let func = if caps[2].eq_ignore_ascii_case("NEXTVAL") {
            "nextval"
        } else {
            "currval"
        };
        format!(
            "{func}('{}.{}')",
            current_schema.to_lowercase(),
            seq.to_lowercase()
        )
    })
    .into_owned()
}

/// `TO_CHAR(x, fmt)` format-code translation: `RR→YY`, `RRRR→YYYY` in date
/// formats, `D→.`, `G→,` in number formats. The NLS third argument, if
/// present, is dropped.
pub fn rewrite_to_char(sql: &str) -> String {
    apply_rewrite(sql, "TO_CHAR", |args| {
        if args.len() < 2 {
            return None;
        }
        let value = &args[0];
        let fmt = strip_quotes(&args[1]);
        let translated = translate_format_code(&fmt);
        Some(format!("TO_CHAR({value}, '{translated}')"))
    })
}

fn strip_quotes(s: &str) -> String {
    s.trim().trim_matches('\'').to_string()
}

fn translate_format_code(fmt: &str) -> String {
    static RRRR: OnceLock<Regex> = OnceLock::new();
    static RR: OnceLock<Regex> = OnceLock::new();
    let is_date_format = fmt.to_uppercase().contains('Y')
        || fmt.to_uppercase().contains("MM")
        || fmt.to_uppercase().contains("DD");

    if is_date_format {
        let re_rrrr = RRRR.get_or_init(|| Regex::new(r"(?i)RRRR").expect("valid regex"));
        let re_rr = RR.get_or_init(|| Regex::new(r"(?i)RR\b").expect("valid regex"));
        let step1 = re_rrrr.replace_all(fmt, "YYYY");
        re_rr.replace_all(&step1, "YY").into_owned()
    } else {
        fmt.replace('D', ".").replace('G', ",")
    }
}

/// `TRUNC`/`ROUND` date-vs-numeric disambiguation heuristic: a
/// known date-format literal as the 2nd argument, or a date-expression
/// marker in the 1st, means treat as date; otherwise numeric pass-through.
/// `TRUNC(date)` / `TRUNC(date, fmt)` → `DATE_TRUNC(field, d)::DATE`.
/// Numeric `TRUNC` is valid unchanged in PostgreSQL and is left alone.
pub fn rewrite_trunc(sql: &str) -> String {
    apply_rewrite(sql, "TRUNC", |args| {
        if args.is_empty() || args.len() > 2 {
            return None;
        }
        let fmt_arg = args.get(1).map(String::as_str);
        if !is_date_truncation(&args[0], fmt_arg) {
            return None;
        }
        let field = fmt_arg.map(truncation_field).unwrap_or("DAY");
        Some(format!("DATE_TRUNC('{field}', {})::DATE", args[0]))
    })
}

/// `ROUND(date, fmt)` → the day/month/year threshold form PostgreSQL
/// needs in place of Oracle's single built-in. Numeric `ROUND` passes
/// through unchanged.
pub fn rewrite_round(sql: &str) -> String {
    apply_rewrite(sql, "ROUND", |args| {
        if args.len() != 2 || !is_date_truncation(&args[0], Some(&args[1])) {
            return None;
        }
        let date = &args[0];
        let field = truncation_field(&args[1]);
        Some(format!(
            "(CASE WHEN {date} >= DATE_TRUNC('{field}', {date}) + (DATE_TRUNC('{field}', {date} + INTERVAL '1 {field}') - DATE_TRUNC('{field}', {date})) / 2 \
             THEN DATE_TRUNC('{field}', {date} + INTERVAL '1 {field}') ELSE DATE_TRUNC('{field}', {date}) END)::DATE"
        ))
    })
}

/// Maps an Oracle date-format model (`'MM'`, `'YYYY'`, ...) to the
/// `DATE_TRUNC` field name it corresponds to. Defaults to `DAY` for any
/// format this table doesn't recognize, matching `TRUNC(date)`'s own
/// default precision.
fn truncation_field(format_arg: &str) -> &'static str {
    match strip_quotes(format_arg).to_uppercase().as_str() {
        "CC" => "CENTURY",
        "YYYY" | "YY" | "RRRR" | "RR" | "YEAR" => "YEAR",
        "Q" => "QUARTER",
        "MM" | "MONTH" | "MON" => "MONTH",
        "DD" | "DAY" => "DAY",
        "HH" | "HH24" => "HOUR",
        "MI" => "MINUTE",
        _ => "DAY",
    }
}

pub fn is_date_truncation(first_arg: &str, format_arg: Option<&str>) -> bool {
    const DATE_FORMATS: &[&str] = &["DD", "MM", "YYYY", "YY", "HH", "CC", "Q"];
    const DATE_MARKERS: &[&str] = &["SYSDATE", "TO_DATE", "LAST_DAY"];

    if let Some(fmt) = format_arg {
        let stripped = strip_quotes(fmt).to_uppercase();
        if DATE_FORMATS.contains(&stripped.as_str()) {
            return true;
        }
    }
    let upper = first_arg.to_uppercase();
    DATE_MARKERS.iter().any(|m| upper.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nvl_becomes_coalesce() {
        assert_eq!(rewrite_nvl("NVL(a, b)"), "COALESCE(a, b)");
    }

    #[test]
    fn nvl2_becomes_case_expression() {
        assert_eq!(
            rewrite_nvl2("NVL2(e, a, b)"),
            "CASE WHEN e IS NOT NULL THEN a ELSE b END"
        );
    }

    #[test]
    fn decode_with_even_arity_has_an_else() {
        assert_eq!(
            rewrite_decode("DECODE(status, 1, 'active', 0, 'inactive', 'unknown')"),
            "CASE status WHEN 1 THEN 'active' WHEN 0 THEN 'inactive' ELSE 'unknown' END"
        );
    }

    #[test]
    fn decode_with_odd_arity_has_no_else() {
        assert_eq!(
            rewrite_decode("DECODE(status, 1, 'active', 0, 'inactive')"),
            "CASE status WHEN 1 THEN 'active' WHEN 0 THEN 'inactive' END"
        );
    }

    #[test]
    fn sysdate_becomes_current_timestamp() {
        assert_eq!(rewrite_sysdate("SELECT SYSDATE FROM dual"), "SELECT CURRENT_TIMESTAMP FROM dual");
    }

    #[test]
    fn from_dual_is_stripped() {
        assert_eq!(rewrite_dual("SELECT 1 FROM DUAL"), "SELECT 1");
    }

    #[test]
    fn substr_with_three_args_becomes_substring_from_for() {
        assert_eq!(
            rewrite_substr("SUBSTR(name, 1, 3)"),
            "SUBSTRING(name FROM 1 FOR 3)"
        );
    }

    #[test]
    fn two_arg_instr_becomes_position() {
        assert_eq!(rewrite_instr("INSTR(name, 'x')"), "POSITION('x' IN name)");
    }

    #[test]
    fn sequence_nextval_is_qualified() {
        assert_eq!(
            rewrite_sequence_pseudocolumns("emp_seq.NEXTVAL", "HR"),
            "nextval('hr.emp_seq')"
        );
    }

    #[test]
    fn to_char_translates_rr_to_yy() {
        assert_eq!(rewrite_to_char("TO_CHAR(hire_date, 'RRRR-MM-DD')"), "TO_CHAR(hire_date, 'YYYY-MM-DD')");
    }

    #[test]
    fn trunc_with_date_format_literal_is_a_date_truncation() {
        assert!(is_date_truncation("some_col", Some("'MM'")));
    }

    #[test]
    fn trunc_with_sysdate_marker_is_a_date_truncation() {
        assert!(is_date_truncation("SYSDATE", None));
    }

    #[test]
    fn trunc_with_plain_numeric_is_not_a_date_truncation() {
        assert!(!is_date_truncation("price", Some("2")));
    }

    #[test]
    fn trunc_date_with_month_format_becomes_date_trunc() {
        assert_eq!(
            rewrite_trunc("TRUNC(hire_date, 'MM')"),
            "DATE_TRUNC('MONTH', hire_date)::DATE"
        );
    }

    #[test]
    fn trunc_with_no_format_truncates_to_day() {
        assert_eq!(rewrite_trunc("TRUNC(SYSDATE)"), "DATE_TRUNC('DAY', SYSDATE)::DATE");
    }

    #[test]
    fn trunc_numeric_is_left_alone() {
        assert_eq!(rewrite_trunc("TRUNC(price, 2)"), "TRUNC(price, 2)");
    }

    #[test]
    fn round_date_becomes_threshold_case_expression() {
        let out = rewrite_round("ROUND(hire_date, 'MM')");
        assert!(out.starts_with("(CASE WHEN hire_date >="));
        assert!(out.ends_with("END)::DATE"));
    }

    #[test]
    fn round_numeric_is_left_alone() {
        assert_eq!(rewrite_round("ROUND(price, 2)"), "ROUND(price, 2)");
    }
}
