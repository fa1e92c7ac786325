//! SQL Parser: wraps the pest-generated parser for the Oracle
//! SQL grammar (treated as an external asset). Stateless across calls.

use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "sql/grammar.pest"]
pub struct OracleSqlParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRule {
    SelectStatement,
    FunctionBody,
    ProcedureBody,
}

#[derive(Debug)]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

pub enum ParseResult<'a> {
    Tree(pest::iterators::Pairs<'a, Rule>),
    Errors(Vec<SyntaxError>),
}

pub fn parse(text: &str, start_rule: StartRule) -> ParseResult<'_> {
    let rule = match start_rule {
        StartRule::SelectStatement => Rule::selectStatement,
        StartRule::FunctionBody => Rule::functionBody,
        StartRule::ProcedureBody => Rule::procedureBody,
    };

    match OracleSqlParser::parse(rule, text) {
        Ok(pairs) => ParseResult::Tree(pairs),
        Err(e) => {
            let (line, column) = match e.line_col {
                pest::error::LineColLocation::Pos((l, c)) => (l, c),
                pest::error::LineColLocation::Span((l, c), _) => (l, c),
            };
            ParseResult::Errors(vec![SyntaxError {
                line,
                column,
                message: e.to_string(),
            }])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_simple_select() {
        let result = parse("SELECT empno, ename FROM employees", StartRule::SelectStatement);
        assert!(matches!(result, ParseResult::Tree(_)));
    }

    #[test]
    fn reports_line_and_column_on_syntax_error() {
        let result = parse("SELECT FROM", StartRule::SelectStatement);
        match result {
            ParseResult::Errors(errors) => assert_eq!(errors[0].line, 1),
            ParseResult::Tree(_) => panic!("expected a syntax error"),
        }
    }
}
