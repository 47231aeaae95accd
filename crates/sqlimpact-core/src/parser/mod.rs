//! T-SQL script parsing on top of sqlparser's MsSql dialect
//!
//! sqlparser covers single statements. This module adds what a T-SQL script
//! needs around them: `GO` batches, optional `;` terminators, control-of-flow
//! language, stored procedure definitions whose body runs to the end of the
//! batch, and syntax errors located in the coordinates of the whole script.

mod batch;
mod control;
mod normalize;
mod procedure;

use std::sync::OnceLock;

use regex::Regex;
use sqlparser::dialect::MsSqlDialect;
use sqlparser::keywords::Keyword;
use sqlparser::parser::{Parser, ParserError};
use sqlparser::tokenizer::{Token, Tokenizer};
use tracing::debug;

use crate::error::SyntaxError;
use crate::tree::{Node, Script};

use batch::{split_batches, Batch};

/// Parse a whole script.
///
/// Every batch is parsed even after an earlier one fails, so all syntax
/// errors are reported together. A script with errors yields no tree.
pub fn parse_script(sql: &str) -> Result<Script, Vec<SyntaxError>> {
    let sql = sql.strip_prefix('\u{FEFF}').unwrap_or(sql);
    let dialect = MsSqlDialect {};

    let mut nodes = Vec::new();
    let mut errors = Vec::new();

    for batch in split_batches(sql) {
        if batch.content.trim().is_empty() {
            continue;
        }

        match parse_batch(&dialect, batch.content) {
            Ok(parsed) => {
                debug!(
                    start_line = batch.start_line,
                    nodes = parsed.len(),
                    "parsed batch"
                );
                nodes.extend(parsed);
            }
            Err(e) => {
                let mut error = syntax_error(&e, &batch);
                error.span = error.span.resolve_offset(sql);
                debug!(%error, "batch failed to parse");
                errors.push(error);
            }
        }
    }

    if errors.is_empty() {
        Ok(Script::new(nodes))
    } else {
        Err(errors)
    }
}

fn parse_batch(dialect: &MsSqlDialect, sql: &str) -> Result<Vec<Node>, ParserError> {
    let tokens = Tokenizer::new(dialect, sql).tokenize_with_location()?;
    let mut parser = Parser::new(dialect).with_tokens_with_locations(normalize::normalize(tokens));
    parse_nodes(&mut parser, BlockEnd::EndOfInput)
}

/// What closes a sequence of statements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockEnd {
    /// End of the batch
    EndOfInput,
    /// An `END` keyword, left unconsumed for the caller
    EndKeyword,
}

/// Parse statements until `end`, with `;` terminators optional
pub(crate) fn parse_nodes(
    parser: &mut Parser<'_>,
    end: BlockEnd,
) -> Result<Vec<Node>, ParserError> {
    let mut nodes = Vec::new();

    loop {
        while parser.consume_token(&Token::SemiColon) {}

        match parser.peek_token().token {
            Token::EOF => {
                if end == BlockEnd::EndKeyword {
                    return parser.expected("END", parser.peek_token());
                }
                break;
            }
            Token::Word(w) if end == BlockEnd::EndKeyword && w.keyword == Keyword::END => break,
            _ => {}
        }

        nodes.push(parse_node(parser)?);
    }

    Ok(nodes)
}

fn parse_node(parser: &mut Parser<'_>) -> Result<Node, ParserError> {
    if procedure::at_create_procedure(parser) {
        return procedure::parse_create_procedure(parser).map(Node::Procedure);
    }
    if let Some(control) = control::at_control(parser) {
        return control::parse_control(parser, control);
    }
    parser.parse_statement().map(Node::Statement)
}

/// Whether `token` is one of `candidates`, unquoted and in any case
pub(crate) fn word_is(token: &Token, candidates: &[&str]) -> bool {
    match token {
        Token::Word(w) if w.quote_style.is_none() => candidates
            .iter()
            .any(|candidate| w.value.eq_ignore_ascii_case(candidate)),
        _ => false,
    }
}

/// Consume `word`, which need not be a sqlparser keyword
pub(crate) fn expect_word(parser: &mut Parser<'_>, word: &str) -> Result<(), ParserError> {
    let token = parser.next_token();
    if word_is(&token.token, &[word]) {
        Ok(())
    } else {
        parser.expected(word, token)
    }
}

fn location_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\s*at Line: (\d+), Column: (\d+)").expect("location pattern is valid")
    })
}

/// Convert a parser error into script coordinates.
///
/// sqlparser appends ` at Line: X, Column: Y` relative to the batch; errors
/// at end of input carry no location and are placed after the batch's last
/// character.
fn syntax_error(error: &ParserError, batch: &Batch<'_>) -> SyntaxError {
    let text = match error {
        ParserError::TokenizerError(message) | ParserError::ParserError(message) => {
            message.clone()
        }
        other => other.to_string(),
    };

    let located = location_pattern().captures(&text).and_then(|caps| {
        let line: usize = caps.get(1)?.as_str().parse().ok()?;
        let column: usize = caps.get(2)?.as_str().parse().ok()?;
        let matched = caps.get(0)?;
        Some((line, column, matched.range()))
    });

    match located {
        Some((line, column, range)) if line > 0 => {
            let mut message = text.clone();
            message.replace_range(range, "");
            SyntaxError::new(message.trim(), batch.start_line + line - 1, column)
        }
        _ => {
            let (line, column) = batch.end_location();
            SyntaxError::new(text.trim(), line, column)
        }
    }
}
