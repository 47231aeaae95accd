//! `CREATE [OR ALTER] PROC[EDURE]` definitions
//!
//! ```sql
//! CREATE PROCEDURE [schema].[name] @p1 INT, @p2 VARCHAR(10) = NULL OUTPUT AS ...
//! CREATE PROC name (@items dbo.OrderLines READONLY) AS BEGIN ... END
//! CREATE OR ALTER PROCEDURE name WITH RECOMPILE AS ...
//! ```
//!
//! Without an enclosing `BEGIN ... END` the body runs to the end of the batch.

use sqlparser::keywords::Keyword;
use sqlparser::parser::{Parser, ParserError};
use sqlparser::tokenizer::Token;
use tracing::trace;

use super::control::{at_control, Control};
use super::{parse_nodes, word_is, BlockEnd};
use crate::tree::{ParameterDeclaration, ProcedureDefinition};

/// Whether the upcoming tokens start a procedure definition
pub(super) fn at_create_procedure(parser: &Parser<'_>) -> bool {
    let word_at = |n: usize, expected: &str| {
        matches!(
            &parser.peek_nth_token(n).token,
            Token::Word(w) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case(expected)
        )
    };

    if !word_at(0, "CREATE") {
        return false;
    }
    let kind = if word_at(1, "OR") && word_at(2, "ALTER") {
        3
    } else {
        1
    };
    word_at(kind, "PROCEDURE") || word_at(kind, "PROC")
}

pub(super) fn parse_create_procedure(
    parser: &mut Parser<'_>,
) -> Result<ProcedureDefinition, ParserError> {
    parser.expect_keyword(Keyword::CREATE)?;
    let or_alter = parser.parse_keywords(&[Keyword::OR, Keyword::ALTER]);
    // PROC | PROCEDURE, checked by at_create_procedure
    parser.next_token();

    let name = parser.parse_object_name(false)?;
    let parameters = parse_parameter_list(parser)?;
    trace!(procedure = %name, parameters = parameters.len(), "procedure header");

    if parser.parse_keyword(Keyword::WITH) {
        skip_procedure_options(parser)?;
    }
    parser.expect_keyword(Keyword::AS)?;

    let body = if at_body_block(parser) {
        parser.next_token();
        let body = parse_nodes(parser, BlockEnd::EndKeyword)?;
        parser.expect_keyword(Keyword::END)?;
        body
    } else {
        parse_nodes(parser, BlockEnd::EndOfInput)?
    };

    Ok(ProcedureDefinition {
        or_alter,
        name,
        parameters,
        body,
    })
}

/// Parameters, with or without surrounding parentheses
fn parse_parameter_list(parser: &mut Parser<'_>) -> Result<Vec<ParameterDeclaration>, ParserError> {
    if parser.consume_token(&Token::LParen) {
        if parser.consume_token(&Token::RParen) {
            return Ok(Vec::new());
        }
        let parameters = parser.parse_comma_separated(parse_parameter)?;
        parser.expect_token(&Token::RParen)?;
        return Ok(parameters);
    }

    if is_variable(&parser.peek_token().token) {
        parser.parse_comma_separated(parse_parameter)
    } else {
        Ok(Vec::new())
    }
}

fn parse_parameter(parser: &mut Parser<'_>) -> Result<ParameterDeclaration, ParserError> {
    let token = parser.next_token();
    let variable = match &token.token {
        Token::Word(w) if w.value.starts_with('@') => Some(sqlparser::ast::Ident::new(&w.value)),
        _ => None,
    };
    let Some(name) = variable else {
        return parser.expected("a parameter name", token);
    };

    let _ = parser.parse_keyword(Keyword::AS);
    let data_type = parser.parse_data_type()?;
    let default = if parser.consume_token(&Token::Eq) {
        Some(parser.parse_expr()?)
    } else {
        None
    };

    let mut output = false;
    let mut read_only = false;
    loop {
        if word_is(&parser.peek_token().token, &["OUT", "OUTPUT"]) {
            output = true;
        } else if word_is(&parser.peek_token().token, &["READONLY"]) {
            read_only = true;
        } else {
            break;
        }
        parser.next_token();
    }

    Ok(ParameterDeclaration {
        name,
        data_type,
        default,
        output,
        read_only,
    })
}

/// `WITH RECOMPILE, ENCRYPTION, EXECUTE AS OWNER, ...`
fn skip_procedure_options(parser: &mut Parser<'_>) -> Result<(), ParserError> {
    loop {
        if parser.parse_keyword(Keyword::EXECUTE) {
            parser.expect_keyword(Keyword::AS)?;
        }
        parser.next_token();
        if !parser.consume_token(&Token::Comma) {
            return Ok(());
        }
    }
}

/// `AS BEGIN` opens a block; `AS BEGIN TRAN` and `AS BEGIN TRY` start the body
/// with a statement
fn at_body_block(parser: &Parser<'_>) -> bool {
    at_control(parser) == Some(Control::Block)
}

fn is_variable(token: &Token) -> bool {
    matches!(token, Token::Word(w) if w.value.starts_with('@'))
}
