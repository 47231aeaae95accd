//! Token rewrites applied before parsing
//!
//! sqlparser's MsSql dialect misses a few T-SQL forms that only need a local
//! change to the token stream:
//!
//! - Statements need no `;`, but sqlparser reads a bare word after a table
//!   name as its alias (`DELETE FROM a INSERT INTO b ...`). A `;` is inserted
//!   in front of each statement keyword that follows an identifier, a literal
//!   or another keyword, unless the keyword belongs to the clause before it
//!   (`INSTEAD OF INSERT`, `THEN UPDATE`, `ON DELETE`, `DROP TABLE IF EXISTS`).
//!   `ELSE` and `END` outside `CASE` expressions are separated the same way.
//! - `TOP (n) [PERCENT]` right after `INSERT`, `UPDATE` or `DELETE` is dropped.
//! - `DELETE name WHERE ...` gets its optional `FROM`.
//! - `OUTPUT` clauses of data-modification statements are dropped.
//!
//! Whitespace and comments are dropped as well; every token keeps its span.

use sqlparser::tokenizer::{Token, TokenWithSpan};

use super::word_is;

const STATEMENT_STARTS: &[&str] = &[
    "BEGIN", "COMMIT", "DECLARE", "DELETE", "EXEC", "EXECUTE", "IF", "INSERT", "MERGE",
    "ROLLBACK", "TRUNCATE", "UPDATE", "WHILE",
];

const DML_STARTS: &[&str] = &["DELETE", "INSERT", "MERGE", "UPDATE"];

/// Words after which a statement keyword continues the clause
const CLAUSE_WORDS: &[&str] = &[
    "AFTER", "AS", "BEFORE", "DENY", "FOR", "GRANT", "IF", "INSTEAD", "OF", "ON", "REVOKE",
    "THEN", "WHILE", "WITH",
];

/// `DROP <kind> IF EXISTS`, `CREATE <kind> IF NOT EXISTS`
const IF_EXISTS_KINDS: &[&str] = &[
    "DATABASE", "FUNCTION", "INDEX", "PROC", "PROCEDURE", "SCHEMA", "SEQUENCE", "TABLE",
    "TRIGGER", "TYPE", "VIEW",
];

const OUTPUT_END: &[&str] = &[
    "DEFAULT", "ELSE", "END", "EXEC", "EXECUTE", "FROM", "OPTION", "SELECT", "VALUES", "WHERE",
];

pub(super) fn normalize(tokens: Vec<TokenWithSpan>) -> Vec<TokenWithSpan> {
    let tokens: Vec<TokenWithSpan> = tokens
        .into_iter()
        .filter(|t| !matches!(t.token, Token::Whitespace(_)))
        .collect();

    let mut out: Vec<TokenWithSpan> = Vec::with_capacity(tokens.len());
    let mut paren_depth = 0usize;
    let mut case_depth = 0usize;
    let mut in_dml = false;
    let mut from_at = None;
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        let previous = out.last().map(|t| &t.token);

        if needs_terminator(&token.token, previous, case_depth) {
            out.push(TokenWithSpan::new(Token::SemiColon, token.span));
            in_dml = false;
        }
        let previous = out.last().map(|t| &t.token);
        let top_follows_dml = word_is(&token.token, &["TOP"])
            && previous.is_some_and(|p| word_is(p, &["INSERT", "UPDATE", "DELETE"]));
        let output_clause = in_dml && paren_depth == 0 && at_output_clause(&tokens, i, previous);
        let delete_statement = word_is(&token.token, &["DELETE"]) && begins_statement(previous);

        if top_follows_dml {
            if let Some(next) = skip_top(&tokens, i) {
                i = next;
                continue;
            }
        }

        if output_clause {
            i = output_clause_end(&tokens, i);
            continue;
        }

        if from_at == Some(i) {
            out.push(TokenWithSpan::new(Token::make_keyword("FROM"), token.span));
            from_at = None;
        }

        match &token.token {
            Token::LParen => paren_depth += 1,
            Token::RParen => paren_depth = paren_depth.saturating_sub(1),
            Token::SemiColon => in_dml = false,
            t if word_is(t, &["CASE"]) => case_depth += 1,
            t if word_is(t, &["END"]) && case_depth > 0 => case_depth -= 1,
            t if paren_depth == 0 && word_is(t, DML_STARTS) => in_dml = true,
            t if word_is(t, &["ALTER", "CREATE"])
                || word_is(t, STATEMENT_STARTS)
                || (paren_depth == 0 && word_is(t, &["SELECT"])) =>
            {
                in_dml = false
            }
            _ => {}
        }

        if delete_statement {
            from_at = missing_from(&tokens, i + 1);
        }

        out.push(token.clone());
        i += 1;
    }

    out
}

fn needs_terminator(token: &Token, previous: Option<&Token>, case_depth: usize) -> bool {
    let Some(previous) = previous else {
        return false;
    };
    if !ends_clause(previous) {
        return false;
    }
    if word_is(token, &["ELSE", "END"]) {
        return case_depth == 0;
    }
    if word_is(token, &["IF"]) && word_is(previous, IF_EXISTS_KINDS) {
        return false;
    }
    word_is(token, STATEMENT_STARTS)
}

/// Whether a statement keyword after `token` begins a new statement
fn ends_clause(token: &Token) -> bool {
    match token {
        Token::Word(w) if w.quote_style.is_none() => !word_is(token, CLAUSE_WORDS),
        Token::Word(_)
        | Token::Number(..)
        | Token::SingleQuotedString(_)
        | Token::NationalStringLiteral(_) => true,
        _ => false,
    }
}

/// Whether a `DELETE` after `previous` is a statement rather than a clause word
fn begins_statement(previous: Option<&Token>) -> bool {
    match previous {
        None | Some(Token::SemiColon) | Some(Token::RParen) => true,
        Some(token) => word_is(token, &["AS"]) || ends_clause(token),
    }
}

/// Index past `TOP ( ... ) [PERCENT]` starting at `start`
fn skip_top(tokens: &[TokenWithSpan], start: usize) -> Option<usize> {
    let top = word_is(token_at(tokens, start)?, &["TOP"]);
    if !top || token_at(tokens, start + 1)? != &Token::LParen {
        return None;
    }
    let mut end = closing_paren(tokens, start + 1)? + 1;
    if token_at(tokens, end).is_some_and(|t| word_is(t, &["PERCENT"])) {
        end += 1;
    }
    Some(end)
}

/// Where `FROM` belongs in `DELETE [TOP (n)] name ...`, unless the statement
/// already has it (`DELETE FROM t`, `DELETE a FROM t a`)
fn missing_from(tokens: &[TokenWithSpan], start: usize) -> Option<usize> {
    let name_start = skip_top(tokens, start).unwrap_or(start);
    if !matches!(token_at(tokens, name_start)?, Token::Word(_))
        || word_is(token_at(tokens, name_start)?, &["FROM"])
    {
        return None;
    }

    let mut end = name_start + 1;
    while token_at(tokens, end) == Some(&Token::Period)
        && matches!(token_at(tokens, end + 1), Some(Token::Word(_)))
    {
        end += 2;
    }

    match token_at(tokens, end) {
        Some(token) if word_is(token, &["FROM"]) => None,
        _ => Some(name_start),
    }
}

fn at_output_clause(tokens: &[TokenWithSpan], index: usize, previous: Option<&Token>) -> bool {
    word_is(&tokens[index].token, &["OUTPUT"])
        && token_at(tokens, index + 1).is_some_and(|next| next != &Token::Eq)
        && !previous.is_some_and(|p| {
            matches!(p, Token::Comma | Token::Period) || word_is(p, &["SET", "SELECT"])
        })
}

fn output_clause_end(tokens: &[TokenWithSpan], start: usize) -> usize {
    let mut depth = 0usize;
    let mut case_depth = 0usize;
    let mut index = start + 1;

    while let Some(token) = token_at(tokens, index) {
        match token {
            Token::LParen => depth += 1,
            Token::RParen if depth == 0 => break,
            Token::RParen => depth -= 1,
            Token::SemiColon if depth == 0 => break,
            t if word_is(t, &["CASE"]) => case_depth += 1,
            t if word_is(t, &["END"]) && case_depth > 0 => case_depth -= 1,
            t if depth == 0
                && case_depth == 0
                && (word_is(t, OUTPUT_END) || word_is(t, STATEMENT_STARTS)) =>
            {
                break
            }
            _ => {}
        }
        index += 1;
    }

    index
}

fn closing_paren(tokens: &[TokenWithSpan], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        match token.token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn token_at(tokens: &[TokenWithSpan], index: usize) -> Option<&Token> {
    tokens.get(index).map(|t| &t.token)
}
