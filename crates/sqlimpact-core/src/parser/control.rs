//! Control-of-flow language
//!
//! ```sql
//! IF @x = 1 UPDATE t SET a = 1 ELSE DELETE FROM t
//! WHILE @n > 0 BEGIN ... END
//! BEGIN TRY ... END TRY BEGIN CATCH ... END CATCH
//! SET NOCOUNT ON
//! ```
//!
//! sqlparser reads `BEGIN` as the start of a transaction and has no `IF`,
//! `WHILE` or `TRY ... CATCH` statements for the MsSql dialect, so these are
//! parsed here and the statements inside them are handed back to
//! [`super::parse_node`].

use sqlparser::keywords::Keyword;
use sqlparser::parser::{Parser, ParserError};
use sqlparser::tokenizer::Token;

use super::{expect_word, parse_node, parse_nodes, word_is, BlockEnd};
use crate::tree::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Control {
    If,
    While,
    Block,
    TryCatch,
    SetOption,
}

/// `BEGIN` words that start a statement rather than a block
const BEGIN_STATEMENTS: &[&str] = &[
    "CONVERSATION",
    "DIALOG",
    "DISTRIBUTED",
    "TRAN",
    "TRANSACTION",
];

/// Which construct the upcoming tokens start, if any
pub(super) fn at_control(parser: &Parser<'_>) -> Option<Control> {
    let first = parser.peek_token().token;
    let second = parser.peek_nth_token(1).token;

    if word_is(&first, &["IF"]) {
        Some(Control::If)
    } else if word_is(&first, &["WHILE"]) {
        Some(Control::While)
    } else if word_is(&first, &["BEGIN"]) {
        if word_is(&second, &["TRY"]) {
            Some(Control::TryCatch)
        } else if word_is(&second, BEGIN_STATEMENTS) {
            None
        } else {
            Some(Control::Block)
        }
    } else if word_is(&first, &["SET"]) && set_option_switch(parser).is_some() {
        Some(Control::SetOption)
    } else {
        None
    }
}

pub(super) fn parse_control(
    parser: &mut Parser<'_>,
    control: Control,
) -> Result<Node, ParserError> {
    match control {
        Control::If => {
            expect_word(parser, "IF")?;
            let condition = parser.parse_expr()?;
            let then_branch = Box::new(parse_branch(parser)?);

            while parser.consume_token(&Token::SemiColon) {}
            let else_branch = if word_is(&parser.peek_token().token, &["ELSE"]) {
                parser.next_token();
                Some(Box::new(parse_branch(parser)?))
            } else {
                None
            };

            Ok(Node::If {
                condition,
                then_branch,
                else_branch,
            })
        }
        Control::While => {
            expect_word(parser, "WHILE")?;
            let condition = parser.parse_expr()?;
            let body = Box::new(parse_branch(parser)?);
            Ok(Node::While { condition, body })
        }
        Control::Block => {
            expect_word(parser, "BEGIN")?;
            let nodes = parse_nodes(parser, BlockEnd::EndKeyword)?;
            parser.expect_keyword(Keyword::END)?;
            Ok(Node::Block(nodes))
        }
        Control::TryCatch => {
            let try_block = parse_labelled_block(parser, "TRY")?;
            while parser.consume_token(&Token::SemiColon) {}
            let catch_block = parse_labelled_block(parser, "CATCH")?;
            Ok(Node::TryCatch {
                try_block,
                catch_block,
            })
        }
        Control::SetOption => parse_set_option(parser),
    }
}

/// The single statement or block governed by `IF`, `ELSE` or `WHILE`
fn parse_branch(parser: &mut Parser<'_>) -> Result<Node, ParserError> {
    while parser.consume_token(&Token::SemiColon) {}
    parse_node(parser)
}

/// `BEGIN label ... END label`
fn parse_labelled_block(parser: &mut Parser<'_>, label: &str) -> Result<Vec<Node>, ParserError> {
    expect_word(parser, "BEGIN")?;
    expect_word(parser, label)?;
    let nodes = parse_nodes(parser, BlockEnd::EndKeyword)?;
    parser.expect_keyword(Keyword::END)?;
    expect_word(parser, label)?;
    Ok(nodes)
}

/// Position of the `ON`/`OFF` closing `SET option [, option] [object]`
fn set_option_switch(parser: &Parser<'_>) -> Option<usize> {
    let mut n = 1;
    loop {
        match parser.peek_nth_token(n).token {
            Token::Word(w) if w.value.starts_with('@') => return None,
            ref token if word_is(token, &["ON", "OFF"]) => return (n > 1).then_some(n),
            Token::Word(_) | Token::Comma | Token::Period => n += 1,
            _ => return None,
        }
    }
}

fn parse_set_option(parser: &mut Parser<'_>) -> Result<Node, ParserError> {
    let Some(switch) = set_option_switch(parser) else {
        return parser.expected("ON or OFF", parser.peek_token());
    };
    expect_word(parser, "SET")?;

    let mut setting = String::new();
    let mut after_word = false;
    for _ in 1..switch {
        match parser.next_token().token {
            Token::Word(w) => {
                if after_word {
                    setting.push(' ');
                }
                setting.push_str(&w.value);
                after_word = true;
            }
            Token::Comma => {
                setting.push_str(", ");
                after_word = false;
            }
            _ => {
                setting.push('.');
                after_word = false;
            }
        }
    }

    let enabled = word_is(&parser.next_token().token, &["ON"]);
    Ok(Node::SetOption { setting, enabled })
}

#[cfg(test)]
mod tests {
    use crate::parser::parse_script;
    use crate::tree::Node;
    use pretty_assertions::assert_eq;
    use sqlparser::ast::Statement;

    fn single_node(sql: &str) -> Node {
        let mut script = parse_script(sql).unwrap();
        assert_eq!(script.nodes.len(), 1, "{:?}", script.nodes);
        script.nodes.remove(0)
    }

    #[test]
    fn test_if_without_else() {
        match single_node("IF 1 = 1 UPDATE Orders SET Status = 1") {
            Node::If {
                then_branch,
                else_branch,
                ..
            } => {
                assert!(matches!(
                    *then_branch,
                    Node::Statement(Statement::Update { .. })
                ));
                assert!(else_branch.is_none());
            }
            other => panic!("expected IF, got {:?}", other),
        }
    }

    #[test]
    fn test_if_else_with_blocks() {
        let node = single_node(
            "IF @x = 1\nBEGIN\n  UPDATE a SET b = 1\n  DELETE FROM c\nEND\nELSE\n  INSERT INTO d (e) VALUES (1);",
        );
        match node {
            Node::If {
                then_branch,
                else_branch: Some(else_branch),
                ..
            } => {
                match *then_branch {
                    Node::Block(nodes) => assert_eq!(nodes.len(), 2),
                    other => panic!("expected a block, got {:?}", other),
                }
                assert!(matches!(
                    *else_branch,
                    Node::Statement(Statement::Insert(_))
                ));
            }
            other => panic!("expected IF ... ELSE, got {:?}", other),
        }
    }

    #[test]
    fn test_else_if_chain() {
        let node = single_node(
            "IF @x = 1 DELETE FROM a ELSE IF @x = 2 DELETE FROM b ELSE DELETE FROM c",
        );
        let Node::If {
            else_branch: Some(else_branch),
            ..
        } = node
        else {
            panic!("expected IF ... ELSE");
        };
        assert!(matches!(
            *else_branch,
            Node::If {
                else_branch: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_case_else_is_not_a_branch() {
        let node = single_node(
            "IF EXISTS (SELECT 1 FROM t) UPDATE t SET a = CASE WHEN b = 1 THEN 2 ELSE 3 END",
        );
        assert!(matches!(
            node,
            Node::If {
                else_branch: None,
                ..
            }
        ));
    }

    #[test]
    fn test_while_loop() {
        match single_node("WHILE 1 = 0 DELETE FROM c") {
            Node::While { body, .. } => {
                assert!(matches!(*body, Node::Statement(Statement::Delete(_))));
            }
            other => panic!("expected WHILE, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_blocks() {
        match single_node("BEGIN\n  BEGIN\n    DELETE FROM a\n  END\n  SELECT 1\nEND") {
            Node::Block(nodes) => {
                assert_eq!(nodes.len(), 2);
                assert!(matches!(&nodes[0], Node::Block(inner) if inner.len() == 1));
            }
            other => panic!("expected a block, got {:?}", other),
        }
    }

    #[test]
    fn test_try_catch() {
        let node = single_node(
            "BEGIN TRY\n  DELETE FROM a\nEND TRY\nBEGIN CATCH\n  ROLLBACK;\n  SELECT 1\nEND CATCH",
        );
        match node {
            Node::TryCatch {
                try_block,
                catch_block,
            } => {
                assert_eq!(try_block.len(), 1);
                assert_eq!(catch_block.len(), 2);
            }
            other => panic!("expected TRY ... CATCH, got {:?}", other),
        }
    }

    #[test]
    fn test_transaction_begin_is_a_statement() {
        let script = parse_script("BEGIN TRANSACTION\nDELETE FROM a\nCOMMIT").unwrap();
        assert_eq!(script.nodes.len(), 3);
        assert!(matches!(script.nodes[0], Node::Statement(_)));
    }

    #[test]
    fn test_set_options() {
        assert_eq!(
            single_node("SET NOCOUNT ON;"),
            Node::SetOption {
                setting: "NOCOUNT".to_string(),
                enabled: true,
            }
        );
        assert_eq!(
            single_node("SET IDENTITY_INSERT dbo.Orders OFF"),
            Node::SetOption {
                setting: "IDENTITY_INSERT dbo.Orders".to_string(),
                enabled: false,
            }
        );
        assert_eq!(
            single_node("SET ANSI_NULLS, QUOTED_IDENTIFIER ON"),
            Node::SetOption {
                setting: "ANSI_NULLS, QUOTED_IDENTIFIER".to_string(),
                enabled: true,
            }
        );
    }

    #[test]
    fn test_unterminated_block_is_an_error() {
        let errors = parse_script("IF 1 = 1 BEGIN DELETE FROM a").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("END"));
    }
}
