//! Syntax tree of a parsed T-SQL script
//!
//! Ordinary statements are carried as `sqlparser` statements. Procedure
//! definitions and control-of-flow constructs get their own nodes because
//! they hold further nodes.

use sqlparser::ast::{DataType, Expr, Ident, ObjectName, SetExpr, Statement};

/// Root of a parsed script: every batch's nodes in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Statement(Statement),
    Procedure(ProcedureDefinition),
    /// `BEGIN ... END`
    Block(Vec<Node>),
    /// `IF condition statement [ELSE statement]`
    If {
        condition: Expr,
        then_branch: Box<Node>,
        else_branch: Option<Box<Node>>,
    },
    /// `WHILE condition statement`
    While { condition: Expr, body: Box<Node> },
    /// `BEGIN TRY ... END TRY BEGIN CATCH ... END CATCH`
    TryCatch {
        try_block: Vec<Node>,
        catch_block: Vec<Node>,
    },
    /// `SET NOCOUNT ON`, `SET IDENTITY_INSERT dbo.t OFF`
    SetOption { setting: String, enabled: bool },
}

/// `CREATE [OR ALTER] PROC[EDURE] name params AS body`
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureDefinition {
    pub or_alter: bool,
    pub name: ObjectName,
    pub parameters: Vec<ParameterDeclaration>,
    pub body: Vec<Node>,
}

/// `@name [AS] type [= default] [OUT | OUTPUT] [READONLY]`
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDeclaration {
    pub name: Ident,
    pub data_type: DataType,
    pub default: Option<Expr>,
    pub output: bool,
    pub read_only: bool,
}

/// A node reached while walking a script
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Statement(&'a Statement),
    Procedure(&'a ProcedureDefinition),
}

impl Script {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every statement and procedure reachable from the root, depth-first and
    /// pre-order: procedure bodies, control-of-flow branches and statements
    /// wrapped by other statements included.
    pub fn walk(&self) -> Vec<NodeRef<'_>> {
        let mut visited = Vec::new();
        walk_nodes(&self.nodes, &mut visited);
        visited
    }

    /// Procedure definitions in document order
    pub fn procedures(&self) -> Vec<&ProcedureDefinition> {
        self.walk()
            .into_iter()
            .filter_map(|node| match node {
                NodeRef::Procedure(procedure) => Some(procedure),
                NodeRef::Statement(_) => None,
            })
            .collect()
    }
}

fn walk_nodes<'a>(nodes: &'a [Node], visited: &mut Vec<NodeRef<'a>>) {
    for node in nodes {
        walk_node(node, visited);
    }
}

fn walk_node<'a>(node: &'a Node, visited: &mut Vec<NodeRef<'a>>) {
    match node {
        Node::Statement(statement) => walk_statement(statement, visited),
        Node::Procedure(procedure) => {
            visited.push(NodeRef::Procedure(procedure));
            walk_nodes(&procedure.body, visited);
        }
        Node::Block(nodes) => walk_nodes(nodes, visited),
        Node::If {
            then_branch,
            else_branch,
            ..
        } => {
            walk_node(then_branch, visited);
            if let Some(else_branch) = else_branch {
                walk_node(else_branch, visited);
            }
        }
        Node::While { body, .. } => walk_node(body, visited),
        Node::TryCatch {
            try_block,
            catch_block,
        } => {
            walk_nodes(try_block, visited);
            walk_nodes(catch_block, visited);
        }
        Node::SetOption { .. } => {}
    }
}

fn walk_statement<'a>(statement: &'a Statement, visited: &mut Vec<NodeRef<'a>>) {
    visited.push(NodeRef::Statement(statement));

    match statement {
        Statement::Explain { statement, .. } | Statement::Prepare { statement, .. } => {
            walk_statement(statement, visited);
        }
        // WITH cte AS (...) INSERT / UPDATE
        Statement::Query(query) => match query.body.as_ref() {
            SetExpr::Insert(inner) | SetExpr::Update(inner) => walk_statement(inner, visited),
            _ => {}
        },
        _ => {}
    }
}
