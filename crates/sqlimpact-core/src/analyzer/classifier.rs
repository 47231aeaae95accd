//! Partition script statements by kind

use sqlparser::ast::Statement;

use crate::tree::{NodeRef, Script};

/// Statements of a script grouped by kind, each group in document order
#[derive(Debug, Default)]
pub struct Classified<'a> {
    pub inserts: Vec<&'a Statement>,
    pub updates: Vec<&'a Statement>,
    pub deletes: Vec<&'a Statement>,
    pub selects: Vec<&'a Statement>,
}

impl Classified<'_> {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty()
            && self.updates.is_empty()
            && self.deletes.is_empty()
            && self.selects.is_empty()
    }
}

/// Collect every insert, update, delete and select reachable from the root,
/// whatever its nesting (batches, procedure bodies, wrapping statements).
pub fn classify(script: &Script) -> Classified<'_> {
    let mut classified = Classified::default();

    for node in script.walk() {
        let NodeRef::Statement(statement) = node else {
            continue;
        };
        match statement {
            Statement::Insert(_) => classified.inserts.push(statement),
            Statement::Update { .. } => classified.updates.push(statement),
            Statement::Delete(_) => classified.deletes.push(statement),
            Statement::Query(_) => classified.selects.push(statement),
            _ => {}
        }
    }

    classified
}
