//! Table alias resolution within a single statement

use std::convert::Infallible;
use std::ops::ControlFlow;

use indexmap::IndexMap;
use sqlparser::ast::{Statement, TableFactor, Visit, Visitor};
use tracing::trace;

/// alias -> base table name, for one statement
///
/// Built from every aliased named-table reference in the statement: joins,
/// subqueries, `FROM` clauses of `UPDATE`/`DELETE`, insert source queries.
/// When an alias is declared twice the last declaration wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasMap {
    aliases: IndexMap<String, String>,
}

impl AliasMap {
    pub fn build(statement: &Statement) -> Self {
        let mut collector = AliasCollector::default();
        match statement.visit(&mut collector) {
            ControlFlow::Continue(()) => collector.map,
            ControlFlow::Break(never) => match never {},
        }
    }

    /// Base name for `name` if it is a known alias, otherwise `name` itself
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn insert(&mut self, alias: impl Into<String>, base_name: impl Into<String>) {
        let alias = alias.into();
        // re-declared aliases move to the end, matching the declaration order
        self.aliases.shift_remove(&alias);
        self.aliases.insert(alias, base_name.into());
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Default)]
struct AliasCollector {
    map: AliasMap,
}

impl Visitor for AliasCollector {
    type Break = Infallible;

    fn pre_visit_table_factor(&mut self, table_factor: &TableFactor) -> ControlFlow<Infallible> {
        // table-valued function calls carry `args` and are not tables
        if let TableFactor::Table {
            name,
            alias: Some(alias),
            args: None,
            ..
        } = table_factor
        {
            if let Some(base) = name.0.last() {
                trace!(alias = %alias.name.value, table = %base.value, "alias");
                self.map.insert(&alias.name.value, &base.value);
            }
        }
        ControlFlow::Continue(())
    }
}
