//! Insert, update and delete targets of a script

use sqlparser::ast::{
    Assignment, AssignmentTarget, Delete, FromTable, Ident, Insert, ObjectName, Statement,
    TableFactor, TableWithJoins,
};
use tracing::debug;

use super::alias::AliasMap;
use super::classifier::classify;
use crate::model::{ModificationRecord, TableTarget};
use crate::tree::Script;

/// Every modification in the script: all inserts, then all updates, then all
/// deletes, each group in document order.
///
/// Statements whose target is not a named table (table variables, table-valued
/// functions, derived tables) produce no record.
pub fn extract_modifications(script: &Script) -> Vec<ModificationRecord> {
    let classified = classify(script);
    let mut records = Vec::new();

    for statement in classified.inserts {
        if let Statement::Insert(insert) = statement {
            records.extend(insert_record(statement, insert));
        }
    }

    for statement in classified.updates {
        if let Statement::Update {
            table, assignments, ..
        } = statement
        {
            records.extend(update_record(statement, table, assignments));
        }
    }

    for statement in classified.deletes {
        if let Statement::Delete(delete) = statement {
            records.extend(delete_record(statement, delete));
        }
    }

    records
}

fn insert_record(statement: &Statement, insert: &Insert) -> Option<ModificationRecord> {
    let target = named_target(&insert.table_name, None)?;
    let aliases = AliasMap::build(statement);
    let record = ModificationRecord::insert(aliases.resolve(&target.base_name));
    debug!(table = %record.table, "insert");
    Some(record)
}

fn update_record(
    statement: &Statement,
    table: &TableWithJoins,
    assignments: &[Assignment],
) -> Option<ModificationRecord> {
    let target = table_factor_target(&table.relation)?;
    debug!(%target, "update target");
    let aliases = AliasMap::build(statement);
    let record = ModificationRecord::update(
        aliases.resolve(&target.base_name),
        assigned_columns(assignments),
    );
    debug!(table = %record.table, columns = ?record.columns, "update");
    Some(record)
}

fn delete_record(statement: &Statement, delete: &Delete) -> Option<ModificationRecord> {
    // `DELETE a FROM t a ...` names its target before FROM
    let target = match delete.tables.first() {
        Some(name) => named_target(name, None),
        None => {
            let from = match &delete.from {
                FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => tables,
            };
            from.first()
                .and_then(|table| table_factor_target(&table.relation))
        }
    }?;
    debug!(%target, "delete target");

    let aliases = AliasMap::build(statement);
    let record = ModificationRecord::delete(aliases.resolve(&target.base_name));
    debug!(table = %record.table, "delete");
    Some(record)
}

/// Last segment of every column written by SET, in clause order
fn assigned_columns(assignments: &[Assignment]) -> Vec<String> {
    assignments
        .iter()
        .filter_map(|assignment| match &assignment.target {
            AssignmentTarget::ColumnName(name) => name.0.last(),
            AssignmentTarget::Tuple(_) => None,
        })
        .filter(|column| !column.value.starts_with('@'))
        .map(|column| column.value.clone())
        .collect()
}

fn table_factor_target(factor: &TableFactor) -> Option<TableTarget> {
    match factor {
        TableFactor::Table {
            name,
            alias,
            args: None,
            ..
        } => named_target(name, alias.as_ref().map(|alias| &alias.name)),
        other => {
            debug!(relation = %other, "skipping target that is not a named table");
            None
        }
    }
}

fn named_target(name: &ObjectName, alias: Option<&Ident>) -> Option<TableTarget> {
    let target = TableTarget::from_object_name(name, alias)?;
    if target.is_table_variable() {
        debug!(table = %target, "skipping table variable target");
        return None;
    }
    Some(target)
}
