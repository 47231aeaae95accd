//! Table modification records

use serde::{Deserialize, Serialize};
use sqlparser::ast::{Ident, ObjectName};

/// A table reference as written in source text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableTarget {
    pub schema: Option<String>,
    pub base_name: String,
    pub alias: Option<String>,
}

impl TableTarget {
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            schema: None,
            base_name: base_name.into(),
            alias: None,
        }
    }

    pub fn with_schema(schema: impl Into<String>, base_name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            base_name: base_name.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Build a target from a multi-part name (`server.db.schema.table`).
    ///
    /// Only the last two parts are retained. Returns `None` for an empty name.
    pub fn from_object_name(name: &ObjectName, alias: Option<&Ident>) -> Option<Self> {
        let target = match name.0.as_slice() {
            [] => return None,
            [table] => TableTarget::new(&table.value),
            [.., schema, table] => TableTarget::with_schema(&schema.value, &table.value),
        };

        Some(match alias {
            Some(alias) => target.with_alias(&alias.value),
            None => target,
        })
    }

    /// `@name` references a table variable rather than a named table
    pub fn is_table_variable(&self) -> bool {
        self.base_name.starts_with('@')
    }

    /// `#name` / `##name` references a temporary table
    pub fn is_temporary(&self) -> bool {
        self.base_name.starts_with('#')
    }
}

impl std::fmt::Display for TableTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{}.{}", schema, self.base_name)?;
        } else {
            write!(f, "{}", self.base_name)?;
        }
        if let Some(alias) = &self.alias {
            write!(f, " AS {}", alias)?;
        }
        Ok(())
    }
}

/// Kind of data modification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Insert => write!(f, "Insert"),
            Action::Update => write!(f, "Update"),
            Action::Delete => write!(f, "Delete"),
        }
    }
}

/// One data-modification statement: resolved table, action, written columns
///
/// `columns` is only present for [`Action::Update`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModificationRecord {
    pub table: String,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
}

impl ModificationRecord {
    pub fn insert(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            action: Action::Insert,
            columns: None,
        }
    }

    pub fn update(table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            table: table.into(),
            action: Action::Update,
            columns: Some(columns),
        }
    }

    pub fn delete(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            action: Action::Delete,
            columns: None,
        }
    }
}
