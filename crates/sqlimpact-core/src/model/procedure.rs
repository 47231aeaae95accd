//! Stored procedure signatures

use serde::{Serialize, Serializer};
use sqlparser::ast::{DataType, ObjectName};

use crate::tree::ParameterDeclaration;

/// Procedure name with optional schema, displayed as `[schema].[name]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcedureName {
    pub schema_name: Option<String>,
    pub base_name: String,
}

impl ProcedureName {
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            schema_name: None,
            base_name: base_name.into(),
        }
    }

    pub fn with_schema(schema_name: impl Into<String>, base_name: impl Into<String>) -> Self {
        Self {
            schema_name: Some(schema_name.into()),
            base_name: base_name.into(),
        }
    }

    pub fn from_object_name(name: &ObjectName) -> Self {
        match name.0.as_slice() {
            [.., schema, base] => ProcedureName::with_schema(&schema.value, &base.value),
            [base] => ProcedureName::new(&base.value),
            [] => ProcedureName::new(String::new()),
        }
    }
}

impl std::fmt::Display for ProcedureName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.schema_name {
            Some(schema) => write!(f, "[{}].[{}]", schema, self.base_name),
            None => write!(f, "[{}]", self.base_name),
        }
    }
}

impl Serialize for ProcedureName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A declared procedure parameter: name without `@`, base type identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcedureParameter {
    pub name: String,
    #[serde(rename = "Type")]
    pub data_type: String,
}

impl ProcedureParameter {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    pub fn from_declaration(declaration: &ParameterDeclaration) -> Self {
        let name = &declaration.name.value;
        Self {
            name: name.strip_prefix('@').unwrap_or(name).to_string(),
            data_type: base_type_name(&declaration.data_type),
        }
    }
}

impl std::fmt::Display for ProcedureParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : {}", self.name, self.data_type)
    }
}

/// Name and ordered parameters of the procedure a script defines
///
/// `name` is `None` when the script contains no procedure definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcedureSignature {
    pub name: Option<ProcedureName>,
    pub parameters: Vec<ProcedureParameter>,
}

/// Base identifier of a declared type, without length/precision arguments.
///
/// Built-in and bare type names are lowercased; quoted or schema-qualified
/// user-defined types keep their last segment as written.
fn base_type_name(data_type: &DataType) -> String {
    match data_type {
        DataType::Custom(name, _) => match name.0.as_slice() {
            [ident] if ident.quote_style.is_none() => ident.value.to_lowercase(),
            parts => parts
                .last()
                .map(|ident| ident.value.clone())
                .unwrap_or_default(),
        },
        other => {
            let rendered = other.to_string();
            rendered
                .split('(')
                .next()
                .unwrap_or(&rendered)
                .trim()
                .to_lowercase()
        }
    }
}
