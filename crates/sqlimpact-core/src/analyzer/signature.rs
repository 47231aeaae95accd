//! Stored procedure signature of a script

use tracing::debug;

use crate::error::AnalysisError;
use crate::model::{ProcedureName, ProcedureParameter, ProcedureSignature};
use crate::tree::Script;

/// Name and parameters of the script's procedure definition.
///
/// A script defines at most one procedure; a second definition anywhere in
/// the tree fails with [`AnalysisError::DuplicateDefinition`]. Without any
/// definition the signature has no name and no parameters.
pub fn extract_signature(script: &Script) -> Result<ProcedureSignature, AnalysisError> {
    let procedures = script.procedures();

    let Some(procedure) = procedures.first() else {
        debug!("no procedure definition");
        return Ok(ProcedureSignature::default());
    };

    if let Some(second) = procedures.get(1) {
        return Err(AnalysisError::DuplicateDefinition {
            first: ProcedureName::from_object_name(&procedure.name),
            second: ProcedureName::from_object_name(&second.name),
        });
    }

    let signature = ProcedureSignature {
        name: Some(ProcedureName::from_object_name(&procedure.name)),
        parameters: procedure
            .parameters
            .iter()
            .map(ProcedureParameter::from_declaration)
            .collect(),
    };
    debug!(
        procedure = %procedure.name,
        parameters = signature.parameters.len(),
        "signature"
    );
    Ok(signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_script;
    use pretty_assertions::assert_eq;

    fn extract(sql: &str) -> Result<ProcedureSignature, AnalysisError> {
        extract_signature(&parse_script(sql).unwrap())
    }

    #[test]
    fn test_signature() {
        let signature =
            extract("CREATE PROCEDURE dbo.Foo (@a INT, @b VARCHAR(10)) AS SELECT 1").unwrap();
        assert_eq!(
            signature,
            ProcedureSignature {
                name: Some(ProcedureName::with_schema("dbo", "Foo")),
                parameters: vec![
                    ProcedureParameter::new("a", "int"),
                    ProcedureParameter::new("b", "varchar"),
                ],
            }
        );
    }

    #[test]
    fn test_unqualified_name_and_user_type() {
        let signature = extract(
            "CREATE OR ALTER PROC Load @rows dbo.RowList READONLY, @when DATETIME2(7) = NULL OUTPUT AS\nDELETE FROM Staging",
        )
        .unwrap();
        assert_eq!(signature.name, Some(ProcedureName::new("Load")));
        assert_eq!(
            signature.parameters,
            vec![
                ProcedureParameter::new("rows", "RowList"),
                ProcedureParameter::new("when", "datetime2"),
            ]
        );
    }

    #[test]
    fn test_no_procedure() {
        let signature = extract("INSERT INTO Orders (Id) VALUES (1)").unwrap();
        assert_eq!(signature, ProcedureSignature::default());
    }

    #[test]
    fn test_two_procedures_fail() {
        let error = extract("CREATE PROCEDURE a AS SELECT 1\nGO\nCREATE PROCEDURE dbo.b AS SELECT 2")
            .unwrap_err();
        match error {
            AnalysisError::DuplicateDefinition { first, second } => {
                assert_eq!(first, ProcedureName::new("a"));
                assert_eq!(second, ProcedureName::with_schema("dbo", "b"));
            }
            other => panic!("expected a duplicate definition, got {:?}", other),
        }
    }
}
