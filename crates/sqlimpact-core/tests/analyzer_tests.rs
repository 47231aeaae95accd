// Integration tests for script analysis
use pretty_assertions::assert_eq;
use sqlimpact_core::analyzer::Analyzer;
use sqlimpact_core::error::AnalysisError;
use sqlimpact_core::model::{
    Action, ModificationRecord, ProcedureName, ProcedureParameter, ProcedureSignature,
};

fn modifications(sql: &str) -> Vec<ModificationRecord> {
    Analyzer::new()
        .modifications(sql)
        .unwrap_or_else(|e| panic!("analysis failed: {:?}", e))
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

// ========== Modifications ==========

#[test]
fn test_single_insert() {
    assert_eq!(
        modifications("INSERT INTO Orders (Id) VALUES (1)"),
        vec![ModificationRecord::insert("Orders")]
    );
}

#[test]
fn test_update_through_alias() {
    assert_eq!(
        modifications("UPDATE o SET o.Status = 'X' FROM Orders o WHERE o.Id = 1"),
        vec![ModificationRecord::update("Orders", columns(&["Status"]))]
    );
}

#[test]
fn test_single_delete() {
    assert_eq!(
        modifications("DELETE FROM Orders WHERE Id = 1"),
        vec![ModificationRecord::delete("Orders")]
    );
}

#[test]
fn test_no_modifications() {
    assert!(modifications("SELECT Id FROM Orders WHERE Id = 1").is_empty());
    assert!(modifications("").is_empty());
}

#[test]
fn test_inserts_keep_script_order() {
    let records = modifications(
        "INSERT INTO a (x) VALUES (1);\nINSERT INTO b (x) VALUES (1);\nINSERT INTO c (x) VALUES (1);",
    );
    let tables: Vec<&str> = records.iter().map(|r| r.table.as_str()).collect();
    assert_eq!(tables, vec!["a", "b", "c"]);
    assert!(records.iter().all(|r| r.action == Action::Insert));
}

#[test]
fn test_actions_are_grouped() {
    let records = modifications(
        r#"
        DELETE FROM Queue WHERE Done = 1
        UPDATE Orders SET Status = 'Closed', ClosedAt = GETDATE() WHERE Id = 7
        INSERT INTO History (OrderId) VALUES (7)
        GO
        UPDATE c SET c.Balance = 0 FROM Customers AS c JOIN Orders o ON o.CustomerId = c.Id
        INSERT INTO Audit (Message) SELECT s.Message FROM Staging s
        "#,
    );

    assert_eq!(
        records,
        vec![
            ModificationRecord::insert("History"),
            ModificationRecord::insert("Audit"),
            ModificationRecord::update("Orders", columns(&["Status", "ClosedAt"])),
            ModificationRecord::update("Customers", columns(&["Balance"])),
            ModificationRecord::delete("Queue"),
        ]
    );
}

#[test]
fn test_update_column_count_matches_column_assignments() {
    let records = modifications("UPDATE t SET a = 1, t.b = 2, [dbo].[t].[c] = 3, @v = 4");
    assert_eq!(records[0].columns, Some(columns(&["a", "b", "c"])));
}

#[test]
fn test_alias_declared_in_subquery() {
    let records = modifications(
        "DELETE x FROM Orders x WHERE x.CustomerId IN (SELECT c.Id FROM Customers c WHERE c.Inactive = 1)",
    );
    assert_eq!(records, vec![ModificationRecord::delete("Orders")]);
}

#[test]
fn test_temporary_tables_are_reported() {
    let records = modifications("INSERT INTO #work (Id) VALUES (1)");
    assert_eq!(records, vec![ModificationRecord::insert("#work")]);
}

#[test]
fn test_table_variable_targets_are_skipped() {
    let records = modifications(
        "INSERT INTO @ids (Id) SELECT Id FROM Orders\nUPDATE Orders SET Flag = 1",
    );
    assert_eq!(
        records,
        vec![ModificationRecord::update("Orders", columns(&["Flag"]))]
    );
}

#[test]
fn test_procedure_body_modifications() {
    let records = modifications(
        r#"
CREATE PROCEDURE dbo.ArchiveOrder
    @id INT
AS
BEGIN
    INSERT INTO dbo.OrderArchive (Id) SELECT Id FROM dbo.Orders WHERE Id = @id;
    DELETE o FROM dbo.Orders o WHERE o.Id = @id;
END
"#,
    );
    assert_eq!(
        records,
        vec![
            ModificationRecord::insert("OrderArchive"),
            ModificationRecord::delete("Orders"),
        ]
    );
}

// ========== Control of flow ==========

#[test]
fn test_if_else_branches() {
    assert_eq!(
        modifications("IF 1 = 1 UPDATE Orders SET Status = 1"),
        vec![ModificationRecord::update("Orders", columns(&["Status"]))]
    );
    assert_eq!(
        modifications(
            "IF EXISTS (SELECT 1 FROM Orders WHERE Id = @id)\n    UPDATE Orders SET Status = 2 WHERE Id = @id\nELSE\n    INSERT INTO Orders (Id, Status) VALUES (@id, 2)"
        ),
        vec![
            ModificationRecord::insert("Orders"),
            ModificationRecord::update("Orders", columns(&["Status"])),
        ]
    );
}

#[test]
fn test_while_loop_body() {
    assert_eq!(
        modifications("WHILE 1 = 0 DELETE FROM c"),
        vec![ModificationRecord::delete("c")]
    );
}

#[test]
fn test_try_catch_blocks() {
    let records = modifications(
        r#"
BEGIN TRY
    BEGIN TRANSACTION;
    DELETE FROM Queue WHERE Processed = 1
    COMMIT TRANSACTION;
END TRY
BEGIN CATCH
    ROLLBACK TRANSACTION;
    INSERT INTO ErrorLog (Message) VALUES (ERROR_MESSAGE());
END CATCH
"#,
    );
    assert_eq!(
        records,
        vec![
            ModificationRecord::insert("ErrorLog"),
            ModificationRecord::delete("Queue"),
        ]
    );
}

#[test]
fn test_procedure_with_control_flow_body() {
    let sql = r#"
CREATE PROCEDURE dbo.SyncOrder
    @id INT,
    @mode INT = 0
AS
BEGIN
    SET NOCOUNT ON;

    IF @mode = 1
    BEGIN
        UPDATE o SET o.Status = 3, o.Touched = 1 FROM dbo.Orders o WHERE o.Id = @id
        BEGIN
            DELETE FROM dbo.Pending WHERE OrderId = @id
        END
    END
    ELSE
        INSERT INTO dbo.Pending (OrderId) VALUES (@id)
END
"#;
    assert_eq!(
        modifications(sql),
        vec![
            ModificationRecord::insert("Pending"),
            ModificationRecord::update("Orders", columns(&["Status", "Touched"])),
            ModificationRecord::delete("Pending"),
        ]
    );

    let signature = Analyzer::new().signature(sql).unwrap();
    assert_eq!(signature.name, Some(ProcedureName::with_schema("dbo", "SyncOrder")));
    assert_eq!(signature.parameters.len(), 2);
}

#[test]
fn test_cte_prefixed_modifications() {
    assert_eq!(
        modifications("WITH c AS (SELECT Id FROM Orders) UPDATE Orders SET Status = 1"),
        vec![ModificationRecord::update("Orders", columns(&["Status"]))]
    );
    assert_eq!(
        modifications("WITH c AS (SELECT Id FROM Orders) INSERT INTO Archive (Id) SELECT Id FROM c"),
        vec![ModificationRecord::insert("Archive")]
    );
}

#[test]
fn test_top_and_output_clauses() {
    assert_eq!(
        modifications("UPDATE TOP (10) Orders SET Status = 1"),
        vec![ModificationRecord::update("Orders", columns(&["Status"]))]
    );
    assert_eq!(
        modifications("UPDATE Orders SET Status = 1 OUTPUT inserted.Id"),
        vec![ModificationRecord::update("Orders", columns(&["Status"]))]
    );
    assert_eq!(
        modifications("DELETE TOP (100) FROM Log OUTPUT deleted.* INTO LogArchive WHERE Old = 1"),
        vec![ModificationRecord::delete("Log")]
    );
}

#[test]
fn test_delete_without_from() {
    assert_eq!(
        modifications("DELETE Orders WHERE Id = 1"),
        vec![ModificationRecord::delete("Orders")]
    );
}

// ========== Signatures ==========

#[test]
fn test_procedure_signature() {
    let signature = Analyzer::new()
        .signature("CREATE PROCEDURE dbo.Foo (@a INT, @b VARCHAR(10)) AS SELECT 1")
        .unwrap();
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
    assert_eq!(
        serde_json::to_string(&signature).unwrap(),
        r#"{"Name":"[dbo].[Foo]","Parameters":[{"Name":"a","Type":"int"},{"Name":"b","Type":"varchar"}]}"#
    );
}

#[test]
fn test_signature_after_preamble_batches() {
    let signature = Analyzer::new()
        .signature(
            "SET ANSI_NULLS ON\nGO\nSET QUOTED_IDENTIFIER ON\nGO\nDROP PROCEDURE IF EXISTS Refresh\nGO\nCREATE OR ALTER PROC Refresh\n  @since DATETIME = NULL,\n  @count INT OUTPUT\nAS\nUPDATE Cache SET Stale = 1",
        )
        .unwrap();
    assert_eq!(signature.name, Some(ProcedureName::new("Refresh")));
    assert_eq!(
        signature.parameters,
        vec![
            ProcedureParameter::new("since", "datetime"),
            ProcedureParameter::new("count", "int"),
        ]
    );
}

#[test]
fn test_duplicate_procedures() {
    let error = Analyzer::new()
        .signature("CREATE PROCEDURE p1 AS SELECT 1\nGO\nCREATE PROCEDURE p2 AS SELECT 2")
        .unwrap_err();
    assert!(matches!(error, AnalysisError::DuplicateDefinition { .. }));
    assert_eq!(error.code(), "E2001");
}

#[test]
fn test_no_procedure_has_no_name() {
    let signature = Analyzer::new().signature("DELETE FROM Orders").unwrap();
    assert_eq!(signature, ProcedureSignature::default());
    assert_eq!(
        serde_json::to_string(&signature).unwrap(),
        r#"{"Name":null,"Parameters":[]}"#
    );
}

// ========== Syntax errors ==========

#[test]
fn test_syntax_error_blocks_extraction() {
    let error = Analyzer::new()
        .modifications("INSERT INTO Orders (Id) VALUES (1)\nGO\nUPDATE Orders SET WHERE Id = 1")
        .unwrap_err();
    let errors = error.syntax_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line(), 3);
    assert!(errors[0].column() > 1);
    assert!(errors[0].to_string().contains(" Line:3:"));
}

#[test]
fn test_syntax_error_blocks_signature() {
    let error = Analyzer::new()
        .signature("CREATE PROCEDURE dbo.Foo (@a INT AS SELECT 1")
        .unwrap_err();
    assert_eq!(error.code(), "E1000");
}
