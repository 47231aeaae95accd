//! sqlimpact-core: T-SQL script impact analysis library
//!
//! This library parses T-SQL scripts and reports which tables their insert,
//! update and delete statements modify (through aliases, joins and procedure
//! bodies), along with the signature of the stored procedure they define.

pub mod analyzer;
pub mod error;
pub mod model;
pub mod parser;
pub mod tree;

pub use analyzer::Analyzer;
pub use error::{AnalysisError, Span, SyntaxError};
pub use model::{
    Action, ModificationRecord, ProcedureName, ProcedureParameter, ProcedureSignature, TableTarget,
};
pub use parser::parse_script;
pub use tree::Script;
