//! Records produced by the analysis

mod modification;
mod procedure;

pub use modification::{Action, ModificationRecord, TableTarget};
pub use procedure::{ProcedureName, ProcedureParameter, ProcedureSignature};
