//! Script analysis: modification targets and procedure signatures

mod alias;
mod classifier;
mod modifications;
mod signature;

use tracing::debug;

use crate::error::AnalysisError;
use crate::model::{ModificationRecord, ProcedureSignature};
use crate::parser::parse_script;
use crate::tree::Script;

pub use alias::AliasMap;
pub use classifier::{classify, Classified};
pub use modifications::extract_modifications;
pub use signature::extract_signature;

/// Parse-then-extract entry point shared by every output surface
#[derive(Debug, Default, Clone, Copy)]
pub struct Analyzer;

impl Analyzer {
    pub fn new() -> Self {
        Self
    }

    /// Parse a script, reporting every syntax error at once
    pub fn parse(&self, sql: &str) -> Result<Script, AnalysisError> {
        let script = parse_script(sql)?;
        debug!(nodes = script.nodes.len(), "parsed script");
        Ok(script)
    }

    /// Insert, update and delete targets of a script
    pub fn modifications(&self, sql: &str) -> Result<Vec<ModificationRecord>, AnalysisError> {
        let script = self.parse(sql)?;
        Ok(extract_modifications(&script))
    }

    /// Signature of the procedure a script defines
    pub fn signature(&self, sql: &str) -> Result<ProcedureSignature, AnalysisError> {
        let script = self.parse(sql)?;
        extract_signature(&script)
    }
}
