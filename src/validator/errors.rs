use thiserror::Error;

use crate::dom::DomError;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A fix ran before the rule that fills its evidence key.
    #[error("no evidence recorded under '{key}'; run its rule before the fix")]
    MissingEvidence { key: &'static str },

    #[error("evidence under '{key}' has an unexpected type")]
    EvidenceType { key: &'static str },

    #[error("rule '{rule}' failed: {source}")]
    Rule {
        rule: &'static str,
        #[source]
        source: DomError,
    },

    #[error("fix '{fix}' failed: {source}")]
    Fix {
        fix: &'static str,
        #[source]
        source: DomError,
    },
}
