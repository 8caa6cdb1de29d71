use serde::Serialize;
use std::fmt;
use std::io;
use thiserror::Error;

use crate::dom::{DomError, ParseError};
use crate::extractor::Capability;
use crate::locator::LocatorError;
use crate::validator::ValidationError;
use crate::writer::HandlerError;

/// Where in a run an [`ExtractionError`] happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Construction,
    Detection,
    Caching,
    Parsing,
    Validation,
    Execution,
    Release,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Construction => "construction",
            Self::Detection => "detection",
            Self::Caching => "caching",
            Self::Parsing => "parsing",
            Self::Validation => "validation",
            Self::Execution => "execution",
            Self::Release => "release",
        })
    }
}

/// Failure raised by an extractor's own logic.
#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("output error: {0}")]
    Output(#[from] HandlerError),

    #[error("dom error: {0}")]
    Dom(#[from] DomError),

    #[error("syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("{0}")]
    Failed(String),
}

/// Failure of a whole [`SingleDocumentExtraction`](crate::extractor::SingleDocumentExtraction) run.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error(transparent)]
    InvalidLocator(#[from] LocatorError),

    #[error("io error during {phase}: {source}")]
    Io {
        phase: Phase,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse document: {0}")]
    Parse(#[source] ParseError),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("extractor '{extractor}' failed: {source}")]
    Extractor {
        extractor: &'static str,
        #[source]
        source: ExtractorError,
    },

    #[error(
        "extractor '{extractor}' declares {declared} capability but produced a {actual} extractor"
    )]
    UnsupportedCapability {
        extractor: &'static str,
        declared: Capability,
        actual: Capability,
    },

    #[error("cannot open output for extractor '{extractor}': {source}")]
    Output {
        extractor: &'static str,
        #[source]
        source: HandlerError,
    },

    #[error(
        "cannot release output of extractor '{extractor}': {source}{}",
        prior_suffix(.prior)
    )]
    Release {
        extractor: &'static str,
        #[source]
        source: HandlerError,
        prior: Option<Box<ExtractionError>>,
    },

    #[error("cannot finish document output: {0}")]
    Finish(#[source] HandlerError),
}

fn prior_suffix(prior: &Option<Box<ExtractionError>>) -> String {
    prior
        .as_ref()
        .map(|prior| format!(" (after: {prior})"))
        .unwrap_or_default()
}

impl ExtractionError {
    pub fn phase(&self) -> Phase {
        match self {
            Self::InvalidLocator(_) => Phase::Construction,
            Self::Io { phase, .. } => *phase,
            Self::Parse(_) => Phase::Parsing,
            Self::Validation(_) => Phase::Validation,
            Self::Extractor { .. } | Self::UnsupportedCapability { .. } | Self::Output { .. } => {
                Phase::Execution
            }
            Self::Release { .. } | Self::Finish(_) => Phase::Release,
        }
    }

    /// Name of the extractor the failure is attributed to, if any.
    pub fn extractor(&self) -> Option<&'static str> {
        match self {
            Self::Extractor { extractor, .. }
            | Self::UnsupportedCapability { extractor, .. }
            | Self::Output { extractor, .. }
            | Self::Release { extractor, .. } => Some(*extractor),
            _ => None,
        }
    }

    /// The execution failure a release failure occurred after.
    pub fn prior(&self) -> Option<&ExtractionError> {
        match self {
            Self::Release { prior, .. } => prior.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_error_keeps_prior_failure() {
        let prior = ExtractionError::Extractor {
            extractor: "broken",
            source: ExtractorError::Failed("boom".to_string()),
        };
        let err = ExtractionError::Release {
            extractor: "broken",
            source: HandlerError::Other("disk full".to_string()),
            prior: Some(Box::new(prior)),
        };

        assert_eq!(err.phase(), Phase::Release);
        assert_eq!(err.extractor(), Some("broken"));
        assert_eq!(err.prior().map(ExtractionError::phase), Some(Phase::Execution));
        let message = err.to_string();
        assert!(message.contains("disk full"));
        assert!(message.contains("boom"));
    }

    #[test]
    fn test_io_error_reports_its_phase() {
        let err = ExtractionError::Io {
            phase: Phase::Detection,
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.phase(), Phase::Detection);
        assert_eq!(err.extractor(), None);
        assert_eq!(err.to_string(), "io error during detection: gone");
    }
}
