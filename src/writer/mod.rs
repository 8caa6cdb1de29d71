//! Statement sinks.
//!
//! A [`TripleHandler`] receives statements while extractors run. Each extractor
//! run is bracketed by `open_context`/`close_context` on the same
//! [`ExtractionContext`], so sinks can tell contributions apart.

pub mod collect;
pub mod json;
pub mod ntriples;
pub mod shared;

pub use collect::{CollectingHandler, CountingHandler};
pub use json::JsonLinesWriter;
pub use ntriples::NTriplesWriter;
pub use shared::SharedHandler;

use serde::Serialize;
use thiserror::Error;

use crate::locator::DocumentLocator;
use crate::model::Statement;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("context '{0}' is not open")]
    ContextNotOpen(String),

    #[error("sink lock poisoned")]
    Poisoned,

    #[error("{0}")]
    Other(String),
}

/// Identifies one extractor's contribution for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionContext {
    pub document: DocumentLocator,
    pub extractor: String,
}

impl ExtractionContext {
    pub fn new(document: DocumentLocator, extractor: impl Into<String>) -> Self {
        Self {
            document,
            extractor: extractor.into(),
        }
    }

    pub fn id(&self) -> String {
        format!("{}#{}", self.document, self.extractor)
    }
}

pub trait TripleHandler {
    fn open_context(&mut self, context: &ExtractionContext) -> Result<(), HandlerError>;

    fn receive_statement(
        &mut self,
        context: &ExtractionContext,
        statement: &Statement,
    ) -> Result<(), HandlerError>;

    fn receive_namespace(
        &mut self,
        _context: &ExtractionContext,
        _prefix: &str,
        _iri: &str,
    ) -> Result<(), HandlerError> {
        Ok(())
    }

    fn close_context(&mut self, context: &ExtractionContext) -> Result<(), HandlerError>;

    /// Called once a document has been fully processed.
    fn end_document(&mut self, _document: &DocumentLocator) -> Result<(), HandlerError> {
        Ok(())
    }
}

impl<H: TripleHandler + ?Sized> TripleHandler for &mut H {
    fn open_context(&mut self, context: &ExtractionContext) -> Result<(), HandlerError> {
        (**self).open_context(context)
    }

    fn receive_statement(
        &mut self,
        context: &ExtractionContext,
        statement: &Statement,
    ) -> Result<(), HandlerError> {
        (**self).receive_statement(context, statement)
    }

    fn receive_namespace(
        &mut self,
        context: &ExtractionContext,
        prefix: &str,
        iri: &str,
    ) -> Result<(), HandlerError> {
        (**self).receive_namespace(context, prefix, iri)
    }

    fn close_context(&mut self, context: &ExtractionContext) -> Result<(), HandlerError> {
        (**self).close_context(context)
    }

    fn end_document(&mut self, document: &DocumentLocator) -> Result<(), HandlerError> {
        (**self).end_document(document)
    }
}

impl<H: TripleHandler + ?Sized> TripleHandler for Box<H> {
    fn open_context(&mut self, context: &ExtractionContext) -> Result<(), HandlerError> {
        (**self).open_context(context)
    }

    fn receive_statement(
        &mut self,
        context: &ExtractionContext,
        statement: &Statement,
    ) -> Result<(), HandlerError> {
        (**self).receive_statement(context, statement)
    }

    fn receive_namespace(
        &mut self,
        context: &ExtractionContext,
        prefix: &str,
        iri: &str,
    ) -> Result<(), HandlerError> {
        (**self).receive_namespace(context, prefix, iri)
    }

    fn close_context(&mut self, context: &ExtractionContext) -> Result<(), HandlerError> {
        (**self).close_context(context)
    }

    fn end_document(&mut self, document: &DocumentLocator) -> Result<(), HandlerError> {
        (**self).end_document(document)
    }
}
