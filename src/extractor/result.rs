use serde::Serialize;
use tracing::warn;

use crate::locator::DocumentLocator;
use crate::model::{Statement, Term};
use crate::writer::{ExtractionContext, HandlerError, TripleHandler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueLevel {
    Warning,
    Error,
}

/// Non-fatal problem an extractor noticed in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub level: IssueLevel,
    pub message: String,
}

/// What one extractor contributed once its output was released.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub statements: usize,
    pub issues: Vec<Issue>,
}

/// Scoped output channel for one extractor run over one document.
///
/// Opening a result opens its context on the sink; [`close`](Self::close)
/// closes it. A result that is dropped without being closed, including while
/// unwinding, closes the context itself and logs any failure.
pub struct ExtractionResult<'h> {
    context: ExtractionContext,
    handler: &'h mut dyn TripleHandler,
    statements: usize,
    issues: Vec<Issue>,
    closed: bool,
}

impl<'h> ExtractionResult<'h> {
    pub fn open(
        context: ExtractionContext,
        handler: &'h mut dyn TripleHandler,
    ) -> Result<Self, HandlerError> {
        handler.open_context(&context)?;
        Ok(Self {
            context,
            handler,
            statements: 0,
            issues: Vec::new(),
            closed: false,
        })
    }

    pub fn context(&self) -> &ExtractionContext {
        &self.context
    }

    pub fn document(&self) -> &DocumentLocator {
        &self.context.document
    }

    pub fn write_statement(&mut self, statement: &Statement) -> Result<(), HandlerError> {
        self.handler.receive_statement(&self.context, statement)?;
        self.statements += 1;
        Ok(())
    }

    pub fn write(
        &mut self,
        subject: Term,
        predicate: impl Into<String>,
        object: Term,
    ) -> Result<(), HandlerError> {
        self.write_statement(&Statement::new(subject, predicate, object))
    }

    pub fn write_namespace(&mut self, prefix: &str, iri: &str) -> Result<(), HandlerError> {
        self.handler.receive_namespace(&self.context, prefix, iri)
    }

    pub fn notify_issue(&mut self, level: IssueLevel, message: impl Into<String>) {
        let message = message.into();
        warn!(
            document = %self.context.document,
            extractor = %self.context.extractor,
            ?level,
            "{message}"
        );
        self.issues.push(Issue { level, message });
    }

    pub fn statement_count(&self) -> usize {
        self.statements
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Closes the context and reports what was written.
    pub fn close(mut self) -> Result<ResultSummary, HandlerError> {
        self.closed = true;
        let summary = ResultSummary {
            statements: self.statements,
            issues: std::mem::take(&mut self.issues),
        };
        self.handler.close_context(&self.context)?;
        Ok(summary)
    }
}

impl Drop for ExtractionResult<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.handler.close_context(&self.context) {
            warn!(context = %self.context.id(), error = %e, "Failed to close extraction context");
        }
    }
}
