use std::collections::HashSet;

use crate::locator::DocumentLocator;
use crate::model::Statement;
use crate::writer::{ExtractionContext, HandlerError, TripleHandler};

/// Keeps every statement in memory, tagged with the extractor that produced it.
#[derive(Debug, Default)]
pub struct CollectingHandler {
    statements: Vec<(String, Statement)>,
    namespaces: Vec<(String, String)>,
    open: HashSet<String>,
    closed: Vec<String>,
    documents: Vec<DocumentLocator>,
}

impl CollectingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().map(|(_, statement)| statement)
    }

    pub fn statements_from<'a>(&'a self, extractor: &'a str) -> impl Iterator<Item = &'a Statement> {
        self.statements
            .iter()
            .filter(move |(name, _)| name == extractor)
            .map(|(_, statement)| statement)
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn namespaces(&self) -> &[(String, String)] {
        &self.namespaces
    }

    /// Extractor names in the order their contexts were closed.
    pub fn closed_contexts(&self) -> &[String] {
        &self.closed
    }

    pub fn has_open_contexts(&self) -> bool {
        !self.open.is_empty()
    }

    pub fn finished_documents(&self) -> &[DocumentLocator] {
        &self.documents
    }

    pub fn into_statements(self) -> Vec<Statement> {
        self.statements.into_iter().map(|(_, statement)| statement).collect()
    }
}

impl TripleHandler for CollectingHandler {
    fn open_context(&mut self, context: &ExtractionContext) -> Result<(), HandlerError> {
        self.open.insert(context.id());
        Ok(())
    }

    fn receive_statement(
        &mut self,
        context: &ExtractionContext,
        statement: &Statement,
    ) -> Result<(), HandlerError> {
        if !self.open.contains(&context.id()) {
            return Err(HandlerError::ContextNotOpen(context.id()));
        }
        self.statements
            .push((context.extractor.clone(), statement.clone()));
        Ok(())
    }

    fn receive_namespace(
        &mut self,
        _context: &ExtractionContext,
        prefix: &str,
        iri: &str,
    ) -> Result<(), HandlerError> {
        self.namespaces.push((prefix.to_string(), iri.to_string()));
        Ok(())
    }

    fn close_context(&mut self, context: &ExtractionContext) -> Result<(), HandlerError> {
        if !self.open.remove(&context.id()) {
            return Err(HandlerError::ContextNotOpen(context.id()));
        }
        self.closed.push(context.extractor.clone());
        Ok(())
    }

    fn end_document(&mut self, document: &DocumentLocator) -> Result<(), HandlerError> {
        self.documents.push(document.clone());
        Ok(())
    }
}

/// Counts statements without keeping them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountingHandler {
    pub statements: usize,
    pub contexts: usize,
}

impl CountingHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TripleHandler for CountingHandler {
    fn open_context(&mut self, _context: &ExtractionContext) -> Result<(), HandlerError> {
        self.contexts += 1;
        Ok(())
    }

    fn receive_statement(
        &mut self,
        _context: &ExtractionContext,
        _statement: &Statement,
    ) -> Result<(), HandlerError> {
        self.statements += 1;
        Ok(())
    }

    fn close_context(&mut self, _context: &ExtractionContext) -> Result<(), HandlerError> {
        Ok(())
    }
}
