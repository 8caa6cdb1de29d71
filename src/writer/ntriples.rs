use std::io::Write;

use crate::locator::DocumentLocator;
use crate::model::Statement;
use crate::writer::{ExtractionContext, HandlerError, TripleHandler};

/// Streams statements as N-Triples lines.
pub struct NTriplesWriter<W: Write> {
    out: W,
}

impl<W: Write> NTriplesWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TripleHandler for NTriplesWriter<W> {
    fn open_context(&mut self, _context: &ExtractionContext) -> Result<(), HandlerError> {
        Ok(())
    }

    fn receive_statement(
        &mut self,
        _context: &ExtractionContext,
        statement: &Statement,
    ) -> Result<(), HandlerError> {
        writeln!(self.out, "{statement}")?;
        Ok(())
    }

    fn close_context(&mut self, _context: &ExtractionContext) -> Result<(), HandlerError> {
        self.out.flush()?;
        Ok(())
    }

    fn end_document(&mut self, _document: &DocumentLocator) -> Result<(), HandlerError> {
        self.out.flush()?;
        Ok(())
    }
}
