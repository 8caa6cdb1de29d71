use serde::Serialize;
use std::io::Write;

use crate::locator::DocumentLocator;
use crate::model::{Statement, Term};
use crate::writer::{ExtractionContext, HandlerError, TripleHandler};

#[derive(Serialize)]
struct JsonStatement<'a> {
    document: &'a str,
    extractor: &'a str,
    subject: &'a Term,
    predicate: &'a Term,
    object: &'a Term,
}

/// Writes one JSON object per statement, tagged with its document and extractor.
pub struct JsonLinesWriter<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TripleHandler for JsonLinesWriter<W> {
    fn open_context(&mut self, _context: &ExtractionContext) -> Result<(), HandlerError> {
        Ok(())
    }

    fn receive_statement(
        &mut self,
        context: &ExtractionContext,
        statement: &Statement,
    ) -> Result<(), HandlerError> {
        let line = JsonStatement {
            document: context.document.as_str(),
            extractor: &context.extractor,
            subject: &statement.subject,
            predicate: &statement.predicate,
            object: &statement.object,
        };
        serde_json::to_writer(&mut self.out, &line)?;
        self.out.write_all(b"\n")?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_line_shape() {
        let mut writer = JsonLinesWriter::new(Vec::new());
        let ctx = ExtractionContext::new(
            DocumentLocator::parse("http://example.com/doc").unwrap(),
            "html-head-meta",
        );
        let statement = Statement::new(
            Term::iri("http://example.com/doc"),
            "http://purl.org/dc/terms/title",
            Term::lang_literal("Hello", "en"),
        );

        writer.receive_statement(&ctx, &statement).unwrap();

        let out = String::from_utf8(writer.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["document"], "http://example.com/doc");
        assert_eq!(value["extractor"], "html-head-meta");
        assert_eq!(value["object"]["language"], "en");
    }
}
