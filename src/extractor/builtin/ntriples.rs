use std::io::{BufRead, BufReader, Read};

use crate::extractor::{ContentExtractor, ExtractionResult, ExtractorError};
use crate::locator::DocumentLocator;
use crate::model::{Statement, Term};

/// Streams an N-Triples document line by line.
///
/// Stops at the first malformed line; statements from earlier lines have
/// already been written.
#[derive(Debug, Clone, Copy, Default)]
pub struct NTriplesExtractor;

impl ContentExtractor for NTriplesExtractor {
    fn run(
        &mut self,
        stream: &mut dyn Read,
        _locator: &DocumentLocator,
        result: &mut ExtractionResult<'_>,
    ) -> Result<(), ExtractorError> {
        let reader = BufReader::new(stream);
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if let Some(statement) = parse_line(&line, index + 1)? {
                result.write_statement(&statement)?;
            }
        }
        Ok(())
    }
}

/// Parses one N-Triples line. Blank lines and comments yield `None`.
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<Statement>, ExtractorError> {
    let mut parser = LineParser {
        rest: line,
        line: line_number,
    };
    parser.skip_whitespace();
    if parser.rest.is_empty() || parser.rest.starts_with('#') {
        return Ok(None);
    }

    let subject = match parser.peek() {
        Some('<') => Term::iri(parser.iri()?),
        Some('_') => Term::blank(parser.blank()?),
        _ => return Err(parser.error("expected IRI or blank node as subject")),
    };
    parser.skip_whitespace();
    if parser.peek() != Some('<') {
        return Err(parser.error("expected IRI as predicate"));
    }
    let predicate = parser.iri()?;
    parser.skip_whitespace();
    let object = match parser.peek() {
        Some('<') => Term::iri(parser.iri()?),
        Some('_') => Term::blank(parser.blank()?),
        Some('"') => parser.literal()?,
        _ => return Err(parser.error("expected IRI, blank node or literal as object")),
    };
    parser.skip_whitespace();
    if !parser.eat('.') {
        return Err(parser.error("expected '.' after object"));
    }
    parser.skip_whitespace();
    if !parser.rest.is_empty() && !parser.rest.starts_with('#') {
        return Err(parser.error("unexpected content after '.'"));
    }

    Ok(Some(Statement::new(subject, predicate, object)))
}

struct LineParser<'a> {
    rest: &'a str,
    line: usize,
}

impl LineParser<'_> {
    fn error(&self, message: &str) -> ExtractorError {
        ExtractorError::Syntax {
            line: self.line,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn eat(&mut self, c: char) -> bool {
        match self.rest.strip_prefix(c) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start_matches([' ', '\t']);
    }

    fn iri(&mut self) -> Result<String, ExtractorError> {
        self.eat('<');
        let end = self
            .rest
            .find('>')
            .ok_or_else(|| self.error("unterminated IRI"))?;
        let raw = &self.rest[..end];
        if raw.is_empty() || raw.chars().any(|c| c.is_whitespace() || c == '<' || c == '"') {
            return Err(self.error("invalid character in IRI"));
        }
        let value = self.unescape(raw)?;
        self.rest = &self.rest[end + 1..];
        Ok(value)
    }

    fn blank(&mut self) -> Result<String, ExtractorError> {
        if !self.rest.starts_with("_:") {
            return Err(self.error("expected '_:' blank node prefix"));
        }
        let rest = self.rest;
        let label = &rest[2..];
        let mut end = label
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.')))
            .unwrap_or(label.len());
        // a label cannot end with '.'; that one terminates the statement
        while label[..end].ends_with('.') {
            end -= 1;
        }
        if end == 0 {
            return Err(self.error("empty blank node label"));
        }
        let id = label[..end].to_string();
        self.rest = &label[end..];
        Ok(id)
    }

    fn literal(&mut self) -> Result<Term, ExtractorError> {
        self.eat('"');
        let mut end = None;
        let mut escaped = false;
        for (i, c) in self.rest.char_indices() {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => {
                    end = Some(i);
                    break;
                }
                _ => {}
            }
        }
        let end = end.ok_or_else(|| self.error("unterminated literal"))?;
        let value = self.unescape(&self.rest[..end])?;
        self.rest = &self.rest[end + 1..];

        if self.eat('@') {
            let len = self
                .rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                .unwrap_or(self.rest.len());
            if len == 0 {
                return Err(self.error("empty language tag"));
            }
            let rest = self.rest;
            let language = &rest[..len];
            self.rest = &rest[len..];
            return Ok(Term::lang_literal(value, language));
        }
        if let Some(rest) = self.rest.strip_prefix("^^") {
            self.rest = rest;
            if self.peek() != Some('<') {
                return Err(self.error("expected datatype IRI after '^^'"));
            }
            let datatype = self.iri()?;
            return Ok(Term::typed_literal(value, datatype));
        }
        Ok(Term::literal(value))
    }

    fn unescape(&self, raw: &str) -> Result<String, ExtractorError> {
        if !raw.contains('\\') {
            return Ok(raw.to_string());
        }
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            let decoded = match chars.next() {
                Some('t') => '\t',
                Some('b') => '\u{8}',
                Some('n') => '\n',
                Some('r') => '\r',
                Some('f') => '\u{c}',
                Some('"') => '"',
                Some('\'') => '\'',
                Some('\\') => '\\',
                Some('u') => self.code_point(&mut chars, 4)?,
                Some('U') => self.code_point(&mut chars, 8)?,
                _ => return Err(self.error("invalid escape sequence")),
            };
            out.push(decoded);
        }
        Ok(out)
    }

    fn code_point(
        &self,
        chars: &mut std::str::Chars<'_>,
        digits: usize,
    ) -> Result<char, ExtractorError> {
        let hex: String = chars.by_ref().take(digits).collect();
        if hex.len() != digits {
            return Err(self.error("truncated unicode escape"));
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error("invalid unicode escape"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{CollectingHandler, ExtractionContext};
    use std::io::Cursor;

    fn parse(line: &str) -> Statement {
        parse_line(line, 1).unwrap().unwrap()
    }

    #[test]
    fn test_parses_each_object_form() {
        assert_eq!(
            parse("<http://a> <http://p> <http://b> .").object,
            Term::iri("http://b")
        );
        assert_eq!(parse("_:x <http://p> _:y.").object, Term::blank("y"));
        assert_eq!(
            parse(r#"<http://a> <http://p> "café \"x\""@FR ."#).object,
            Term::lang_literal("café \"x\"", "fr")
        );
        assert_eq!(
            parse(r#"<http://a> <http://p> "1"^^<http://www.w3.org/2001/XMLSchema#integer> . # c"#)
                .object,
            Term::typed_literal("1", "http://www.w3.org/2001/XMLSchema#integer")
        );
    }

    #[test]
    fn test_skips_blank_and_comment_lines() {
        assert!(parse_line("   ", 1).unwrap().is_none());
        assert!(parse_line("# comment", 1).unwrap().is_none());
    }

    #[test]
    fn test_reports_line_of_first_error() {
        for (line, input) in [
            (3, "<http://a> <http://p> <http://b>"),
            (4, "<http://a> \"p\" <http://b> ."),
            (5, "<http://a> <http://p> \"open ."),
            (6, "<http://a b> <http://p> <http://b> ."),
            (7, "<http://a> <http://p> <http://b> . extra"),
        ] {
            match parse_line(input, line) {
                Err(ExtractorError::Syntax { line: reported, .. }) => assert_eq!(reported, line),
                other => panic!("expected syntax error for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_extractor_stops_at_first_bad_line() {
        let document = "<http://a> <http://p> <http://b> .\n\nnot a triple\n<http://c> <http://p> <http://d> .\n";
        let locator = DocumentLocator::parse("http://example.com/data.nt").unwrap();
        let mut sink = CollectingHandler::new();
        let context = ExtractionContext::new(locator.clone(), "ntriples");
        let mut result = ExtractionResult::open(context, &mut sink).unwrap();

        let err = NTriplesExtractor
            .run(&mut Cursor::new(document), &locator, &mut result)
            .unwrap_err();
        drop(result);

        assert!(matches!(err, ExtractorError::Syntax { line: 3, .. }));
        assert_eq!(sink.len(), 1);
    }
}
