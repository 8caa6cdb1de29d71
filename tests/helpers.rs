#![allow(dead_code)]

use std::cell::Cell;
use std::io::{self, Cursor, Read};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use harvest::dom::{DomDocument, ParseError, TagSoupParser, TreeParser};
use harvest::extractor::{
    BlindExtractor, Capability, DomExtractor, ExtractionResult, Extractor, ExtractorDescriptor,
    ExtractorError, ExtractorFactory, ExtractorGroup,
};
use harvest::locator::DocumentLocator;
use harvest::mime::{ContentType, ContentTypeDetector, SniffingDetector};
use harvest::model::Term;
use harvest::stream::ByteSource;

pub const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Test</title><meta name="og:title" content="Test"></head>
<body><p>Hello World</p></body></html>"#;

pub type Calls = Rc<Cell<usize>>;

/// In-memory source that counts how often it is opened.
pub struct CountingSource {
    bytes: Vec<u8>,
    opens: Calls,
}

impl CountingSource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> (Self, Calls) {
        let opens = Calls::default();
        let source = Self {
            bytes: bytes.into(),
            opens: Rc::clone(&opens),
        };
        (source, opens)
    }
}

impl ByteSource for CountingSource {
    fn open(&self, _locator: &DocumentLocator) -> io::Result<Box<dyn Read>> {
        self.opens.set(self.opens.get() + 1);
        Ok(Box::new(Cursor::new(self.bytes.clone())))
    }
}

pub struct CountingDetector {
    calls: Calls,
}

impl CountingDetector {
    pub fn new() -> (Self, Calls) {
        let calls = Calls::default();
        (
            Self {
                calls: Rc::clone(&calls),
            },
            calls,
        )
    }
}

impl ContentTypeDetector for CountingDetector {
    fn guess(
        &self,
        path_hint: Option<&str>,
        stream: &mut dyn Read,
        known: Option<&ContentType>,
    ) -> io::Result<ContentType> {
        self.calls.set(self.calls.get() + 1);
        SniffingDetector::new().guess(path_hint, stream, known)
    }
}

pub struct CountingParser {
    calls: Calls,
}

impl CountingParser {
    pub fn new() -> (Self, Calls) {
        let calls = Calls::default();
        (
            Self {
                calls: Rc::clone(&calls),
            },
            calls,
        )
    }
}

impl TreeParser for CountingParser {
    fn parse(
        &self,
        stream: &mut dyn Read,
        base: &DocumentLocator,
    ) -> Result<DomDocument, ParseError> {
        self.calls.set(self.calls.get() + 1);
        TagSoupParser::new().parse(stream, base)
    }
}

/// Marks the root element so later tree extractors can see the edit.
#[derive(Default)]
pub struct TreeMarker;

impl DomExtractor for TreeMarker {
    fn run(
        &mut self,
        document: &DomDocument,
        _result: &mut ExtractionResult<'_>,
    ) -> Result<(), ExtractorError> {
        if let Some(root) = document.document_element() {
            DomDocument::set_attribute(&root, "data-marker", "seen")?;
        }
        Ok(())
    }
}

/// Writes the root element's `data-marker` value, or "missing".
#[derive(Default)]
pub struct MarkerReader;

impl DomExtractor for MarkerReader {
    fn run(
        &mut self,
        document: &DomDocument,
        result: &mut ExtractionResult<'_>,
    ) -> Result<(), ExtractorError> {
        let marker = document
            .document_element()
            .and_then(|root| DomDocument::attribute(&root, "data-marker"))
            .unwrap_or_else(|| "missing".to_string());
        result.write(
            Term::from(document.base()),
            "http://example.com/marker",
            Term::literal(marker),
        )?;
        Ok(())
    }
}

/// Writes `property` values of every `<meta>` it finds.
#[derive(Default)]
pub struct MetaPropertyReader;

impl DomExtractor for MetaPropertyReader {
    fn run(
        &mut self,
        document: &DomDocument,
        result: &mut ExtractionResult<'_>,
    ) -> Result<(), ExtractorError> {
        for meta in document.select("meta[property]")? {
            if let Some(property) = DomDocument::attribute(&meta, "property") {
                result.write(
                    Term::from(document.base()),
                    "http://example.com/property",
                    Term::literal(property),
                )?;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FailingExtractor;

impl BlindExtractor for FailingExtractor {
    fn run(
        &mut self,
        _locator: &DocumentLocator,
        result: &mut ExtractionResult<'_>,
    ) -> Result<(), ExtractorError> {
        result.write(
            Term::iri("http://example.com/partial"),
            "http://example.com/p",
            Term::literal("written before failing"),
        )?;
        Err(ExtractorError::Failed("boom".to_string()))
    }
}

struct RunCounter {
    runs: Arc<AtomicUsize>,
}

impl BlindExtractor for RunCounter {
    fn run(
        &mut self,
        _locator: &DocumentLocator,
        _result: &mut ExtractionResult<'_>,
    ) -> Result<(), ExtractorError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Blind extractor for all types that counts its runs.
pub fn counting_blind(name: &'static str) -> (ExtractorDescriptor, Arc<AtomicUsize>) {
    let runs = Arc::new(AtomicUsize::new(0));
    let shared = Arc::clone(&runs);
    let descriptor = ExtractorDescriptor::new(
        name,
        Capability::Blind,
        vec![harvest::mime::ANY],
        Box::new(move || {
            Extractor::Blind(Box::new(RunCounter {
                runs: Arc::clone(&shared),
            }))
        }),
    );
    (descriptor, runs)
}

pub fn group(descriptors: Vec<ExtractorDescriptor>) -> ExtractorGroup {
    descriptors
        .into_iter()
        .map(|d| Arc::new(d) as Arc<dyn ExtractorFactory>)
        .collect()
}
