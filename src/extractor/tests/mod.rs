use std::fs;
use std::sync::Arc;

use crate::extractor::{ExtractorRegistry, SingleDocumentExtraction, builtin};
use crate::mime::{self, SniffingDetector};
use crate::model::vocab;
use crate::stream::{FileStreamCache, MemorySource};
use crate::validator::Validator;
use crate::writer::CollectingHandler;

fn fixture(name: &str) -> Vec<u8> {
    fs::read(format!("src/extractor/tests/fixtures/{name}")).expect("Failed to read test fixture")
}

fn article_extraction() -> SingleDocumentExtraction<CollectingHandler> {
    SingleDocumentExtraction::new(
        MemorySource::new(fixture("article.html")),
        "https://example.com/articles/sample",
        ExtractorRegistry::with_defaults().group(),
        CollectingHandler::new(),
    )
    .unwrap()
    .with_detector(SniffingDetector::new())
}

#[test]
fn test_article_with_default_extractors() {
    let mut extraction = article_extraction();
    let report = extraction.run().unwrap();

    assert_eq!(report.detected_content_type, Some(mime::TEXT_HTML));
    assert_eq!(
        report.extractor_names(),
        ["document-origin", "html-head-meta", "html-license"]
    );
    assert_eq!(report.statements(), 7);
    assert!(report.validation.is_none());

    // the misused meta name is reported, not emitted
    let issues: Vec<_> = report.issues().collect();
    assert_eq!(issues.len(), 1);
    assert!(issues[0].message.contains("og:title"));

    let output = extraction.output();
    let licenses: Vec<_> = output
        .statements_from("html-license")
        .filter_map(|s| s.object.as_iri())
        .collect();
    assert_eq!(
        licenses,
        [
            "https://example.com/licenses/cc-by",
            "https://creativecommons.org/licenses/by/4.0/",
        ]
    );
    assert_eq!(output.finished_documents().len(), 1);
    assert!(!output.has_open_contexts());
}

#[test]
fn test_article_with_validation_fixes() {
    let mut extraction = article_extraction().with_validator(Validator::with_default_rules(), true);
    let report = extraction.run().unwrap();

    let validation = report.validation.as_ref().unwrap();
    assert!(validation.activated("meta-name-misuse"));
    assert!(validation.activated("missing-opengraph-namespace"));
    assert!(validation.activated("about-not-iri"));
    assert_eq!(validation.fixes_applied(), 2);

    assert_eq!(report.issues().count(), 0);
    let og_title = extraction
        .output()
        .statements_from("html-head-meta")
        .find(|s| s.predicate.as_iri() == Some("http://ogp.me/ns#title"))
        .map(|s| s.object.to_string());
    assert_eq!(og_title.as_deref(), Some(r#""Sample Article"@en"#));

    let root = extraction.document().unwrap().document_element().unwrap();
    assert_eq!(
        crate::dom::DomDocument::attribute(&root, "xmlns:og").as_deref(),
        Some(vocab::OPEN_GRAPH)
    );
}

#[test]
fn test_validation_report_only_leaves_tree_untouched() {
    let mut extraction =
        article_extraction().with_validator(Validator::with_default_rules(), false);
    let report = extraction.run().unwrap();

    let validation = report.validation.unwrap();
    assert_eq!(validation.activations.len(), 3);
    assert_eq!(validation.fixes_applied(), 0);
    assert_eq!(report.extractors[1].issues.len(), 1);
}

#[test]
fn test_ntriples_document_through_file_cache() {
    let mut extraction = SingleDocumentExtraction::new(
        MemorySource::new(fixture("data.nt")),
        "http://example.com/data",
        ExtractorRegistry::with_defaults().group(),
        CollectingHandler::new(),
    )
    .unwrap()
    .with_detector(SniffingDetector::new())
    .with_stream_cache(FileStreamCache::new());

    let report = extraction.run().unwrap();

    assert_eq!(report.detected_content_type, Some(mime::APPLICATION_NTRIPLES));
    assert_eq!(report.extractor_names(), ["document-origin", "ntriples"]);
    assert_eq!(extraction.output().statements_from("ntriples").count(), 4);
}

#[test]
fn test_single_extractor_skips_detection() {
    let mut extraction = SingleDocumentExtraction::single(
        MemorySource::new(fixture("article.html")),
        "https://example.com/articles/sample",
        Arc::new(builtin::license()),
        CollectingHandler::new(),
    )
    .unwrap();

    let report = extraction.run().unwrap();
    assert_eq!(report.detected_content_type, None);
    assert_eq!(report.statements(), 2);
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use crate::extractor::builtin::parse_line;
    use crate::writer::CountingHandler;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extraction_never_panics(
            html in ".*",
            path in "[a-z]{1,8}(\\.html|\\.nt|\\.txt)?"
        ) {
            let locator = format!("https://example.com/{path}");
            let mut extraction = SingleDocumentExtraction::new(
                MemorySource::new(html),
                &locator,
                ExtractorRegistry::with_defaults().group(),
                CountingHandler::new(),
            )
            .unwrap()
            .with_detector(SniffingDetector::new())
            .with_validator(Validator::with_default_rules(), true);
            // N-Triples syntax errors are expected; panics are not
            let _ = extraction.run();
        }

        #[test]
        fn test_ntriples_line_never_panics(line in "\\PC*") {
            let _ = parse_line(&line, 1);
        }

        #[test]
        fn test_written_statements_parse_back(
            subject in "[a-z]{1,10}",
            value in "\\PC*",
        ) {
            let statement = crate::model::Statement::new(
                crate::model::Term::iri(format!("http://example.com/{subject}")),
                vocab::DCTERMS_TITLE,
                crate::model::Term::literal(value),
            );
            let parsed = parse_line(&statement.to_string(), 1).unwrap();
            prop_assert_eq!(parsed, Some(statement));
        }
    }
}
