use crate::dom::DomDocument;
use crate::extractor::{DomExtractor, ExtractionResult, ExtractorError, IssueLevel};
use crate::model::{Term, vocab};

/// Emits `xhtml:license` for links marked `rel="license"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LicenseExtractor;

fn is_license_link(rel: &str) -> bool {
    rel.split_ascii_whitespace()
        .any(|token| token.eq_ignore_ascii_case("license"))
}

impl DomExtractor for LicenseExtractor {
    fn run(
        &mut self,
        document: &DomDocument,
        result: &mut ExtractionResult<'_>,
    ) -> Result<(), ExtractorError> {
        let subject = Term::from(document.base());
        let mut seen = Vec::new();

        for link in document.select("a[rel][href], link[rel][href]")? {
            let rel = DomDocument::attribute(&link, "rel").unwrap_or_default();
            if !is_license_link(&rel) {
                continue;
            }
            let href = DomDocument::attribute(&link, "href").unwrap_or_default();
            let Some(license) = document.resolve(&href) else {
                result.notify_issue(
                    IssueLevel::Warning,
                    format!("license link '{href}' cannot be resolved"),
                );
                continue;
            };
            if seen.contains(&license) {
                continue;
            }
            result.write(subject.clone(), vocab::XHTML_LICENSE, Term::from(&license))?;
            seen.push(license);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::DocumentLocator;
    use crate::writer::{CollectingHandler, ExtractionContext};
    use kuchiki::traits::*;

    #[test]
    fn test_resolves_and_dedupes_license_links() {
        let locator = DocumentLocator::parse("http://example.com/docs/page").unwrap();
        let document = DomDocument::new(
            kuchiki::parse_html().one(
                r#"<head><link rel="License" href="/terms"></head>
                   <body><a rel="nofollow license" href="http://example.com/terms">terms</a>
                   <a rel="author" href="/me">me</a>
                   <a rel="license" href="http://[bad">bad</a></body>"#,
            ),
            locator.clone(),
        );
        let mut sink = CollectingHandler::new();
        let context = ExtractionContext::new(locator, "html-license");
        let mut result = ExtractionResult::open(context, &mut sink).unwrap();
        LicenseExtractor.run(&document, &mut result).unwrap();
        let summary = result.close().unwrap();

        assert_eq!(summary.statements, 1);
        assert_eq!(summary.issues.len(), 1);
        let statement = sink.statements().next().unwrap();
        assert_eq!(statement.object.as_iri(), Some("http://example.com/terms"));
    }
}
