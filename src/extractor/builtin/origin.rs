use crate::extractor::{BlindExtractor, ExtractionResult, ExtractorError};
use crate::locator::DocumentLocator;
use crate::model::{Term, vocab};

/// Describes the document itself from its locator alone.
///
/// Emits `rdf:type foaf:Document` and, for web documents, a `dcterms:source`
/// pointing at the site root.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentOriginExtractor;

impl BlindExtractor for DocumentOriginExtractor {
    fn run(
        &mut self,
        locator: &DocumentLocator,
        result: &mut ExtractionResult<'_>,
    ) -> Result<(), ExtractorError> {
        let subject = Term::from(locator);
        result.write(subject.clone(), vocab::RDF_TYPE, Term::iri(vocab::FOAF_DOCUMENT))?;

        let url = locator.as_url();
        if matches!(url.scheme(), "http" | "https")
            && let Some(host) = url.host_str()
        {
            let origin = match url.port() {
                Some(port) => format!("{}://{host}:{port}/", url.scheme()),
                None => format!("{}://{host}/", url.scheme()),
            };
            result.write(subject, vocab::DCTERMS_SOURCE, Term::iri(origin))?;
        }
        Ok(())
    }
}
