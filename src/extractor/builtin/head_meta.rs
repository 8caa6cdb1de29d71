use url::Url;

use crate::dom::DomDocument;
use crate::extractor::{DomExtractor, ExtractionResult, ExtractorError, IssueLevel};
use crate::model::{Term, vocab};

const OG_PREFIX: &str = "og:";

/// Reads the document title and `<meta>` tags.
///
/// - `<title>` becomes `dcterms:title`.
/// - `<meta name=... content=...>` becomes a statement in the XHTML vocabulary.
/// - `<meta property=... content=...>` is read as RDFa: `og:` properties are
///   expanded against the OpenGraph namespace, absolute IRIs are used as-is.
///
/// Literals carry the document language when the root element declares one.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadMetaExtractor;

impl HeadMetaExtractor {
    fn is_simple_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    }

    fn expand_property(property: &str) -> Option<String> {
        if let Some(local) = property.strip_prefix(OG_PREFIX) {
            return (!local.is_empty()).then(|| format!("{}{local}", vocab::OPEN_GRAPH));
        }
        Url::parse(property)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .map(String::from)
    }
}

impl DomExtractor for HeadMetaExtractor {
    fn run(
        &mut self,
        document: &DomDocument,
        result: &mut ExtractionResult<'_>,
    ) -> Result<(), ExtractorError> {
        let subject = Term::from(document.base());
        let language = document.language();
        let literal = |value: &str| match &language {
            Some(language) => Term::lang_literal(value, language.as_str()),
            None => Term::literal(value),
        };

        if let Some(title) = document.select_first("title")? {
            let title = title.text_contents();
            let title = title.trim();
            if !title.is_empty() {
                result.write(subject.clone(), vocab::DCTERMS_TITLE, literal(title))?;
            }
        }

        for meta in document.select("meta[name][content]")? {
            let (Some(name), Some(content)) = (
                DomDocument::attribute(&meta, "name"),
                DomDocument::attribute(&meta, "content"),
            ) else {
                continue;
            };
            let name = name.trim().to_ascii_lowercase();
            if name.contains(':') {
                let message = format!("meta name '{name}' holds a prefixed property");
                result.notify_issue(IssueLevel::Warning, message);
                continue;
            }
            if !Self::is_simple_name(&name) {
                continue;
            }
            let predicate = format!("{}{name}", vocab::XHTML_VOCAB);
            result.write(subject.clone(), predicate, literal(content.trim()))?;
        }

        let mut og_declared = false;
        for meta in document.select("meta[property][content]")? {
            let (Some(properties), Some(content)) = (
                DomDocument::attribute(&meta, "property"),
                DomDocument::attribute(&meta, "content"),
            ) else {
                continue;
            };
            for property in properties.split_whitespace() {
                let Some(predicate) = Self::expand_property(property) else {
                    result.notify_issue(
                        IssueLevel::Warning,
                        format!("cannot expand meta property '{property}'"),
                    );
                    continue;
                };
                if property.starts_with(OG_PREFIX) && !og_declared {
                    result.write_namespace("og", vocab::OPEN_GRAPH)?;
                    og_declared = true;
                }
                result.write(subject.clone(), predicate, literal(content.trim()))?;
            }
        }

        Ok(())
    }
}
