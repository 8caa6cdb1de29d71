use crate::dom::{DomDocument, NodeRef};
use crate::validator::{EvidenceKey, Rule, RuleContext, ValidationError};

pub const INVALID_ABOUT_NODES: EvidenceKey<Vec<NodeRef>> = EvidenceKey::new("invalid-about-nodes");

/// Flags RDFa `about` values that are neither IRIs nor safe CURIEs.
///
/// There is no automatic fix; the intended subject cannot be guessed.
#[derive(Debug, Clone, Copy, Default)]
pub struct AboutNotIriRule;

impl AboutNotIriRule {
    fn is_valid(document: &DomDocument, about: &str) -> bool {
        let about = about.trim();
        if about.starts_with('[') && about.ends_with(']') {
            return true;
        }
        !about.is_empty()
            && !about.chars().any(char::is_whitespace)
            && document.resolve(about).is_some()
    }
}

impl Rule for AboutNotIriRule {
    fn name(&self) -> &'static str {
        "about-not-iri"
    }

    fn apply(
        &self,
        document: &DomDocument,
        context: &mut RuleContext,
    ) -> Result<bool, ValidationError> {
        let invalid: Vec<NodeRef> = document
            .select("[about]")
            .map_err(|source| ValidationError::Rule {
                rule: self.name(),
                source,
            })?
            .into_iter()
            .filter(|node| {
                DomDocument::attribute(node, "about")
                    .is_some_and(|about| !Self::is_valid(document, &about))
            })
            .collect();

        let found = !invalid.is_empty();
        context.put(INVALID_ABOUT_NODES, invalid);
        Ok(found)
    }
}
