use crate::dom::{DomDocument, NodeRef};
use crate::model::vocab;
use crate::validator::{EvidenceKey, Fix, Rule, RuleContext, ValidationError};

/// Root element that uses `og:` properties without declaring the prefix.
pub const OPENGRAPH_ROOT: EvidenceKey<Option<NodeRef>> = EvidenceKey::new("opengraph-root");

const XMLNS_OG: &str = "xmlns:og";

#[derive(Debug, Clone, Copy, Default)]
pub struct MissingOpenGraphNamespaceRule;

impl MissingOpenGraphNamespaceRule {
    fn declares_prefix(root: &NodeRef) -> bool {
        DomDocument::has_attribute(root, XMLNS_OG)
            || DomDocument::attribute(root, "prefix").is_some_and(|prefixes| {
                prefixes.contains("og:") && prefixes.contains(vocab::OPEN_GRAPH)
            })
    }
}

impl Rule for MissingOpenGraphNamespaceRule {
    fn name(&self) -> &'static str {
        "missing-opengraph-namespace"
    }

    fn apply(
        &self,
        document: &DomDocument,
        context: &mut RuleContext,
    ) -> Result<bool, ValidationError> {
        let uses_og = document
            .select(r#"meta[property^="og:"]"#)
            .map_err(|source| ValidationError::Rule {
                rule: self.name(),
                source,
            })?
            .into_iter()
            .next()
            .is_some();

        let undeclared = match document.document_element() {
            Some(root) if uses_og && !Self::declares_prefix(&root) => Some(root),
            _ => None,
        };

        let found = undeclared.is_some();
        context.put(OPENGRAPH_ROOT, undeclared);
        Ok(found)
    }
}

/// Declares `xmlns:og` on the root element.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingOpenGraphNamespaceFix;

impl Fix for MissingOpenGraphNamespaceFix {
    fn name(&self) -> &'static str {
        "missing-opengraph-namespace-fix"
    }

    fn execute(
        &self,
        _rule: &dyn Rule,
        context: &RuleContext,
        _document: &mut DomDocument,
    ) -> Result<(), ValidationError> {
        if let Some(root) = context.get(OPENGRAPH_ROOT)? {
            DomDocument::set_attribute(root, XMLNS_OG, vocab::OPEN_GRAPH).map_err(|source| {
                ValidationError::Fix {
                    fix: self.name(),
                    source,
                }
            })?;
        }
        Ok(())
    }
}
