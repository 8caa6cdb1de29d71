use crate::dom::{DomDocument, NodeRef};
use crate::validator::{EvidenceKey, Fix, Rule, RuleContext, ValidationError};

/// `<meta>` nodes whose `name` holds a prefixed property such as `og:title`.
pub const ERRORED_META_NODES: EvidenceKey<Vec<NodeRef>> = EvidenceKey::new("errored-meta-nodes");

/// Flags `<meta name="prefix:...">` in `<head>`, which RDFa consumers only read from `property`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaNameMisuseRule;

impl Rule for MetaNameMisuseRule {
    fn name(&self) -> &'static str {
        "meta-name-misuse"
    }

    fn apply(
        &self,
        document: &DomDocument,
        context: &mut RuleContext,
    ) -> Result<bool, ValidationError> {
        let errored: Vec<NodeRef> = document
            .select("head > meta[name]")
            .map_err(|source| ValidationError::Rule {
                rule: self.name(),
                source,
            })?
            .into_iter()
            .filter(|node| {
                DomDocument::attribute(node, "name").is_some_and(|name| name.contains(':'))
            })
            .collect();

        let found = !errored.is_empty();
        context.put(ERRORED_META_NODES, errored);
        Ok(found)
    }
}

/// Moves the flagged `name` value into a `property` attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaNameMisuseFix;

impl Fix for MetaNameMisuseFix {
    fn name(&self) -> &'static str {
        "meta-name-misuse-fix"
    }

    fn execute(
        &self,
        _rule: &dyn Rule,
        context: &RuleContext,
        _document: &mut DomDocument,
    ) -> Result<(), ValidationError> {
        let wrap = |source| ValidationError::Fix {
            fix: self.name(),
            source,
        };
        for node in context.get(ERRORED_META_NODES)? {
            let Some(value) = DomDocument::remove_attribute(node, "name").map_err(wrap)? else {
                continue;
            };
            DomDocument::set_attribute(node, "property", value).map_err(wrap)?;
        }
        Ok(())
    }
}
