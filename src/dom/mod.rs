//! Parsed, mutable document trees.
//!
//! [`DomDocument`] wraps a `kuchiki` tree. Nodes are reference counted with
//! interior mutability, so every holder of the document sees edits made
//! through any other handle.

pub mod charset;
pub mod errors;
pub mod parser;

pub use errors::{DomError, ParseError};
pub use kuchiki::NodeRef;
pub use parser::{TagSoupParser, TreeParser};

use kuchiki::iter::NodeIterator;
use url::Url;

use crate::locator::DocumentLocator;

#[derive(Debug, Clone)]
pub struct DomDocument {
    root: NodeRef,
    base: DocumentLocator,
}

impl DomDocument {
    pub fn new(root: NodeRef, base: DocumentLocator) -> Self {
        Self { root, base }
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    pub fn base(&self) -> &DocumentLocator {
        &self.base
    }

    /// All elements matching a CSS selector, in document order.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeRef>, DomError> {
        let matches = self
            .root
            .select(selector)
            .map_err(|_| DomError::InvalidSelector(selector.to_string()))?;
        Ok(matches.map(|element| element.as_node().clone()).collect())
    }

    pub fn select_first(&self, selector: &str) -> Result<Option<NodeRef>, DomError> {
        Ok(self.select(selector)?.into_iter().next())
    }

    /// The root element (`<html>` for HTML input).
    pub fn document_element(&self) -> Option<NodeRef> {
        self.root.children().elements().next().map(|e| e.as_node().clone())
    }

    pub fn attribute(node: &NodeRef, name: &str) -> Option<String> {
        node.as_element()
            .and_then(|element| element.attributes.borrow().get(name).map(str::to_string))
    }

    pub fn has_attribute(node: &NodeRef, name: &str) -> bool {
        node.as_element()
            .is_some_and(|element| element.attributes.borrow().contains(name))
    }

    /// Sets an attribute, appending it after existing ones if new.
    pub fn set_attribute(
        node: &NodeRef,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        let element = node.as_element().ok_or(DomError::NotAnElement)?;
        element.attributes.borrow_mut().insert(name, value.into());
        Ok(())
    }

    /// Removes an attribute and returns its value.
    pub fn remove_attribute(node: &NodeRef, name: &str) -> Result<Option<String>, DomError> {
        let element = node.as_element().ok_or(DomError::NotAnElement)?;
        Ok(element
            .attributes
            .borrow_mut()
            .remove(name)
            .map(|attribute| attribute.value))
    }

    /// Attribute names of an element in document order.
    pub fn attribute_names(node: &NodeRef) -> Vec<String> {
        node.as_element()
            .map(|element| {
                element
                    .attributes
                    .borrow()
                    .map
                    .keys()
                    .map(|name| name.local.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn local_name(node: &NodeRef) -> Option<String> {
        node.as_element().map(|element| element.name.local.to_string())
    }

    /// Document language from the root element's `lang` or `xml:lang`.
    pub fn language(&self) -> Option<String> {
        let root = self.document_element()?;
        Self::attribute(&root, "lang")
            .or_else(|| Self::attribute(&root, "xml:lang"))
            .map(|lang| lang.trim().to_string())
            .filter(|lang| !lang.is_empty())
    }

    /// Resolves a reference against the document's base, honoring `<base href>`.
    pub fn resolve(&self, reference: &str) -> Option<Url> {
        let base_href = self
            .select_first("base[href]")
            .ok()
            .flatten()
            .and_then(|node| Self::attribute(&node, "href"))
            .and_then(|href| self.base.resolve(&href));
        match base_href {
            Some(base) => base.join(reference.trim()).ok(),
            None => self.base.resolve(reference),
        }
    }

    pub fn to_html(&self) -> String {
        self.root.to_string()
    }
}
