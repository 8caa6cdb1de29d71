use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum LocatorError {
    #[error("invalid document locator '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("document locator '{0}' cannot be a base")]
    NotABase(String),

    #[error("cannot build a locator from path '{0}'")]
    Path(String),
}

/// Absolute identifier of the document being processed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentLocator(Url);

impl DocumentLocator {
    pub fn parse(input: &str) -> Result<Self, LocatorError> {
        let url = Url::parse(input.trim()).map_err(|source| LocatorError::Invalid {
            input: input.to_string(),
            source,
        })?;
        if url.cannot_be_a_base() {
            return Err(LocatorError::NotABase(input.to_string()));
        }
        Ok(Self(url))
    }

    /// Builds a `file://` locator from a local path, canonicalizing it first.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LocatorError> {
        let path = path.as_ref();
        let absolute = path
            .canonicalize()
            .map_err(|_| LocatorError::Path(path.display().to_string()))?;
        Url::from_file_path(&absolute)
            .map(Self)
            .map_err(|_| LocatorError::Path(path.display().to_string()))
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Path component used as a name hint for content-type detection.
    pub fn path_hint(&self) -> &str {
        self.0.path()
    }

    /// Resolves a possibly relative reference against this locator.
    pub fn resolve(&self, reference: &str) -> Option<Url> {
        self.0.join(reference.trim()).ok()
    }
}

impl fmt::Display for DocumentLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<Url> for DocumentLocator {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absolute_url() {
        let locator = DocumentLocator::parse("https://example.com/a/page.html?x=1").unwrap();
        assert_eq!(locator.path_hint(), "/a/page.html");
        assert_eq!(locator.as_str(), "https://example.com/a/page.html?x=1");
    }

    #[test]
    fn test_reject_relative_reference() {
        let err = DocumentLocator::parse("page.html").unwrap_err();
        assert!(matches!(err, LocatorError::Invalid { .. }));
        assert!(err.to_string().contains("page.html"));
    }

    #[test]
    fn test_reject_non_base_url() {
        let err = DocumentLocator::parse("mailto:someone@example.com").unwrap_err();
        assert!(matches!(err, LocatorError::NotABase(_)));
    }

    #[test]
    fn test_resolve_relative_link() {
        let locator = DocumentLocator::parse("https://example.com/articles/one").unwrap();
        let resolved = locator.resolve("../license").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/license");
    }

    #[test]
    fn test_from_missing_path_fails() {
        let err = DocumentLocator::from_path("/definitely/not/here.html").unwrap_err();
        assert!(matches!(err, LocatorError::Path(_)));
    }
}
