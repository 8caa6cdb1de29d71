pub mod detector;

pub use detector::{ContentTypeDetector, SniffingDetector};

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContentTypeError {
    #[error("empty content type")]
    Empty,

    #[error("malformed content type: {0}")]
    Malformed(String),
}

/// A `type/subtype` essence. Parameters such as `charset` are dropped on parse.
///
/// When declared by an extractor, `*/*` and `type/*` act as patterns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentType(Cow<'static, str>);

pub const ANY: ContentType = ContentType::from_static("*/*");
pub const TEXT_HTML: ContentType = ContentType::from_static("text/html");
pub const TEXT_PLAIN: ContentType = ContentType::from_static("text/plain");
pub const APPLICATION_XHTML: ContentType = ContentType::from_static("application/xhtml+xml");
pub const APPLICATION_XML: ContentType = ContentType::from_static("application/xml");
pub const APPLICATION_NTRIPLES: ContentType = ContentType::from_static("application/n-triples");
pub const TEXT_TURTLE: ContentType = ContentType::from_static("text/turtle");
pub const APPLICATION_JSON: ContentType = ContentType::from_static("application/json");
pub const APPLICATION_OCTET_STREAM: ContentType =
    ContentType::from_static("application/octet-stream");

impl ContentType {
    /// Wraps an already normalized essence. Callers must pass lowercase `type/subtype`.
    pub const fn from_static(essence: &'static str) -> Self {
        Self(Cow::Borrowed(essence))
    }

    pub fn parse(input: &str) -> Result<Self, ContentTypeError> {
        let essence = input.split(';').next().unwrap_or_default().trim();
        if essence.is_empty() {
            return Err(ContentTypeError::Empty);
        }

        let Some((top, sub)) = essence.split_once('/') else {
            return Err(ContentTypeError::Malformed(input.to_string()));
        };
        let valid = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "!#$&^_.+-*".contains(c))
        };
        if !valid(top) || !valid(sub) || (top == "*" && sub != "*") {
            return Err(ContentTypeError::Malformed(input.to_string()));
        }

        Ok(Self(Cow::Owned(essence.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn top_level(&self) -> &str {
        self.as_str().split('/').next().unwrap_or_default()
    }

    pub fn subtype(&self) -> &str {
        self.as_str().split('/').nth(1).unwrap_or_default()
    }

    pub fn is_any(&self) -> bool {
        self.as_str() == "*/*"
    }

    /// True if `self`, read as a pattern, covers `other`.
    pub fn matches(&self, other: &ContentType) -> bool {
        if self.is_any() || self == other {
            return true;
        }
        self.subtype() == "*" && self.top_level() == other.top_level()
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ContentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentType {
    type Error = ContentTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentType> for String {
    fn from(value: ContentType) -> Self {
        value.0.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_parameters() {
        let ct = ContentType::parse("Text/HTML; charset=UTF-8").unwrap();
        assert_eq!(ct, TEXT_HTML);
        assert_eq!(ct.top_level(), "text");
        assert_eq!(ct.subtype(), "html");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(ContentType::parse("  "), Err(ContentTypeError::Empty));
        assert!(matches!(
            ContentType::parse("html"),
            Err(ContentTypeError::Malformed(_))
        ));
        assert!(matches!(
            ContentType::parse("*/html"),
            Err(ContentTypeError::Malformed(_))
        ));
    }

    #[test]
    fn test_wildcard_matching() {
        let text_any = ContentType::parse("text/*").unwrap();
        assert!(ANY.matches(&APPLICATION_XHTML));
        assert!(text_any.matches(&TEXT_HTML));
        assert!(!text_any.matches(&APPLICATION_XML));
        assert!(TEXT_HTML.matches(&TEXT_HTML));
        assert!(!TEXT_HTML.matches(&ANY));
    }

    #[test]
    fn test_serde_uses_plain_string() {
        let json = serde_json::to_string(&APPLICATION_NTRIPLES).unwrap();
        assert_eq!(json, "\"application/n-triples\"");
        let back: ContentType = serde_json::from_str("\"TEXT/Turtle\"").unwrap();
        assert_eq!(back, TEXT_TURTLE);
    }
}
