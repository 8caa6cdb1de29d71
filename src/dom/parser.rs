use kuchiki::traits::*;
use std::io::Read;
use tracing::debug;

use crate::dom::{DomDocument, ParseError, charset};
use crate::locator::DocumentLocator;

/// Builds a [`DomDocument`] from raw bytes.
///
/// Implementations must tolerate malformed markup and only fail when the
/// bytes cannot be read or decoded.
pub trait TreeParser {
    fn parse(
        &self,
        stream: &mut dyn Read,
        base: &DocumentLocator,
    ) -> Result<DomDocument, ParseError>;
}

/// HTML5 tree builder over `kuchiki`; repairs tag soup the way browsers do.
///
/// Byte sequences that are malformed for the detected encoding are replaced
/// with U+FFFD unless the parser is [`strict`](Self::strict).
#[derive(Debug, Clone, Default)]
pub struct TagSoupParser {
    content_type_hint: Option<String>,
    strict: bool,
}

impl TagSoupParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with [`ParseError::Charset`] when a declared encoding does not
    /// match the bytes.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    /// Supplies a `Content-Type` value whose `charset` parameter wins over
    /// in-band declarations.
    pub fn with_content_type_hint(mut self, hint: impl Into<String>) -> Self {
        self.content_type_hint = Some(hint.into());
        self
    }
}

impl TreeParser for TagSoupParser {
    fn parse(
        &self,
        stream: &mut dyn Read,
        base: &DocumentLocator,
    ) -> Result<DomDocument, ParseError> {
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes)?;
        let text = charset::decode(&bytes, self.content_type_hint.as_deref(), self.strict)?;

        let root = kuchiki::parse_html().one(text);
        debug!(document = %base, bytes = bytes.len(), "Parsed document tree");
        Ok(DomDocument::new(root, base.clone()))
    }
}
