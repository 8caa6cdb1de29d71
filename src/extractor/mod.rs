//! Extractors and the machinery that runs them over one document.
//!
//! An extractor comes in one of three capabilities, depending on what it
//! needs to see: only the locator, the raw bytes, or the parsed tree.
//! [`SingleDocumentExtraction`] works out which registered extractors apply
//! to a document and feeds each one exactly what it asks for, reading and
//! parsing the document at most once.

pub mod builtin;
pub mod errors;
pub mod group;
pub mod registry;
pub mod result;
pub mod single;

#[cfg(test)]
mod tests;

pub use errors::{ExtractionError, ExtractorError, Phase};
pub use group::ExtractorGroup;
pub use registry::{ExtractorRegistry, RegistryError};
pub use result::{ExtractionResult, Issue, IssueLevel, ResultSummary};
pub use single::{ExtractionReport, ExtractorRun, SingleDocumentExtraction};

use serde::Serialize;
use std::fmt;
use std::io::Read;

use crate::dom::DomDocument;
use crate::locator::DocumentLocator;
use crate::mime::ContentType;

/// Needs nothing but the document's locator.
pub trait BlindExtractor {
    fn run(
        &mut self,
        locator: &DocumentLocator,
        result: &mut ExtractionResult<'_>,
    ) -> Result<(), ExtractorError>;
}

/// Reads the raw document bytes.
pub trait ContentExtractor {
    fn run(
        &mut self,
        stream: &mut dyn Read,
        locator: &DocumentLocator,
        result: &mut ExtractionResult<'_>,
    ) -> Result<(), ExtractorError>;
}

/// Walks the parsed document tree.
pub trait DomExtractor {
    fn run(
        &mut self,
        document: &DomDocument,
        result: &mut ExtractionResult<'_>,
    ) -> Result<(), ExtractorError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Blind,
    Content,
    Dom,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Blind => "blind",
            Self::Content => "content",
            Self::Dom => "dom",
        })
    }
}

/// A runnable extractor instance.
pub enum Extractor {
    Blind(Box<dyn BlindExtractor>),
    Content(Box<dyn ContentExtractor>),
    Dom(Box<dyn DomExtractor>),
}

impl Extractor {
    pub fn capability(&self) -> Capability {
        match self {
            Self::Blind(_) => Capability::Blind,
            Self::Content(_) => Capability::Content,
            Self::Dom(_) => Capability::Dom,
        }
    }
}

/// Describes an extractor and creates fresh instances of it.
pub trait ExtractorFactory: Send + Sync {
    fn name(&self) -> &'static str;

    /// The capability every instance from [`create`](Self::create) must have.
    fn capability(&self) -> Capability;

    fn supported_types(&self) -> &[ContentType];

    fn create(&self) -> Extractor;

    fn supports_all_content_types(&self) -> bool {
        self.supported_types().iter().any(ContentType::is_any)
    }

    fn supports(&self, content_type: &ContentType) -> bool {
        self.supported_types()
            .iter()
            .any(|supported| supported.matches(content_type))
    }
}

/// Type-erased extractor constructor
pub type ExtractorConstructor = Box<dyn Fn() -> Extractor + Send + Sync>;

/// [`ExtractorFactory`] built from a name, a type list and a constructor.
pub struct ExtractorDescriptor {
    name: &'static str,
    capability: Capability,
    supported_types: Vec<ContentType>,
    constructor: ExtractorConstructor,
}

impl ExtractorDescriptor {
    pub fn new(
        name: &'static str,
        capability: Capability,
        supported_types: Vec<ContentType>,
        constructor: ExtractorConstructor,
    ) -> Self {
        Self {
            name,
            capability,
            supported_types,
            constructor,
        }
    }

    pub fn blind<E>(name: &'static str, supported_types: Vec<ContentType>) -> Self
    where
        E: BlindExtractor + Default + 'static,
    {
        Self::new(
            name,
            Capability::Blind,
            supported_types,
            Box::new(|| Extractor::Blind(Box::new(E::default()))),
        )
    }

    pub fn content<E>(name: &'static str, supported_types: Vec<ContentType>) -> Self
    where
        E: ContentExtractor + Default + 'static,
    {
        Self::new(
            name,
            Capability::Content,
            supported_types,
            Box::new(|| Extractor::Content(Box::new(E::default()))),
        )
    }

    pub fn dom<E>(name: &'static str, supported_types: Vec<ContentType>) -> Self
    where
        E: DomExtractor + Default + 'static,
    {
        Self::new(
            name,
            Capability::Dom,
            supported_types,
            Box::new(|| Extractor::Dom(Box::new(E::default()))),
        )
    }
}

impl ExtractorFactory for ExtractorDescriptor {
    fn name(&self) -> &'static str {
        self.name
    }

    fn capability(&self) -> Capability {
        self.capability
    }

    fn supported_types(&self) -> &[ContentType] {
        &self.supported_types
    }

    fn create(&self) -> Extractor {
        (self.constructor)()
    }
}

impl fmt::Debug for ExtractorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorDescriptor")
            .field("name", &self.name)
            .field("capability", &self.capability)
            .field("supported_types", &self.supported_types)
            .finish()
    }
}
