//! Byte sources and the caches that keep a document's bytes for one run.

pub mod cache;
pub mod source;

pub use cache::{FileStreamCache, MemoryStreamCache};
pub use source::{FileSource, MemorySource};

use std::io::{self, Read};

use crate::locator::DocumentLocator;

/// Opens a fresh stream over a document's bytes.
///
/// Each call is independent. Implementations are expected to return the same
/// bytes for a given locator for the duration of a run.
#[cfg_attr(test, mockall::automock)]
pub trait ByteSource {
    fn open(&self, locator: &DocumentLocator) -> io::Result<Box<dyn Read>>;
}

/// Hands out rewound cursors over bytes a [`StreamCache`] already holds.
pub trait StreamOpener {
    fn open_stream(&self) -> io::Result<Box<dyn Read>>;

    /// Number of cached bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drains a [`ByteSource`] once and serves repeated reads from the copy.
///
/// The origin is opened at most once per cache instance. A failed read leaves
/// the cache empty, so the next call opens the origin again.
pub trait StreamCache {
    fn cache(
        &self,
        source: &dyn ByteSource,
        locator: &DocumentLocator,
    ) -> io::Result<Box<dyn StreamOpener>>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn open(&self, locator: &DocumentLocator) -> io::Result<Box<dyn Read>> {
        (**self).open(locator)
    }
}
