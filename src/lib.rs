//! Single-document structured data extraction.
//!
//! [`SingleDocumentExtraction`] takes one document, works out which
//! extractors apply to it, and runs them in order, reading the document's
//! bytes at most once and parsing its tree at most once. Extractors write
//! [`Statement`]s to a [`TripleHandler`].
//!
//! ```no_run
//! use harvest::{ExtractorRegistry, SingleDocumentExtraction};
//! use harvest::mime::SniffingDetector;
//! use harvest::stream::FileSource;
//! use harvest::writer::NTriplesWriter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut extraction = SingleDocumentExtraction::new(
//!     FileSource::new(),
//!     "file:///tmp/page.html",
//!     ExtractorRegistry::with_defaults().group(),
//!     NTriplesWriter::new(std::io::stdout()),
//! )?
//! .with_detector(SniffingDetector::new());
//! let report = extraction.run()?;
//! println!("{} statements", report.statements());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dom;
pub mod extractor;
pub mod fetcher;
pub mod locator;
pub mod mime;
pub mod model;
pub mod stream;
pub mod validator;
pub mod writer;

pub use extractor::{
    ExtractionError, ExtractionReport, ExtractorGroup, ExtractorRegistry,
    SingleDocumentExtraction,
};
pub use locator::DocumentLocator;
pub use model::{Statement, Term};
pub use writer::TripleHandler;
