//! Extractors shipped with the crate.

mod head_meta;
mod license;
mod ntriples;
mod origin;

pub use head_meta::HeadMetaExtractor;
pub use license::LicenseExtractor;
pub use ntriples::{NTriplesExtractor, parse_line};
pub use origin::DocumentOriginExtractor;

use std::sync::Arc;

use crate::extractor::{ExtractorDescriptor, ExtractorFactory};
use crate::mime;

pub fn document_origin() -> ExtractorDescriptor {
    ExtractorDescriptor::blind::<DocumentOriginExtractor>("document-origin", vec![mime::ANY])
}

pub fn head_meta() -> ExtractorDescriptor {
    ExtractorDescriptor::dom::<HeadMetaExtractor>(
        "html-head-meta",
        vec![mime::TEXT_HTML, mime::APPLICATION_XHTML],
    )
}

pub fn license() -> ExtractorDescriptor {
    ExtractorDescriptor::dom::<LicenseExtractor>(
        "html-license",
        vec![mime::TEXT_HTML, mime::APPLICATION_XHTML],
    )
}

pub fn ntriples() -> ExtractorDescriptor {
    ExtractorDescriptor::content::<NTriplesExtractor>(
        "ntriples",
        vec![mime::APPLICATION_NTRIPLES, mime::TEXT_PLAIN],
    )
}

/// All built-in factories, in registration order.
pub fn factories() -> Vec<Arc<dyn ExtractorFactory>> {
    vec![
        Arc::new(document_origin()),
        Arc::new(head_meta()),
        Arc::new(license()),
        Arc::new(ntriples()),
    ]
}
