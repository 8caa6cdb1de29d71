#![no_main]

use libfuzzer_sys::fuzz_target;

use harvest::mime::SniffingDetector;
use harvest::stream::MemorySource;
use harvest::validator::Validator;
use harvest::writer::CountingHandler;
use harvest::{ExtractorRegistry, SingleDocumentExtraction};

fuzz_target!(|data: &[u8]| {
    let extraction = SingleDocumentExtraction::new(
        MemorySource::new(data.to_vec()),
        "https://example.com/fuzz",
        ExtractorRegistry::with_defaults().group(),
        CountingHandler::new(),
    );
    let Ok(extraction) = extraction else {
        return;
    };

    // Errors are fine; panics are not
    let mut extraction = extraction
        .with_detector(SniffingDetector::new())
        .with_validator(Validator::with_default_rules(), true);
    let _ = extraction.run();
});
