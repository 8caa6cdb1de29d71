use crate::mime::{self, ContentType};
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{self, Read};
use tracing::debug;

/// Number of leading bytes inspected when sniffing.
const SNIFF_LEN: u64 = 1024;

static HTML_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(html|head|body|title|meta|link|script|div|p|a)[\s>/]").unwrap()
});

static NTRIPLES_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(<[^>\s]+>|_:[A-Za-z0-9_.-]+)\s+<[^>\s]+>\s+(<[^>\s]+>|_:[A-Za-z0-9_.-]+|")"#)
        .unwrap()
});

static TURTLE_DIRECTIVE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*(@prefix|@base|prefix\s+\w*:|base\s+<)").unwrap());

/// Guesses the content type of a document.
pub trait ContentTypeDetector {
    /// `stream` is positioned at the start of the document; implementations read
    /// only what they need from it.
    fn guess(
        &self,
        path_hint: Option<&str>,
        stream: &mut dyn Read,
        known: Option<&ContentType>,
    ) -> io::Result<ContentType>;
}

/// Magic-byte sniffer with a file-extension fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct SniffingDetector;

impl SniffingDetector {
    pub fn new() -> Self {
        Self
    }

    fn sniff(prefix: &[u8]) -> Option<ContentType> {
        if prefix.is_empty() {
            return None;
        }

        let (encoding, bom_len) = Encoding::for_bom(prefix).unwrap_or((UTF_8, 0));
        let (text, _) = encoding.decode_without_bom_handling(&prefix[bom_len..]);
        let text = text.trim_start();
        let lower = text.to_ascii_lowercase();

        if lower.starts_with("<?xml") {
            if lower.contains("<html") || lower.contains("http://www.w3.org/1999/xhtml") {
                return Some(mime::APPLICATION_XHTML);
            }
            return Some(mime::APPLICATION_XML);
        }
        if lower.starts_with("<!doctype html") {
            return Some(mime::TEXT_HTML);
        }

        // N-Triples literals may contain markup
        let first_statement = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#'));
        if let Some(line) = first_statement
            && line.ends_with('.')
            && NTRIPLES_LINE_REGEX.is_match(line)
        {
            return Some(mime::APPLICATION_NTRIPLES);
        }

        if HTML_TAG_REGEX.is_match(&lower) {
            return Some(mime::TEXT_HTML);
        }
        if TURTLE_DIRECTIVE_REGEX.is_match(text) {
            return Some(mime::TEXT_TURTLE);
        }
        if lower.starts_with('{') || lower.starts_with('[') {
            return Some(mime::APPLICATION_JSON);
        }
        if lower.starts_with('<') {
            return Some(mime::APPLICATION_XML);
        }
        if bom_len == 0 && prefix.contains(&0) {
            return Some(mime::APPLICATION_OCTET_STREAM);
        }
        None
    }

    fn by_extension(path_hint: &str) -> Option<ContentType> {
        let name = path_hint.rsplit('/').next()?;
        let (_, extension) = name.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(mime::TEXT_HTML),
            "xhtml" => Some(mime::APPLICATION_XHTML),
            "xml" => Some(mime::APPLICATION_XML),
            "nt" => Some(mime::APPLICATION_NTRIPLES),
            "ttl" => Some(mime::TEXT_TURTLE),
            "json" => Some(mime::APPLICATION_JSON),
            "txt" => Some(mime::TEXT_PLAIN),
            _ => None,
        }
    }
}

impl ContentTypeDetector for SniffingDetector {
    fn guess(
        &self,
        path_hint: Option<&str>,
        stream: &mut dyn Read,
        known: Option<&ContentType>,
    ) -> io::Result<ContentType> {
        let mut prefix = Vec::with_capacity(SNIFF_LEN as usize);
        stream.take(SNIFF_LEN).read_to_end(&mut prefix)?;

        let guessed = Self::sniff(&prefix)
            .or_else(|| path_hint.and_then(Self::by_extension))
            .or_else(|| known.cloned())
            .unwrap_or_else(|| {
                if prefix.is_empty() {
                    mime::APPLICATION_OCTET_STREAM
                } else {
                    mime::TEXT_PLAIN
                }
            });

        debug!(
            path = path_hint.unwrap_or_default(),
            sniffed_bytes = prefix.len(),
            content_type = %guessed,
            "Guessed content type"
        );
        Ok(guessed)
    }
}
