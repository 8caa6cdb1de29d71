use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::dom::errors::ParseError;

/// How far into the document we look for an in-band charset declaration.
const SNIFF_WINDOW: usize = 4096;

static CHARSET_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static META_HTTP_EQUIV_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap()
});

static XML_DECL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^<\?xml[^>]*?encoding\s*=\s*["']([^"']+)["']"#).unwrap());

/// Where an encoding decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharsetSource {
    Bom,
    Hint,
    Declaration,
    Heuristic,
}

/// Picks the document encoding: BOM, then the caller's content-type hint,
/// then an in-band declaration, then `chardetng`.
pub fn detect_charset(
    content_type_hint: Option<&str>,
    bytes: &[u8],
) -> (&'static Encoding, CharsetSource) {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return (encoding, CharsetSource::Bom);
    }

    if let Some(hint) = content_type_hint
        && let Some(encoding) = label_from(&CHARSET_REGEX, hint)
    {
        return (encoding, CharsetSource::Hint);
    }

    let window = &bytes[..bytes.len().min(SNIFF_WINDOW)];
    let head = String::from_utf8_lossy(window);
    for regex in [&*XML_DECL_REGEX, &*META_CHARSET_REGEX, &*META_HTTP_EQUIV_REGEX] {
        if let Some(encoding) = label_from(regex, &head) {
            return (encoding, CharsetSource::Declaration);
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(window, window.len() == bytes.len());
    (detector.guess(None, true), CharsetSource::Heuristic)
}

fn label_from(regex: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = regex.captures(haystack)?.get(1)?.as_str().to_lowercase();
    Encoding::for_label(label.as_bytes())
}

/// Decodes `bytes` to UTF-8, stripping any BOM.
///
/// Malformed sequences are replaced with U+FFFD. With `strict` set, they are
/// an error instead when the encoding came from a BOM, hint or declaration. A
/// heuristic guess that produced replacements is retried as UTF-8 lossily.
pub fn decode(
    bytes: &[u8],
    content_type_hint: Option<&str>,
    strict: bool,
) -> Result<String, ParseError> {
    let (encoding, source) = detect_charset(content_type_hint, bytes);
    let (decoded, used, had_errors) = encoding.decode(bytes);
    debug!(encoding = used.name(), ?source, had_errors, "Decoded document");

    if !had_errors {
        return Ok(decoded.into_owned());
    }
    if source == CharsetSource::Heuristic {
        return Ok(String::from_utf8_lossy(bytes).into_owned());
    }
    if strict {
        return Err(ParseError::Charset(format!(
            "content is not valid {}",
            used.name()
        )));
    }

    warn!(
        encoding = used.name(),
        ?source,
        "Replaced malformed byte sequences while decoding"
    );
    Ok(decoded.into_owned())
}
