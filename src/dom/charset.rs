//! Byte-level decoding of HTML documents.

use std::borrow::Cow;
use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;

/// Bytes inspected for an in-document charset declaration.
const PRESCAN_LIMIT: usize = 1024;

/// `<meta charset=...>` or the `charset=` parameter of a
/// `<meta http-equiv="Content-Type" content=...>` declaration.
#[allow(clippy::expect_used)]
static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#)
        .expect("meta charset pattern")
});

/// Pick the document encoding: byte order mark, then the first meta
/// declaration within the prescan window, then UTF-8.
#[must_use]
pub fn sniff_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    let head = &bytes[..bytes.len().min(PRESCAN_LIMIT)];
    META_CHARSET
        .captures(head)
        .and_then(|caps| caps.get(1))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        // UTF-16 labels in ASCII-compatible markup decode as UTF-8
        .map(Encoding::output_encoding)
        .unwrap_or(UTF_8)
}

/// Decode `bytes` to UTF-8 text. Malformed sequences become U+FFFD.
#[must_use]
pub fn decode_html(bytes: &[u8]) -> Cow<'_, str> {
    let encoding = sniff_encoding(bytes);
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(encoding = used.name(), "replaced malformed byte sequences");
    }
    text
}
