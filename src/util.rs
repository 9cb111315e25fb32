//! Byte decoding for HTML input.

use std::borrow::Cow;

/// How far into the document to look for an encoding declaration.
const SNIFF_LEN: usize = 1024;

/// Decode bytes to a string.
///
/// 1. UTF-8 (a BOM is handled by encoding_rs)
/// 2. the hinted encoding, when the bytes are not valid UTF-8
/// 3. Windows-1252, a superset of ISO-8859-1
///
/// Valid UTF-8 input is borrowed, not copied.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        log::debug!("input is not UTF-8, decoding as {}", encoding.name());
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    log::debug!("input is not UTF-8 and declares no encoding, decoding as windows-1252");
    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Find a declared encoding in the document prologue.
///
/// Recognizes `<?xml ... encoding="..."?>`, `<meta charset="...">` and the
/// `charset=` parameter of `<meta http-equiv="Content-Type" content="...">`.
pub fn extract_encoding_hint(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(SNIFF_LEN)];

    if let Some(start) = find_ignore_case(prefix, b"<?xml")
        && let Some(value) = attribute_value(&prefix[start..], b"encoding=")
    {
        return Some(value);
    }

    let mut rest = prefix;
    while let Some(start) = find_ignore_case(rest, b"<meta") {
        let tag = &rest[start..];
        let end = tag.iter().position(|&b| b == b'>').unwrap_or(tag.len());
        let tag = &tag[..end];
        if let Some(value) = attribute_value(tag, b"charset=") {
            return Some(value);
        }
        rest = &rest[start + end..];
    }
    None
}

fn find_ignore_case(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
}

/// Value after `key`, quoted or bare. A bare value ends at whitespace, a
/// quote, `;`, `/` or `>`.
fn attribute_value<'a>(tag: &'a [u8], key: &[u8]) -> Option<&'a str> {
    let pos = find_ignore_case(tag, key)?;
    let after = &tag[pos + key.len()..];
    let first = *after.first()?;

    let value = if first == b'"' || first == b'\'' {
        let end = after[1..].iter().position(|&b| b == first)? + 1;
        &after[1..end]
    } else {
        let end = after
            .iter()
            .position(|&b| b.is_ascii_whitespace() || matches!(b, b'"' | b'\'' | b';' | b'/' | b'>'))
            .unwrap_or(after.len());
        &after[..end]
    };

    std::str::from_utf8(value).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_borrows() {
        let text = decode_text("héllo".as_bytes(), None);
        assert!(matches!(text, Cow::Borrowed("héllo")));
    }

    #[test]
    fn test_decode_falls_back_to_windows_1252() {
        // 0xE9 is "é" in Windows-1252 and invalid on its own in UTF-8.
        assert_eq!(decode_text(b"caf\xE9", None), "café");
    }

    #[test]
    fn test_decode_uses_hint() {
        // 0xE6 is "ć" in ISO-8859-2 but "æ" in Windows-1252.
        assert_eq!(decode_text(b"\xE6", Some("iso-8859-2")), "ć");
    }

    #[test]
    fn test_hint_from_xml_declaration() {
        let bytes = br#"<?xml version="1.0" encoding="ISO-8859-1"?><html/>"#;
        assert_eq!(extract_encoding_hint(bytes), Some("ISO-8859-1"));
    }

    #[test]
    fn test_hint_from_meta_charset() {
        let bytes = br#"<html><head><meta charset=windows-1250></head>"#;
        assert_eq!(extract_encoding_hint(bytes), Some("windows-1250"));
    }

    #[test]
    fn test_hint_from_http_equiv() {
        let bytes = br#"<meta name="x"><meta http-equiv="Content-Type" content="text/html; charset=koi8-r">"#;
        assert_eq!(extract_encoding_hint(bytes), Some("koi8-r"));
    }

    #[test]
    fn test_no_hint() {
        assert_eq!(extract_encoding_hint(b"<p>plain</p>"), None);
    }
}
