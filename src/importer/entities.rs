// File: ./src/importer/entities.rs
// Character reference decoding for text and attribute values
use html_escape::decode_html_entities;

/// Longest reference body we try to match (`CounterClockwiseContourIntegral` is 31).
const MAX_REF_LEN: usize = 32;

/// Named references resolve to one or two code points.
const MAX_NAMED_CHARS: usize = 2;

pub fn decode(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        let semi = after
            .find(';')
            .filter(|&semi| semi > 0 && semi <= MAX_REF_LEN);
        match semi.and_then(|semi| resolve(&rest[amp..amp + semi + 2]).map(|s| (s, semi))) {
            Some((decoded, semi)) => {
                out.push_str(&decoded);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// `reference` is the full `&...;` slice.
fn resolve(reference: &str) -> Option<String> {
    let body = &reference[1..reference.len() - 1];
    if let Some(num) = body.strip_prefix('#') {
        let code = if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        return char::from_u32(code)
            .filter(|c| *c != '\0')
            .map(String::from);
    }
    if !body.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    // Only a whole-reference match counts, not a legacy prefix like `&amp` in `&ampx;`.
    let decoded = decode_html_entities(reference);
    (decoded != reference && decoded.chars().count() <= MAX_NAMED_CHARS)
        .then(|| decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_named_and_numeric() {
        assert_eq!(decode("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode("&lt;b&gt;"), "<b>");
        assert_eq!(decode("it&#39;s"), "it's");
        assert_eq!(decode("&#x1F600;"), "😀");
        assert_eq!(decode("a&nbsp;b"), "a\u{a0}b");
        assert_eq!(decode("Caf&eacute; M&uuml;nchen"), "Café München");
        assert_eq!(decode("&Aring;lesund &ntilde;"), "Ålesund ñ");
        assert_eq!(decode("&euro;5 &pound;3 &yen;9"), "€5 £3 ¥9");
    }

    #[test]
    fn test_decode_leaves_unknown_references() {
        assert_eq!(decode("AT&T"), "AT&T");
        assert_eq!(decode("&bogus;"), "&bogus;");
        assert_eq!(decode("a & b; c"), "a & b; c");
        assert_eq!(decode("&#0;"), "&#0;");
        assert_eq!(decode("trailing &"), "trailing &");
        assert_eq!(decode("&ampx;"), "&ampx;");
    }

    #[test]
    fn test_decode_non_ascii_passthrough() {
        assert_eq!(decode("북마크바 &amp; 개발도구"), "북마크바 & 개발도구");
    }
}
