// File: ./src/importer/tokenizer.rs
// Splits loose bookmark-export markup into tags and text runs.
//
// This is deliberately not an HTML5 tokenizer: exports leave <DT> and <p>
// open, mix upper and lower case, and sometimes carry unbalanced quotes, so
// the scanner only needs to find tag boundaries and attribute pairs.
use crate::model::ImportWarning;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Upper-cased tag name.
    pub name: String,
    /// Upper-cased attribute names with their raw (undecoded) values, in source order.
    pub attrs: Vec<(String, &'a str)>,
    pub offset: usize,
}

impl<'a> Tag<'a> {
    /// First value of the named attribute. `name` must be upper case.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Open(Tag<'a>),
    Close(String),
    Text(&'a str),
}

impl Token<'_> {
    pub fn is_open(&self, name: &str) -> bool {
        matches!(self, Token::Open(tag) if tag.is(name))
    }

    pub fn is_close(&self, name: &str) -> bool {
        matches!(self, Token::Close(n) if n == name)
    }
}

#[derive(Debug, Default)]
pub struct TokenStream<'a> {
    pub tokens: Vec<Token<'a>>,
    pub warnings: Vec<ImportWarning>,
}

pub fn tokenize(input: &str) -> TokenStream<'_> {
    let bytes = input.as_bytes();
    let mut stream = TokenStream::default();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            let end = find_byte(bytes, pos, b'<').unwrap_or(bytes.len());
            stream.tokens.push(Token::Text(&input[pos..end]));
            pos = end;
            continue;
        }

        let rest = &input[pos..];
        if rest.starts_with("<!--") {
            pos = rest[4..]
                .find("-->")
                .map(|i| pos + 4 + i + 3)
                .unwrap_or(bytes.len());
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            pos = find_byte(bytes, pos, b'>').map(|i| i + 1).unwrap_or(bytes.len());
            continue;
        }

        let (closing, name_start) = if rest.starts_with("</") {
            (true, pos + 2)
        } else {
            (false, pos + 1)
        };
        if !bytes.get(name_start).is_some_and(u8::is_ascii_alphabetic) {
            // A lone '<' in text.
            let end = find_byte(bytes, pos + 1, b'<').unwrap_or(bytes.len());
            stream.tokens.push(Token::Text(&input[pos..end]));
            pos = end;
            continue;
        }

        let Some(tag_end) = find_tag_end(bytes, name_start) else {
            stream.warnings.push(ImportWarning::UnterminatedTag(pos));
            break;
        };

        let name_end = bytes[name_start..tag_end]
            .iter()
            .position(|b| !b.is_ascii_alphanumeric())
            .map(|i| name_start + i)
            .unwrap_or(tag_end);
        let name = input[name_start..name_end].to_ascii_uppercase();

        if closing {
            stream.tokens.push(Token::Close(name));
        } else {
            stream.tokens.push(Token::Open(Tag {
                name,
                attrs: parse_attributes(&input[name_end..tag_end]),
                offset: pos,
            }));
        }
        pos = tag_end + 1;
    }

    stream
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes[from..]
        .iter()
        .position(|&b| b == needle)
        .map(|i| from + i)
}

/// Position of the `>` closing a tag, skipping quoted attribute values.
/// Falls back to the first `>` when a stray quote would swallow the rest of the file.
fn find_tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes[from..].iter().enumerate() {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => return Some(from + i),
            (None, b'<') => break,
            _ => {}
        }
    }
    find_byte(bytes, from, b'>')
}

fn parse_attributes(body: &str) -> Vec<(String, &str)> {
    let bytes = body.as_bytes();
    let mut attrs: Vec<(String, &str)> = Vec::new();
    let mut pos = 0;

    loop {
        while pos < bytes.len() && (bytes[pos].is_ascii_whitespace() || bytes[pos] == b'/') {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }

        let name_start = pos;
        while pos < bytes.len()
            && !bytes[pos].is_ascii_whitespace()
            && bytes[pos] != b'='
            && bytes[pos] != b'/'
        {
            pos += 1;
        }
        let name = body[name_start..pos].to_ascii_uppercase();

        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        let value = if bytes.get(pos) == Some(&b'=') {
            pos += 1;
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            match bytes.get(pos) {
                Some(&q @ (b'"' | b'\'')) => {
                    let start = pos + 1;
                    let end = find_byte(bytes, start, q).unwrap_or(bytes.len());
                    pos = (end + 1).min(bytes.len());
                    &body[start..end]
                }
                Some(_) => {
                    let start = pos;
                    while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
                        pos += 1;
                    }
                    &body[start..pos]
                }
                None => "",
            }
        } else {
            ""
        };

        if !name.is_empty() && !attrs.iter().any(|(k, _)| *k == name) {
            attrs.push((name, value));
        }
    }

    attrs
}
