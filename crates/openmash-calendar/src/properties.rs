//! Reader for Java-style `.properties` files.
//!
//! Supports the parts of the format that real credential files use:
//! `#`/`!` comments, `=`, `:` or whitespace separators, backslash line
//! continuations, and `\t`, `\n`, `\r`, `\f`, `\uXXXX` escapes.

use std::collections::HashMap;
use std::io::{self, Read};

/// Parsed key/value pairs from a properties resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    /// Parses properties from text.
    ///
    /// Later occurrences of a key replace earlier ones. The only failure is
    /// a malformed `\u` escape, reported as [`io::ErrorKind::InvalidData`].
    pub fn parse(input: &str) -> io::Result<Self> {
        let mut entries = HashMap::new();
        let mut lines = split_lines(input).into_iter();

        while let Some(line) = lines.next() {
            let trimmed = trim_blank_start(line);
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }

            let mut logical = trimmed.to_string();
            while has_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some(next) => logical.push_str(trim_blank_start(next)),
                    None => break,
                }
            }

            let (key, value) = split_entry(&logical);
            entries.insert(unescape(key)?, unescape(value)?);
        }

        Ok(Self { entries })
    }

    /// Reads all of `reader` and parses it.
    ///
    /// The bytes are decoded as ISO-8859-1, so every byte maps to exactly one
    /// character and no byte sequence is rejected. Characters outside
    /// Latin-1 are written as `\uXXXX` escapes.
    pub fn load<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let content: String = bytes.iter().map(|&b| char::from(b)).collect();
        Self::parse(&content)
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Splits on `\n`, `\r\n` and lone `\r`.
fn split_lines(input: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&input[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&input[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < input.len() {
        lines.push(&input[start..]);
    }
    lines
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

fn trim_blank_start(s: &str) -> &str {
    s.trim_start_matches(is_blank)
}

/// A line continues when it ends with an odd number of backslashes.
fn has_continuation(line: &str) -> bool {
    let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
    trailing % 2 == 1
}

/// Splits a logical line into its raw (still escaped) key and value.
fn split_entry(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if is_blank(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut value = trim_blank_start(&line[key_end..]);
    if let Some(rest) = value.strip_prefix(['=', ':']) {
        value = trim_blank_start(rest);
    }
    (key, value)
}

/// Decodes escape sequences.
///
/// `\uXXXX` escapes are UTF-16 code units, so surrogate pairs written as two
/// escapes decode to a single character.
fn unescape(raw: &str) -> io::Result<String> {
    if !raw.contains('\\') {
        return Ok(raw.to_string());
    }

    let mut units: Vec<u16> = Vec::with_capacity(raw.len());
    let mut chars = raw.chars();
    let mut buf = [0u16; 2];

    while let Some(c) = chars.next() {
        let decoded = if c == '\\' {
            match chars.next() {
                Some('t') => '\t',
                Some('n') => '\n',
                Some('r') => '\r',
                Some('f') => '\x0c',
                Some('u') => {
                    let hex: String = chars.by_ref().take(4).collect();
                    let unit = parse_unicode_escape(&hex)?;
                    units.push(unit);
                    continue;
                }
                Some(other) => other,
                None => break,
            }
        } else {
            c
        };
        units.extend_from_slice(decoded.encode_utf16(&mut buf));
    }

    String::from_utf16(&units).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn parse_unicode_escape(hex: &str) -> io::Result<u16> {
    let malformed = || {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("malformed \\uxxxx escape: \\u{}", hex),
        )
    };
    if hex.len() != 4 {
        return Err(malformed());
    }
    u16::from_str_radix(hex, 16).map_err(|_| malformed())
}
