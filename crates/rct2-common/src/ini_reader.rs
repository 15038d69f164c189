// ini_reader.rs: section/key-value reader for the config file format
//
// [section]
// key = value            # comment
// quoted = "a # b"       # quotes protect '#' and surrounding whitespace

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::Path;

use crate::config_enum::ConfigEnumLookup;
use crate::error::ConfigError;
use crate::ini_lexer::{split_lines, Span};
use crate::stream::ByteStream;

// ============================================================
// Case-insensitive names
// ============================================================

/// Section or key name that hashes and compares with ASCII case folding.
///
/// Spelling is kept as written; only `Hash` and `Eq` ignore case.
#[derive(Debug, Clone)]
pub struct IniName(String);

impl IniName {
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Boost-style hash combine over the upper-cased bytes of `s`.
pub fn ini_name_hash(s: &str) -> u64 {
    s.bytes().fold(0u64, |seed, b| {
        let value = b.to_ascii_uppercase() as u64;
        seed ^ value
            .wrapping_add(0x9e37_79b9)
            .wrapping_add(seed << 6)
            .wrapping_add(seed >> 2)
    })
}

impl Hash for IniName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(ini_name_hash(&self.0));
    }
}

impl PartialEq for IniName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for IniName {}

impl From<&str> for IniName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Inclusive line indices of a section, header line included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

// ============================================================
// Line helpers
// ============================================================

/// Cut `line` at the first `#` that is neither quoted nor escaped.
pub fn trim_comment(line: &str) -> &str {
    let mut in_quotes: Option<char> = None;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if !escaped {
            match in_quotes {
                None if c == '#' => return &line[..i],
                Some(q) if c == q => in_quotes = None,
                None if c == '\'' || c == '"' => in_quotes = Some(c),
                _ => {}
            }
        }
        escaped = c == '\\' && !escaped;
    }
    line
}

/// Strip one layer of matching single or double quotes.
pub fn unquote_value(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && first == bytes[bytes.len() - 1] {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Drop every escaping backslash and keep the character after it, so `\n`
/// reads back as a plain `n`.
pub fn unescape_value(s: &str) -> String {
    if !s.contains('\\') {
        return s.to_owned();
    }
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;
    for c in s.chars() {
        if c == '\\' && !escaped {
            escaped = true;
        } else {
            escaped = false;
            out.push(c);
        }
    }
    out
}

/// Byte index of the first `=` not preceded by an escaping backslash.
fn find_assignment(line: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if c == '=' && !escaped {
            return Some(i);
        }
        escaped = c == '\\' && !escaped;
    }
    None
}

/// Split a value line into its key and final value.
pub fn parse_value_line(line: &str) -> Option<(&str, String)> {
    let line = trim_comment(line);
    let equals = find_assignment(line)?;
    let key = line[..equals].trim();
    let value = line[equals + 1..].trim();
    Some((key, unescape_value(unquote_value(value))))
}

// ============================================================
// IniReader
// ============================================================

/// Reader over a complete config buffer.
///
/// Sections are indexed once at construction. Values are parsed lazily by
/// [`read_section`](Self::read_section) and only for that one section; the
/// typed getters then answer from it.
#[derive(Debug, Clone)]
pub struct IniReader {
    buffer: Vec<u8>,
    lines: Vec<Span>,
    sections: HashMap<IniName, LineRange>,
    values: HashMap<IniName, String>,
}

impl IniReader {
    pub fn new(buffer: Vec<u8>) -> Self {
        let lines = split_lines(&buffer);
        let mut reader = Self {
            buffer,
            lines,
            sections: HashMap::new(),
            values: HashMap::new(),
        };
        reader.parse_sections();
        reader
    }

    /// Read everything between the stream's cursor and its end.
    pub fn from_stream(stream: &mut ByteStream) -> Self {
        let rest = stream.remaining();
        let bytes = stream.read_bytes(rest).map(<[u8]>::to_vec).unwrap_or_default();
        Self::new(bytes)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_stream(&mut ByteStream::from_bytes(bytes)))
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, index: usize) -> String {
        String::from_utf8_lossy(self.lines[index].slice(&self.buffer)).into_owned()
    }

    fn parse_sections(&mut self) {
        let mut current: Option<(String, usize)> = None;

        for i in 0..self.lines.len() {
            let line = self.line(i);
            let line = line.trim();
            if line.len() > 3 && line.starts_with('[') {
                if let Some(end) = line.find(']') {
                    if let Some((name, start)) = current.take() {
                        if !name.is_empty() {
                            self.sections
                                .insert(IniName(name), LineRange { start, end: i - 1 });
                        }
                    }
                    current = Some((line[1..end].to_owned(), i));
                }
            }
        }

        if let Some((name, start)) = current.filter(|(name, _)| !name.is_empty()) {
            let end = self.lines.len() - 1;
            self.sections.insert(IniName(name), LineRange { start, end });
        }
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(&IniName::new(name))
    }

    pub fn section_range(&self, name: &str) -> Option<LineRange> {
        self.sections.get(&IniName::new(name)).copied()
    }

    /// Parse the body of section `name`, replacing any previously read values.
    /// Returns `false` and leaves state alone if the section does not exist.
    pub fn read_section(&mut self, name: &str) -> bool {
        let Some(range) = self.section_range(name) else {
            return false;
        };
        self.values.clear();
        for i in range.start + 1..=range.end {
            let line = self.line(i);
            if let Some((key, value)) = parse_value_line(&line) {
                self.values.insert(IniName::new(key), value);
            }
        }
        true
    }

    // ============================================================
    // Typed getters
    // ============================================================

    pub fn try_get_string(&self, name: &str) -> Option<&str> {
        self.values.get(&IniName::new(name)).map(String::as_str)
    }

    fn get_parsed<T: std::str::FromStr>(&self, name: &str, default: T) -> T {
        self.try_get_string(name)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    pub fn get_boolean(&self, name: &str, default: bool) -> bool {
        match self.try_get_string(name) {
            Some(v) if v.eq_ignore_ascii_case("true") => true,
            Some(v) if v.eq_ignore_ascii_case("false") => false,
            _ => default,
        }
    }

    pub fn get_int32(&self, name: &str, default: i32) -> i32 {
        self.get_parsed(name, default)
    }

    pub fn get_int64(&self, name: &str, default: i64) -> i64 {
        self.get_parsed(name, default)
    }

    pub fn get_float(&self, name: &str, default: f32) -> f32 {
        self.get_parsed(name, default)
    }

    pub fn get_string(&self, name: &str, default: &str) -> String {
        self.try_get_string(name).unwrap_or(default).to_owned()
    }

    /// Like [`get_string`](Self::get_string) but with no default: absent keys
    /// stay `None`.
    pub fn get_optional_string(&self, name: &str) -> Option<String> {
        self.try_get_string(name).map(str::to_owned)
    }

    pub fn get_enum<T, E>(&self, name: &str, default: T, table: &E) -> T
    where
        T: Copy,
        E: ConfigEnumLookup<T> + ?Sized,
    {
        match self.try_get_string(name) {
            Some(key) => table.value_of(key, default),
            None => default,
        }
    }
}

// ============================================================
// Tests
// ============================================================
