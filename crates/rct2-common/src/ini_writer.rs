// ini_writer.rs: writes config sections and values that IniReader reads back

use std::path::Path;

use crate::config_enum::ConfigEnumLookup;
use crate::error::ConfigError;
use crate::stream::ByteStream;

#[cfg(windows)]
pub const PLATFORM_NEWLINE: &str = "\r\n";
#[cfg(not(windows))]
pub const PLATFORM_NEWLINE: &str = "\n";

/// Whether `value` can be written without quotes and still read back as-is.
fn is_plain_value(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
}

/// Bytes the lexer treats as line breaks. No escape can carry them.
fn is_line_break(c: char) -> bool {
    matches!(c, '\0' | '\n' | '\r')
}

/// Quote and escape `value` unless it is plain. Line break characters are
/// dropped.
pub fn encode_string_value(value: &str) -> String {
    if is_plain_value(value) {
        return value.to_owned();
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars().filter(|&c| !is_line_break(c)) {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Streams `[section]` headers and `key = value` lines into a [`ByteStream`].
#[derive(Debug)]
pub struct IniWriter {
    stream: ByteStream,
    first_section: bool,
}

impl IniWriter {
    pub fn new() -> Self {
        Self {
            stream: ByteStream::new(),
            first_section: true,
        }
    }

    /// Append to an existing stream at its current position.
    pub fn with_stream(stream: ByteStream) -> Self {
        Self {
            stream,
            first_section: true,
        }
    }

    pub fn into_stream(self) -> ByteStream {
        self.stream
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.stream.into_bytes()
    }

    pub fn save(self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        std::fs::write(path, self.stream.as_slice()).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    fn write_line(&mut self, line: &str) {
        self.stream.write(line.as_bytes());
        self.stream.write(PLATFORM_NEWLINE.as_bytes());
    }

    fn write_property(&mut self, name: &str, value: &str) {
        self.write_line(&format!("{} = {}", name, value));
    }

    pub fn write_section(&mut self, name: &str) {
        if self.first_section {
            self.first_section = false;
        } else {
            self.write_line("");
        }
        self.write_line(&format!("[{}]", name));
    }

    pub fn write_boolean(&mut self, name: &str, value: bool) {
        self.write_property(name, if value { "true" } else { "false" });
    }

    pub fn write_int32(&mut self, name: &str, value: i32) {
        self.write_property(name, &value.to_string());
    }

    pub fn write_int64(&mut self, name: &str, value: i64) {
        self.write_property(name, &value.to_string());
    }

    /// Shortest decimal form that parses back to the same `f32`.
    pub fn write_float(&mut self, name: &str, value: f32) {
        self.write_property(name, &value.to_string());
    }

    pub fn write_string(&mut self, name: &str, value: &str) {
        if value.chars().any(is_line_break) {
            log::warn!("dropping line breaks from config value '{}'", name);
        }
        self.write_property(name, &encode_string_value(value));
    }

    /// Write the symbolic key for `value`, or the raw number if the table has
    /// no name for it.
    pub fn write_enum<T, E>(&mut self, name: &str, value: T, table: &E)
    where
        T: Copy + Into<i64>,
        E: ConfigEnumLookup<T> + ?Sized,
    {
        match table.name_of(value) {
            Some(key) if !key.is_empty() => self.write_property(name, key),
            _ => self.write_int64(name, value.into()),
        }
    }
}

impl Default for IniWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_enum::{ConfigEnum, ConfigEnumEntry};
    use crate::ini_reader::IniReader;

    const COLOURS: ConfigEnum<i32> = ConfigEnum::new(&[
        ConfigEnumEntry::new("RED", 0),
        ConfigEnumEntry::new("DD/MM/YY", 1),
    ]);

    fn text(w: IniWriter) -> String {
        String::from_utf8(w.into_bytes()).unwrap()
    }

    #[test]
    fn test_section_separators() {
        let mut w = IniWriter::new();
        w.write_section("first");
        w.write_int32("a", 1);
        w.write_section("second");
        w.write_boolean("b", false);
        let nl = PLATFORM_NEWLINE;
        assert_eq!(
            text(w),
            format!("[first]{nl}a = 1{nl}{nl}[second]{nl}b = false{nl}")
        );
    }

    #[test]
    fn test_string_quoting() {
        assert_eq!(encode_string_value("Player"), "Player");
        assert_eq!(encode_string_value("en-GB"), "en-GB");
        assert_eq!(encode_string_value(""), "\"\"");
        assert_eq!(encode_string_value("two words"), "\"two words\"");
        assert_eq!(encode_string_value(r"c:\rct2"), r#""c:\\rct2""#);
        assert_eq!(encode_string_value("say \"hi\""), r#""say \"hi\"""#);
    }

    #[test]
    fn test_line_breaks_dropped_from_strings() {
        assert_eq!(encode_string_value("a\nb"), "\"ab\"");

        let mut w = IniWriter::new();
        w.write_section("s");
        w.write_string("v", "line1\nline2\r\n\0end");
        w.write_int32("after", 5);
        let mut r = IniReader::new(w.into_bytes());
        assert!(r.read_section("s"));
        assert_eq!(r.try_get_string("v"), Some("line1line2end"));
        assert_eq!(r.get_int32("after", 0), 5);
    }

    #[test]
    fn test_write_enum_fallback_to_integer() {
        let mut w = IniWriter::new();
        w.write_section("s");
        w.write_enum("known", 1, &COLOURS);
        w.write_enum("unknown", 42, &COLOURS);
        let out = text(w);
        assert!(out.contains("known = DD/MM/YY"));
        assert!(out.contains("unknown = 42"));
    }

    #[test]
    fn test_roundtrip_through_reader() {
        let strings = [
            "",
            "plain",
            "  leading and trailing  ",
            "hash # inside",
            "quote \" and 'single'",
            r"back\slash\",
            "equals = sign",
            "\"already quoted\"",
            "ünïcödé",
        ];
        let floats = [0.0f32, 1.0, -2.5, 0.1, 1.0e-7, 123456.79, f32::MAX];

        let mut w = IniWriter::new();
        w.write_section("values");
        w.write_boolean("t", true);
        w.write_boolean("f", false);
        w.write_int32("i32min", i32::MIN);
        w.write_int32("i32max", i32::MAX);
        w.write_int64("i64min", i64::MIN);
        for (i, s) in strings.iter().enumerate() {
            w.write_string(&format!("s{}", i), s);
        }
        for (i, f) in floats.iter().enumerate() {
            w.write_float(&format!("f{}", i), *f);
        }
        w.write_enum("colour", 0, &COLOURS);

        let mut r = IniReader::new(w.into_bytes());
        assert!(r.read_section("values"));
        assert!(r.get_boolean("t", false));
        assert!(!r.get_boolean("f", true));
        assert_eq!(r.get_int32("i32min", 0), i32::MIN);
        assert_eq!(r.get_int32("i32max", 0), i32::MAX);
        assert_eq!(r.get_int64("i64min", 0), i64::MIN);
        for (i, s) in strings.iter().enumerate() {
            assert_eq!(r.get_string(&format!("s{}", i), "<missing>"), *s, "string {}", i);
        }
        for (i, f) in floats.iter().enumerate() {
            assert_eq!(r.get_float(&format!("f{}", i), f32::NAN), *f, "float {}", i);
        }
        assert_eq!(r.get_enum("colour", 99, &COLOURS), 0);
    }
}
