// ini_lexer.rs: split a raw config buffer into logical lines

/// UTF-8 byte-order mark, skipped when it starts the buffer.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// A line as `(start, length)` offsets into the buffer it was lexed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub length: usize,
}

impl Span {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// The bytes this span covers. Panics if `buf` is not the lexed buffer.
    pub fn slice<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.start..self.end()]
    }
}

#[inline]
fn is_line_break(b: u8) -> bool {
    b == 0 || b == b'\n' || b == b'\r'
}

/// Where line scanning starts: past a leading byte-order mark, if any.
pub fn content_start(buf: &[u8]) -> usize {
    if buf.starts_with(&UTF8_BOM) {
        UTF8_BOM.len()
    } else {
        0
    }
}

/// Split `buf` into lines. A run of `\0`, `\n` and `\r` bytes counts as a
/// single break, so `\r\n` never yields an empty line between the two.
pub fn split_lines(buf: &[u8]) -> Vec<Span> {
    let mut lines = Vec::new();
    let mut line_begin = content_start(buf);
    let mut on_break = false;

    for (i, &b) in buf.iter().enumerate().skip(line_begin) {
        if is_line_break(b) {
            if !on_break {
                on_break = true;
                lines.push(Span::new(line_begin, i - line_begin));
            }
        } else if on_break {
            on_break = false;
            line_begin = i;
        }
    }
    if !on_break {
        lines.push(Span::new(line_begin, buf.len() - line_begin));
    }
    lines
}
