//! Line/offset conversion for document text.
//!
//! [`LineIndex`] pre-computes line start offsets so that both directions of
//! conversion are a binary search plus a scan of a single line.

use tale_ir::{Position, Range, Span};

/// Byte offsets of every line start in a text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineIndex {
    /// `starts[0] = 0`; `starts[n]` is the byte after the n-th `\n`.
    starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    /// Scan `text` once for newlines.
    pub fn build(text: &str) -> Self {
        let mut starts = vec![0u32];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                starts.push(to_u32(i + 1));
            }
        }
        LineIndex {
            starts,
            len: to_u32(text.len()),
        }
    }

    /// Number of lines (a trailing newline opens one more, empty, line).
    pub fn line_count(&self) -> u32 {
        to_u32(self.starts.len())
    }

    /// Byte offset of the start of `line`, if it exists.
    pub fn line_start(&self, line: u32) -> Option<u32> {
        self.starts.get(line as usize).copied()
    }

    /// Zero-based line containing `offset`.
    #[inline]
    pub fn line_of(&self, offset: u32) -> u32 {
        match self.starts.binary_search(&offset) {
            Ok(exact) => to_u32(exact),
            Err(insert) => to_u32(insert.saturating_sub(1)),
        }
    }

    /// End of `line`'s content, excluding its line break.
    pub fn line_end(&self, text: &str, line: u32) -> u32 {
        let next = self
            .line_start(line + 1)
            .map_or(self.len, |next| next.saturating_sub(1));
        let start = self.line_start(line).unwrap_or(self.len);
        if next > start && text.as_bytes().get(next as usize - 1) == Some(&b'\r') {
            next - 1
        } else {
            next.max(start)
        }
    }

    /// Position of a byte offset; offsets past the end clamp to the end.
    pub fn position_at(&self, text: &str, offset: u32) -> Position {
        let offset = offset.min(self.len);
        let line = self.line_of(offset);
        let start = self.line_start(line).unwrap_or(0) as usize;
        let prefix = text.get(start..offset as usize).unwrap_or("");
        Position::new(line, to_u32(prefix.chars().count()))
    }

    /// Byte offset of a position. Lines past the end clamp to the text end,
    /// characters past the end of a line clamp to the line end.
    pub fn offset_at(&self, text: &str, position: Position) -> u32 {
        let Some(start) = self.line_start(position.line) else {
            return self.len;
        };
        let end = self.line_end(text, position.line);
        let line_text = text.get(start as usize..end as usize).unwrap_or("");
        let within = line_text
            .char_indices()
            .nth(position.character as usize)
            .map_or(line_text.len(), |(idx, _)| idx);
        start + to_u32(within)
    }

    /// Convert a byte span to a line/character range.
    pub fn range_of(&self, text: &str, span: Span) -> Range {
        Range::new(
            self.position_at(text, span.start),
            self.position_at(text, span.end),
        )
    }

    /// Convert a line/character range to a byte span.
    pub fn span_of(&self, text: &str, range: Range) -> Span {
        let start = self.offset_at(text, range.start);
        let end = self.offset_at(text, range.end).max(start);
        Span::new(start, end)
    }
}

#[inline]
fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests;
