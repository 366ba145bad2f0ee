//! Document store entries: versioned text plus a line index.

use serde::{Deserialize, Serialize};
use tale_diagnostic::LineIndex;
use tale_ir::{Range, Span, TextChange};

/// One content-change event. A change without a range replaces the whole
/// text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    pub text: String,
}

impl ContentChange {
    pub fn replace(range: Range, text: impl Into<String>) -> Self {
        ContentChange {
            range: Some(range),
            text: text.into(),
        }
    }

    pub fn full(text: impl Into<String>) -> Self {
        ContentChange {
            range: None,
            text: text.into(),
        }
    }
}

/// An open document `{uri, version, text}`.
#[derive(Clone, Debug)]
pub struct TextDocument {
    uri: String,
    version: i32,
    text: String,
    lines: LineIndex,
}

impl TextDocument {
    pub fn new(uri: impl Into<String>, version: i32, text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = LineIndex::build(&text);
        TextDocument {
            uri: uri.into(),
            version,
            text,
            lines,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn set_version(&mut self, version: i32) {
        self.version = version;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    pub fn len(&self) -> u32 {
        u32::try_from(self.text.len()).unwrap_or(u32::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Resolve a change's range to bytes of the current text.
    pub fn span_of_change(&self, change: &ContentChange) -> Span {
        change.range.map_or(Span::new(0, self.len()), |range| {
            self.lines.span_of(&self.text, range)
        })
    }

    pub fn range_of(&self, span: Span) -> Range {
        self.lines.range_of(&self.text, span)
    }

    /// Apply one change and return it in byte offsets of the old text.
    pub fn apply(&mut self, change: &ContentChange) -> TextChange {
        let span = self.span_of_change(change);
        self.text.replace_range(span.to_range(), &change.text);
        self.lines = LineIndex::build(&self.text);
        TextChange::new(
            span.start,
            span.end,
            u32::try_from(change.text.len()).unwrap_or(u32::MAX),
        )
    }
}

#[cfg(test)]
mod tests;
