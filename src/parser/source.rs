use sqlparser::tokenizer::{Location, Span};

/// Input text with a line index for mapping tokenizer locations to bytes.
pub(crate) struct Source<'a> {
    text:        &'a str,
    line_starts: Vec<usize>
}

impl<'a> Source<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            text,
            line_starts
        }
    }

    pub(crate) fn text(&self) -> &'a str {
        self.text
    }

    /// Byte offset of a 1-based line/column location.
    ///
    /// Columns count characters, matching the sqlparser tokenizer.
    pub(crate) fn offset(&self, location: Location) -> Option<usize> {
        let line = usize::try_from(location.line).ok()?.checked_sub(1)?;
        let column = usize::try_from(location.column).ok()?.checked_sub(1)?;
        let start = *self.line_starts.get(line)?;
        self.text[start..]
            .char_indices()
            .map(|(i, _)| start + i)
            .chain(std::iter::once(self.text.len()))
            .nth(column)
    }

    /// Text covered by a non-empty span.
    pub(crate) fn slice(&self, span: Span) -> Option<&'a str> {
        if span.start.line == 0 {
            return None;
        }
        let start = self.offset(span.start)?;
        let end = self.offset(span.end)?;
        self.text.get(start..end).filter(|s| !s.is_empty())
    }
}
