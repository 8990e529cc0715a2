//! Small helpers shared across the crate.

use ruff_text_size::TextSize;

/// Maps byte offsets in a source file to 1-indexed line numbers.
///
/// The ruff parser reports node positions as byte offsets, while every
/// diagnostic in this crate is line-based, so each checked file builds one
/// of these from its source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Builds the index by scanning for newlines. `'\n'` is always a single
    /// byte in UTF-8, so byte iteration is sufficient.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Converts a byte offset into a 1-indexed line number.
    #[must_use]
    pub fn line_index(&self, offset: TextSize) -> usize {
        let offset = offset.to_usize();
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_maps_offsets() {
        let index = LineIndex::new("a = 1\nb = 2\nc = 3\n");
        assert_eq!(index.line_index(TextSize::new(0)), 1);
        assert_eq!(index.line_index(TextSize::new(4)), 1);
        assert_eq!(index.line_index(TextSize::new(6)), 2);
        assert_eq!(index.line_index(TextSize::new(12)), 3);
    }

    #[test]
    fn line_index_handles_empty_source() {
        let index = LineIndex::new("");
        assert_eq!(index.line_index(TextSize::new(0)), 1);
    }
}
