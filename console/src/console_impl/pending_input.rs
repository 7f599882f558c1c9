// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::ops::Range;

/// The characters the user has typed for the current line, but not yet submitted with
/// Enter. All indices are char indices (not byte offsets), and every index that is
/// passed in is clamped to `[0, len]` first, so none of these operations can fail.
///
/// Invariant: `0 <= cursor <= len`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingInputBuffer {
    text: Vec<char>,
    cursor: usize,
}

impl PendingInputBuffer {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Buffer with the given text and the cursor at the end.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        let text: Vec<char> = text.chars().collect();
        let cursor = text.len();
        Self { text, cursor }
    }

    #[must_use]
    pub fn len(&self) -> usize { self.text.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.text.is_empty() }

    #[must_use]
    pub fn text(&self) -> String { self.text.iter().collect() }

    #[must_use]
    pub fn cursor(&self) -> usize { self.cursor }

    #[must_use]
    pub fn clamp(&self, index: usize) -> usize { index.min(self.text.len()) }

    /// Returns the clamped index the cursor was moved to.
    pub fn set_cursor(&mut self, index: usize) -> usize {
        self.cursor = self.clamp(index);
        self.cursor
    }

    /// Insert `text` at `index` (clamped, so an index past the end appends). The cursor
    /// ends up right after the inserted text. Returns the index where the text went.
    pub fn insert(&mut self, index: usize, text: &str) -> usize {
        let index = self.clamp(index);
        let count_before = self.text.len();
        self.text.splice(index..index, text.chars());
        self.cursor = index + (self.text.len() - count_before);
        index
    }

    /// Remove `[start, end)`. The bounds may be given in either order. Returns the range
    /// that was actually removed (after clamping and ordering), which may be empty. The
    /// cursor ends up at the start of the removed range.
    pub fn delete_range(&mut self, start: usize, end: usize) -> Range<usize> {
        let (start, end) = (self.clamp(start.min(end)), self.clamp(start.max(end)));
        self.text.drain(start..end);
        self.cursor = start;
        start..end
    }

    /// Backspace at `index`. No-op at the start of the buffer. Returns the index of the
    /// removed char.
    pub fn delete_backward(&mut self, index: usize) -> Option<usize> {
        let index = self.clamp(index);
        if index == 0 {
            return None;
        }
        self.text.remove(index - 1);
        self.cursor = index - 1;
        Some(index - 1)
    }

    /// Delete key at `index`. No-op at the end of the buffer. Returns the index of the
    /// removed char.
    pub fn delete_forward(&mut self, index: usize) -> Option<usize> {
        let index = self.clamp(index);
        if index >= self.text.len() {
            return None;
        }
        self.text.remove(index);
        self.cursor = index;
        Some(index)
    }

    /// Text in `range` (clamped), without removing it.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> String {
        let (start, end) = (self.clamp(range.start), self.clamp(range.end));
        if start >= end {
            return String::new();
        }
        self.text[start..end].iter().collect()
    }

    /// Empty the buffer and return what was in it.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text).into_iter().collect()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_insert_clamps_to_append() {
        let mut buffer = PendingInputBuffer::with_text("abc");
        let index = buffer.insert(99, "de");
        assert_eq!(index, 3);
        assert_eq!(buffer.text(), "abcde");
        assert_eq!(buffer.cursor(), 5);
    }

    #[test]
    fn test_insert_in_the_middle_moves_cursor_after_insertion() {
        let mut buffer = PendingInputBuffer::with_text("ad");
        buffer.insert(1, "bc");
        assert_eq!(buffer.text(), "abcd");
        assert_eq!(buffer.cursor(), 3);
    }

    #[test]
    fn test_multibyte_chars_are_single_positions() {
        let mut buffer = PendingInputBuffer::with_text("héllo");
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.delete_backward(2), Some(1));
        assert_eq!(buffer.text(), "hllo");
    }

    #[test_case(1, 3, "ad", 1..3 ; "in order")]
    #[test_case(3, 1, "ad", 1..3 ; "reversed bounds")]
    #[test_case(2, 99, "ab", 2..4 ; "end clamped")]
    #[test_case(2, 2, "abcd", 2..2 ; "empty range")]
    fn test_delete_range(start: usize, end: usize, expected: &str, removed: Range<usize>) {
        let mut buffer = PendingInputBuffer::with_text("abcd");
        assert_eq!(buffer.delete_range(start, end), removed);
        assert_eq!(buffer.text(), expected);
        assert_eq!(buffer.cursor(), removed.start);
    }

    #[test]
    fn test_delete_backward_at_zero_is_noop() {
        let mut buffer = PendingInputBuffer::with_text("abc");
        assert_eq!(buffer.delete_backward(0), None);
        assert_eq!(buffer.text(), "abc");
    }

    #[test]
    fn test_delete_forward_at_end_is_noop() {
        let mut buffer = PendingInputBuffer::with_text("abc");
        assert_eq!(buffer.delete_forward(3), None);
        assert_eq!(buffer.delete_forward(42), None);
        assert_eq!(buffer.text(), "abc");

        assert_eq!(buffer.delete_forward(0), Some(0));
        assert_eq!(buffer.text(), "bc");
        assert_eq!(buffer.cursor(), 0);
    }

    #[test]
    fn test_take_empties_buffer() {
        let mut buffer = PendingInputBuffer::with_text("line");
        assert_eq!(buffer.take(), "line");
        assert!(buffer.is_empty());
        assert_eq!(buffer.cursor(), 0);
    }

    #[test]
    fn test_slice_and_set_cursor_clamp() {
        let mut buffer = PendingInputBuffer::with_text("hello");
        assert_eq!(buffer.slice(1..3), "el");
        assert_eq!(buffer.slice(4..10), "o");
        assert_eq!(buffer.slice(3..1), "");
        assert_eq!(buffer.set_cursor(100), 5);
    }
}
