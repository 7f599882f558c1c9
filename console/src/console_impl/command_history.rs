// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Every line that was submitted with Enter, oldest first, plus a navigation index.
///
/// The index lives in `[-1, len]`. Both `-1` (before the oldest entry) and `len` (past
/// the newest entry) mean "no entry selected", and recall an empty line. Submitting a
/// line always resets the index to `len`.
///
/// Unlike a shell history, every submitted line is recorded, including empty lines and
/// repeats of the previous line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHistory {
    entries: Vec<String>,
    index: isize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self {
            entries: vec![],
            index: -1,
        }
    }
}

impl CommandHistory {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
        self.index = self.len_as_index();
    }

    /// Move the index by `delta` (negative is towards older entries), clamped to
    /// `[-1, len]`, and return the entry there. Returns `""` at either boundary.
    pub fn navigate(&mut self, delta: isize) -> &str {
        self.index = self
            .index
            .saturating_add(delta)
            .clamp(-1, self.len_as_index());
        self.selected().unwrap_or_default()
    }

    /// The entry the index points at, if it is not at a boundary.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        usize::try_from(self.index)
            .ok()
            .and_then(|index| self.entries.get(index))
            .map(String::as_str)
    }

    #[must_use]
    pub fn index(&self) -> isize { self.index }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    #[must_use]
    pub fn last(&self) -> Option<&str> { self.entries.last().map(String::as_str) }

    #[must_use]
    pub fn entries(&self) -> &[String] { &self.entries }

    fn len_as_index(&self) -> isize { isize::try_from(self.entries.len()).unwrap_or(isize::MAX) }
}
