// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ConsoleColor, DEFAULT_WINDOW_TITLE, FontSpec, NamedColor, OutputComparison,
            RecolorOutcome, TextRole, TextStyle, TextSurface};
use std::ops::Range;

/// A [`TextSurface`] that keeps everything in memory. Used by the headless `rconsole`
/// binary and by tests. Every char carries its own [`TextStyle`], and dialogs are
/// recorded instead of shown.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    chars: Vec<char>,
    styles: Vec<TextStyle>,
    cursor: usize,
    selection: Option<Range<usize>>,
    editable: bool,
    title: String,
    background: Option<ConsoleColor>,
    font: Option<FontSpec>,
    span_addressing: bool,
    messages: Vec<(String, String)>,
    comparisons: Vec<OutputComparison>,
    focus_requests: usize,
    closed: bool,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self {
            chars: vec![],
            styles: vec![],
            cursor: 0,
            selection: None,
            editable: true,
            title: DEFAULT_WINDOW_TITLE.to_string(),
            background: None,
            font: None,
            span_addressing: true,
            messages: vec![],
            comparisons: vec![],
            focus_requests: 0,
            closed: false,
        }
    }
}

impl MemorySurface {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// A surface that can't style individual spans, so recoloring hits everything.
    #[must_use]
    pub fn without_span_addressing() -> Self {
        Self {
            span_addressing: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn style_at(&self, index: usize) -> Option<TextStyle> { self.styles.get(index).copied() }

    /// Adjacent chars with the same style merged into runs.
    #[must_use]
    pub fn styled_runs(&self) -> Vec<(String, TextStyle)> {
        let mut runs: Vec<(String, TextStyle)> = vec![];
        for (ch, style) in self.chars.iter().zip(&self.styles) {
            match runs.last_mut() {
                Some((text, last_style)) if last_style == style => text.push(*ch),
                _ => runs.push((ch.to_string(), *style)),
            }
        }
        runs
    }

    /// Text of every char whose style has the given role.
    #[must_use]
    pub fn text_with_role(&self, role: TextRole) -> String {
        self.chars
            .iter()
            .zip(&self.styles)
            .filter(|(_, style)| style.role == role)
            .map(|(ch, _)| *ch)
            .collect()
    }

    #[must_use]
    pub fn messages(&self) -> &[(String, String)] { &self.messages }

    #[must_use]
    pub fn comparisons(&self) -> &[OutputComparison] { &self.comparisons }

    #[must_use]
    pub fn background(&self) -> Option<ConsoleColor> { self.background }

    #[must_use]
    pub fn font(&self) -> Option<&FontSpec> { self.font.as_ref() }

    #[must_use]
    pub fn focus_requests(&self) -> usize { self.focus_requests }

    #[must_use]
    pub fn is_closed(&self) -> bool { self.closed }

    fn clamp(&self, index: usize) -> usize { index.min(self.chars.len()) }

    fn clamp_range(&self, range: &Range<usize>) -> Range<usize> {
        let start = self.clamp(range.start.min(range.end));
        let end = self.clamp(range.start.max(range.end));
        start..end
    }
}

fn plain_style() -> TextStyle {
    TextStyle {
        role: TextRole::Output,
        color: NamedColor::Black.into(),
        bold: false,
    }
}

impl TextSurface for MemorySurface {
    fn text(&self) -> String { self.chars.iter().collect() }

    fn set_text(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.styles = vec![plain_style(); self.chars.len()];
        self.cursor = self.chars.len();
        self.selection = None;
    }

    fn char_len(&self) -> usize { self.chars.len() }

    fn append(&mut self, text: &str, style: TextStyle) {
        let index = self.chars.len();
        self.insert_at(index, text, style);
    }

    fn insert_at(&mut self, index: usize, text: &str, style: TextStyle) {
        let index = self.clamp(index);
        let count_before = self.chars.len();
        self.chars.splice(index..index, text.chars());
        let inserted = self.chars.len() - count_before;
        self.styles
            .splice(index..index, std::iter::repeat_n(style, inserted));
        if self.cursor >= index {
            self.cursor += inserted;
        }
    }

    fn delete_range(&mut self, range: Range<usize>) {
        let range = self.clamp_range(&range);
        let removed = range.len();
        self.chars.drain(range.clone());
        self.styles.drain(range.clone());
        if self.cursor >= range.end {
            self.cursor -= removed;
        } else if self.cursor > range.start {
            self.cursor = range.start;
        }
        self.selection = None;
    }

    fn set_style(&mut self, range: Range<usize>, style: TextStyle) {
        let range = self.clamp_range(&range);
        self.styles[range].fill(style);
    }

    fn cursor(&self) -> usize { self.cursor }

    fn set_cursor(&mut self, index: usize) { self.cursor = self.clamp(index); }

    fn selection(&self) -> Option<Range<usize>> { self.selection.clone() }

    fn set_selection(&mut self, selection: Option<Range<usize>>) {
        self.selection = selection
            .map(|it| self.clamp_range(&it))
            .filter(|it| !it.is_empty());
    }

    fn scroll_to_end(&mut self) {}

    fn is_editable(&self) -> bool { self.editable }

    fn set_editable(&mut self, editable: bool) { self.editable = editable; }

    fn title(&self) -> String { self.title.clone() }

    fn set_title(&mut self, title: &str) { title.clone_into(&mut self.title); }

    fn recolor_foreground(
        &mut self,
        color: ConsoleColor,
        keep: Option<Range<usize>>,
    ) -> RecolorOutcome {
        let keep = keep.filter(|_| self.span_addressing);
        for (index, style) in self.styles.iter_mut().enumerate() {
            if keep.as_ref().is_some_and(|it| it.contains(&index)) {
                continue;
            }
            style.color = color;
        }
        if self.span_addressing {
            RecolorOutcome::PendingInputPreserved
        } else {
            RecolorOutcome::RecoloredEverything
        }
    }

    fn set_background(&mut self, color: ConsoleColor) { self.background = Some(color); }

    fn set_font(&mut self, font: &FontSpec) { self.font = Some(font.clone()); }

    fn request_focus(&mut self) { self.focus_requests += 1; }

    fn show_message(&mut self, title: &str, text: &str) {
        self.messages.push((title.to_string(), text.to_string()));
    }

    fn show_comparison(&mut self, comparison: &OutputComparison) {
        self.comparisons.push(comparison.clone());
    }

    fn close(&mut self) { self.closed = true; }
}
