// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ConsoleColor, FontSpec, OutputComparison, TextStyle};
use std::ops::Range;

/// What [`TextSurface::recolor_foreground()`] was able to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecolorOutcome {
    /// Everything except the pending input span was recolored.
    PendingInputPreserved,
    /// The surface can't address spans, so the pending input got recolored too. This is
    /// a known limitation of such surfaces.
    RecoloredEverything,
}

/// The text widget that shows the transcript. This is implemented by the UI layer (a
/// GUI text area, a terminal pane, or [`crate::MemorySurface`] for headless use), and
/// is only ever touched from the UI context by [`crate::ConsoleView`].
///
/// All indices are char offsets into the full text.
pub trait TextSurface {
    fn text(&self) -> String;

    fn set_text(&mut self, text: &str);

    fn char_len(&self) -> usize { self.text().chars().count() }

    fn append(&mut self, text: &str, style: TextStyle);

    fn insert_at(&mut self, index: usize, text: &str, style: TextStyle);

    fn delete_range(&mut self, range: Range<usize>);

    fn set_style(&mut self, range: Range<usize>, style: TextStyle);

    fn cursor(&self) -> usize;

    fn set_cursor(&mut self, index: usize);

    fn selection(&self) -> Option<Range<usize>>;

    fn set_selection(&mut self, selection: Option<Range<usize>>);

    fn scroll_to_end(&mut self);

    fn is_editable(&self) -> bool;

    fn set_editable(&mut self, editable: bool);

    fn title(&self) -> String;

    fn set_title(&mut self, title: &str);

    /// Recolor all the text with `color`, except the chars in `keep` (the pending input
    /// span) if the surface is able to address them.
    fn recolor_foreground(
        &mut self,
        color: ConsoleColor,
        keep: Option<Range<usize>>,
    ) -> RecolorOutcome;

    fn set_background(&mut self, _color: ConsoleColor) {}

    fn set_font(&mut self, _font: &FontSpec) {}

    fn request_focus(&mut self) {}

    /// Informational message for the user (eg: a file could not be found). Surfaces
    /// without dialogs just log it.
    fn show_message(&mut self, title: &str, text: &str) {
        tracing::info!(message = "Console message", title, text);
    }

    fn show_comparison(&mut self, comparison: &OutputComparison) {
        tracing::info!(
            message = "Output comparison",
            matches = comparison.matches(),
            summary = %comparison.summary()
        );
    }

    fn close(&mut self) {}
}
