// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ConsoleEngine, CursorPlacement, KeyOutcome, KeyPress, RecolorOutcome, SpanId,
            SurfaceOp, SurfaceOpReceiver, TextStyle, TextSurface};
use std::ops::Range;
use tokio::sync::mpsc::error::TryRecvError;

pub const DEBUG_CONSOLE_VIEW: bool = false;

/// Where the pending input span currently sits in the surface text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TrackedSpan {
    id: SpanId,
    start: usize,
    len: usize,
    style: TextStyle,
}

impl TrackedSpan {
    fn range(&self) -> Range<usize> { self.start..self.start + self.len }

    fn to_surface(&self, range: &Range<usize>) -> Range<usize> {
        let start = self.start + range.start.min(self.len);
        let end = self.start + range.end.min(self.len);
        start..end.max(start)
    }
}

/// The single consumer of [`SurfaceOp`]s. It owns the [`TextSurface`] and must only be
/// used from the UI context. Key events, pastes, and cuts from the UI come in here too,
/// so that the surface cursor can be translated into a position in the pending input
/// before the [`ConsoleEngine`] sees the event.
///
/// The view knows where the pending input span lives (its start, and length), so edits
/// are applied by [`SpanId`] and no text matching is ever done. Ops for a span that is
/// no longer tracked (eg: after a clear) are dropped.
#[derive(Debug)]
pub struct ConsoleView<S: TextSurface> {
    engine: ConsoleEngine,
    receiver: SurfaceOpReceiver,
    surface: S,
    input_span: Option<TrackedSpan>,
}

impl<S: TextSurface> ConsoleView<S> {
    pub fn new(engine: ConsoleEngine, receiver: SurfaceOpReceiver, surface: S) -> Self {
        Self {
            engine,
            receiver,
            surface,
            input_span: None,
        }
    }

    pub fn surface(&self) -> &S { &self.surface }

    pub fn surface_mut(&mut self) -> &mut S { &mut self.surface }

    pub fn into_surface(self) -> S { self.surface }

    pub fn engine(&self) -> &ConsoleEngine { &self.engine }

    /// Where the pending input span is in the surface text, if one is open.
    pub fn input_span_range(&self) -> Option<Range<usize>> {
        self.input_span.as_ref().map(TrackedSpan::range)
    }

    /// Apply everything that was posted so far, without waiting. Returns how many ops
    /// were applied. Call this from the UI event loop (eg: on every tick).
    pub fn apply_pending_ops(&mut self) -> usize {
        let mut count = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(op) => {
                    self.apply(op);
                    count += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        count
    }

    /// Apply ops as they arrive until [`SurfaceOp::Close`] is applied.
    pub async fn run_until_closed(&mut self) {
        while let Some(op) = self.receiver.recv().await {
            let is_close = matches!(op, SurfaceOp::Close);
            self.apply(op);
            if is_close {
                break;
            }
        }
    }

    /// Send a key press to the engine.
    pub fn handle_key(&mut self, key: KeyPress) -> KeyOutcome {
        self.sync_cursor();
        let outcome = self.engine.handle_key(key);
        self.apply_pending_ops();
        outcome
    }

    /// Paste text from the clipboard (the clipboard itself is the caller's business).
    pub fn paste(&mut self, text: &str) {
        self.sync_cursor();
        self.engine.paste(text);
        self.apply_pending_ops();
    }

    /// Cut the selection, if it lies inside the pending input. Returns the text for the
    /// caller to put on the clipboard.
    pub fn cut(&mut self) -> Option<String> {
        self.sync_cursor();
        let cut = self.engine.cut_selection();
        self.apply_pending_ops();
        cut
    }

    /// The selected text anywhere in the transcript, for copying to the clipboard.
    pub fn selected_text(&self) -> Option<String> {
        let selection = self.surface.selection()?;
        let text: String = self
            .surface
            .text()
            .chars()
            .skip(selection.start)
            .take(selection.len())
            .collect();
        Some(text)
    }

    /// Tell the engine where the surface cursor and selection are, relative to the
    /// pending input span. The user may have clicked anywhere in the transcript.
    pub fn sync_cursor(&mut self) {
        self.apply_pending_ops();

        let cursor = self.surface.cursor();
        let selection = self.surface.selection();

        let (placement, selection) = match self.input_span {
            Some(span) if span.start <= cursor && cursor <= span.start + span.len => {
                let selection = selection
                    .filter(|it| span.start <= it.start && it.end <= span.start + span.len)
                    .map(|it| it.start - span.start..it.end - span.start);
                (CursorPlacement::InInput(cursor - span.start), selection)
            }
            // An empty pending input starts at the end of the transcript.
            None if cursor >= self.surface.char_len() => (CursorPlacement::InInput(0), None),
            _ => (CursorPlacement::Outside, None),
        };

        self.engine.place_cursor(placement, selection);
    }

    #[allow(clippy::too_many_lines)]
    pub fn apply(&mut self, op: SurfaceOp) {
        DEBUG_CONSOLE_VIEW.then(|| {
            // % is Display, ? is Debug.
            tracing::debug!(message = "Apply surface op", op = ?op);
        });

        match op {
            SurfaceOp::Append { text, style } => {
                self.surface.append(&text, style);
            }
            SurfaceOp::OpenInput { span, text, style } => {
                if let Some(stale) = self.input_span.take() {
                    tracing::warn!(message = "Input span opened over another", stale = %stale.id);
                }
                let start = self.surface.char_len();
                self.surface.append(&text, style);
                let len = text.chars().count();
                self.input_span = Some(TrackedSpan {
                    id: span,
                    start,
                    len,
                    style,
                });
                self.surface.set_cursor(start + len);
            }
            SurfaceOp::InsertInput { span, index, text } => {
                let Some(tracked) = self.tracked_mut(span) else {
                    return;
                };
                let at = tracked.start + index.min(tracked.len);
                let count = text.chars().count();
                tracked.len += count;
                let style = tracked.style;
                self.surface.insert_at(at, &text, style);
                self.surface.set_cursor(at + count);
            }
            SurfaceOp::DeleteInput { span, range } => {
                let Some(tracked) = self.tracked_mut(span) else {
                    return;
                };
                let range = tracked.to_surface(&range);
                tracked.len -= range.len();
                self.surface.delete_range(range.clone());
                self.surface.set_cursor(range.start);
            }
            SurfaceOp::MoveInputCursor {
                span,
                cursor,
                selection,
            } => {
                let Some(tracked) = self.tracked_mut(span).map(|it| *it) else {
                    return;
                };
                self.surface.set_cursor(tracked.start + cursor.min(tracked.len));
                self.surface
                    .set_selection(selection.map(|it| tracked.to_surface(&it)));
            }
            SurfaceOp::CloseInput { span, style } => {
                if let Some(tracked) = self.tracked_mut(span).map(|it| *it) {
                    self.surface.set_style(tracked.range(), style);
                    self.input_span = None;
                }
            }
            SurfaceOp::ClearAll => {
                self.surface.set_text("");
                self.input_span = None;
            }
            SurfaceOp::Recolor(color) => {
                let keep = self.input_span_range();
                let outcome = self.surface.recolor_foreground(color, keep.clone());
                if outcome == RecolorOutcome::RecoloredEverything && keep.is_some() {
                    tracing::warn!(
                        message = "Surface can't address spans, pending input was recolored too",
                        %color
                    );
                }
            }
            SurfaceOp::SetBackground(color) => self.surface.set_background(color),
            SurfaceOp::SetFont(font) => self.surface.set_font(&font),
            SurfaceOp::SetTitle(title) => self.surface.set_title(&title),
            SurfaceOp::SetEditable(editable) => self.surface.set_editable(editable),
            SurfaceOp::FocusInput => {
                self.surface.request_focus();
                let end = self.surface.char_len();
                self.surface.set_cursor(end);
                self.surface.set_selection(None);
            }
            SurfaceOp::ScrollToEnd => self.surface.scroll_to_end(),
            SurfaceOp::SaveTranscript(path) => {
                match std::fs::write(&path, self.surface.text()) {
                    Ok(()) => tracing::debug!(message = "Saved transcript", ?path),
                    Err(error) => {
                        tracing::warn!(message = "Could not save transcript", ?path, %error);
                        self.surface.show_message(
                            "Save",
                            &format!("Could not save to {}: {error}", path.display()),
                        );
                    }
                }
            }
            SurfaceOp::ShowMessage { title, message } => {
                self.surface.show_message(&title, &message);
            }
            SurfaceOp::ShowComparison(comparison) => self.surface.show_comparison(&comparison),
            SurfaceOp::Close => self.surface.close(),
        }
    }

    fn tracked_mut(&mut self, span: SpanId) -> Option<&mut TrackedSpan> {
        match self.input_span.as_mut() {
            Some(tracked) if tracked.id == span => Some(tracked),
            _ => {
                tracing::warn!(message = "Dropping op for untracked input span", %span);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConsoleColor, ConsoleKey, ConsoleOptions, EchoDevice, EchoDevices,
                MemorySurface, NamedColor, OutputStream, ReadLineEvent, TextRole,
                test_fixtures::StdoutMock};
    use pretty_assertions::assert_eq;
    use std::{thread,
              time::{Duration, Instant}};

    fn new_view(surface: MemorySurface) -> (ConsoleEngine, ConsoleView<MemorySurface>) {
        let (engine, receiver) = ConsoleEngine::new(ConsoleOptions {
            echo_devices: EchoDevices {
                stdout: EchoDevice::new_mock(StdoutMock::new()),
                stderr: EchoDevice::new_mock(StdoutMock::new()),
            },
            ..ConsoleOptions::default()
        });
        let view = ConsoleView::new(engine.clone(), receiver, surface);
        (engine, view)
    }

    fn type_keys(view: &mut ConsoleView<MemorySurface>, text: &str) {
        for ch in text.chars() {
            view.handle_key(KeyPress::from(ch));
        }
    }

    fn wait_for_prompt(engine: &ConsoleEngine) {
        while !engine.state().prompt_active {
            thread::yield_now();
        }
    }

    #[test]
    fn test_typed_line_becomes_user_input() {
        let (engine, mut view) = new_view(MemorySurface::new());
        type_keys(&mut view, "hi");
        assert_eq!(view.surface().text(), "hi");
        assert_eq!(view.surface().text_with_role(TextRole::PendingInput), "hi");
        assert_eq!(view.input_span_range(), Some(0..2));

        view.handle_key(KeyPress::plain(ConsoleKey::Enter));
        assert_eq!(view.surface().text(), "hi\n");
        assert_eq!(view.surface().text_with_role(TextRole::UserInput), "hi\n");
        assert_eq!(view.input_span_range(), None);
        assert_eq!(engine.read_line(), ReadLineEvent::Line("hi".into()));
    }

    #[test]
    fn test_span_is_tracked_by_id_not_by_text() {
        let (engine, mut view) = new_view(MemorySurface::new());
        engine.print("ab", OutputStream::Stdout);
        type_keys(&mut view, "ab");
        engine.print("\nab\n", OutputStream::Stdout);
        view.apply_pending_ops();

        type_keys(&mut view, "c");
        view.handle_key(KeyPress::plain(ConsoleKey::Backspace));
        view.handle_key(KeyPress::plain(ConsoleKey::Backspace));

        assert_eq!(view.surface().text(), "aba\nab\n");
        assert_eq!(engine.pending_input(), "a");
        assert_eq!(view.input_span_range(), Some(2..3));
    }

    #[test]
    fn test_clear_keeps_pending_input() {
        let (engine, mut view) = new_view(MemorySurface::new());
        engine.print("noise\n", OutputStream::Stdout);
        type_keys(&mut view, "abc");

        view.handle_key(KeyPress::ctrl(ConsoleKey::Char('l')));
        assert_eq!(view.surface().text(), "abc");
        assert_eq!(engine.all_output(), "");

        type_keys(&mut view, "d");
        assert_eq!(view.surface().text(), "abcd");
        assert_eq!(view.input_span_range(), Some(0..4));
    }

    #[test]
    fn test_recolor_preserves_pending_input_color() {
        let (engine, mut view) = new_view(MemorySurface::new());
        engine.print("out", OutputStream::Stdout);
        type_keys(&mut view, "in");

        let green = ConsoleColor::Named(NamedColor::Green);
        engine.set_output_color(green);
        view.apply_pending_ops();

        assert_eq!(view.surface().style_at(0).unwrap().color, green);
        assert_eq!(
            view.surface().style_at(3).unwrap().color,
            engine.settings().user_input_color
        );
    }

    #[test]
    fn test_recolor_without_span_addressing_hits_pending_input() {
        let (engine, mut view) = new_view(MemorySurface::without_span_addressing());
        engine.print("out", OutputStream::Stdout);
        type_keys(&mut view, "in");

        let green = ConsoleColor::Named(NamedColor::Green);
        engine.set_output_color(green);
        view.apply_pending_ops();

        assert_eq!(view.surface().style_at(3).unwrap().color, green);
    }

    #[test]
    fn test_shift_home_then_cut() {
        let (engine, mut view) = new_view(MemorySurface::new());
        let reader = {
            let engine = engine.clone();
            thread::spawn(move || engine.read_line())
        };
        wait_for_prompt(&engine);

        type_keys(&mut view, "hello");
        view.handle_key(KeyPress::plain(ConsoleKey::Left));
        view.handle_key(KeyPress::plain(ConsoleKey::Left));
        view.handle_key(KeyPress::shift(ConsoleKey::Home));
        assert_eq!(view.selected_text(), Some("hel".into()));

        assert_eq!(view.cut(), Some("hel".into()));
        assert_eq!(view.surface().text(), "lo");

        view.paste("p!\n");
        assert_eq!(reader.join().unwrap(), ReadLineEvent::Line("p!lo".into()));
    }

    #[test]
    fn test_history_on_empty_prompt() {
        let (engine, mut view) = new_view(MemorySurface::new());
        engine.print("> ", OutputStream::Stdout);
        type_keys(&mut view, "first");
        view.handle_key(KeyPress::plain(ConsoleKey::Enter));
        engine.read_line();

        let reader = {
            let engine = engine.clone();
            thread::spawn(move || engine.read_line())
        };
        wait_for_prompt(&engine);
        view.apply_pending_ops();

        assert_eq!(view.handle_key(KeyPress::plain(ConsoleKey::Up)), KeyOutcome::Consumed);
        assert_eq!(view.surface().text(), "> first\nfirst");
        view.handle_key(KeyPress::plain(ConsoleKey::Enter));
        assert_eq!(reader.join().unwrap(), ReadLineEvent::Line("first".into()));
    }

    #[test]
    fn test_prompt_focuses_and_moves_cursor_to_end() {
        let (engine, mut view) = new_view(MemorySurface::new());
        engine.print("some output\n> ", OutputStream::Stdout);
        view.apply_pending_ops();
        view.surface_mut().set_cursor(0);
        assert_eq!(view.surface().focus_requests(), 0);

        let reader = {
            let engine = engine.clone();
            thread::spawn(move || engine.read_line())
        };
        wait_for_prompt(&engine);
        let deadline = Instant::now() + Duration::from_secs(5);
        while view.surface().focus_requests() == 0 && Instant::now() < deadline {
            view.apply_pending_ops();
            thread::yield_now();
        }

        assert_eq!(view.surface().focus_requests(), 1);
        assert_eq!(view.surface().cursor(), view.surface().char_len());
        assert_eq!(engine.liveness(), crate::ConsoleLiveness::Prompting);

        engine.shutdown();
        assert_eq!(reader.join().unwrap(), ReadLineEvent::Shutdown);
    }

    #[test]
    fn test_shutdown_makes_surface_read_only() {
        let (engine, mut view) = new_view(MemorySurface::new());
        view.handle_key(KeyPress::ctrl(ConsoleKey::Char('q')));
        assert!(view.surface().is_closed());
        assert!(!view.surface().is_editable());
        assert_eq!(view.surface().title(), "Console [completed]");

        assert_eq!(view.handle_key(KeyPress::from('x')), KeyOutcome::Consumed);
        assert_eq!(view.surface().text(), "");
        assert!(engine.is_shutdown());
    }

    #[tokio::test]
    async fn test_run_until_closed() {
        let (engine, mut view) = new_view(MemorySurface::new());
        let printer = {
            let engine = engine.clone();
            thread::spawn(move || {
                engine.println("bye", OutputStream::Stdout);
                engine.close();
            })
        };
        view.run_until_closed().await;
        printer.join().unwrap();

        assert_eq!(view.surface().text(), "bye\n");
        assert!(view.surface().is_closed());
    }
}
