// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{CommandHistory, OutputSink, PendingInputBuffer, SpanId, SurfaceOp,
            SurfaceOpSender, TextStyle};
use std::ops::Range;

/// Where the user's cursor is, as far as editing is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPlacement {
    /// Inside the pending input, at this char index.
    InInput(usize),
    /// Somewhere else in the transcript. Typing still goes to the end of the pending
    /// input.
    Outside,
}

/// What an edit needs besides the editor itself.
#[derive(Debug, Clone, Copy)]
pub struct EditContext<'a> {
    pub sink: &'a OutputSink,
    pub ops: &'a SurfaceOpSender,
    pub pending_style: TextStyle,
}

/// Everything guarded by the pending input lock: the [`PendingInputBuffer`], the
/// [`CommandHistory`], whether a read is outstanding, the cursor and selection inside
/// the pending input, and the id of the transcript span that shows it.
///
/// Invariant: `active_span` is `Some` exactly when the buffer is not empty.
#[derive(Debug, Default)]
pub struct InputEditor {
    pub buffer: PendingInputBuffer,
    pub history: CommandHistory,
    pub prompt_active: bool,
    cursor_outside: bool,
    selection: Option<Range<usize>>,
    selection_anchor: Option<usize>,
    active_span: Option<SpanId>,
}

impl InputEditor {
    #[must_use]
    pub fn active_span(&self) -> Option<SpanId> { self.active_span }

    #[must_use]
    pub fn selection(&self) -> Option<Range<usize>> { self.selection.clone() }

    #[must_use]
    pub fn cursor_placement(&self) -> CursorPlacement {
        if self.cursor_outside {
            CursorPlacement::Outside
        } else {
            CursorPlacement::InInput(self.buffer.cursor())
        }
    }

    /// Cursor movement and history navigation only work here: a read is outstanding and
    /// the cursor is inside the pending input.
    #[must_use]
    pub fn is_cursor_in_input(&self) -> bool { self.prompt_active && !self.cursor_outside }

    /// Record where the UI says the cursor and selection are. The selection is only
    /// kept if it lies inside the pending input.
    pub fn place_cursor(&mut self, placement: CursorPlacement, selection: Option<Range<usize>>) {
        // Unchanged since the last move, so a Shift selection keeps its anchor.
        if placement == self.cursor_placement() && selection == self.selection {
            return;
        }
        match placement {
            CursorPlacement::InInput(index) => {
                self.buffer.set_cursor(index);
                self.cursor_outside = false;
                self.selection = selection
                    .map(|it| self.buffer.clamp(it.start)..self.buffer.clamp(it.end))
                    .filter(|it| !it.is_empty());
            }
            CursorPlacement::Outside => {
                self.cursor_outside = true;
                self.selection = None;
            }
        }
        self.selection_anchor = None;
    }

    /// Put the cursor at the end of the pending input.
    pub fn focus_end(&mut self) {
        let end = self.buffer.len();
        self.place_cursor(CursorPlacement::InInput(end), None);
    }

    fn edit_index(&self) -> usize {
        if self.cursor_outside {
            self.buffer.len()
        } else {
            self.buffer.cursor()
        }
    }

    /// Type `text` at the cursor, replacing the selection if there is one. The first
    /// char typed into an empty buffer opens a new span at the end of the transcript.
    pub fn insert_text(&mut self, text: &str, ctx: &EditContext<'_>) {
        if text.is_empty() {
            return;
        }
        self.delete_selection_inner(ctx);

        let index = self.edit_index();
        self.buffer.insert(index, text);
        self.cursor_outside = false;
        self.selection_anchor = None;

        match self.active_span {
            Some(span) => ctx.ops.post(SurfaceOp::InsertInput {
                span,
                index,
                text: text.to_string(),
            }),
            None => {
                let span = SpanId::new();
                ctx.sink
                    .open_input_span(span, self.buffer.text(), ctx.pending_style);
                self.active_span = Some(span);
            }
        }
    }

    /// Backspace. Returns `false` if there was nothing to delete.
    pub fn delete_backward(&mut self, ctx: &EditContext<'_>) -> bool {
        if self.delete_selection_inner(ctx).is_some() {
            return true;
        }
        let Some(removed) = self.buffer.delete_backward(self.edit_index()) else {
            return false;
        };
        self.post_delete(removed..removed + 1, ctx);
        true
    }

    /// Delete key. Returns `false` if there was nothing to delete.
    pub fn delete_forward(&mut self, ctx: &EditContext<'_>) -> bool {
        if self.delete_selection_inner(ctx).is_some() {
            return true;
        }
        let Some(removed) = self.buffer.delete_forward(self.edit_index()) else {
            return false;
        };
        self.post_delete(removed..removed + 1, ctx);
        true
    }

    /// Remove the selection and return its text.
    pub fn delete_selection(&mut self, ctx: &EditContext<'_>) -> Option<String> {
        self.delete_selection_inner(ctx)
    }

    fn delete_selection_inner(&mut self, ctx: &EditContext<'_>) -> Option<String> {
        let selection = self.selection.take().filter(|it| !it.is_empty())?;
        self.selection_anchor = None;
        let text = self.buffer.slice(selection.clone());
        let removed = self.buffer.delete_range(selection.start, selection.end);
        self.cursor_outside = false;
        self.post_delete(removed, ctx);
        Some(text)
    }

    fn post_delete(&mut self, removed: Range<usize>, ctx: &EditContext<'_>) {
        let Some(span) = self.active_span else {
            return;
        };
        ctx.ops.post(SurfaceOp::DeleteInput {
            span,
            range: removed,
        });
        if self.buffer.is_empty() {
            ctx.ops.post(SurfaceOp::CloseInput {
                span,
                style: ctx.pending_style,
            });
            self.active_span = None;
        }
    }

    /// Throw away the pending input and type `text` in its place, one char at a time,
    /// just like the user would. Control chars in `text` are dropped.
    pub fn replace_all(&mut self, text: &str, ctx: &EditContext<'_>) {
        self.selection = None;
        self.selection_anchor = None;
        if !self.buffer.is_empty() {
            let len = self.buffer.len();
            self.buffer.clear();
            self.post_delete(0..len, ctx);
        }
        self.cursor_outside = false;

        let mut utf8 = [0_u8; 4];
        for ch in text.chars().filter(|ch| !ch.is_control()) {
            self.insert_text(ch.encode_utf8(&mut utf8), ctx);
        }
    }

    /// Move the cursor inside the pending input to `target` (clamped), extending the
    /// selection from where it started if `extend` is set. Returns `false` if there is
    /// no pending input to move in.
    pub fn move_cursor(&mut self, target: usize, extend: bool, ctx: &EditContext<'_>) -> bool {
        let Some(span) = self.active_span else {
            return false;
        };

        let from = self.buffer.cursor();
        let cursor = self.buffer.set_cursor(target);
        self.cursor_outside = false;

        if extend {
            let anchor = *self.selection_anchor.get_or_insert(from);
            self.selection = Some(anchor.min(cursor)..anchor.max(cursor)).filter(|it| !it.is_empty());
        } else {
            self.selection_anchor = None;
            self.selection = None;
        }

        ctx.ops.post(SurfaceOp::MoveInputCursor {
            span,
            cursor,
            selection: self.selection.clone(),
        });
        true
    }

    /// Enter: empty the buffer into the history, and return the line along with the span
    /// that showed it.
    pub fn take_line(&mut self) -> (String, Option<SpanId>) {
        let line = self.buffer.take();
        self.history.push(line.clone());
        self.selection = None;
        self.selection_anchor = None;
        self.cursor_outside = false;
        (line, self.active_span.take())
    }

    /// After the transcript was wiped, show whatever is still pending in a fresh span.
    pub fn restore_after_clear(&mut self, ctx: &EditContext<'_>) {
        self.selection = None;
        self.selection_anchor = None;
        if self.buffer.is_empty() {
            self.active_span = None;
            return;
        }
        let span = SpanId::new();
        ctx.sink
            .open_input_span(span, self.buffer.text(), ctx.pending_style);
        self.active_span = Some(span);
        let cursor = self.buffer.cursor();
        ctx.ops.post(SurfaceOp::MoveInputCursor {
            span,
            cursor,
            selection: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EchoDevice, EchoDevices, NamedColor, SurfaceOpReceiver, TextRole,
                drain_surface_ops, surface_op_channel, test_fixtures::StdoutMock};
    use pretty_assertions::assert_eq;

    struct Fixture {
        sink: OutputSink,
        ops: SurfaceOpSender,
        receiver: SurfaceOpReceiver,
    }

    impl Fixture {
        fn new() -> Self {
            let (ops, receiver) = surface_op_channel();
            let devices = EchoDevices {
                stdout: EchoDevice::new_mock(StdoutMock::new()),
                stderr: EchoDevice::new_mock(StdoutMock::new()),
            };
            Self {
                sink: OutputSink::new(devices, ops.clone()),
                ops,
                receiver,
            }
        }

        fn ctx(&self) -> EditContext<'_> {
            EditContext {
                sink: &self.sink,
                ops: &self.ops,
                pending_style: TextStyle {
                    role: TextRole::PendingInput,
                    color: NamedColor::Blue.into(),
                    bold: true,
                },
            }
        }
    }

    #[test]
    fn test_first_char_opens_span_then_inserts() {
        let mut fixture = Fixture::new();
        let mut editor = InputEditor::default();

        editor.insert_text("a", &fixture.ctx());
        editor.insert_text("b", &fixture.ctx());
        let span = editor.active_span().unwrap();

        let ops = drain_surface_ops(&mut fixture.receiver);
        assert!(matches!(&ops[0], SurfaceOp::OpenInput { text, .. } if text == "a"));
        assert_eq!(ops[1], SurfaceOp::InsertInput {
            span,
            index: 1,
            text: "b".into()
        });
        assert_eq!(editor.buffer.text(), "ab");
    }

    #[test]
    fn test_typing_replaces_selection() {
        let fixture = Fixture::new();
        let mut editor = InputEditor::default();
        editor.insert_text("hello", &fixture.ctx());
        editor.place_cursor(CursorPlacement::InInput(1), Some(1..4));

        editor.insert_text("E", &fixture.ctx());
        assert_eq!(editor.buffer.text(), "hEo");
        assert_eq!(editor.buffer.cursor(), 2);
    }

    #[test]
    fn test_typing_with_cursor_outside_appends() {
        let fixture = Fixture::new();
        let mut editor = InputEditor::default();
        editor.insert_text("ab", &fixture.ctx());
        editor.place_cursor(CursorPlacement::InInput(0), None);
        editor.place_cursor(CursorPlacement::Outside, None);

        editor.insert_text("c", &fixture.ctx());
        assert_eq!(editor.buffer.text(), "abc");
    }

    #[test]
    fn test_deleting_last_char_closes_span() {
        let mut fixture = Fixture::new();
        let mut editor = InputEditor::default();
        editor.insert_text("x", &fixture.ctx());
        assert!(editor.delete_backward(&fixture.ctx()));
        assert_eq!(editor.active_span(), None);
        assert!(!editor.delete_backward(&fixture.ctx()));

        let ops = drain_surface_ops(&mut fixture.receiver);
        assert!(matches!(ops.last(), Some(SurfaceOp::CloseInput { .. })));
    }

    #[test]
    fn test_replace_all_types_each_char() {
        let mut fixture = Fixture::new();
        let mut editor = InputEditor::default();
        editor.insert_text("old", &fixture.ctx());
        drain_surface_ops(&mut fixture.receiver);

        editor.replace_all("new\t", &fixture.ctx());
        assert_eq!(editor.buffer.text(), "new");

        let ops = drain_surface_ops(&mut fixture.receiver);
        // Delete + close the old span, open a new one with "n", then 2 inserts.
        assert_eq!(ops.len(), 5);
        assert!(matches!(&ops[2], SurfaceOp::OpenInput { text, .. } if text == "n"));
    }

    #[test]
    fn test_move_cursor_extends_selection() {
        let fixture = Fixture::new();
        let mut editor = InputEditor::default();
        editor.insert_text("hello", &fixture.ctx());

        assert!(editor.move_cursor(0, true, &fixture.ctx()));
        assert_eq!(editor.selection(), Some(0..5));
        assert_eq!(editor.delete_selection(&fixture.ctx()), Some("hello".into()));
        assert!(editor.buffer.is_empty());
        assert!(!editor.move_cursor(0, false, &fixture.ctx()));
    }

    #[test]
    fn test_take_line_records_history() {
        let fixture = Fixture::new();
        let mut editor = InputEditor::default();
        editor.insert_text("ls", &fixture.ctx());
        let (line, span) = editor.take_line();
        assert_eq!(line, "ls");
        assert!(span.is_some());
        assert_eq!(editor.history.last(), Some("ls"));
        assert_eq!(editor.active_span(), None);
    }
}
