// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ConsoleColor, FontSpec, OutputComparison};
use std::{fmt::{Display, Formatter},
          ops::Range,
          path::PathBuf};
use strum_macros::Display as StrumDisplay;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, error::TryRecvError};

/// Identifies one span of in-progress user input in the transcript. The view tracks
/// where this span lives, so edits are addressed by id and never by searching the
/// transcript for matching text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(uuid::Uuid);

impl SpanId {
    #[must_use]
    pub fn new() -> Self { Self(uuid::Uuid::new_v4()) }
}

impl Default for SpanId {
    fn default() -> Self { Self::new() }
}

impl Display for SpanId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

/// The kinds of text in the transcript that must stay distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
pub enum TextRole {
    Output,
    Error,
    /// Submitted lines, and script lines echoed as if typed.
    UserInput,
    /// The line being typed right now.
    PendingInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextStyle {
    pub role: TextRole,
    pub color: ConsoleColor,
    pub bold: bool,
}

/// A change that must become visible on the [`crate::TextSurface`]. These are only
/// ever applied by [`crate::ConsoleView`] in the UI context, in the order they were
/// posted.
///
/// Span relative indices (in [`SurfaceOp::InsertInput`] and friends) are char offsets
/// from the start of the span, which is the same as the index in the
/// [`crate::PendingInputBuffer`].
#[derive(Debug, Clone, PartialEq, StrumDisplay)]
pub enum SurfaceOp {
    Append {
        text: String,
        style: TextStyle,
    },
    /// Append `text` at the end of the transcript and start tracking it as `span`.
    OpenInput {
        span: SpanId,
        text: String,
        style: TextStyle,
    },
    InsertInput {
        span: SpanId,
        index: usize,
        text: String,
    },
    DeleteInput {
        span: SpanId,
        range: Range<usize>,
    },
    MoveInputCursor {
        span: SpanId,
        cursor: usize,
        selection: Option<Range<usize>>,
    },
    /// Stop tracking `span` and restyle what is left of it with `style`.
    CloseInput {
        span: SpanId,
        style: TextStyle,
    },
    ClearAll,
    /// Recolor the output foreground, keeping the pending input span's own color if the
    /// surface can address it.
    Recolor(ConsoleColor),
    SetBackground(ConsoleColor),
    SetFont(FontSpec),
    SetTitle(String),
    SetEditable(bool),
    /// Move keyboard focus to the surface, and the cursor to the end.
    FocusInput,
    ScrollToEnd,
    SaveTranscript(PathBuf),
    ShowMessage {
        title: String,
        message: String,
    },
    ShowComparison(OutputComparison),
    Close,
}

/// Sending half of the surface op queue. Posting never blocks, and posting after the
/// view is gone is silently dropped (the console outlives its window in headless use).
#[derive(Debug, Clone)]
pub struct SurfaceOpSender {
    sender: UnboundedSender<SurfaceOp>,
}

pub type SurfaceOpReceiver = UnboundedReceiver<SurfaceOp>;

#[must_use]
pub fn surface_op_channel() -> (SurfaceOpSender, SurfaceOpReceiver) {
    let (sender, receiver) = tokio::sync::mpsc::unbounded_channel::<SurfaceOp>();
    (SurfaceOpSender { sender }, receiver)
}

impl SurfaceOpSender {
    pub fn post(&self, op: SurfaceOp) {
        if let Err(op) = self.try_post(op) {
            log_dropped_op(&op);
        }
    }

    /// Same as [`Self::post()`], but hands a dropped op back instead of logging it. Use
    /// this while holding a lock that printing needs.
    ///
    /// # Errors
    ///
    /// Returns the op if there is no view attached anymore.
    pub fn try_post(&self, op: SurfaceOp) -> Result<(), SurfaceOp> {
        self.sender.send(op).map_err(|error| error.0)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool { self.sender.is_closed() }
}

pub fn log_dropped_op(op: &SurfaceOp) {
    tracing::trace!(message = "No view attached, dropping surface op", op = %op);
}

/// Drain everything that is queued right now, without waiting.
pub fn drain_surface_ops(receiver: &mut SurfaceOpReceiver) -> Vec<SurfaceOp> {
    let mut ops = vec![];
    loop {
        match receiver.try_recv() {
            Ok(op) => ops.push(op),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
        }
    }
    ops
}
