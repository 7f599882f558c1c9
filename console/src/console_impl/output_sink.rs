// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{EchoDevices, EchoErrors, SpanId, StdMutex, SurfaceOp, SurfaceOpSender, TextStyle,
            lock_recover, log_dropped_op};
use std::borrow::Cow;
use strum_macros::Display;

/// Which process stream a print belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    #[must_use]
    pub fn is_error(self) -> bool { matches!(self, OutputStream::Stderr) }
}

/// Everything printed to the console (both streams), plus echoed script lines and
/// submitted input. Only an enabled clear truncates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputLog {
    text: String,
}

impl OutputLog {
    pub fn push_str(&mut self, text: &str) { self.text.push_str(text); }

    pub fn push(&mut self, ch: char) { self.text.push(ch); }

    pub fn clear(&mut self) { self.text.clear(); }

    #[must_use]
    pub fn as_str(&self) -> &str { &self.text }

    #[must_use]
    pub fn len(&self) -> usize { self.text.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.text.is_empty() }
}

/// `"\r\n"` and lone `"\r"` both become `"\n"`.
#[must_use]
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Serializes all output. Every method holds the output lock for its whole body, so the
/// [`OutputLog`] and the order of appends posted to the transcript always agree, and the
/// text of one call is never split by another.
pub struct OutputSink {
    log: StdMutex<OutputLog>,
    echo_devices: EchoDevices,
    ops: SurfaceOpSender,
}

impl std::fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSink")
            .field("log_len", &lock_recover(&self.log).len())
            .finish_non_exhaustive()
    }
}

impl OutputSink {
    #[must_use]
    pub fn new(echo_devices: EchoDevices, ops: SurfaceOpSender) -> Self {
        Self {
            log: StdMutex::new(OutputLog::default()),
            echo_devices,
            ops,
        }
    }

    #[must_use]
    pub fn echo_devices(&self) -> &EchoDevices { &self.echo_devices }

    /// Print `text` in `style`. When `echo` is set the untransformed text is also written
    /// to the real `stream`.
    pub fn print(&self, text: &str, stream: OutputStream, style: TextStyle, echo: bool) {
        let normalized = normalize_line_endings(text);
        let deferred = {
            let mut log = lock_recover(&self.log);
            let mut deferred = Deferred::default();
            if echo {
                deferred.echo_errors = self.echo_devices.echo(text, stream);
            }
            log.push_str(&normalized);
            deferred.post(&self.ops, SurfaceOp::Append {
                text: normalized.into_owned(),
                style,
            });
            deferred.post(&self.ops, SurfaceOp::ScrollToEnd);
            deferred
        };
        deferred.report();
    }

    /// A script line delivered to the reader shows up as if it was typed.
    pub fn echo_input_line(&self, line: &str, style: TextStyle) {
        let text = format!("{line}\n");
        let deferred = {
            let mut log = lock_recover(&self.log);
            let mut deferred = Deferred::default();
            log.push_str(&text);
            deferred.post(&self.ops, SurfaceOp::Append { text, style });
            deferred.post(&self.ops, SurfaceOp::ScrollToEnd);
            deferred
        };
        deferred.report();
    }

    /// Start showing pending input at the end of the transcript.
    pub fn open_input_span(&self, span: SpanId, text: String, style: TextStyle) {
        let deferred = {
            let _log = lock_recover(&self.log);
            let mut deferred = Deferred::default();
            deferred.post(&self.ops, SurfaceOp::OpenInput { span, text, style });
            deferred
        };
        deferred.report();
    }

    /// A typed line was submitted: it goes into the log, the pending span (if there is
    /// one) becomes submitted input, and the newline is appended.
    pub fn submit_input_line(&self, line: &str, span: Option<SpanId>, style: TextStyle) {
        let deferred = {
            let mut log = lock_recover(&self.log);
            let mut deferred = Deferred::default();
            log.push_str(line);
            log.push('\n');
            if let Some(span) = span {
                deferred.post(&self.ops, SurfaceOp::CloseInput { span, style });
            }
            deferred.post(&self.ops, SurfaceOp::Append {
                text: "\n".to_string(),
                style,
            });
            deferred.post(&self.ops, SurfaceOp::ScrollToEnd);
            deferred
        };
        deferred.report();
    }

    /// Wipe the log and the transcript, and write `marker` to the real stdout.
    pub fn clear_all(&self, marker: &str) {
        let deferred = {
            let mut log = lock_recover(&self.log);
            let mut deferred = Deferred {
                echo_errors: self.echo_devices.write_plain_line(marker),
                ..Default::default()
            };
            log.clear();
            deferred.post(&self.ops, SurfaceOp::ClearAll);
            deferred
        };
        deferred.report();
    }

    #[must_use]
    pub fn all_output(&self) -> String { lock_recover(&self.log).as_str().to_string() }

    pub fn flush_echo(&self) { self.echo_devices.flush_all().report(); }
}

/// Whatever went wrong while the output lock was held. Logging is deferred until the
/// lock is released, since the log may be routed into this console, see
/// [`crate::DisplayPreference::ConsoleWriter`].
#[derive(Debug, Default)]
#[must_use]
struct Deferred {
    echo_errors: EchoErrors,
    dropped_ops: Vec<SurfaceOp>,
}

impl Deferred {
    fn post(&mut self, ops: &SurfaceOpSender, op: SurfaceOp) {
        if let Err(op) = ops.try_post(op) {
            self.dropped_ops.push(op);
        }
    }

    fn report(self) {
        self.echo_errors.report();
        for op in &self.dropped_ops {
            log_dropped_op(op);
        }
    }
}
