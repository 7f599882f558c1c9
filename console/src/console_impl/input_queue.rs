// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{StdMutex, lock_recover};
use std::{collections::VecDeque,
          sync::{Condvar, PoisonError},
          time::Duration};

/// Lines loaded from an input script, replayed as if typed. Loading a new script
/// replaces whatever is left of the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptQueue {
    lines: VecDeque<String>,
}

impl ScriptQueue {
    /// Returns how many unconsumed lines of the previous script were discarded.
    pub fn replace(&mut self, lines: impl IntoIterator<Item = String>) -> usize {
        let discarded = self.lines.len();
        self.lines = lines.into_iter().collect();
        discarded
    }

    pub fn pop(&mut self) -> Option<String> { self.lines.pop_front() }

    #[must_use]
    pub fn len(&self) -> usize { self.lines.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }
}

/// What the blocked reader gets woken up with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextInput {
    /// A line from the [`ScriptQueue`]. The caller still has to echo it.
    Script(String),
    /// A line the user typed and submitted with Enter.
    Typed(String),
    Eof,
    Shutdown,
}

/// Everything guarded by the input queue lock.
#[derive(Debug, Default)]
pub struct InputQueueState {
    pub typed: VecDeque<String>,
    pub script: ScriptQueue,
    /// Sticky: once set, every read returns [`NextInput::Eof`].
    pub eof: bool,
    /// Monotonic: once set, every read returns [`NextInput::Shutdown`].
    pub shutdown: bool,
}

impl InputQueueState {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.shutdown || self.eof || !self.script.is_empty() || !self.typed.is_empty()
    }

    /// Shutdown and EOF end a read before any queued line is looked at. Script lines
    /// always win over typed lines, so replay order is deterministic.
    pub fn try_next(&mut self) -> Option<NextInput> {
        if self.shutdown {
            return Some(NextInput::Shutdown);
        }
        if self.eof {
            return Some(NextInput::Eof);
        }
        if let Some(line) = self.script.pop() {
            return Some(NextInput::Script(line));
        }
        self.typed.pop_front().map(NextInput::Typed)
    }
}

/// FIFO of completed lines shared between the producers (the UI context submitting
/// typed lines, script loading) and the single blocked reader. The reader waits on a
/// [`Condvar`] instead of polling, and the lock is never held while waiting.
#[derive(Debug, Default)]
pub struct InputQueue {
    state: StdMutex<InputQueueState>,
    available: Condvar,
}

impl InputQueue {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn push_typed(&self, line: String) {
        lock_recover(&self.state).typed.push_back(line);
        self.available.notify_all();
    }

    /// Replace the script queue. Returns the count of discarded lines from the previous
    /// script.
    pub fn load_script(&self, lines: impl IntoIterator<Item = String>) -> usize {
        let discarded = lock_recover(&self.state).script.replace(lines);
        self.available.notify_all();
        discarded
    }

    pub fn signal_eof(&self) {
        lock_recover(&self.state).eof = true;
        self.available.notify_all();
    }

    /// Wakes up the reader (if any) while holding the lock, so the wakeup can't be
    /// missed between its predicate check and its wait.
    pub fn signal_shutdown(&self) {
        let mut state = lock_recover(&self.state);
        state.shutdown = true;
        self.available.notify_all();
        drop(state);
    }

    /// Block the calling thread until there is something to return. Never call this
    /// from the UI context.
    pub fn next_blocking(&self) -> NextInput {
        let mut state = lock_recover(&self.state);
        loop {
            if let Some(next) = state.try_next() {
                return next;
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Same as [`Self::next_blocking()`] but gives up after `timeout`.
    pub fn next_timeout(&self, timeout: Duration) -> Option<NextInput> {
        let state = lock_recover(&self.state);
        let (mut state, _) = self
            .available
            .wait_timeout_while(state, timeout, |state| !state.is_ready())
            .unwrap_or_else(PoisonError::into_inner);
        state.try_next()
    }

    pub fn try_next(&self) -> Option<NextInput> { lock_recover(&self.state).try_next() }

    #[must_use]
    pub fn is_eof(&self) -> bool { lock_recover(&self.state).eof }

    #[must_use]
    pub fn typed_len(&self) -> usize { lock_recover(&self.state).typed.len() }

    #[must_use]
    pub fn script_len(&self) -> usize { lock_recover(&self.state).script.len() }
}
