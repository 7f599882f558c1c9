// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::sync::atomic::{AtomicBool, Ordering};
use strum_macros::Display;

/// ```text
/// Idle ──read_line()──► Prompting ──line delivered──► Idle
///   │                       │
///   └────────shutdown()─────┴──────────────────────► Shutdown (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ConsoleLiveness {
    Idle,
    Prompting,
    Shutdown,
}

/// Snapshot of the console flags, see [`crate::ConsoleEngine::state()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsoleState {
    pub prompt_active: bool,
    pub shutting_down: bool,
    pub echo_enabled: bool,
    pub input_locked: bool,
}

impl ConsoleState {
    #[must_use]
    pub fn liveness(&self) -> ConsoleLiveness {
        match (self.shutting_down, self.prompt_active) {
            (true, _) => ConsoleLiveness::Shutdown,
            (false, true) => ConsoleLiveness::Prompting,
            (false, false) => ConsoleLiveness::Idle,
        }
    }
}

/// Flags that are read from every thread. `prompt_active` is not here, it lives with
/// the pending input under its lock, since key handling must see it change atomically
/// with the buffer.
#[derive(Debug)]
pub struct ConsoleFlags {
    shutting_down: AtomicBool,
    echo_enabled: AtomicBool,
    clear_enabled: AtomicBool,
    locked: AtomicBool,
}

impl Default for ConsoleFlags {
    fn default() -> Self {
        Self {
            shutting_down: AtomicBool::new(false),
            echo_enabled: AtomicBool::new(false),
            clear_enabled: AtomicBool::new(true),
            locked: AtomicBool::new(false),
        }
    }
}

impl ConsoleFlags {
    #[must_use]
    pub fn is_shutdown(&self) -> bool { self.shutting_down.load(Ordering::Acquire) }

    /// Returns `true` only for the call that actually flipped the flag.
    pub fn begin_shutdown(&self) -> bool { !self.shutting_down.swap(true, Ordering::AcqRel) }

    #[must_use]
    pub fn echo_enabled(&self) -> bool { self.echo_enabled.load(Ordering::Acquire) }

    #[must_use]
    pub fn clear_enabled(&self) -> bool { self.clear_enabled.load(Ordering::Acquire) }

    #[must_use]
    pub fn is_locked(&self) -> bool { self.locked.load(Ordering::Acquire) }

    pub fn set_locked(&self, locked: bool) { self.locked.store(locked, Ordering::Release); }

    /// No-op (returns `false`) while locked or after shutdown.
    pub fn set_echo_enabled(&self, enabled: bool) -> bool {
        self.store_unless_frozen(&self.echo_enabled, enabled)
    }

    /// No-op (returns `false`) while locked or after shutdown.
    pub fn set_clear_enabled(&self, enabled: bool) -> bool {
        self.store_unless_frozen(&self.clear_enabled, enabled)
    }

    fn store_unless_frozen(&self, flag: &AtomicBool, value: bool) -> bool {
        if self.is_locked() || self.is_shutdown() {
            return false;
        }
        flag.store(value, Ordering::Release);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_liveness() {
        let mut state = ConsoleState::default();
        assert_eq!(state.liveness(), ConsoleLiveness::Idle);
        state.prompt_active = true;
        assert_eq!(state.liveness(), ConsoleLiveness::Prompting);
        state.shutting_down = true;
        assert_eq!(state.liveness(), ConsoleLiveness::Shutdown);
    }

    #[test]
    fn test_shutdown_is_monotonic() {
        let flags = ConsoleFlags::default();
        assert!(flags.begin_shutdown());
        assert!(!flags.begin_shutdown());
        assert!(flags.is_shutdown());
    }

    #[test]
    fn test_setters_frozen_when_locked_or_shut_down() {
        let flags = ConsoleFlags::default();
        assert!(flags.set_echo_enabled(true));
        assert!(flags.echo_enabled());

        flags.set_locked(true);
        assert!(!flags.set_echo_enabled(false));
        assert!(!flags.set_clear_enabled(false));
        assert!(flags.echo_enabled());
        assert!(flags.clear_enabled());

        flags.set_locked(false);
        flags.begin_shutdown();
        assert!(!flags.set_clear_enabled(false));
        assert!(flags.clear_enabled());
    }
}
