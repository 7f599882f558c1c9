// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # r3bl_console
//!
//! A traditional, blocking, line oriented console (`read_line()` / `print()`) for
//! programs that run inside an event driven UI process. The UI owns a text surface (a
//! text widget in a window, or anything else that can append and edit styled text) and
//! delivers key events, pasted text, and menu actions one at a time on a single UI
//! context. The program, on some other thread, just wants to call `read_line()` and
//! block until a line shows up, and to print from as many threads as it likes without
//! the transcript getting mangled.
//!
//! # Mental model
//!
//! ```text
//! ┌──────────────── UI context ─────────────────┐      ┌────── caller threads ──────┐
//! │ key events ──► ConsoleView::handle_key()    │      │ ConsoleEngine::print()     │
//! │                   │                         │      │ ConsoleWriter (io::Write)  │
//! │                   ▼                         │      │            │               │
//! │            ConsoleEngine (edit state) ──────┼──┐   │            ▼               │
//! │                                             │  │   │        OutputSink          │
//! │ ConsoleView::apply_pending_ops() ◄─ SurfaceOp ◄┴───┼──── (OutputLog + ops)     │
//! │        │                                    │      │                            │
//! │        ▼                                    │      │ ConsoleEngine::read_line() │
//! │   TextSurface (the visible transcript)      │      │  blocks on InputQueue      │
//! └─────────────────────────────────────────────┘      └────────────────────────────┘
//! ```
//!
//! 1. [`ConsoleEngine`] owns all the state: the [`PendingInputBuffer`], the
//!    [`CommandHistory`], the [`InputQueue`] (typed lines + the [`ScriptQueue`] of
//!    replayed lines), and the [`OutputSink`] (the append only output log). It is
//!    cheap to clone and every clone refers to the same console.
//! 2. Nothing in the engine touches the text surface directly. Every change that must
//!    become visible is posted as a [`SurfaceOp`] message, and the single UI side
//!    consumer, [`ConsoleView`], applies them to a [`TextSurface`] in order.
//! 3. [`ConsoleEngine::read_line()`] blocks the calling thread on a condition variable
//!    until a script line, a typed line, end of input, or shutdown is available.
//!
//! # Locks
//!
//! There are three separate locks, so that printing never waits on typing, and typing
//! never waits on a blocked reader:
//!
//! | Lock          | Guards                                        | Held by               |
//! |---------------|-----------------------------------------------|-----------------------|
//! | pending input | [`PendingInputBuffer`], [`CommandHistory`]    | key handlers          |
//! | input queue   | typed lines, script lines, EOF, shutdown      | producers, the reader |
//! | output        | OutputLog, order of transcript appends        | `print`, `clear`      |
//!
//! When more than one is needed they are always acquired in the order
//! `pending input → input queue → output`. No lock is ever held while the reader is
//! waiting for input.
//!
//! # Streams
//!
//! Use [`ConsoleEngine::streams()`] to get a [`ConsoleStdin`] (`io::Read` +
//! `io::BufRead`) and two [`ConsoleWriter`]s (`io::Write`) that redirect a program's
//! standard streams through the console.

// Enforce strict error handling in production library code only.
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach modules.
pub mod common;
pub mod config;
pub mod console_api;
pub mod console_impl;
pub mod log;
pub mod script;
pub mod surface;
pub mod terminal_io;
pub mod test_fixtures;

// Re-export.
pub use common::*;
pub use config::*;
pub use console_api::*;
pub use console_impl::*;
pub use log::*;
pub use script::*;
pub use surface::*;
pub use terminal_io::*;
