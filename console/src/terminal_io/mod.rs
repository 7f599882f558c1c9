// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod console_stdin;
pub mod console_writer;
pub mod echo_device;

// Re-export.
pub use console_stdin::*;
pub use console_writer::*;
pub use echo_device::*;
