// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod command_history;
pub mod console_state;
pub mod input_editor;
pub mod input_queue;
pub mod key_handler;
pub mod output_sink;
pub mod pending_input;

// Re-export.
pub use command_history::*;
pub use console_state::*;
pub use input_editor::*;
pub use input_queue::*;
pub use key_handler::*;
pub use output_sink::*;
pub use pending_input::*;
