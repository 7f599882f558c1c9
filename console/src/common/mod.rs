// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod console_error;
pub mod decl_macros;
pub mod type_aliases;

// Re-export.
pub use console_error::*;
pub use type_aliases::*;
