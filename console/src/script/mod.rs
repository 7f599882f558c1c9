// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod compare_output;
pub mod script_files;

// Re-export.
pub use compare_output::*;
pub use script_files::*;
