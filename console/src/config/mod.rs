// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod console_color;
pub mod console_settings;
pub mod font_spec;

// Re-export.
pub use console_color::*;
pub use console_settings::*;
pub use font_spec::*;
