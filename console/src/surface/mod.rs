// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod console_view;
pub mod memory_surface;
pub mod surface_ops;
pub mod text_surface;

// Re-export.
pub use console_view::*;
pub use memory_surface::*;
pub use surface_ops::*;
pub use text_surface::*;
