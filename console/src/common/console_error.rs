// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can be returned by the fallible console operations (loading scripts,
/// loading and saving settings, parsing colors and fonts, saving the transcript).
///
/// The core console operations (`print`, `read_line`, key handling, history) never
/// fail. They degrade to no-ops after shutdown instead.
#[derive(Debug, Error, Diagnostic)]
pub enum ConsoleError {
    #[error("console I/O error")]
    #[diagnostic(code(r3bl_console::io))]
    Io(#[from] std::io::Error),

    #[error("file not found: {}", path.display())]
    #[diagnostic(
        code(r3bl_console::file_not_found),
        help("Check that the file exists and is readable")
    )]
    FileNotFound { path: PathBuf },

    #[error("no script numbered {number} was found in: {searched}")]
    #[diagnostic(
        code(r3bl_console::script_not_found),
        help("Script files are named `input-<N>.txt` and `expected-output-<N>.txt`")
    )]
    ScriptNotFound { number: u8, searched: String },

    #[error("invalid color: {value:?}")]
    #[diagnostic(
        code(r3bl_console::invalid_color),
        help("Use a color name like `blue` or a hex value like `#336699`")
    )]
    InvalidColor { value: String },

    #[error("invalid font: {value:?}")]
    #[diagnostic(
        code(r3bl_console::invalid_font),
        help("Use `Family-Size` or `Family-Size-Weight`, eg: `Monospace-12-Bold`")
    )]
    InvalidFont { value: String },
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

impl ConsoleError {
    /// Maps [`std::io::ErrorKind::NotFound`] to [`ConsoleError::FileNotFound`] so that
    /// the user gets told which file is missing.
    pub fn from_io_with_path(error: std::io::Error, path: impl Into<PathBuf>) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound { path: path.into() },
            _ => Self::Io(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_file_not_found() {
        let error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let it = ConsoleError::from_io_with_path(error, "some/script.txt");
        assert!(matches!(it, ConsoleError::FileNotFound { .. }));
        assert_eq!(it.to_string(), "file not found: some/script.txt");
    }

    #[test]
    fn test_other_io_errors_pass_through() {
        let error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let it = ConsoleError::from_io_with_path(error, "x");
        assert!(matches!(it, ConsoleError::Io(_)));
    }
}
