// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ConsoleError, ConsoleResult, ok};
use std::path::{Path, PathBuf};

pub const INPUT_SCRIPT_PREFIX: &str = "input-";
pub const EXPECTED_OUTPUT_PREFIX: &str = "expected-output-";
pub const SCRIPT_FILE_EXTENSION: &str = ".txt";

/// Directories searched for numbered scripts, relative to the current dir.
#[must_use]
pub fn default_script_dirs() -> Vec<PathBuf> {
    [".", "input", "output"].iter().map(PathBuf::from).collect()
}

/// An input script and the output that running it should produce. Either may be
/// missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptPair {
    pub input: Option<PathBuf>,
    pub expected_output: Option<PathBuf>,
}

impl ScriptPair {
    #[must_use]
    pub fn is_empty(&self) -> bool { self.input.is_none() && self.expected_output.is_none() }
}

/// Does `file_name` contain `{prefix}{number}` (not followed by another digit) and end
/// in `.txt`? So `input-1` matches `my-input-1.txt` but not `input-10.txt`.
fn is_numbered_file(file_name: &str, prefix: &str, number: u8) -> bool {
    if !file_name.ends_with(SCRIPT_FILE_EXTENSION) {
        return false;
    }
    let needle = format!("{prefix}{number}");
    file_name.match_indices(&needle).any(|(index, _)| {
        let after = &file_name[index + needle.len()..];
        !after.starts_with(|ch: char| ch.is_ascii_digit())
    })
}

/// Find the first `*input-N*.txt` and `*expected-output-N*.txt` in `dirs`, searched in
/// order, each listed in sorted order. Dirs that don't exist are skipped.
#[must_use]
pub fn discover_script_pair(number: u8, dirs: &[PathBuf]) -> ScriptPair {
    let mut pair = ScriptPair::default();

    for dir in dirs.iter().filter(|it| it.is_dir()) {
        let Ok(read_dir) = std::fs::read_dir(dir) else {
            tracing::debug!(message = "Can't list script dir", ?dir);
            continue;
        };
        let mut file_names: Vec<String> = read_dir
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        file_names.sort();

        for file_name in file_names {
            // "expected-output-N" never contains "input-N", so check it first.
            if is_numbered_file(&file_name, EXPECTED_OUTPUT_PREFIX, number) {
                if pair.expected_output.is_none() {
                    pair.expected_output = Some(dir.join(&file_name));
                }
            } else if is_numbered_file(&file_name, INPUT_SCRIPT_PREFIX, number)
                && pair.input.is_none()
            {
                pair.input = Some(dir.join(&file_name));
            }
        }
    }

    pair
}

/// Read a script file into lines (without line endings).
///
/// # Errors
///
/// Returns [`ConsoleError::FileNotFound`] or [`ConsoleError::Io`] if the file can't be
/// read.
pub fn read_script_lines(path: &Path) -> ConsoleResult<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .map_err(|error| ConsoleError::from_io_with_path(error, path))?;
    ok!(text.lines().map(ToString::to_string).collect())
}
