// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::normalize_line_endings;
use std::{fmt::Write as _, path::Path};

/// The first line where the expected and the actual output disagree. Line numbers start
/// at 1, and a `None` side means that output ran out of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDifference {
    pub line_number: usize,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

/// Expected output (from a file) vs. everything the console printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputComparison {
    pub expected: String,
    pub actual: String,
    pub first_difference: Option<LineDifference>,
}

impl OutputComparison {
    /// Line endings are normalized on both sides before comparing.
    #[must_use]
    pub fn new(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        let expected = expected.into();
        let actual = actual.into();
        let first_difference = find_first_difference(
            &normalize_line_endings(&expected),
            &normalize_line_endings(&actual),
        );
        Self {
            expected,
            actual,
            first_difference,
        }
    }

    #[must_use]
    pub fn matches(&self) -> bool { self.first_difference.is_none() }

    #[must_use]
    pub fn summary(&self) -> String {
        let Some(diff) = &self.first_difference else {
            return "Output matches the expected output".to_string();
        };
        let mut acc = format!("Output differs at line {}", diff.line_number);
        let show = |it: &Option<String>| {
            it.as_deref()
                .map_or("<end of output>".to_string(), |line| format!("{line:?}"))
        };
        _ = write!(acc, "\n  expected: {}", show(&diff.expected));
        _ = write!(acc, "\n  actual:   {}", show(&diff.actual));
        acc
    }
}

fn find_first_difference(expected: &str, actual: &str) -> Option<LineDifference> {
    let mut expected_lines = expected.lines();
    let mut actual_lines = actual.lines();
    let mut line_number = 0;
    loop {
        line_number += 1;
        match (expected_lines.next(), actual_lines.next()) {
            (None, None) => return None,
            (expected, actual) if expected == actual => {}
            (expected, actual) => {
                return Some(LineDifference {
                    line_number,
                    expected: expected.map(ToString::to_string),
                    actual: actual.map(ToString::to_string),
                });
            }
        }
    }
}

/// Contents of the expected output file. A file that can't be read is not an error:
/// the message takes the place of the expected output, so the comparison shows it.
#[must_use]
pub fn read_expected_output(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|error| {
        tracing::warn!(message = "Can't read expected output", ?path, %error);
        format!("File not found: {}", path.display())
    })
}
