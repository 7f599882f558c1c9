// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ConsoleColor, ConsoleError, ConsoleResult, FontSpec, NamedColor, ok};
use std::{path::{Path, PathBuf},
          str::FromStr};
use strum_macros::{Display, EnumString};

pub const CONFIG_FILE_NAME: &str = "console-settings.txt";
pub const CONFIG_FILE_HEADER: &str = "# Console configuration file";
pub const DEFAULT_WINDOW_TITLE: &str = "Console";

/// Keys that are recognized in the settings file. Anything else is ignored.
#[derive(Debug, Display, EnumString, Copy, Clone, PartialEq, Eq)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ConfigKey {
    Font,
    Background,
    Foreground,
}

/// Appearance of the console. The settings file only persists `background`,
/// `foreground` (the output color) and `font`.
///
/// The file format is line based `key=value`. Lines are trimmed, empty lines and lines
/// starting with `#` are skipped, keys are case insensitive, and lines with an unknown
/// key or an unparseable value are ignored (and logged).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSettings {
    pub font: FontSpec,
    pub background: ConsoleColor,
    pub output_color: ConsoleColor,
    pub error_color: ConsoleColor,
    pub user_input_color: ConsoleColor,
    pub title: String,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            font: FontSpec::default(),
            background: NamedColor::White.into(),
            output_color: NamedColor::Black.into(),
            error_color: NamedColor::Red.into(),
            user_input_color: NamedColor::Blue.into(),
            title: DEFAULT_WINDOW_TITLE.to_string(),
        }
    }
}

impl ConsoleSettings {
    /// The settings file lives in the system temp dir so that it is shared by every
    /// console on this machine.
    #[must_use]
    pub fn default_config_path() -> PathBuf { std::env::temp_dir().join(CONFIG_FILE_NAME) }

    /// Apply every recognized `key=value` line in `text`. Returns the keys that were
    /// applied, in order.
    pub fn apply_config_text(&mut self, text: &str) -> Vec<ConfigKey> {
        let mut applied = vec![];

        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let Ok(key) = ConfigKey::from_str(key.trim()) else {
                tracing::debug!(message = "Ignoring unknown settings key", line);
                continue;
            };

            let result = match key {
                ConfigKey::Font => FontSpec::try_parse(value).map(|it| self.font = it),
                ConfigKey::Background => {
                    ConsoleColor::from_str(value).map(|it| self.background = it)
                }
                ConfigKey::Foreground => {
                    ConsoleColor::from_str(value).map(|it| self.output_color = it)
                }
            };

            match result {
                Ok(()) => applied.push(key),
                Err(error) => {
                    tracing::debug!(message = "Ignoring invalid settings line", line, %error);
                }
            }
        }

        applied
    }

    #[must_use]
    pub fn to_config_text(&self) -> String {
        format!(
            "{CONFIG_FILE_HEADER}\n{}={}\n{}={}\n{}={}\n",
            ConfigKey::Background,
            self.background,
            ConfigKey::Foreground,
            self.output_color,
            ConfigKey::Font,
            self.font,
        )
    }

    /// Apply the settings file at `path` on top of `self`.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::FileNotFound`] if there is no file at `path`, or
    /// [`ConsoleError::Io`] if it can't be read.
    pub fn try_load_from(&mut self, path: &Path) -> ConsoleResult<Vec<ConfigKey>> {
        let text = std::fs::read_to_string(path)
            .map_err(|error| ConsoleError::from_io_with_path(error, path))?;
        ok!(self.apply_config_text(&text))
    }

    /// Defaults, with the settings file at `path` applied if there is one. A missing
    /// file is the normal case on first run and is not an error.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        let mut settings = Self::default();
        match settings.try_load_from(path) {
            Ok(applied) => {
                tracing::debug!(message = "Loaded console settings", ?path, ?applied);
            }
            Err(ConsoleError::FileNotFound { .. }) => {
                tracing::debug!(message = "No console settings file", ?path);
            }
            Err(error) => {
                tracing::warn!(message = "Could not read console settings", ?path, %error);
            }
        }
        settings
    }

    /// # Errors
    ///
    /// Returns [`ConsoleError::Io`] if the file can't be written.
    pub fn save_to(&self, path: &Path) -> ConsoleResult<()> {
        std::fs::write(path, self.to_config_text())?;
        tracing::debug!(message = "Saved console settings", ?path);
        ok!()
    }
}
