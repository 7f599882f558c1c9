// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ConsoleError, ConsoleResult};
use std::{fmt::{Display, Formatter},
          str::FromStr};

pub const DEFAULT_FONT_FAMILY: &str = "Monospace";
pub const DEFAULT_FONT_SIZE: u8 = 12;
pub const MIN_FONT_SIZE: u8 = 4;
pub const MAX_FONT_SIZE: u8 = 255;

/// The transcript font, written as `Family-Size` or `Family-Size-Weight`, eg:
/// `Monospace-12` or `Courier New-14-Bold`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontSpec {
    pub family: String,
    pub size: u8,
    pub weight: Option<String>,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: DEFAULT_FONT_FAMILY.to_string(),
            size: DEFAULT_FONT_SIZE,
            weight: None,
        }
    }
}

impl FontSpec {
    /// Returns a copy one point larger, or [`None`] if already at [`MAX_FONT_SIZE`].
    #[must_use]
    pub fn grown(&self) -> Option<Self> {
        (self.size < MAX_FONT_SIZE).then(|| Self {
            size: self.size + 1,
            ..self.clone()
        })
    }

    /// Returns a copy one point smaller, or [`None`] if already at [`MIN_FONT_SIZE`].
    #[must_use]
    pub fn shrunk(&self) -> Option<Self> {
        (self.size > MIN_FONT_SIZE).then(|| Self {
            size: self.size - 1,
            ..self.clone()
        })
    }

    /// # Errors
    ///
    /// Returns [`ConsoleError::InvalidFont`] if the family is empty or the size is not
    /// a number.
    pub fn try_parse(input: &str) -> ConsoleResult<Self> {
        let invalid = || ConsoleError::InvalidFont {
            value: input.to_string(),
        };

        let mut parts = input.trim().splitn(3, '-');
        let family = parts.next().map(str::trim).unwrap_or_default();
        if family.is_empty() {
            return Err(invalid());
        }

        let size = match parts.next().map(str::trim) {
            None | Some("") => DEFAULT_FONT_SIZE,
            Some(size) => {
                let size = size.parse::<u32>().map_err(|_| invalid())?;
                let clamped = size.clamp(MIN_FONT_SIZE.into(), MAX_FONT_SIZE.into());
                u8::try_from(clamped).map_err(|_| invalid())?
            }
        };

        let weight = parts
            .next()
            .map(str::trim)
            .filter(|it| !it.is_empty())
            .map(ToString::to_string);

        Ok(Self {
            family: family.to_string(),
            size,
            weight,
        })
    }
}

impl FromStr for FontSpec {
    type Err = ConsoleError;

    fn from_str(input: &str) -> Result<Self, Self::Err> { Self::try_parse(input) }
}

impl Display for FontSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.family, self.size)?;
        if let Some(weight) = &self.weight {
            write!(f, "-{weight}")?;
        }
        Ok(())
    }
}
