// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ConsoleError, ConsoleResult};
use std::{fmt::{Display, Formatter},
          str::FromStr};
use strum_macros::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Color names accepted in the settings file and by the color setters. Parsing is case
/// insensitive, so `Blue`, `BLUE` and `blue` are all the same.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum NamedColor {
    Black,
    White,
    Red,
    Green,
    Blue,
    Cyan,
    Magenta,
    Yellow,
    Orange,
    Pink,
    Gray,
    #[strum(serialize = "light_gray", serialize = "lightgray")]
    LightGray,
    #[strum(serialize = "dark_gray", serialize = "darkgray")]
    DarkGray,
}

impl NamedColor {
    #[must_use]
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            NamedColor::Black => (0, 0, 0),
            NamedColor::White => (255, 255, 255),
            NamedColor::Red => (255, 0, 0),
            NamedColor::Green => (0, 255, 0),
            NamedColor::Blue => (0, 0, 255),
            NamedColor::Cyan => (0, 255, 255),
            NamedColor::Magenta => (255, 0, 255),
            NamedColor::Yellow => (255, 255, 0),
            NamedColor::Orange => (255, 200, 0),
            NamedColor::Pink => (255, 175, 175),
            NamedColor::Gray => (128, 128, 128),
            NamedColor::LightGray => (192, 192, 192),
            NamedColor::DarkGray => (64, 64, 64),
        }
    }
}

/// A color used for the transcript background, or one of the foreground roles (output,
/// error, user input). Either a [`NamedColor`] or a `#RRGGBB` / `#RGB` hex value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleColor {
    Named(NamedColor),
    Rgb { red: u8, green: u8, blue: u8 },
}

impl From<NamedColor> for ConsoleColor {
    fn from(it: NamedColor) -> Self { ConsoleColor::Named(it) }
}

impl ConsoleColor {
    #[must_use]
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            ConsoleColor::Named(named) => named.rgb(),
            ConsoleColor::Rgb { red, green, blue } => (red, green, blue),
        }
    }

    /// # Errors
    ///
    /// Returns [`ConsoleError::InvalidColor`] if the input is not `#RGB` or `#RRGGBB`.
    pub fn try_from_hex_color(input: &str) -> ConsoleResult<Self> {
        let invalid = || ConsoleError::InvalidColor {
            value: input.to_string(),
        };

        let digits = input.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let parse = |it: &str| u8::from_str_radix(it, 16).map_err(|_| invalid());
        match digits.len() {
            // Short form, each digit is doubled, eg: `#f80` is `#ff8800`.
            3 => {
                let mut channels = [0_u8; 3];
                for (channel, ch) in channels.iter_mut().zip(digits.chars()) {
                    *channel = parse(&format!("{ch}{ch}"))?;
                }
                let [red, green, blue] = channels;
                Ok(ConsoleColor::Rgb { red, green, blue })
            }
            6 => Ok(ConsoleColor::Rgb {
                red: parse(&digits[0..2])?,
                green: parse(&digits[2..4])?,
                blue: parse(&digits[4..6])?,
            }),
            _ => Err(invalid()),
        }
    }
}

impl FromStr for ConsoleColor {
    type Err = ConsoleError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if input.starts_with('#') {
            return Self::try_from_hex_color(input);
        }
        NamedColor::from_str(input)
            .map(ConsoleColor::Named)
            .map_err(|_| ConsoleError::InvalidColor {
                value: input.to_string(),
            })
    }
}

impl Display for ConsoleColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsoleColor::Named(named) => write!(f, "{named}"),
            ConsoleColor::Rgb { red, green, blue } => {
                write!(f, "#{red:02x}{green:02x}{blue:02x}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("blue", ConsoleColor::Named(NamedColor::Blue) ; "lowercase name")]
    #[test_case("  RED ", ConsoleColor::Named(NamedColor::Red) ; "padded uppercase name")]
    #[test_case("LightGray", ConsoleColor::Named(NamedColor::LightGray) ; "camel case name")]
    #[test_case("dark_gray", ConsoleColor::Named(NamedColor::DarkGray) ; "snake case name")]
    #[test_case("#336699", ConsoleColor::Rgb { red: 0x33, green: 0x66, blue: 0x99 } ; "long hex")]
    #[test_case("#f80", ConsoleColor::Rgb { red: 0xff, green: 0x88, blue: 0x00 } ; "short hex")]
    fn test_parse_color(input: &str, expected: ConsoleColor) {
        assert_eq!(input.parse::<ConsoleColor>().unwrap(), expected);
    }

    #[test_case("chartreuse-ish" ; "unknown name")]
    #[test_case("#12345" ; "wrong hex length")]
    #[test_case("#gg0000" ; "non hex digits")]
    #[test_case("" ; "empty")]
    fn test_parse_invalid_color(input: &str) {
        let result = input.parse::<ConsoleColor>();
        assert!(matches!(result, Err(ConsoleError::InvalidColor { .. })));
    }

    #[test]
    fn test_every_named_color_parses_back() {
        use strum::IntoEnumIterator;
        for named in NamedColor::iter() {
            let parsed = named.as_ref().parse::<ConsoleColor>().unwrap();
            assert_eq!(parsed, ConsoleColor::Named(named));
        }
    }

    #[test]
    fn test_display_is_parseable() {
        let colors = [
            ConsoleColor::Named(NamedColor::LightGray),
            ConsoleColor::Rgb {
                red: 1,
                green: 2,
                blue: 254,
            },
        ];
        for color in colors {
            assert_eq!(color.to_string().parse::<ConsoleColor>().unwrap(), color);
        }
    }
}
