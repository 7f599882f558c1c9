// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Key events, as delivered by the UI context, and what they mean to the console.
//!
//! [`decode_key()`] is a pure function from a [`KeyPress`] to a [`KeyCommand`], so the
//! whole shortcut table can be tested without a console. The engine then carries out
//! the command, see [`crate::ConsoleEngine::handle_key()`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers as CtKeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleKey {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Tab,
    Escape,
    Function(u8),
}

/// `ctrl` is set for either Control or Command (macOS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ConsoleKeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: ConsoleKey,
    pub modifiers: ConsoleKeyModifiers,
}

impl KeyPress {
    #[must_use]
    pub fn plain(key: ConsoleKey) -> Self {
        Self {
            key,
            modifiers: ConsoleKeyModifiers::default(),
        }
    }

    #[must_use]
    pub fn ctrl(key: ConsoleKey) -> Self {
        Self {
            key,
            modifiers: ConsoleKeyModifiers {
                ctrl: true,
                ..Default::default()
            },
        }
    }

    #[must_use]
    pub fn shift(key: ConsoleKey) -> Self {
        Self {
            key,
            modifiers: ConsoleKeyModifiers {
                shift: true,
                ..Default::default()
            },
        }
    }

    #[must_use]
    pub fn ctrl_shift(key: ConsoleKey) -> Self {
        Self {
            key,
            modifiers: ConsoleKeyModifiers {
                shift: true,
                ctrl: true,
                alt: false,
            },
        }
    }
}

impl From<char> for KeyPress {
    fn from(ch: char) -> Self { KeyPress::plain(ConsoleKey::Char(ch)) }
}

/// A crossterm key event the console has no use for (key releases, media keys, etc).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedKey(pub KeyEvent);

impl TryFrom<KeyEvent> for KeyPress {
    type Error = UnsupportedKey;

    fn try_from(event: KeyEvent) -> Result<Self, Self::Error> {
        if event.kind == KeyEventKind::Release {
            return Err(UnsupportedKey(event));
        }

        let key = match event.code {
            KeyCode::Char(ch) => ConsoleKey::Char(ch),
            KeyCode::Enter => ConsoleKey::Enter,
            KeyCode::Backspace => ConsoleKey::Backspace,
            KeyCode::Delete => ConsoleKey::Delete,
            KeyCode::Insert => ConsoleKey::Insert,
            KeyCode::Home => ConsoleKey::Home,
            KeyCode::End => ConsoleKey::End,
            KeyCode::Left => ConsoleKey::Left,
            KeyCode::Right => ConsoleKey::Right,
            KeyCode::Up => ConsoleKey::Up,
            KeyCode::Down => ConsoleKey::Down,
            KeyCode::PageUp => ConsoleKey::PageUp,
            KeyCode::PageDown => ConsoleKey::PageDown,
            KeyCode::Tab | KeyCode::BackTab => ConsoleKey::Tab,
            KeyCode::Esc => ConsoleKey::Escape,
            KeyCode::F(number) => ConsoleKey::Function(number),
            _ => return Err(UnsupportedKey(event)),
        };

        let modifiers = ConsoleKeyModifiers {
            shift: event.modifiers.contains(CtKeyModifiers::SHIFT)
                || event.code == KeyCode::BackTab,
            ctrl: event
                .modifiers
                .intersects(CtKeyModifiers::CONTROL | CtKeyModifiers::SUPER),
            alt: event.modifiers.contains(CtKeyModifiers::ALT),
        };

        Ok(KeyPress { key, modifiers })
    }
}

/// Actions that need a collaborator outside the console (the clipboard, a file dialog,
/// an about box). [`crate::ConsoleEngine::handle_key()`] hands these back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleAction {
    Copy,
    Cut,
    Paste,
    /// Save was requested but there is no previous save path yet.
    SaveAs,
    ShowAbout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyOutcome {
    /// The console handled the key, the surface must not.
    Consumed,
    /// Not for the console, let the surface do its default thing (eg: scroll, or move
    /// the cursor around the transcript).
    Ignored,
    Action(ConsoleAction),
}

/// What a key press means, before looking at any console state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCommand {
    // Shortcuts.
    Eof,
    Clear,
    LoadScript(u8),
    Close,
    Save,
    SaveAs,
    FontGrow,
    FontShrink,
    FontReset,
    Copy,
    Cut,
    Paste,
    ShowAbout,
    // Editing.
    Type(char),
    Submit,
    Backspace,
    DeleteForward,
    Home { extend: bool },
    End { extend: bool },
    Left { extend: bool },
    Right { extend: bool },
    HistoryOlder,
    HistoryNewer,
    /// A modified key that is not a shortcut.
    Swallow,
    PassThrough,
}

impl KeyCommand {
    /// Shortcuts are handled even after shutdown (each of them checks for itself).
    #[must_use]
    pub fn is_shortcut(self) -> bool {
        matches!(
            self,
            KeyCommand::Eof
                | KeyCommand::Clear
                | KeyCommand::LoadScript(_)
                | KeyCommand::Close
                | KeyCommand::Save
                | KeyCommand::SaveAs
                | KeyCommand::FontGrow
                | KeyCommand::FontShrink
                | KeyCommand::FontReset
                | KeyCommand::Copy
                | KeyCommand::Cut
                | KeyCommand::Paste
                | KeyCommand::ShowAbout
        )
    }
}

#[must_use]
pub fn decode_key(press: KeyPress) -> KeyCommand {
    let ConsoleKeyModifiers { shift, ctrl, alt } = press.modifiers;

    if ctrl {
        return match press.key {
            ConsoleKey::Char(ch) => match ch.to_ascii_lowercase() {
                '+' | '=' => KeyCommand::FontGrow,
                '-' => KeyCommand::FontShrink,
                '0' => KeyCommand::FontReset,
                'c' => KeyCommand::Copy,
                'd' => KeyCommand::Eof,
                'l' => KeyCommand::Clear,
                'q' | 'w' => KeyCommand::Close,
                's' if shift => KeyCommand::SaveAs,
                's' => KeyCommand::Save,
                'v' => KeyCommand::Paste,
                'x' => KeyCommand::Cut,
                digit @ '1'..='9' => digit
                    .to_digit(10)
                    .and_then(|it| u8::try_from(it).ok())
                    .map_or(KeyCommand::Swallow, KeyCommand::LoadScript),
                _ => KeyCommand::Swallow,
            },
            ConsoleKey::Insert => KeyCommand::Copy,
            _ => KeyCommand::Swallow,
        };
    }

    if alt {
        return KeyCommand::Swallow;
    }

    match press.key {
        ConsoleKey::Delete if shift => KeyCommand::Cut,
        ConsoleKey::Insert if shift => KeyCommand::Paste,
        ConsoleKey::Function(1) => KeyCommand::ShowAbout,
        ConsoleKey::Char(ch) if !ch.is_control() => KeyCommand::Type(ch),
        ConsoleKey::Enter => KeyCommand::Submit,
        ConsoleKey::Backspace => KeyCommand::Backspace,
        ConsoleKey::Delete => KeyCommand::DeleteForward,
        ConsoleKey::Home => KeyCommand::Home { extend: shift },
        ConsoleKey::End => KeyCommand::End { extend: shift },
        ConsoleKey::Left => KeyCommand::Left { extend: shift },
        ConsoleKey::Right => KeyCommand::Right { extend: shift },
        ConsoleKey::Up => KeyCommand::HistoryOlder,
        ConsoleKey::Down => KeyCommand::HistoryNewer,
        _ => KeyCommand::PassThrough,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(KeyPress::ctrl(ConsoleKey::Char('d')), KeyCommand::Eof ; "ctrl d")]
    #[test_case(KeyPress::ctrl(ConsoleKey::Char('L')), KeyCommand::Clear ; "ctrl shift l")]
    #[test_case(KeyPress::ctrl(ConsoleKey::Char('3')), KeyCommand::LoadScript(3) ; "ctrl 3")]
    #[test_case(KeyPress::ctrl(ConsoleKey::Char('w')), KeyCommand::Close ; "ctrl w")]
    #[test_case(KeyPress::ctrl(ConsoleKey::Char('s')), KeyCommand::Save ; "ctrl s")]
    #[test_case(KeyPress::ctrl_shift(ConsoleKey::Char('S')), KeyCommand::SaveAs ; "ctrl shift s")]
    #[test_case(KeyPress::ctrl(ConsoleKey::Char('=')), KeyCommand::FontGrow ; "ctrl equals")]
    #[test_case(KeyPress::ctrl(ConsoleKey::Char('-')), KeyCommand::FontShrink ; "ctrl minus")]
    #[test_case(KeyPress::ctrl(ConsoleKey::Char('0')), KeyCommand::FontReset ; "ctrl zero")]
    #[test_case(KeyPress::ctrl(ConsoleKey::Insert), KeyCommand::Copy ; "ctrl insert")]
    #[test_case(KeyPress::ctrl(ConsoleKey::Char('z')), KeyCommand::Swallow ; "ctrl z unbound")]
    #[test_case(KeyPress::shift(ConsoleKey::Delete), KeyCommand::Cut ; "shift delete")]
    #[test_case(KeyPress::shift(ConsoleKey::Insert), KeyCommand::Paste ; "shift insert")]
    #[test_case(KeyPress::plain(ConsoleKey::Function(1)), KeyCommand::ShowAbout ; "f1")]
    #[test_case(KeyPress::from('x'), KeyCommand::Type('x') ; "printable")]
    #[test_case(KeyPress::shift(ConsoleKey::Char('X')), KeyCommand::Type('X') ; "shifted printable")]
    #[test_case(KeyPress::from('\u{7}'), KeyCommand::PassThrough ; "control char")]
    #[test_case(KeyPress::plain(ConsoleKey::Enter), KeyCommand::Submit ; "enter")]
    #[test_case(KeyPress::shift(ConsoleKey::Home), KeyCommand::Home { extend: true } ; "shift home")]
    #[test_case(KeyPress::plain(ConsoleKey::Up), KeyCommand::HistoryOlder ; "up")]
    #[test_case(KeyPress::plain(ConsoleKey::PageDown), KeyCommand::PassThrough ; "page down")]
    fn test_decode_key(press: KeyPress, expected: KeyCommand) {
        assert_eq!(decode_key(press), expected);
    }

    #[test]
    fn test_shortcuts() {
        assert!(KeyCommand::Eof.is_shortcut());
        assert!(!KeyCommand::Type('a').is_shortcut());
        assert!(!KeyCommand::Swallow.is_shortcut());
    }

    #[test]
    fn test_from_crossterm() {
        let event = KeyEvent::new(KeyCode::Char('d'), CtKeyModifiers::CONTROL);
        assert_eq!(
            KeyPress::try_from(event).unwrap(),
            KeyPress::ctrl(ConsoleKey::Char('d'))
        );

        let event = KeyEvent::new(KeyCode::Char('s'), CtKeyModifiers::SUPER);
        assert_eq!(decode_key(KeyPress::try_from(event).unwrap()), KeyCommand::Save);
    }

    #[test]
    fn test_from_crossterm_release_is_unsupported() {
        let event = KeyEvent {
            code: KeyCode::Enter,
            modifiers: CtKeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(KeyPress::try_from(event).is_err());
    }
}
