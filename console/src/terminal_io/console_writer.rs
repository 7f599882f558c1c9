// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ConsoleEngine, OutputStream, ok};
use std::io::{self, Write};

/// Cloneable [`Write`] that prints into a [`ConsoleEngine`] on one of its two streams.
/// Hand it to code that wants an `io::Write` (eg: a `tracing` writer, or `writeln!`).
///
/// # Nothing is printed until a newline is written, unless you call [`Self::flush()`]
///
/// Bytes are buffered until the buffer ends with `'\n'`, and then printed in one
/// [`ConsoleEngine::print()`] call, so lines from different threads never interleave.
/// Since the split only happens right after a newline, a multi byte char is never cut
/// in half. Whatever is left is flushed on drop.
///
/// Writing after the console shut down succeeds, and the text goes nowhere.
#[derive(Debug)]
pub struct ConsoleWriter {
    engine: ConsoleEngine,
    stream: OutputStream,
    /// Bytes that have not been printed yet.
    pub buffer: Vec<u8>,
}

impl ConsoleWriter {
    #[must_use]
    pub fn new(engine: ConsoleEngine, stream: OutputStream) -> Self {
        Self {
            engine,
            stream,
            buffer: Vec::new(),
        }
    }

    #[must_use]
    pub fn stream(&self) -> OutputStream { self.stream }

    fn emit(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        self.engine.print(text, self.stream);
    }
}

/// Each clone gets its own (empty) buffer, and prints to the same console.
impl Clone for ConsoleWriter {
    fn clone(&self) -> Self { Self::new(self.engine.clone(), self.stream) }
}

impl Write for ConsoleWriter {
    fn write(&mut self, payload: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(payload);
        if self.buffer.ends_with(b"\n") {
            self.emit();
        }
        Ok(payload.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit();
        ok!()
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) { self.emit(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConsoleOptions;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nothing_printed_until_newline() {
        let (engine, _receiver) = ConsoleEngine::new(ConsoleOptions::default());
        let mut writer = engine.writer(OutputStream::Stdout);

        write!(writer, "abc").unwrap();
        assert_eq!(engine.all_output(), "");

        writeln!(writer, "def").unwrap();
        assert_eq!(engine.all_output(), "abcdef\n");
        assert!(writer.buffer.is_empty());
    }

    #[test]
    fn test_flush_and_drop_print_partial_line() {
        let (engine, _receiver) = ConsoleEngine::new(ConsoleOptions::default());
        let mut writer = engine.writer(OutputStream::Stderr);

        write!(writer, "partial").unwrap();
        writer.flush().unwrap();
        assert_eq!(engine.all_output(), "partial");

        let mut other = writer.clone();
        write!(other, " tail").unwrap();
        drop(other);
        assert_eq!(engine.all_output(), "partial tail");
    }

    #[test]
    fn test_split_multibyte_char_is_reassembled() {
        let (engine, _receiver) = ConsoleEngine::new(ConsoleOptions::default());
        let mut writer = engine.writer(OutputStream::Stdout);
        let bytes = "é\n".as_bytes();

        writer.write_all(&bytes[..1]).unwrap();
        writer.write_all(&bytes[1..]).unwrap();
        assert_eq!(engine.all_output(), "é\n");
    }
}
