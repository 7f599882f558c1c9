// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ConsoleEngine, ConsoleWriter, OutputStream, ReadLineEvent};
use std::io::{self, BufRead, Read};

/// [`Read`] and [`BufRead`] on top of [`ConsoleEngine::read_line()`]. Each line comes
/// back with a trailing `'\n'`. End of input and shutdown read as 0 bytes (EOF).
///
/// Reading blocks, so never read from the UI context.
#[derive(Debug)]
pub struct ConsoleStdin {
    engine: ConsoleEngine,
    line: Vec<u8>,
    position: usize,
}

impl ConsoleStdin {
    #[must_use]
    pub fn new(engine: ConsoleEngine) -> Self {
        Self {
            engine,
            line: Vec::new(),
            position: 0,
        }
    }
}

impl BufRead for ConsoleStdin {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.position >= self.line.len() {
            self.line.clear();
            self.position = 0;
            if let ReadLineEvent::Line(line) = self.engine.read_line() {
                self.line.extend_from_slice(line.as_bytes());
                self.line.push(b'\n');
            }
        }
        Ok(&self.line[self.position..])
    }

    fn consume(&mut self, amount: usize) {
        self.position = (self.position + amount).min(self.line.len());
    }
}

impl Read for ConsoleStdin {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);
        self.consume(count);
        Ok(count)
    }
}

/// Stand ins for a program's standard streams.
#[derive(Debug)]
pub struct ConsoleStreams {
    pub stdin: ConsoleStdin,
    pub stdout: ConsoleWriter,
    pub stderr: ConsoleWriter,
}

impl ConsoleStreams {
    #[must_use]
    pub fn new(engine: &ConsoleEngine) -> Self {
        Self {
            stdin: engine.stdin(),
            stdout: engine.writer(OutputStream::Stdout),
            stderr: engine.writer(OutputStream::Stderr),
        }
    }
}
