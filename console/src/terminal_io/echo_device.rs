// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{OutputStream, StdMutex, lock_recover};
use std::{io::Write, sync::Arc};

pub type SafeEchoWriter = Arc<StdMutex<dyn Write + Send>>;

/// The real process stream that console output is echoed to (when echo is enabled),
/// and that the plain clear marker is written to.
/// - It is safe to clone.
/// - Use [`Self::new_mock()`] in tests, see [`crate::test_fixtures::StdoutMock`].
#[derive(Clone)]
#[allow(missing_debug_implementations)]
pub struct EchoDevice {
    pub resource: SafeEchoWriter,
    pub is_mock: bool,
}

impl EchoDevice {
    #[must_use]
    pub fn new_stdout() -> Self {
        Self {
            resource: Arc::new(StdMutex::new(std::io::stdout())),
            is_mock: false,
        }
    }

    #[must_use]
    pub fn new_stderr() -> Self {
        Self {
            resource: Arc::new(StdMutex::new(std::io::stderr())),
            is_mock: false,
        }
    }

    pub fn new_mock(writer: impl Write + Send + 'static) -> Self {
        Self {
            resource: Arc::new(StdMutex::new(writer)),
            is_mock: true,
        }
    }

    /// Don't call this again in the same scope, it will deadlock.
    pub fn lock(&self) -> std::sync::MutexGuard<'_, dyn Write + Send + 'static> {
        lock_recover(&self.resource)
    }

    fn write_text(&self, text: &str) -> std::io::Result<()> {
        self.lock().write_all(text.as_bytes())
    }

    fn flush(&self) -> std::io::Result<()> { self.lock().flush() }
}

/// I/O failures on the real streams. These are collected while the output lock is
/// held, and only logged by [`Self::report()`] once it is released, since a log event
/// may itself be printed to the console.
#[derive(Debug, Default)]
pub struct EchoErrors(pub Vec<std::io::Error>);

impl EchoErrors {
    fn collect(results: impl IntoIterator<Item = std::io::Result<()>>) -> Self {
        Self(results.into_iter().filter_map(Result::err).collect())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn report(self) {
        for error in self.0 {
            tracing::warn!(message = "Echo to the real stream failed", %error);
        }
    }
}

/// The pair of real process streams behind the console.
#[derive(Clone)]
#[allow(missing_debug_implementations)]
pub struct EchoDevices {
    pub stdout: EchoDevice,
    pub stderr: EchoDevice,
}

impl Default for EchoDevices {
    fn default() -> Self {
        Self {
            stdout: EchoDevice::new_stdout(),
            stderr: EchoDevice::new_stderr(),
        }
    }
}

impl EchoDevices {
    fn get(&self, stream: OutputStream) -> (&EchoDevice, &EchoDevice) {
        match stream {
            OutputStream::Stdout => (&self.stdout, &self.stderr),
            OutputStream::Stderr => (&self.stderr, &self.stdout),
        }
    }

    /// Write `text` exactly as given (line endings untouched) to the real stream. The
    /// other stream is flushed first, and if `text` completes a line both are flushed
    /// again, so stdout and stderr stay interleaved correctly on a real terminal.
    #[must_use]
    pub fn echo(&self, text: &str, stream: OutputStream) -> EchoErrors {
        let (own, other) = self.get(stream);
        let mut results = vec![other.flush(), own.flush(), own.write_text(text)];
        if text.contains('\n') {
            results.push(own.flush());
            results.push(other.flush());
        }
        EchoErrors::collect(results)
    }

    /// Write `line` and a newline to the real stdout, regardless of echo.
    #[must_use]
    pub fn write_plain_line(&self, line: &str) -> EchoErrors {
        EchoErrors::collect([
            self.stdout.write_text(line),
            self.stdout.write_text("\n"),
            self.stdout.flush(),
        ])
    }

    #[must_use]
    pub fn flush_all(&self) -> EchoErrors {
        EchoErrors::collect([self.stdout.flush(), self.stderr.flush()])
    }
}
