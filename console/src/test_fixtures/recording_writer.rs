// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{StdMutex, lock_recover};
use std::{io::{Result, Write},
          sync::Arc};

/// One call made on a [`RecordingWriter`], tagged with the writer's label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriterEvent {
    Write { label: &'static str, text: String },
    Flush { label: &'static str },
}

/// Records every write and flush into an event log that can be shared between several
/// writers, so the relative order of calls across (eg) stdout and stderr can be checked.
#[derive(Clone, Debug)]
pub struct RecordingWriter {
    pub label: &'static str,
    pub events: Arc<StdMutex<Vec<WriterEvent>>>,
}

impl RecordingWriter {
    /// Returns a writer per label, all sharing one event log.
    #[must_use]
    pub fn shared<const N: usize>(labels: [&'static str; N]) -> [Self; N] {
        let events = Arc::new(StdMutex::new(vec![]));
        labels.map(|label| Self {
            label,
            events: events.clone(),
        })
    }

    #[must_use]
    pub fn get_copy_of_events(&self) -> Vec<WriterEvent> { lock_recover(&self.events).clone() }
}

impl Write for RecordingWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        lock_recover(&self.events).push(WriterEvent::Write {
            label: self.label,
            text: String::from_utf8_lossy(buf).into_owned(),
        });
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        lock_recover(&self.events).push(WriterEvent::Flush { label: self.label });
        Ok(())
    }
}
