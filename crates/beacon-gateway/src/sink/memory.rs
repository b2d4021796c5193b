//! In-memory sink with a read-side handle, for tests and dry runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;

use beacon_core::error::{BeaconError, Result};
use beacon_core::protocol::line::decode_line;
use beacon_core::Event;

use super::Sink;

#[derive(Default)]
struct Shared {
    buf: Mutex<Vec<u8>>,
    closes: AtomicUsize,
}

impl Shared {
    fn buf(&self) -> MutexGuard<'_, Vec<u8>> {
        self.buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct MemorySink {
    shared: Arc<Shared>,
    fail_after: Option<usize>,
    appended: usize,
}

/// Read side of a [`MemorySink`]; stays valid after the sink is closed.
#[derive(Clone)]
pub struct MemoryReader {
    shared: Arc<Shared>,
}

impl MemorySink {
    pub fn new() -> (Self, MemoryReader) {
        let shared = Arc::new(Shared::default());
        let sink = Self {
            shared: Arc::clone(&shared),
            fail_after: None,
            appended: 0,
        };
        (sink, MemoryReader { shared })
    }

    /// Sink whose append fails once `n` lines have been stored.
    pub fn failing_after(n: usize) -> (Self, MemoryReader) {
        let (mut sink, reader) = Self::new();
        sink.fail_after = Some(n);
        (sink, reader)
    }
}

#[async_trait]
impl Sink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn append(&mut self, line: Bytes) -> Result<()> {
        if self.fail_after.is_some_and(|n| self.appended >= n) {
            return Err(BeaconError::SinkWrite("memory sink: injected failure".into()));
        }
        self.shared.buf().extend_from_slice(&line);
        self.appended += 1;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.shared.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl MemoryReader {
    /// Raw contents written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.shared.buf().clone()
    }

    /// Lines written so far, without terminators.
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.contents())
            .lines()
            .map(str::to_owned)
            .collect()
    }

    /// Decode every line back into an event.
    pub fn events(&self) -> Result<Vec<Event>> {
        self.lines().iter().map(|l| decode_line(l.as_bytes())).collect()
    }

    /// How many times the sink has been closed.
    pub fn close_count(&self) -> usize {
        self.shared.closes.load(Ordering::SeqCst)
    }
}
