use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Keeps document counts per index in memory, used for dry runs without a cluster.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    counts: Arc<Mutex<HashMap<String, u64>>>,
    closed: Arc<AtomicBool>,
    closes: Arc<AtomicUsize>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_count<S: AsRef<str>>(&self, index: S, count: u64) {
        self.counts.lock().insert(index.as_ref().to_string(), count);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// How often the underlying connection was actually released.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::Acquire)
    }

    pub(crate) fn count(&self, index: &str) -> anyhow::Result<u64> {
        if self.is_closed() {
            anyhow::bail!("memory engine is closed")
        }
        Ok(self.counts.lock().get(index).copied().unwrap_or_default())
    }

    pub(crate) fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.closes.fetch_add(1, Ordering::AcqRel);
        }
    }
}
