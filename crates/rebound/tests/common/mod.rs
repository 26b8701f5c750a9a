//! Shared helpers for rebound integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Install a test subscriber so `RUST_LOG=rebound=debug` shows retry events.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Paused-clock timers can land a tick late; allow a few milliseconds.
const TOLERANCE: Duration = Duration::from_millis(5);

pub fn assert_close(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + TOLERANCE,
        "expected ~{:?}, got {:?}",
        expected,
        actual
    );
}

/// Records the offset of every call from the moment it was created.
#[derive(Clone)]
pub struct CallLog {
    start: Instant,
    calls: Arc<Mutex<Vec<Duration>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn record(&self) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(self.start.elapsed());
        calls.len()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Gaps between consecutive calls.
    pub fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls.windows(2).map(|w| w[1] - w[0]).collect()
    }

    pub fn assert_gaps(&self, expected_secs: &[u64]) {
        let gaps = self.gaps();
        assert_eq!(gaps.len(), expected_secs.len(), "gaps: {:?}", gaps);
        for (gap, secs) in gaps.iter().zip(expected_secs) {
            assert_close(*gap, Duration::from_secs(*secs));
        }
    }
}
