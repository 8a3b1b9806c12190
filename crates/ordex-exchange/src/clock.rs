//! Local-to-server clock offset tracking.
//!
//! The exchange rejects signed requests whose timestamp deviates from its own
//! clock by more than the acceptance window, so every signed timestamp is
//! `local_time + offset`. The offset is recorded at startup and refreshed on
//! staleness or after a timestamp-window rejection; fetching the server time
//! is the caller's job, this module only holds the state.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

/// Trait for obtaining current time, enabling testability.
pub trait Clock: Send + Sync {
    /// Returns current local time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;
}

/// System clock implementation using real time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time before Unix epoch")
            .as_millis() as u64
    }
}

/// Clock offset state shared between the submit path and resyncs.
///
/// # Offset Convention
/// `offset_ms = server_time - local_time`
/// - Positive: server clock is ahead of local
/// - Negative: server clock is behind local
///
/// Mutation is confined to [`ClockSync::record_server_time`]; concurrent
/// readers observe either the old or the new offset, never a torn value.
pub struct ClockSync<C: Clock = SystemClock> {
    /// Offset: server_time - local_time (positive = server ahead).
    offset_ms: AtomicI64,
    /// Local timestamp of the last successful sync, 0 = never synced.
    last_sync_ms: AtomicU64,
    /// Clock source for current time.
    clock: C,
}

impl<C: Clock> ClockSync<C> {
    /// Threshold for warning about clock drift (2 seconds).
    const DRIFT_WARN_THRESHOLD_MS: i64 = 2000;

    /// Creates a new `ClockSync` with the given clock and no offset recorded.
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self {
            offset_ms: AtomicI64::new(0),
            last_sync_ms: AtomicU64::new(0),
            clock,
        }
    }

    /// Records a freshly fetched server time and returns the new offset.
    ///
    /// Large drift is compensated, not rejected; it is logged because it
    /// usually means the local clock needs attention.
    pub fn record_server_time(&self, server_time_ms: u64) -> i64 {
        let local_time = self.clock.now_ms();

        let offset = if server_time_ms >= local_time {
            (server_time_ms - local_time) as i64
        } else {
            -((local_time - server_time_ms) as i64)
        };

        if offset.abs() > Self::DRIFT_WARN_THRESHOLD_MS {
            tracing::warn!(offset_ms = offset, "significant clock drift against server");
        }

        self.offset_ms.store(offset, Ordering::Release);
        self.last_sync_ms.store(local_time, Ordering::Release);

        offset
    }

    /// Whether an offset has ever been recorded.
    #[must_use]
    pub fn has_synced(&self) -> bool {
        self.last_sync_ms.load(Ordering::Acquire) != 0
    }

    /// Whether the cached offset is absent or older than `max_age`.
    #[must_use]
    pub fn is_stale(&self, max_age: Duration) -> bool {
        let last = self.last_sync_ms.load(Ordering::Acquire);
        if last == 0 {
            return true;
        }
        let now = self.clock.now_ms();
        now.saturating_sub(last) > max_age.as_millis() as u64
    }

    /// Returns the drift-compensated timestamp for signing: `local + offset`.
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        let local = self.clock.now_ms();
        let offset = self.offset_ms.load(Ordering::Acquire);
        if offset >= 0 {
            local.saturating_add(offset as u64)
        } else {
            local.saturating_sub(offset.unsigned_abs())
        }
    }

    /// Returns the current offset in milliseconds.
    #[must_use]
    pub fn offset_ms(&self) -> i64 {
        self.offset_ms.load(Ordering::Acquire)
    }

    /// Returns the local timestamp of the last sync (0 = never).
    #[must_use]
    pub fn last_sync_ms(&self) -> u64 {
        self.last_sync_ms.load(Ordering::Acquire)
    }
}

impl ClockSync<SystemClock> {
    /// Creates a new `ClockSync` backed by the system clock.
    #[must_use]
    pub fn with_system_clock() -> Self {
        Self::new(SystemClock)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU64;
    use std::sync::Arc;

    use super::*;

    /// Mock clock for testing with controllable time.
    pub(crate) struct MockClock {
        time_ms: AtomicU64,
    }

    impl MockClock {
        pub(crate) fn new(initial_ms: u64) -> Self {
            Self {
                time_ms: AtomicU64::new(initial_ms),
            }
        }

        fn advance(&self, delta_ms: u64) {
            self.time_ms.fetch_add(delta_ms, Ordering::AcqRel);
        }
    }

    impl Clock for MockClock {
        fn now_ms(&self) -> u64 {
            self.time_ms.load(Ordering::Acquire)
        }
    }

    impl Clock for Arc<MockClock> {
        fn now_ms(&self) -> u64 {
            self.time_ms.load(Ordering::Acquire)
        }
    }

    const BASE_TIME: u64 = 1_700_000_000_000; // ~2023-11-14

    #[test]
    fn test_starts_unsynced_and_stale() {
        let sync = ClockSync::new(MockClock::new(BASE_TIME));
        assert!(!sync.has_synced());
        assert!(sync.is_stale(Duration::from_secs(30)));
        assert_eq!(sync.offset_ms(), 0);
    }

    #[test]
    fn test_positive_offset() {
        let sync = ClockSync::new(MockClock::new(BASE_TIME));
        let offset = sync.record_server_time(BASE_TIME + 500);

        assert_eq!(offset, 500);
        assert!(sync.has_synced());
        assert_eq!(sync.timestamp_ms(), BASE_TIME + 500);
    }

    #[test]
    fn test_negative_offset() {
        let sync = ClockSync::new(MockClock::new(BASE_TIME));
        let offset = sync.record_server_time(BASE_TIME - 500);

        assert_eq!(offset, -500);
        assert_eq!(sync.timestamp_ms(), BASE_TIME - 500);
    }

    #[test]
    fn test_staleness_follows_clock() {
        let clock = Arc::new(MockClock::new(BASE_TIME));
        let sync = ClockSync::new(Arc::clone(&clock));

        sync.record_server_time(BASE_TIME + 100);
        assert!(!sync.is_stale(Duration::from_secs(30)));

        clock.advance(29_000);
        assert!(!sync.is_stale(Duration::from_secs(30)));

        clock.advance(2_000);
        assert!(sync.is_stale(Duration::from_secs(30)));
    }

    #[test]
    fn test_resync_replaces_offset() {
        let sync = ClockSync::new(MockClock::new(BASE_TIME));
        sync.record_server_time(BASE_TIME + 1000);
        sync.record_server_time(BASE_TIME - 200);

        assert_eq!(sync.offset_ms(), -200);
    }

    #[test]
    fn test_concurrent_readers_see_whole_offsets() {
        let clock = Arc::new(MockClock::new(BASE_TIME));
        let sync = Arc::new(ClockSync::new(Arc::clone(&clock)));

        let writer = {
            let sync = Arc::clone(&sync);
            std::thread::spawn(move || {
                for i in 0..1000u64 {
                    sync.record_server_time(BASE_TIME + i);
                }
            })
        };

        let reader = {
            let sync = Arc::clone(&sync);
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    let offset = sync.offset_ms();
                    assert!((0..1000).contains(&offset), "torn offset: {offset}");
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
    }
}
