//! Two-tier sliding-window connection limiter.
//!
//! # Responsibilities
//! - Track one entry per identity in a most-recently-touched-first list
//! - Decide accept/drop for a new connection attempt
//! - Evict idle entries opportunistically during lookups
//! - Expose snapshot and flush operations for the management view
//!
//! # Design Decisions
//! - One mutex guards the list; evicted entries are dropped after unlock
//! - Settings are swapped whole, so a check never sees a mix of old and new values
//! - No background timer: ageing happens only inside `check`

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;

use crate::clock::{Clock, SystemClock};
use crate::config::ConnlimitConfig;
use crate::connlimit::key::IdentityKey;
use crate::connlimit::rate::{RateLimit, RateParseError};
use crate::observability::metrics;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Drop,
}

impl Decision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Decision::Accept)
    }
}

/// Errors raised by limiter bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnlimitError {
    /// No room for a new entry.
    #[error("connlimit: entry table exhausted ({max_entries} entries)")]
    Exhausted { max_entries: usize },
}

/// Limiter parameters, replaced atomically on reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitSettings {
    /// Attempts allowed inside the burst window before the sustained rate applies.
    pub burst: u32,
    /// Idle time after which an identity starts fresh.
    pub burst_timeout: Duration,
    /// Minimum spacing between accepted attempts once the burst is spent.
    pub limit_interval: Duration,
    /// Upper bound on tracked identities (0 = unbounded).
    pub max_entries: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            burst: 3,
            burst_timeout: Duration::from_secs(60),
            limit_interval: Duration::from_millis(5000),
            max_entries: 0,
        }
    }
}

impl LimitSettings {
    /// Build settings from the `[connlimit]` section.
    ///
    /// A missing `limit` keeps the default interval.
    pub fn from_config(config: &ConnlimitConfig) -> Result<Self, RateParseError> {
        let mut settings = Self {
            burst: config.burst,
            burst_timeout: Duration::from_secs(config.timeout),
            max_entries: config.max_entries,
            ..Self::default()
        };
        if let Some(limit) = &config.limit {
            settings.limit_interval = limit.parse::<RateLimit>()?.interval();
        }
        Ok(settings)
    }
}

#[derive(Debug)]
struct RateEntry {
    identity: IdentityKey,
    last_seen: Instant,
    count: u32,
}

/// Point-in-time view of one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySnapshot {
    pub identity: IdentityKey,
    pub count: u32,
    pub age: Duration,
}

/// Connection-attempt limiter shared by all admission call sites.
pub struct ConnLimiter {
    entries: Mutex<VecDeque<RateEntry>>,
    settings: ArcSwap<LimitSettings>,
    clock: Arc<dyn Clock>,
}

impl ConnLimiter {
    /// Create a limiter on the system monotonic clock.
    pub fn new(settings: LimitSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(settings: LimitSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            settings: ArcSwap::from_pointee(settings),
            clock,
        }
    }

    /// Replace the settings; entries already in the list are left untouched.
    pub fn apply(&self, settings: LimitSettings) {
        tracing::info!(
            burst = settings.burst,
            burst_timeout_ms = settings.burst_timeout.as_millis() as u64,
            limit_interval_ms = settings.limit_interval.as_millis() as u64,
            "connlimit settings applied"
        );
        self.settings.store(Arc::new(settings));
    }

    /// Current settings.
    pub fn settings(&self) -> Arc<LimitSettings> {
        self.settings.load_full()
    }

    /// Decide whether a new connection from `identity` may proceed.
    pub fn check(&self, identity: IdentityKey) -> Result<Decision, ConnlimitError> {
        let now = self.clock.now();
        let settings = self.settings.load();
        let burst_timeout = settings.burst_timeout.as_millis() as u64;
        let limit_interval = settings.limit_interval.as_millis() as u64;

        let mut evicted = Vec::new();
        let mut outcome = None;

        {
            let mut entries = self.lock();
            tracing::debug!(%identity, "connlimit: check entry");

            let mut i = 0;
            while i < entries.len() {
                let elapsed = elapsed_ms(now, entries[i].last_seen);

                if entries[i].identity == identity {
                    let entry = &mut entries[i];
                    let (decision, to_front) = if elapsed >= burst_timeout {
                        entry.last_seen = now;
                        entry.count = 0;
                        (Decision::Accept, true)
                    } else {
                        entry.count = entry.count.saturating_add(1);
                        if entry.count < settings.burst {
                            (Decision::Accept, false)
                        } else if elapsed >= limit_interval {
                            entry.last_seen = now;
                            (Decision::Accept, true)
                        } else {
                            (Decision::Drop, false)
                        }
                    };
                    if to_front && i > 0 {
                        if let Some(entry) = entries.remove(i) {
                            entries.push_front(entry);
                        }
                    }
                    outcome = Some(decision);
                    break;
                }

                if elapsed > burst_timeout {
                    if let Some(stale) = entries.remove(i) {
                        evicted.push(stale);
                    }
                    continue;
                }
                i += 1;
            }

            if outcome.is_none() {
                let full = settings.max_entries != 0 && entries.len() >= settings.max_entries;
                if full || entries.try_reserve(1).is_err() {
                    let max_entries = settings.max_entries.max(entries.len());
                    drop(entries);
                    self.release(evicted);
                    return Err(ConnlimitError::Exhausted { max_entries });
                }
                entries.push_front(RateEntry {
                    identity,
                    last_seen: now,
                    count: 0,
                });
                tracing::debug!(%identity, "connlimit: add entry");
            }

            metrics::record_connlimit_entries(entries.len());
        }

        self.release(evicted);

        let decision = outcome.unwrap_or(Decision::Accept);
        match decision {
            Decision::Accept => tracing::debug!(%identity, "connlimit: accept"),
            Decision::Drop => tracing::debug!(%identity, "connlimit: drop"),
        }
        metrics::record_connlimit_decision(decision.is_accept());
        Ok(decision)
    }

    /// Admission helper: bookkeeping failures accept by default.
    pub fn admit(&self, identity: IdentityKey) -> bool {
        match self.check(identity) {
            Ok(decision) => decision.is_accept(),
            Err(e) => {
                tracing::error!(%identity, error = %e, "connlimit bookkeeping failed, accepting");
                true
            }
        }
    }

    /// Remove the entry for `identity`. Returns whether one existed.
    pub fn flush(&self, identity: IdentityKey) -> bool {
        let removed = {
            let mut entries = self.lock();
            let removed = entries
                .iter()
                .position(|e| e.identity == identity)
                .and_then(|pos| entries.remove(pos));
            metrics::record_connlimit_entries(entries.len());
            removed
        };
        if removed.is_some() {
            tracing::debug!(%identity, "connlimit: remove");
        }
        removed.is_some()
    }

    /// Remove every entry. Returns how many were dropped.
    pub fn flush_all(&self) -> usize {
        let drained = std::mem::take(&mut *self.lock());
        metrics::record_connlimit_entries(0);
        tracing::debug!(count = drained.len(), "connlimit: remove all entries");
        drained.len()
    }

    /// Snapshot of all entries, most recently touched first.
    pub fn entries(&self) -> Vec<EntrySnapshot> {
        let now = self.clock.now();
        self.lock()
            .iter()
            .map(|e| EntrySnapshot {
                identity: e.identity,
                count: e.count,
                age: now.saturating_duration_since(e.last_seen),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<RateEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn release(&self, evicted: Vec<RateEntry>) {
        if evicted.is_empty() {
            return;
        }
        for entry in &evicted {
            tracing::debug!(identity = %entry.identity, "connlimit: remove");
        }
        metrics::record_connlimit_evicted(evicted.len());
    }
}

impl std::fmt::Debug for ConnLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnLimiter")
            .field("entries", &self.len())
            .field("settings", &self.settings.load())
            .finish()
    }
}

fn elapsed_ms(now: Instant, since: Instant) -> u64 {
    now.saturating_duration_since(since).as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use std::net::Ipv4Addr;

    fn limiter(settings: LimitSettings) -> (ConnLimiter, MockClock) {
        let clock = MockClock::default();
        (ConnLimiter::with_clock(settings, Arc::new(clock.clone())), clock)
    }

    fn scenario_settings() -> LimitSettings {
        LimitSettings {
            burst: 3,
            burst_timeout: Duration::from_secs(60),
            limit_interval: Duration::from_millis(100),
            max_entries: 0,
        }
    }

    fn ip(last: u8) -> IdentityKey {
        IdentityKey::from_ipv4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn test_first_seen_accepts_and_creates_one_entry() {
        let (limiter, _) = limiter(LimitSettings::default());
        assert_eq!(limiter.check(ip(1)), Ok(Decision::Accept));
        assert_eq!(limiter.len(), 1);
        let entries = limiter.entries();
        assert_eq!(entries[0].identity, ip(1));
        assert_eq!(entries[0].count, 0);
    }

    #[test]
    fn test_burst_then_sustained_rate() {
        let (limiter, clock) = limiter(scenario_settings());
        let key = ip(1);

        let mut results = Vec::new();
        for _ in 0..5 {
            results.push(limiter.check(key).unwrap());
            clock.advance_ms(2);
        }
        assert_eq!(
            results,
            vec![
                Decision::Accept,
                Decision::Accept,
                Decision::Accept,
                Decision::Drop,
                Decision::Drop
            ]
        );

        clock.advance_ms(150);
        assert_eq!(limiter.check(key), Ok(Decision::Accept));
        // Timestamp was refreshed, so the ceiling applies again.
        assert_eq!(limiter.check(key), Ok(Decision::Drop));
    }

    #[test]
    fn test_count_never_decreases_while_dropping() {
        let (limiter, _) = limiter(scenario_settings());
        let key = ip(2);
        let mut last = 0;
        for i in 0..10 {
            let decision = limiter.check(key).unwrap();
            let count = limiter.entries()[0].count;
            if i >= 3 {
                assert_eq!(decision, Decision::Drop);
                assert!(count > last);
            }
            last = count;
        }
    }

    #[test]
    fn test_idle_past_burst_window_resets() {
        let (limiter, clock) = limiter(scenario_settings());
        let key = ip(3);
        for _ in 0..6 {
            limiter.check(key).unwrap();
        }
        assert!(limiter.entries()[0].count >= 3);

        clock.advance(Duration::from_secs(60));
        assert_eq!(limiter.check(key), Ok(Decision::Accept));
        assert_eq!(limiter.entries()[0].count, 0);
        assert_eq!(limiter.entries()[0].age, Duration::ZERO);
    }

    #[test]
    fn test_flush_all_forgets_identities() {
        let (limiter, _) = limiter(scenario_settings());
        for _ in 0..5 {
            limiter.check(ip(4)).unwrap();
        }
        assert_eq!(limiter.check(ip(4)), Ok(Decision::Drop));

        assert_eq!(limiter.flush_all(), 1);
        assert!(limiter.is_empty());
        assert_eq!(limiter.check(ip(4)), Ok(Decision::Accept));
        assert_eq!(limiter.entries()[0].count, 0);
    }

    #[test]
    fn test_flush_single_identity() {
        let (limiter, _) = limiter(scenario_settings());
        limiter.check(ip(5)).unwrap();
        limiter.check(ip(6)).unwrap();

        assert!(limiter.flush(ip(5)));
        assert!(!limiter.flush(ip(5)));
        assert_eq!(limiter.len(), 1);
        assert_eq!(limiter.entries()[0].identity, ip(6));
    }

    #[test]
    fn test_stale_entries_evicted_during_unrelated_check() {
        let (limiter, clock) = limiter(scenario_settings());
        limiter.check(ip(7)).unwrap();
        limiter.check(ip(8)).unwrap();

        clock.advance(Duration::from_secs(61));
        limiter.check(ip(9)).unwrap();

        let ids: Vec<_> = limiter.entries().into_iter().map(|e| e.identity).collect();
        assert_eq!(ids, vec![ip(9)]);
    }

    #[test]
    fn test_entries_ordered_most_recent_first() {
        let (limiter, clock) = limiter(LimitSettings {
            burst: 1,
            ..scenario_settings()
        });
        limiter.check(ip(1)).unwrap();
        limiter.check(ip(2)).unwrap();
        let ids: Vec<_> = limiter.entries().into_iter().map(|e| e.identity).collect();
        assert_eq!(ids, vec![ip(2), ip(1)]);

        // A sustained-rate accept moves the touched entry to the front.
        clock.advance_ms(200);
        assert_eq!(limiter.check(ip(1)), Ok(Decision::Accept));
        let ids: Vec<_> = limiter.entries().into_iter().map(|e| e.identity).collect();
        assert_eq!(ids, vec![ip(1), ip(2)]);
    }

    #[test]
    fn test_in_burst_accept_keeps_position() {
        let (limiter, _) = limiter(scenario_settings());
        limiter.check(ip(1)).unwrap();
        limiter.check(ip(2)).unwrap();
        // Second attempt for ip(1) is inside the burst: accepted, not moved.
        assert_eq!(limiter.check(ip(1)), Ok(Decision::Accept));
        let ids: Vec<_> = limiter.entries().into_iter().map(|e| e.identity).collect();
        assert_eq!(ids, vec![ip(2), ip(1)]);
    }

    #[test]
    fn test_reload_applies_to_later_checks_only() {
        let (limiter, _) = limiter(scenario_settings());
        let key = ip(10);
        for _ in 0..3 {
            limiter.check(key).unwrap();
        }
        assert_eq!(limiter.check(key), Ok(Decision::Drop));
        let count_before = limiter.entries()[0].count;

        limiter.apply(LimitSettings {
            burst: 100,
            ..scenario_settings()
        });
        assert_eq!(limiter.entries()[0].count, count_before);
        assert_eq!(limiter.check(key), Ok(Decision::Accept));
        assert_eq!(limiter.settings().burst, 100);
    }

    #[test]
    fn test_exhaustion_surfaces_error() {
        let (limiter, _) = limiter(LimitSettings {
            max_entries: 2,
            ..scenario_settings()
        });
        limiter.check(ip(1)).unwrap();
        limiter.check(ip(2)).unwrap();

        assert_eq!(
            limiter.check(ip(3)),
            Err(ConnlimitError::Exhausted { max_entries: 2 })
        );
        assert_eq!(limiter.len(), 2);
        // Known identities are still served.
        assert_eq!(limiter.check(ip(1)), Ok(Decision::Accept));
        // Admission accepts by default.
        assert!(limiter.admit(ip(3)));
    }

    #[test]
    fn test_settings_from_config() {
        let config = ConnlimitConfig {
            limit: Some("10/1s".to_string()),
            burst: 5,
            timeout: 30,
            max_entries: 0,
        };
        let settings = LimitSettings::from_config(&config).unwrap();
        assert_eq!(settings.limit_interval, Duration::from_millis(100));
        assert_eq!(settings.burst, 5);
        assert_eq!(settings.burst_timeout, Duration::from_secs(30));

        let bad = ConnlimitConfig {
            limit: Some("ten".to_string()),
            ..config
        };
        assert!(LimitSettings::from_config(&bad).is_err());
    }

    #[test]
    fn test_concurrent_checks_keep_identities_unique() {
        let (limiter, _) = limiter(scenario_settings());
        let limiter = Arc::new(limiter);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    for last in 0..16 {
                        limiter.check(ip(last)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(limiter.len(), 16);
    }
}
