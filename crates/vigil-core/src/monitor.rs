//! Renewal monitor: lazy expiration detection and throttled re-decision.
//!
//! The monitor never watches the clock. Expiration is observed lazily on the
//! next activity signal: each evaluated signal re-reads the persisted record
//! and re-runs the decision engine when it has lapsed. Two states per logical
//! session lifetime:
//!
//! - **active**: a valid record is persisted; activity takes the engine's
//!   reuse path and nothing is emitted (session continuation).
//! - **expired**: either cookie entry has lapsed; the next evaluated activity
//!   samples a new record and publishes [`SessionEvent::SessionRenewed`] —
//!   the only circumstance under which that event fires. The first decision
//!   of a visit is creation, not renewal.
//!
//! Evaluations are throttled to one per [`COOKIE_ACCESS_THROTTLE_MS`] window
//! because cookie reads are comparatively costly and activity signals can
//! fire at high frequency; signals inside the window are ignored entirely.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::config::SamplingConfig;
use crate::events::{EventBus, SessionEvent};
use crate::sampling::RandomSource;
use crate::session::{COOKIE_ACCESS_THROTTLE_MS, SessionRecord, decide, read_persisted};
use crate::store::CookieStore;
use crate::throttle::ThrottleGate;

struct MonitorInner {
    config: SamplingConfig,
    store: Arc<dyn CookieStore>,
    bus: Arc<EventBus>,
    random: Box<dyn RandomSource + Send>,
    gate: ThrottleGate,
    current: SessionRecord,
    stopped: bool,
}

/// Handle to a running monitoring session.
///
/// Created by [`start_session`]; owns the renewal monitor state. Multiple
/// independent handles can coexist (nothing here is process-global), which
/// keeps tests isolated from each other.
pub struct SessionHandle {
    inner: Mutex<MonitorInner>,
}

impl SessionHandle {
    /// Feed one user-activity signal at `now_ms`.
    ///
    /// Ignored entirely inside the throttle window or after [`shutdown`].
    /// Otherwise re-validates the persisted record, re-runs the decision
    /// engine if it lapsed, and publishes [`SessionEvent::SessionRenewed`]
    /// on genuine renewal.
    ///
    /// [`shutdown`]: Self::shutdown
    pub fn record_activity(&self, now_ms: u64) {
        let mut guard = self.inner.lock().expect("monitor mutex poisoned");
        let inner = &mut *guard;
        if inner.stopped {
            return;
        }
        if !inner.gate.try_pass(now_ms) {
            debug!("activity inside throttle window, skipping evaluation");
            return;
        }

        let lapsed = read_persisted(inner.store.as_ref(), now_ms).is_none();
        let record = decide(
            &inner.config,
            inner.store.as_ref(),
            inner.random.as_mut(),
            now_ms,
        );
        inner.current = record;

        if lapsed {
            info!(session_type = %inner.current.session_type, "session renewed");
            inner.bus.publish(&SessionEvent::SessionRenewed);
        }
    }

    /// The most recently decided record: the identity all telemetry emitted
    /// right now should be tagged with. Replaced, never mutated, on renewal.
    #[must_use]
    pub fn current(&self) -> SessionRecord {
        let inner = self.inner.lock().expect("monitor mutex poisoned");
        inner.current.clone()
    }

    /// Tear the monitor down: further activity signals become no-ops and
    /// throttle state is cleared. Idempotent.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock().expect("monitor mutex poisoned");
        inner.stopped = true;
        inner.gate.reset();
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        let inner = self.inner.lock().expect("monitor mutex poisoned");
        inner.stopped
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().expect("monitor mutex poisoned");
        f.debug_struct("SessionHandle")
            .field("current", &inner.current)
            .field("stopped", &inner.stopped)
            .finish()
    }
}

/// Start a monitoring session: establish or restore the session decision
/// synchronously, then return the handle that observes activity signals.
///
/// Called once per page lifetime. The initial decision never publishes
/// [`SessionEvent::SessionRenewed`], and the throttle window opens from
/// `now_ms` so a burst of activity right after startup does not trigger an
/// immediate re-evaluation.
pub fn start_session(
    config: &SamplingConfig,
    store: Arc<dyn CookieStore>,
    bus: Arc<EventBus>,
    mut random: Box<dyn RandomSource + Send>,
    now_ms: u64,
) -> SessionHandle {
    let current = decide(config, store.as_ref(), random.as_mut(), now_ms);
    let mut gate = ThrottleGate::new(COOKIE_ACCESS_THROTTLE_MS);
    gate.mark_passed(now_ms);

    SessionHandle {
        inner: Mutex::new(MonitorInner {
            config: *config,
            store,
            bus,
            random,
            gate,
            current,
            stopped: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::ScriptedRandom;
    use crate::session::{SESSION_COOKIE_NAME, SESSION_TYPE_COOKIE_NAME, SessionType};
    use crate::store::MemoryCookieStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const FAIL: f64 = 1.0 - f64::EPSILON;

    fn config() -> SamplingConfig {
        SamplingConfig {
            sample_rate: 0.5,
            resource_sample_rate: 0.5,
        }
    }

    fn renew_counter(bus: &EventBus) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber_count = Arc::clone(&count);
        bus.subscribe(move |event| {
            assert_eq!(*event, SessionEvent::SessionRenewed);
            subscriber_count.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    fn start(
        store: &Arc<MemoryCookieStore>,
        bus: &Arc<EventBus>,
        draws: &[f64],
        now_ms: u64,
    ) -> SessionHandle {
        start_session(
            &config(),
            Arc::clone(store) as Arc<dyn CookieStore>,
            Arc::clone(bus),
            Box::new(ScriptedRandom::new(draws)),
            now_ms,
        )
    }

    #[test]
    fn startup_decides_without_publishing() {
        let store = Arc::new(MemoryCookieStore::new());
        let bus = Arc::new(EventBus::new());
        let renewals = renew_counter(&bus);

        let handle = start(&store, &bus, &[0.0, 0.0], 0);

        assert_eq!(
            handle.current().session_type,
            SessionType::TrackedWithResources
        );
        assert_eq!(renewals.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn startup_never_publishes_even_when_not_tracked() {
        let store = Arc::new(MemoryCookieStore::new());
        let bus = Arc::new(EventBus::new());
        let renewals = renew_counter(&bus);

        let handle = start(&store, &bus, &[FAIL], 0);

        assert_eq!(handle.current().session_type, SessionType::NotTracked);
        assert_eq!(renewals.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn activity_with_valid_cookies_is_continuation() {
        let store = Arc::new(MemoryCookieStore::new());
        let bus = Arc::new(EventBus::new());
        let renewals = renew_counter(&bus);

        let handle = start(&store, &bus, &[0.0, 0.0], 0);
        let first = handle.current();

        handle.record_activity(COOKIE_ACCESS_THROTTLE_MS);

        assert_eq!(handle.current(), first);
        assert_eq!(renewals.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn renewal_after_expiry_publishes_exactly_once() {
        let store = Arc::new(MemoryCookieStore::new());
        let bus = Arc::new(EventBus::new());
        let renewals = renew_counter(&bus);

        let handle = start(&store, &bus, &[0.0, 0.0], 0);
        let first_id = handle.current().id;

        store.delete(SESSION_COOKIE_NAME);
        store.delete(SESSION_TYPE_COOKIE_NAME);

        handle.record_activity(COOKIE_ACCESS_THROTTLE_MS);

        let renewed = handle.current();
        assert_eq!(renewed.session_type, SessionType::TrackedWithResources);
        assert_ne!(renewed.id, first_id);
        assert_eq!(renewals.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn signals_inside_throttle_window_are_ignored() {
        let store = Arc::new(MemoryCookieStore::new());
        let bus = Arc::new(EventBus::new());
        let renewals = renew_counter(&bus);

        let handle = start(&store, &bus, &[0.0, 0.0], 0);
        store.delete(SESSION_COOKIE_NAME);
        store.delete(SESSION_TYPE_COOKIE_NAME);

        // Both signals land inside the window opened at startup.
        handle.record_activity(1);
        handle.record_activity(COOKIE_ACCESS_THROTTLE_MS - 1);
        assert_eq!(renewals.load(Ordering::SeqCst), 0);

        // Past the window: exactly one evaluation, one renewal.
        handle.record_activity(COOKIE_ACCESS_THROTTLE_MS);
        handle.record_activity(COOKIE_ACCESS_THROTTLE_MS + 1);
        assert_eq!(renewals.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn shutdown_stops_evaluation() {
        let store = Arc::new(MemoryCookieStore::new());
        let bus = Arc::new(EventBus::new());
        let renewals = renew_counter(&bus);

        let handle = start(&store, &bus, &[0.0, 0.0], 0);
        handle.shutdown();
        assert!(handle.is_shut_down());

        store.delete(SESSION_COOKIE_NAME);
        store.delete(SESSION_TYPE_COOKIE_NAME);
        handle.record_activity(COOKIE_ACCESS_THROTTLE_MS * 10);

        assert_eq!(renewals.load(Ordering::SeqCst), 0);
        handle.shutdown(); // idempotent
    }

    #[test]
    fn independent_monitors_do_not_cross_contaminate() {
        let store_a = Arc::new(MemoryCookieStore::new());
        let store_b = Arc::new(MemoryCookieStore::new());
        let bus_a = Arc::new(EventBus::new());
        let bus_b = Arc::new(EventBus::new());
        let renewals_a = renew_counter(&bus_a);
        let renewals_b = renew_counter(&bus_b);

        let handle_a = start(&store_a, &bus_a, &[0.0, 0.0], 0);
        let _handle_b = start(&store_b, &bus_b, &[FAIL], 0);

        store_a.delete(SESSION_COOKIE_NAME);
        store_a.delete(SESSION_TYPE_COOKIE_NAME);
        handle_a.record_activity(COOKIE_ACCESS_THROTTLE_MS);

        assert_eq!(renewals_a.load(Ordering::SeqCst), 1);
        assert_eq!(renewals_b.load(Ordering::SeqCst), 0);
    }
}
