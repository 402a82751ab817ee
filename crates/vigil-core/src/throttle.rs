//! Throttle gate: at most one pass per fixed window.
//!
//! Cookie reads are comparatively costly and activity signals can fire at
//! high frequency, so validity checks are rate limited. Uses the same
//! lazy-timestamp style as a token bucket: no timers, no background threads,
//! the caller supplies `now_ms` on every call.

/// Single-slot rate limiter: the first call passes, then further calls are
/// denied until a full window has elapsed since the last pass.
#[derive(Debug, Clone)]
pub struct ThrottleGate {
    window_ms: u64,
    last_pass_ms: Option<u64>,
}

impl ThrottleGate {
    /// Create a gate with the given window.
    #[must_use]
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_pass_ms: None,
        }
    }

    /// Try to pass the gate at `now_ms`.
    ///
    /// Returns `true` and records the pass if no pass happened within the
    /// last window. Timestamps that move backwards are treated as being
    /// inside the window.
    pub fn try_pass(&mut self, now_ms: u64) -> bool {
        match self.last_pass_ms {
            Some(last) if now_ms < last.saturating_add(self.window_ms) => false,
            _ => {
                self.last_pass_ms = Some(now_ms);
                true
            }
        }
    }

    /// Record a pass without evaluating, e.g. for work performed outside the
    /// gate that should still suppress the next window.
    pub fn mark_passed(&mut self, now_ms: u64) {
        self.last_pass_ms = Some(now_ms);
    }

    /// Forget any recorded pass; the next `try_pass` succeeds.
    pub fn reset(&mut self) {
        self.last_pass_ms = None;
    }

    /// The configured window.
    #[must_use]
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }
}
