//! Weighted sampling draws and session id generation.
//!
//! A session decision consumes one uniform `[0,1)` value per draw. The random
//! source sits behind a single-call trait so tests can script exact draw
//! sequences and force either branch of a decision without touching a global
//! RNG.
//!
//! # Boundary convention
//!
//! A draw succeeds iff `value < rate` (strict less-than). With values uniform
//! in `[0,1)`, a rate of `0.0` never succeeds and a rate of `1.0` always
//! succeeds.

use rand::{Rng, SeedableRng};

// =============================================================================
// RandomSource
// =============================================================================

/// Source of uniform random values for sampling draws.
///
/// Each call returns one independent value in `[0,1)`.
pub trait RandomSource {
    /// Next uniform value in `[0,1)`.
    fn next_uniform(&mut self) -> f64;
}

/// Default random source backed by the thread-local OS-seeded RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformRandom;

impl RandomSource for UniformRandom {
    fn next_uniform(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Deterministic random source with an explicit seed.
///
/// Reproducible runs for simulations and debugging.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: rand::rngs::StdRng,
}

impl SeededRandom {
    /// Create a seeded source.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed sequence of draw values, then repeats the last one.
///
/// Test double for forcing specific decision branches.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    next: usize,
}

impl ScriptedRandom {
    /// Create a scripted source from a non-empty value sequence.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    #[must_use]
    pub fn new(values: &[f64]) -> Self {
        assert!(!values.is_empty(), "script must have at least one value");
        Self {
            values: values.to_vec(),
            next: 0,
        }
    }

    /// Number of draws consumed so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.next
    }
}

impl RandomSource for ScriptedRandom {
    fn next_uniform(&mut self) -> f64 {
        let value = self.values[self.next.min(self.values.len() - 1)];
        self.next += 1;
        value
    }
}

/// Perform one weighted draw: succeeds iff the drawn value is strictly less
/// than `rate`.
pub fn draw(random: &mut dyn RandomSource, rate: f64) -> bool {
    random.next_uniform() < rate
}

// =============================================================================
// SessionId
// =============================================================================

/// A session identifier: a UUID-v4-equivalent token rendered as lowercase hex
/// digits and hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh identifier, unique with overwhelming probability.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill(&mut bytes[..]);
        // RFC 4122 version 4, variant 1 bits.
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;
        let h = hex::encode(bytes);
        Self(format!(
            "{}-{}-{}-{}-{}",
            &h[0..8],
            &h[8..12],
            &h[12..16],
            &h[16..20],
            &h[20..32]
        ))
    }

    /// Wrap a persisted token read back from the store.
    ///
    /// Returns `None` for an empty string: an empty cookie value means the
    /// entry is absent.
    #[must_use]
    pub fn from_persisted(value: &str) -> Option<Self> {
        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    /// The token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
