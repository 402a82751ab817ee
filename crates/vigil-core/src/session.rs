//! Session decision engine: sample, persist, reuse.
//!
//! A visit gets exactly one session decision at a time, materialized as two
//! cookie entries sharing one rolling expiration horizon:
//!
//! - [`SESSION_TYPE_COOKIE_NAME`] holds the [`SessionType`] wire literal,
//! - [`SESSION_COOKIE_NAME`] holds the session id, present only when tracked.
//!
//! [`decide`] is idempotent against a valid persisted record: as long as the
//! cookies are present and well-formed, the existing pair is reused verbatim
//! with no new draw and no write, guaranteeing continuity across page loads.
//! Anything malformed (unrecognized type literal, tracked type without an id)
//! reads as "no session" and falls through to a fresh decision; nothing here
//! ever surfaces an error.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SamplingConfig;
use crate::sampling::{RandomSource, SessionId, draw};
use crate::store::CookieStore;

/// Cookie entry holding the session id.
pub const SESSION_COOKIE_NAME: &str = "_vgl";

/// Cookie entry holding the session type literal.
pub const SESSION_TYPE_COOKIE_NAME: &str = "_vgl_r";

/// Rolling expiration horizon shared by both cookie entries: 15 minutes,
/// refreshed on every write.
pub const SESSION_EXPIRATION_MS: u64 = 15 * 60 * 1000;

/// Minimum interval between consecutive cookie-validity evaluations.
pub const COOKIE_ACCESS_THROTTLE_MS: u64 = 1_000;

// =============================================================================
// SessionType / SessionRecord
// =============================================================================

/// Monitoring decision for a visitor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionType {
    /// Session emits no telemetry.
    NotTracked,
    /// Session is monitored, without fine-grained resource telemetry.
    TrackedWithoutResources,
    /// Session is monitored, including resource telemetry.
    TrackedWithResources,
}

impl SessionType {
    /// Wire literal stored in the type cookie.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotTracked => "NOT_TRACKED",
            Self::TrackedWithoutResources => "TRACKED_WITHOUT_RESOURCES",
            Self::TrackedWithResources => "TRACKED_WITH_RESOURCES",
        }
    }

    /// Parse a persisted wire literal. Unrecognized strings are `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "NOT_TRACKED" => Some(Self::NotTracked),
            "TRACKED_WITHOUT_RESOURCES" => Some(Self::TrackedWithoutResources),
            "TRACKED_WITH_RESOURCES" => Some(Self::TrackedWithResources),
            _ => None,
        }
    }

    /// Whether sessions of this type emit telemetry at all.
    #[must_use]
    pub fn is_tracked(self) -> bool {
        !matches!(self, Self::NotTracked)
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One session decision.
///
/// Invariant: `id` is present iff `session_type` is tracked. The pair is
/// immutable for the lifetime of a session; renewal produces a new record,
/// never a partial mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// The sampled monitoring decision.
    pub session_type: SessionType,
    /// Session identifier, present only when tracked.
    pub id: Option<SessionId>,
}

impl SessionRecord {
    /// The untracked record: no telemetry, no id.
    #[must_use]
    pub fn not_tracked() -> Self {
        Self {
            session_type: SessionType::NotTracked,
            id: None,
        }
    }

    /// Whether this session emits telemetry.
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        self.session_type.is_tracked()
    }
}

// =============================================================================
// Decision engine
// =============================================================================

/// Read the persisted record, if a valid one exists.
///
/// Returns `None` unless the type cookie holds a recognized literal and,
/// for tracked types, the id cookie is present. A tracked type with no id
/// (or any stale half of the pair) means the whole record is absent.
#[must_use]
pub fn read_persisted(store: &dyn CookieStore, now_ms: u64) -> Option<SessionRecord> {
    let type_value = store.get(SESSION_TYPE_COOKIE_NAME, now_ms)?;
    let session_type = SessionType::parse(&type_value)?;
    if !session_type.is_tracked() {
        return Some(SessionRecord {
            session_type,
            id: None,
        });
    }
    let id = store
        .get(SESSION_COOKIE_NAME, now_ms)
        .and_then(|value| SessionId::from_persisted(&value))?;
    Some(SessionRecord {
        session_type,
        id: Some(id),
    })
}

/// Establish or restore the session decision for this visit.
///
/// Reuses a valid persisted record verbatim; otherwise performs two
/// independent weighted draws (tracked at all, then resources for tracked
/// sessions), generates a fresh id when tracked, and persists both entries
/// with [`SESSION_EXPIRATION_MS`] measured from `now_ms`.
///
/// Never fails: malformed persisted state falls through to a fresh decision,
/// and a store that drops writes simply yields a non-durable record.
pub fn decide(
    config: &SamplingConfig,
    store: &dyn CookieStore,
    random: &mut dyn RandomSource,
    now_ms: u64,
) -> SessionRecord {
    if let Some(existing) = read_persisted(store, now_ms) {
        debug!(session_type = %existing.session_type, "reusing persisted session");
        return existing;
    }

    let tracked = draw(random, config.sample_rate);
    let record = if tracked {
        let with_resources = draw(random, config.resource_sample_rate);
        SessionRecord {
            session_type: if with_resources {
                SessionType::TrackedWithResources
            } else {
                SessionType::TrackedWithoutResources
            },
            id: Some(SessionId::generate()),
        }
    } else {
        SessionRecord::not_tracked()
    };

    store.set(
        SESSION_TYPE_COOKIE_NAME,
        record.session_type.as_str(),
        SESSION_EXPIRATION_MS,
        now_ms,
    );
    if let Some(id) = &record.id {
        store.set(SESSION_COOKIE_NAME, id.as_str(), SESSION_EXPIRATION_MS, now_ms);
    }

    info!(session_type = %record.session_type, "session decided");
    record
}
