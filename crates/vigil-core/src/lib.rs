//! vigil-core: Core library for Vigil
//!
//! This crate decides, persists, and renews the per-visitor monitoring
//! session identity for a client-side telemetry agent: whether a session is
//! monitored at all and, if so, whether fine-grained resource telemetry is
//! also collected.
//!
//! # Architecture
//!
//! ```text
//! start_session → Decision Engine → Cookie Store (two entries, one TTL)
//!                       ↑
//! activity signal → Renewal Monitor (throttled) → Event Bus (SESSION_RENEWED)
//! ```
//!
//! The decision engine runs once synchronously at startup to establish or
//! restore session state; thereafter the renewal monitor re-checks cookie
//! validity on each (throttled) activity signal and re-runs the engine when
//! the persisted record has lapsed, publishing a renewal event only for
//! genuine renewals.
//!
//! # Modules
//!
//! - `session`: session types, cookie contract, and the decision engine
//! - `monitor`: renewal monitor and the `start_session` entry point
//! - `sampling`: uniform draw source and session id generation
//! - `store`: cookie store capability with TTL (in-memory and disabled impls)
//! - `events`: event bus publishing `SESSION_RENEWED`
//! - `throttle`: one-pass-per-window gate for validity evaluations
//! - `config`: sampling configuration loading and validation
//! - `logging`: tracing subscriber setup
//! - `error`: error types for the configuration/logging edges
//!
//! # Safety
//!
//! This crate forbids unsafe code.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod monitor;
pub mod sampling;
pub mod session;
pub mod store;
pub mod throttle;

pub use config::{Config, SamplingConfig};
pub use error::{Error, Result};
pub use events::{EventBus, SessionEvent, SubscriptionId};
pub use monitor::{SessionHandle, start_session};
pub use sampling::{RandomSource, SeededRandom, SessionId, UniformRandom};
pub use session::{SessionRecord, SessionType};
pub use store::{CookieStore, DisabledCookieStore, MemoryCookieStore};
