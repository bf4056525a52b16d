//! # brewhub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `Clock`: read the current wall-clock time
//!   - `Actuator`: drive a physical button to a level
//!   - `EventPublisher`: broadcast domain events
//! - Define the **use-cases** driven by inbound adapters:
//!   - `Sequencer`: run the brew sequence exclusively
//!   - `AlarmScheduler`: own the single daily alarm and fire the sequencer
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `brewhub-domain` only (plus `tokio` for tasks, timers and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod scheduler;
pub mod sequencer;
