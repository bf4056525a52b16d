//! # brewhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Map the command surface onto the core (driving adapter):
//!
//!   | Verb | Path | Query | Core call |
//!   |------|------|-------|-----------|
//!   | `POST` | `/coffee` | - | `Sequencer::start` |
//!   | `POST` | `/alarm` | `hour`, `minutes` | `AlarmScheduler::schedule` |
//!   | `PATCH` | `/alarm` | `hour`, `minutes` | `AlarmScheduler::reschedule` |
//!   | `DELETE` | `/alarm` | - | `AlarmScheduler::cancel` |
//!
//! - Serve the read-only status surface (`GET /alarm`, `GET /status`)
//! - Stream domain events over SSE (`GET /events`)
//!
//! Commands answer as soon as the core accepted or rejected them; no
//! handler waits for a brew or an alarm to complete.
//!
//! ## Dependency rule
//! Depends on `brewhub-app` (for port traits and use-cases) and
//! `brewhub-domain` (for request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
