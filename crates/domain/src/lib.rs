//! # brewhub-domain
//!
//! Pure domain model for the brewhub coffee-machine controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, clock readings
//! - Define **alarm times** and the drift-correcting wait computation
//! - Define the **alarm state** snapshot exposed to the status surface
//! - Define **actuator steps** and the fixed brew **sequence**
//! - Define **events** (alarm and brew lifecycle records)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod actuator;
pub mod alarm;
pub mod event;
