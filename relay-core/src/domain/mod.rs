//! Domain types
//!
//! These are the types the lifecycle works with. They are independent of the
//! wire format; see [`crate::dto`] for the Jenkins JSON representations.

pub mod build;
pub mod console;
pub mod job;
pub mod queue;
pub mod retry;
