//! Data Transfer Objects for the Jenkins remote API
//!
//! These mirror the JSON documents served under `.../api/json`. Only the
//! fields the lifecycle needs are modelled; everything else is ignored on
//! deserialization.

pub mod build;
pub mod job;
pub mod queue;
pub mod server;
