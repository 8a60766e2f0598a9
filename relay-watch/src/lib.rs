//! Relay Watch
//!
//! Turns the fire-and-forget "start a build" call of a remote build server
//! into a synchronous "run this job and tell me the outcome".
//!
//! Components, leaf first:
//! - [`retry`]: bounded retrier wrapped around every status and log call
//! - [`console`]: incremental console stream reader
//! - [`poller`]: build state poller
//! - [`queue`]: queue entry to build resolution
//! - [`trigger`]: job submission with collapsed-submission handling
//! - [`orchestrator`]: the end-to-end flow under one deadline
//!
//! All waiting goes through a [`pacer::Pacer`], which owns the polling
//! interval, the shared deadline and the cancellation token.

pub mod config;
pub mod console;
pub mod error;
pub mod orchestrator;
pub mod pacer;
pub mod poller;
pub mod queue;
pub mod retry;
pub mod trigger;

#[cfg(test)]
mod testing;

pub use config::WatchConfig;
pub use error::{ErrorKind, Phase, Result, WatchError};
pub use orchestrator::{BuildReport, Orchestrator, OutputSink, Target};
