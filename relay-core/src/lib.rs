//! Relay Core
//!
//! Core types for triggering and watching builds on a remote Jenkins server.
//!
//! This crate contains:
//! - Domain types: jobs, queue entries, builds and their status snapshots
//! - DTOs: the JSON shapes returned by the Jenkins remote API

pub mod domain;
pub mod dto;
