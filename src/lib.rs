//! Audioforge - batch audio transcoding orchestrator
//!
//! This library crate exposes the core functionality for integration testing.

pub mod batch;
pub mod config;
pub mod discovery;
pub mod report;
pub mod scheduler;
pub mod worker;
