#![doc = include_str!("../docs/rustdoc.md")]

/// Optimistic unread-alert badge counter.
pub mod alerts;
/// REST collaborator client for snapshots and actions.
pub mod api;
/// Exponential reconnect backoff schedule.
pub mod backoff;
/// Command-line argument definitions.
pub mod cli;
/// Runtime configuration model.
pub mod config;
/// Push connection lifecycle and reconnection.
pub mod connection;
/// Credential provider abstraction.
pub mod creds;
/// Frame decoding and event fan-out.
pub mod dispatch;
/// Error types used across the crate.
pub mod error;
/// Typed push events and the wire decoder.
pub mod events;
/// Fixed-capacity metric history window.
pub mod history;
/// Metrics and health counters.
pub mod monitoring;
/// Snapshot refetch coordination per page.
pub mod refetch;
/// Tracing/logging initialization.
pub mod tracing_setup;
/// REST resource data models.
pub mod types;
/// Terminal status view.
pub mod ui;

/// Primary crate error type.
pub use error::FleetwatchError;
