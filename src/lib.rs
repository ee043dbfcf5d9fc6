//! Honeypot - decoy remote-shell listener
//!
//! Accepts connections on the remote-shell port, logs every origin, and
//! throttles origins that reconnect too often instead of blocking them, so
//! their behaviour stays observable.

/// Service configuration (YAML)
pub mod config;
/// Error types
pub mod error;
/// Tracing subscriber setup
pub mod logging;
/// Endpoint parsing, per-origin rate limiting and admission policy
pub mod network;
/// Listener and per-session handling
pub mod servers;
