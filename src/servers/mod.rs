//! Server implementations
//!
//! - honeypot: decoy remote-shell listener with per-origin throttling

pub mod honeypot;
