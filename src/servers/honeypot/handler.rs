//! Per-session admission flow
//!
//! Resolve the origin host, spend a permit from its bucket, then either greet
//! the client or send the throttle notice and hold the session open for the
//! configured delay. Every session is evaluated exactly once and produces one
//! [`ConnectionEvent`].

use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

use super::session::Session;
use super::HoneypotState;
use crate::network::policy::Decision;
use crate::network::split_host;

/// Sent to sessions that pass the rate limit.
pub const GREETING: &str = "\n\nWant to join a nice remote team?\nSend an e-mail to ping@datamix.io\n\n";

/// Sent to sessions from an origin that is out of permits.
pub const THROTTLE_NOTICE: &str = "\n\nToo many connection attempts. Please try again later.\n\n";

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Allowed,
    Throttled,
    /// The remote endpoint could not be split into host and port.
    AddressError(String),
}

/// One record per session, handed to the log and then dropped.
#[derive(Debug, Clone)]
pub struct ConnectionEvent {
    /// Origin host, or the raw endpoint text when it could not be parsed.
    pub address: String,
    pub outcome: Outcome,
    pub at: DateTime<Utc>,
}

impl ConnectionEvent {
    fn new(address: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            address: address.into(),
            outcome,
            at: Utc::now(),
        }
    }

    /// Emit the event to the log.
    pub fn record(&self) {
        let at = self.at.to_rfc3339();
        match &self.outcome {
            Outcome::Allowed => {
                tracing::info!("[honeypot] [connect] ip={} at={}", self.address, at);
            }
            Outcome::Throttled => {
                tracing::warn!("[honeypot] [rate_limited] ip={} at={}", self.address, at);
            }
            Outcome::AddressError(err) => {
                tracing::warn!("[honeypot] [addr_error] endpoint={:?} err={}", self.address, err);
            }
        }
    }
}

/// Run one accepted session through the admission flow.
///
/// Write failures on the session are logged at debug level and otherwise
/// ignored; the peer may already be gone.
pub async fn handle_session<S: Session>(state: &HoneypotState, session: &mut S) -> ConnectionEvent {
    let endpoint = session.remote_endpoint();
    let host = match split_host(&endpoint) {
        Ok(host) => host,
        Err(e) => {
            let event = ConnectionEvent::new(endpoint.as_str(), Outcome::AddressError(e.to_string()));
            event.record();
            return event;
        }
    };

    let bucket = state.limiter.get_or_create(host);
    let decision = state.policy.decide(&bucket);
    drop(bucket);

    match decision {
        Decision::Allow => {
            let event = ConnectionEvent::new(host, Outcome::Allowed);
            event.record();
            send(session, host, GREETING).await;
            event
        }
        Decision::Throttle => {
            let event = ConnectionEvent::new(host, Outcome::Throttled);
            event.record();
            send(session, host, THROTTLE_NOTICE).await;
            tokio::time::sleep(state.throttle_delay).await;
            event
        }
    }
}

async fn send<S: Session>(session: &mut S, host: &str, text: &str) {
    if let Err(e) = session.write_all(text.as_bytes()).await {
        tracing::debug!("[honeypot] [write_failed] ip={} err={}", host, e);
        return;
    }
    if let Err(e) = session.flush().await {
        tracing::debug!("[honeypot] [flush_failed] ip={} err={}", host, e);
    }
}
