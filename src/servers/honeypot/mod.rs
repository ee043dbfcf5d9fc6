pub mod handler;
pub mod session;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

use crate::config::HoneypotConfig;
use crate::error::HoneypotError;
use crate::network::limiter::{AddressLimiter, DEFAULT_BURST, DEFAULT_RATE};
use crate::network::policy::AdmissionPolicy;
use handler::handle_session;
use session::TcpSession;

/// Hold applied to throttled sessions when no config says otherwise.
pub const DEFAULT_THROTTLE_DELAY: Duration = Duration::from_secs(2);

/// Shared state for every session on one listener.
///
/// Built once at startup and handed to each connection task behind an `Arc`.
pub struct HoneypotState {
    pub limiter: AddressLimiter,
    pub policy: AdmissionPolicy,
    pub throttle_delay: Duration,
}

impl HoneypotState {
    pub fn new(config: &HoneypotConfig) -> Self {
        Self {
            limiter: AddressLimiter::new(config.rate_per_sec, config.burst),
            policy: AdmissionPolicy,
            throttle_delay: config.throttle_delay(),
        }
    }

    /// Bind the listening socket.
    pub async fn bind(bind_addr: &str) -> Result<TcpListener, HoneypotError> {
        TcpListener::bind(bind_addr)
            .await
            .map_err(|source| HoneypotError::ListenerStartup {
                addr: bind_addr.to_string(),
                source,
            })
    }

    /// Bind `bind_addr` and serve until the process exits.
    pub async fn run(state: Arc<Self>, bind_addr: &str) -> Result<(), HoneypotError> {
        let listener = Self::bind(bind_addr).await?;
        tracing::info!("[honeypot] [ready] addr={}", bind_addr);
        Self::serve(state, listener).await;
        Ok(())
    }

    /// Serve on `listener` until `shutdown` resolves. Sessions still waiting
    /// out a throttle delay are dropped with the runtime.
    pub async fn run_until<F>(state: Arc<Self>, listener: TcpListener, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            () = Self::serve(state, listener) => {}
            () = shutdown => {
                tracing::info!("[honeypot] [shutdown] listener closed");
            }
        }
    }

    /// Accept loop: one task per connection.
    pub async fn serve(state: Arc<Self>, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    let s = Arc::clone(&state);
                    tokio::spawn(async move {
                        Self::handle_new_connection(s, stream, peer).await;
                    });
                }
                Err(e) => {
                    tracing::warn!("[honeypot] [accept_failed] err={}", e);
                }
            }
        }
    }

    pub async fn handle_new_connection(state: Arc<Self>, stream: TcpStream, peer: SocketAddr) {
        let mut session = TcpSession::new(stream, peer);
        handle_session(&state, &mut session).await;
        session.close().await;
    }
}

impl Default for HoneypotState {
    fn default() -> Self {
        Self {
            limiter: AddressLimiter::new(DEFAULT_RATE, DEFAULT_BURST),
            policy: AdmissionPolicy,
            throttle_delay: DEFAULT_THROTTLE_DELAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_from_config() {
        let config = HoneypotConfig::from_str("burst: 2\nthrottle_delay_secs: 7\n").unwrap();
        let state = HoneypotState::new(&config);
        assert_eq!(state.throttle_delay, Duration::from_secs(7));
        let bucket = state.limiter.get_or_create("198.51.100.4");
        assert!((bucket.burst() - 2.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn bind_failure_is_startup_error() {
        let taken = HoneypotState::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap().to_string();

        let err = HoneypotState::bind(&addr).await.unwrap_err();
        assert!(matches!(err, HoneypotError::ListenerStartup { .. }));
        assert!(err.to_string().contains(&addr));
    }

    #[tokio::test]
    async fn run_reports_bind_failure() {
        let taken = HoneypotState::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap().to_string();

        let result = HoneypotState::run(Arc::new(HoneypotState::default()), &addr).await;
        assert!(matches!(result, Err(HoneypotError::ListenerStartup { .. })));
    }
}
