//! Error types for the honeypot service

/// Errors surfaced by the honeypot library.
///
/// `AddressParse` only ever ends one session; `ListenerStartup` is fatal to
/// the process.
#[derive(Debug, thiserror::Error)]
pub enum HoneypotError {
    #[error("Cannot parse remote endpoint {endpoint:?}: {reason}")]
    AddressParse {
        endpoint: String,
        reason: &'static str,
    },

    #[error("Cannot bind listener on {addr}: {source}")]
    ListenerStartup {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
