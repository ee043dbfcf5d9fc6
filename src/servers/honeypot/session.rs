//! Transport boundary
//!
//! The remote-shell protocol stack is not part of this crate. Whatever
//! accepts a connection hands the handler something implementing
//! [`Session`]: a remote endpoint plus an output stream. Dropping the
//! session closes it.

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

/// An accepted connection as seen by the session handler.
pub trait Session: AsyncWrite + Unpin + Send {
    /// Remote endpoint as `host:port` text, as reported by the transport.
    fn remote_endpoint(&self) -> String;
}

/// Plain TCP transport: the accepted stream and its peer address.
pub struct TcpSession {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpSession {
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self { stream, peer }
    }

    /// Flush and shut down the write half so the peer sees EOF.
    pub async fn close(mut self) {
        let _ = self.stream.shutdown().await;
    }
}

impl Session for TcpSession {
    fn remote_endpoint(&self) -> String {
        self.peer.to_string()
    }
}

impl AsyncWrite for TcpSession {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.stream).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_shutdown(cx)
    }
}
