//! Line-protocol request handler.
//!
//! One connection carries exactly one request line and one reply line:
//! ```text
//! client → "Hello Server\n"
//! server → "Response from Server on port 5001\n", then close
//! ```
//!
//! # Design Decisions
//! - The request read carries a deadline so a silent peer cannot pin a task
//! - Request lines are capped; longer lines close the connection unanswered
//! - Failures end this connection only; the accept loop never sees them

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Error type for a single connection.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("connection I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("no request line within {0:?}")]
    ReadTimeout(Duration),
    #[error("request line exceeds {0} bytes")]
    LineTooLong(usize),
}

impl HandlerError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerError::Io(_) => "io",
            HandlerError::ReadTimeout(_) => "timeout",
            HandlerError::LineTooLong(_) => "line_too_long",
        }
    }
}

/// How a connection ended when no error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// A request line was read and answered.
    Replied { request: String },
    /// The peer closed before sending anything; nothing was written.
    ClosedEarly,
}

/// Per-listener settings every handler invocation needs.
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    /// Port reported in the reply line.
    pub port: u16,
    /// Log each received line.
    pub verbose: bool,
    pub read_timeout: Duration,
    pub max_line_bytes: usize,
}

/// The reply sent for every request, without the trailing newline.
pub fn reply_line(port: u16) -> String {
    format!("Response from Server on port {}", port)
}

/// Serve one connection: read a line, answer it, close.
///
/// The stream is consumed and dropped (closed) on every path.
pub async fn handle_connection<S>(mut stream: S, settings: &HandlerSettings) -> Result<ConnectionOutcome, HandlerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    // One extra byte so a line of exactly `max_line_bytes` still fits its newline.
    let limit = settings.max_line_bytes as u64 + 1;

    let read = {
        let mut reader = BufReader::new(&mut stream).take(limit);
        tokio::time::timeout(settings.read_timeout, reader.read_until(b'\n', &mut buf)).await
    };
    let n = match read {
        Ok(res) => res?,
        Err(_) => return Err(HandlerError::ReadTimeout(settings.read_timeout)),
    };

    if n == 0 {
        return Ok(ConnectionOutcome::ClosedEarly);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() as u64 >= limit {
        return Err(HandlerError::LineTooLong(settings.max_line_bytes));
    }
    // A final line without newline before EOF is still a request.

    let request = String::from_utf8_lossy(&buf).into_owned();
    if settings.verbose {
        tracing::info!(port = settings.port, message = %request, "Received from client");
    }

    let mut reply = reply_line(settings.port);
    reply.push('\n');
    stream.write_all(reply.as_bytes()).await?;
    stream.flush().await?;
    // Peer may already be gone; the reply has been handed off either way.
    let _ = stream.shutdown().await;

    Ok(ConnectionOutcome::Replied { request })
}
