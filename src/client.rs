//! Client helper for the line protocol.
//!
//! Opens a connection, sends one line, reads one line back.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpStream, ToSocketAddrs};

/// Error type for client requests.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to connect: {0}")]
    Connect(#[source] std::io::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("server closed the connection without replying")]
    NoReply,
}

/// Send `message` as one line and return the reply line without its newline.
///
/// `timeout` bounds the whole exchange, connect included.
pub async fn send_request<A: ToSocketAddrs>(addr: A, message: &str, timeout: Duration) -> Result<String, ClientError> {
    tokio::time::timeout(timeout, exchange(addr, message))
        .await
        .map_err(|_| ClientError::Timeout(timeout))?
}

async fn exchange<A: ToSocketAddrs>(addr: A, message: &str) -> Result<String, ClientError> {
    let mut stream = TcpStream::connect(addr).await.map_err(ClientError::Connect)?;

    let mut line = String::with_capacity(message.len() + 1);
    line.push_str(message);
    line.push('\n');
    stream.write_all(line.as_bytes()).await?;
    stream.flush().await?;

    let mut reply = String::new();
    let n = BufReader::new(&mut stream).read_line(&mut reply).await?;
    if n == 0 {
        return Err(ClientError::NoReply);
    }
    let trimmed = reply.trim_end_matches(['\r', '\n']).len();
    reply.truncate(trimmed);

    tracing::debug!(reply = %reply, "Client received reply");
    Ok(reply)
}
