//! Connection handling
//!
//! Manages one storage connection: reads request frames, dispatches them
//! and writes the replies back in order.

use crate::dispatch::Dispatcher;
use crate::protocol::{RespParser, RespEncoder, RespValue};
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Connection handler
pub struct Connection {
    /// TCP stream
    stream: TcpStream,

    /// Read buffer
    read_buffer: BytesMut,

    /// Write buffer
    write_buffer: BytesMut,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream) -> Self {
        Connection {
            stream,
            read_buffer: BytesMut::with_capacity(4096),
            write_buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Handle the connection until the peer closes it or shutdown is requested
    ///
    /// Every frame already buffered is answered before the next read, so
    /// pipelined requests get their replies in order.
    pub async fn handle(
        &mut self,
        dispatcher: Dispatcher,
        shutdown: CancellationToken,
    ) -> anyhow::Result<()> {
        loop {
            let n = tokio::select! {
                read = self.stream.read_buf(&mut self.read_buffer) => read?,
                _ = shutdown.cancelled() => return Ok(()),
            };

            // Connection closed
            if n == 0 {
                if self.read_buffer.is_empty() {
                    return Ok(());
                } else {
                    anyhow::bail!("connection reset by peer");
                }
            }

            debug!("Read {} bytes", n);

            self.write_buffer.clear();
            loop {
                match RespParser::parse(&mut self.read_buffer) {
                    Ok(Some(frame)) => {
                        debug!("Parsed request: {}", frame);
                        let reply = dispatcher.dispatch(frame);
                        RespEncoder::encode_to(&mut self.write_buffer, &reply);
                    }
                    Ok(None) => break,
                    Err(e) => {
                        // Framing is lost, drop whatever is buffered
                        warn!("Protocol error: {}", e);
                        self.read_buffer.clear();
                        let reply = RespValue::error(format!("ERR protocol error: {}", e));
                        RespEncoder::encode_to(&mut self.write_buffer, &reply);
                        break;
                    }
                }
            }

            if !self.write_buffer.is_empty() {
                self.stream.write_all(&self.write_buffer).await?;
                self.stream.flush().await?;
            }
        }
    }
}
