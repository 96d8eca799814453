//! TCP client for the storage service

use super::{ClientError, KvClient};
use crate::protocol::{Request, RespParser, RespEncoder, RespValue, SetReply, GetReply, DeleteReply};
use bytes::BytesMut;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// A single connection to the storage service
struct ClientConnection {
    stream: TcpStream,
    read_buffer: BytesMut,
    write_buffer: BytesMut,
}

impl ClientConnection {
    async fn connect(addr: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ClientError::Unavailable(format!("connect to {}: {}", addr, e)))?;
        stream.set_nodelay(true)?;
        debug!("Connected to storage service at {}", addr);

        Ok(ClientConnection {
            stream,
            read_buffer: BytesMut::with_capacity(4096),
            write_buffer: BytesMut::with_capacity(1024),
        })
    }

    /// Send one frame and wait for exactly one reply frame
    async fn call(&mut self, frame: &RespValue) -> Result<RespValue, ClientError> {
        self.write_buffer.clear();
        RespEncoder::encode_to(&mut self.write_buffer, frame);
        self.stream.write_all(&self.write_buffer).await?;
        self.stream.flush().await?;

        loop {
            if let Some(reply) = RespParser::parse(&mut self.read_buffer)? {
                return Ok(reply);
            }
            if self.stream.read_buf(&mut self.read_buffer).await? == 0 {
                return Err(ClientError::Unavailable(
                    "connection closed by storage service".to_string(),
                ));
            }
        }
    }
}

/// Storage client over TCP
///
/// Keeps a few idle connections around. A connection goes back to the pool
/// only after a complete exchange; one that failed or timed out may still
/// have a reply in flight and is dropped.
///
/// Pooled connections are not checked on checkout. After a storage restart
/// each stale one fails a single call with `Unavailable` and is discarded;
/// the pool hands out the most recently used connection first.
pub struct RemoteClient {
    addr: String,
    timeout: Duration,
    max_idle: usize,
    idle: Mutex<Vec<ClientConnection>>,
}

impl RemoteClient {
    /// Create a client for the service at `addr`; no connection is opened yet
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        RemoteClient {
            addr: addr.into(),
            timeout,
            max_idle: 16,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Limit the number of pooled idle connections
    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = max_idle;
        self
    }

    /// Address of the storage service
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Number of idle pooled connections
    pub fn idle_connections(&self) -> usize {
        self.idle.lock().len()
    }

    fn checkout(&self) -> Option<ClientConnection> {
        self.idle.lock().pop()
    }

    fn checkin(&self, connection: ClientConnection) {
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(connection);
        }
    }

    /// Run one request/reply exchange under the timeout
    async fn exchange(&self, request: Request) -> Result<RespValue, ClientError> {
        let frame = request.to_frame();
        let attempt = async {
            let mut connection = match self.checkout() {
                Some(connection) => connection,
                None => ClientConnection::connect(&self.addr).await?,
            };
            let reply = connection.call(&frame).await?;
            Ok::<_, ClientError>((connection, reply))
        };

        let (connection, reply) = match tokio::time::timeout(self.timeout, attempt).await {
            Ok(result) => result?,
            Err(_) => {
                debug!("{} to {} timed out after {:?}", request.name(), self.addr, self.timeout);
                return Err(ClientError::Timeout(self.timeout));
            }
        };
        self.checkin(connection);

        match reply {
            RespValue::Error(msg) => Err(ClientError::Remote(msg)),
            reply => Ok(reply),
        }
    }
}

impl KvClient for RemoteClient {
    async fn set(&self, key: String, value: String) -> Result<SetReply, ClientError> {
        let reply = self.exchange(Request::Set { key, value }).await?;
        Ok(SetReply::from_frame(&reply)?)
    }

    async fn get(&self, key: String) -> Result<GetReply, ClientError> {
        let reply = self.exchange(Request::Get { key }).await?;
        Ok(GetReply::from_frame(&reply)?)
    }

    async fn delete(&self, key: String) -> Result<DeleteReply, ClientError> {
        let reply = self.exchange(Request::Delete { key }).await?;
        Ok(DeleteReply::from_frame(&reply)?)
    }

    async fn ping(&self) -> Result<(), ClientError> {
        match self.exchange(Request::Ping).await? {
            RespValue::SimpleString(s) if s == "PONG" => Ok(()),
            other => Err(ClientError::Protocol(crate::protocol::RespError::UnexpectedFrame(
                format!("expected PONG, got {}", other),
            ))),
        }
    }
}
