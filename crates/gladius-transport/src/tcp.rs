//! Newline-framed TCP transport.
//!
//! Every frame is one line: the payload bytes followed by `\n`. A trailing
//! `\r` on inbound lines is stripped so `telnet`-style clients work too.

use std::mem;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Largest inbound line accepted, excluding the terminator.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A TCP [`Transport`] that listens for incoming connections.
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    /// Binds a new TCP transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self { listener })
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let conn = TcpConnection::from_stream(stream, addr);
        tracing::debug!(id = %conn.id, %addr, "accepted TCP connection");
        Ok(conn)
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Read side of a connection plus the bytes of a partially received line.
///
/// Keeping the partial line here (instead of on the stack of `recv`) is
/// what makes `recv` cancel safe.
struct ReadState {
    reader: BufReader<OwnedReadHalf>,
    pending: Vec<u8>,
}

/// A single TCP connection speaking newline-delimited frames.
pub struct TcpConnection {
    id: ConnectionId,
    peer: SocketAddr,
    read: Mutex<ReadState>,
    write: Mutex<OwnedWriteHalf>,
}

impl TcpConnection {
    /// Wraps an already-connected stream.
    pub fn from_stream(stream: TcpStream, peer: SocketAddr) -> Self {
        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        let (read_half, write_half) = stream.into_split();
        Self {
            id,
            peer,
            read: Mutex::new(ReadState {
                reader: BufReader::new(read_half),
                pending: Vec::new(),
            }),
            write: Mutex::new(write_half),
        }
    }

    /// Returns the remote address of the peer.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Connection for TcpConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        if data.contains(&b'\n') {
            return Err(TransportError::EmbeddedNewline);
        }
        let mut frame = Vec::with_capacity(data.len() + 1);
        frame.extend_from_slice(data);
        frame.push(b'\n');

        let mut writer = self.write.lock().await;
        writer
            .write_all(&frame)
            .await
            .map_err(TransportError::SendFailed)?;
        writer.flush().await.map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut guard = self.read.lock().await;
        let ReadState { reader, pending } = &mut *guard;

        // Read at most one byte past the limit so an oversized line is
        // detected without buffering all of it.
        let budget = (MAX_FRAME_LEN + 1).saturating_sub(pending.len());
        let n = (&mut *reader)
            .take(budget as u64)
            .read_until(b'\n', pending)
            .await
            .map_err(TransportError::ReceiveFailed)?;

        if pending.last() == Some(&b'\n') {
            let mut frame = mem::take(pending);
            frame.pop();
            if frame.last() == Some(&b'\r') {
                frame.pop();
            }
            return Ok(Some(frame));
        }

        if pending.len() > MAX_FRAME_LEN {
            pending.clear();
            return Err(TransportError::FrameTooLarge {
                limit: MAX_FRAME_LEN,
            });
        }

        if n == 0 && pending.is_empty() {
            return Ok(None);
        }

        // EOF after an unterminated final line.
        Ok(Some(mem::take(pending)))
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.write
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
