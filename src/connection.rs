//! Low-level transport helper: one fresh TCP connection per call, linger disabled so an aborted
//! call never blocks the caller on close.

use std::time::Duration;

use bytes::BytesMut;
use socket2::SockRef;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::error::ClientError;
use crate::frame::{decode_reply, FrameCodec, Message, Reply};

/// Connects to `addr`, writes `request`, and waits up to `deadline` for a fully-framed reply.
/// Each call opens its own socket and disables linger so a dropped or aborted exchange cannot
/// stall the caller on shutdown.
pub(crate) async fn call_once(
    addr: (&str, u16),
    request: Message,
    deadline: Duration,
) -> Result<Reply, ClientError> {
    let stream = timeout(deadline, TcpStream::connect(addr))
        .await
        .map_err(|_| ClientError::Timeout)?
        .map_err(|e| ClientError::Transport(e.to_string()))?;

    disable_linger(&stream).map_err(|e| ClientError::Transport(e.to_string()))?;

    let reply = timeout(deadline, exchange(stream, request))
        .await
        .map_err(|_| ClientError::Timeout)??;

    decode_reply(&reply).map_err(|e| ClientError::Protocol(e.to_string()))
}

async fn exchange(mut stream: TcpStream, request: Message) -> Result<Message, ClientError> {
    let mut codec = FrameCodec::new();
    let mut out = BytesMut::new();
    codec
        .encode(request, &mut out)
        .map_err(|e| ClientError::Transport(e.to_string()))?;
    stream
        .write_all(&out)
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;
    stream
        .shutdown()
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;

    let mut buf = BytesMut::new();
    loop {
        if let Some(message) = codec
            .decode(&mut buf)
            .map_err(|e| ClientError::Protocol(e.to_string()))?
        {
            trace!(frames = message.len(), "received reply");
            return Ok(message);
        }

        let mut chunk = [0u8; 4096];
        let n = stream
            .read(&mut chunk)
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        if n == 0 {
            return Err(ClientError::Protocol(
                "connection closed before a complete reply arrived".into(),
            ));
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

fn disable_linger(stream: &TcpStream) -> std::io::Result<()> {
    SockRef::from(stream).set_linger(Some(Duration::ZERO))
}
