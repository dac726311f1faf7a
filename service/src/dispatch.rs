//! Per-connection dispatch: read one request, look it up, run its handler, write one reply.

use std::sync::RwLock;

use bytes::BytesMut;
use reqrep::{decode_request, encode_error, encode_ok, ErrorCode, FrameCodec, FrameError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, warn};

use crate::handler::HandlerError;
use crate::registry::Registry;
use crate::state::Fsm;

/// Why a connection's dispatch cycle ended without a usable exchange having taken place.
#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed request: {0}")]
    MalformedRequest(#[from] FrameError),
    #[error("connection closed before a complete request arrived")]
    Incomplete,
    #[error("request has no command name, or it is not valid UTF-8")]
    MalformedCommand,
}

/// Reads one request off `stream`, dispatches it against `registry`, and writes back one reply.
///
/// Returns `Ok(())` once a reply (success or error) has been written. Returns `Err` only for
/// conditions that leave no well-formed reply to send — a transport failure, a malformed
/// request, or a connection closed mid-message — in which case the caller drops the connection
/// without attempting to write anything further.
pub(crate) async fn dispatch_one(
    stream: &mut TcpStream,
    registry: &RwLock<Registry>,
) -> Result<(), DispatchError> {
    let mut fsm = Fsm::new();
    let mut codec = FrameCodec::new();
    let mut buf = BytesMut::new();

    let request = loop {
        if let Some(message) = codec.decode(&mut buf)? {
            break message;
        }
        let mut chunk = [0u8; 4096];
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(DispatchError::Incomplete);
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    fsm.finish_receive()
        .expect("a freshly constructed Fsm is always Receiving");

    let (command, args) = decode_request(&request).map_err(|_| DispatchError::MalformedCommand)?;
    debug!(command = %command, args = args.len(), "dispatching request");

    // Clone the entry (an `Arc<dyn Handler>` plus a `Metadata`) out from under a short-lived
    // lock, rather than holding the guard across the handler's `.await` below.
    let entry = registry
        .read()
        .expect("registry lock poisoned")
        .get(&command)
        .cloned();

    let reply = match entry {
        None => encode_error(ErrorCode::UNKNOWN_COMMAND, &command),
        Some(entry) => match entry.handler.call(&args).await {
            Ok(returns) => encode_ok(&returns),
            Err(err) => {
                let (code, message) = classify(err);
                encode_error(code, &message)
            }
        },
    };

    let mut out = BytesMut::new();
    codec.encode(reply, &mut out)?;
    stream.write_all(&out).await?;
    stream.shutdown().await?;

    if let Err(violation) = fsm.finish_send() {
        // The reply has already been written; there is nothing left to correct. A violation
        // here would mean this function's own control flow is broken, not a peer misbehaving.
        warn!(%violation, "state machine violation after writing the reply");
    }

    Ok(())
}

/// Maps a handler's typed failure onto its wire error-code token and message.
fn classify(err: HandlerError) -> (&'static str, String) {
    match err {
        HandlerError::InvalidArguments(message) => (ErrorCode::UNCATEGORISED, message),
        HandlerError::UnknownCommand(name) => (ErrorCode::UNKNOWN_COMMAND, name),
        HandlerError::Failure { fault, message } => {
            (ErrorCode::UNCATEGORISED, format!("{fault}: {message}"))
        }
    }
}
