//! Wire codec: logical multi-frame messages over a length-delimited TCP stream.
//!
//! A logical message is an ordered sequence of byte strings ("frames") delivered atomically by
//! the transport. The reference transport (a REQ/REP socket pair) delivers such a vector natively;
//! over raw TCP we reproduce that atomicity with a length-prefixed record: a big-endian `u32`
//! frame count, followed by each frame as a big-endian `u32` byte length and that many bytes.

use std::io;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Maximum number of frames accepted in a single message. Guards against a corrupt or hostile
/// peer claiming an absurd frame count before any bytes have arrived.
const MAX_FRAMES: u32 = 1024;

/// Maximum length of a single frame, in bytes. Mirrors the same defensive role as
/// [`MAX_FRAMES`] for the per-frame length prefix.
const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

/// One ordered sequence of byte-string frames, as delivered atomically by the transport.
pub type Message = Vec<Bytes>;

/// Errors raised while decoding a length-delimited multi-frame message.
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("message declares {0} frames, exceeding the limit of {MAX_FRAMES}")]
    TooManyFrames(u32),
    #[error("frame declares {0} bytes, exceeding the limit of {MAX_FRAME_LEN}")]
    FrameTooLong(u32),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A [`Decoder`]/[`Encoder`] pair for the length-delimited multi-frame wire format.
///
/// Decoding never hands the caller a half-formed message: [`FrameCodec::decode`] buffers until
/// the full message (frame count plus every declared frame) has arrived, then returns it in one
/// shot, exactly as a REQ/REP transport delivers multipart messages atomically.
#[derive(Debug, Default)]
pub struct FrameCodec {
    state: DecodeState,
}

#[derive(Debug)]
enum DecodeState {
    Count,
    Frames {
        remaining: u32,
        frames: Vec<Bytes>,
    },
}

impl Default for DecodeState {
    fn default() -> Self {
        DecodeState::Count
    }
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for FrameCodec {
    type Item = Message;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, FrameError> {
        loop {
            match &mut self.state {
                DecodeState::Count => {
                    if src.len() < 4 {
                        return Ok(None);
                    }
                    let count = src.get_u32();
                    if count > MAX_FRAMES {
                        return Err(FrameError::TooManyFrames(count));
                    }
                    self.state = DecodeState::Frames {
                        remaining: count,
                        frames: Vec::with_capacity(count as usize),
                    };
                }
                DecodeState::Frames { remaining, frames } => {
                    if *remaining == 0 {
                        let message = std::mem::take(frames);
                        self.state = DecodeState::Count;
                        return Ok(Some(message));
                    }

                    if src.len() < 4 {
                        return Ok(None);
                    }
                    let len = (&src[..4]).get_u32();
                    if len > MAX_FRAME_LEN {
                        return Err(FrameError::FrameTooLong(len));
                    }
                    if src.len() < 4 + len as usize {
                        return Ok(None);
                    }
                    src.advance(4);
                    let frame = src.split_to(len as usize).freeze();
                    frames.push(frame);
                    *remaining -= 1;
                }
            }
        }
    }
}

impl Encoder<Message> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), FrameError> {
        dst.reserve(4 + item.iter().map(|f| 4 + f.len()).sum::<usize>());
        dst.put_u32(item.len() as u32);
        for frame in item {
            dst.put_u32(frame.len() as u32);
            dst.put_slice(&frame);
        }
        Ok(())
    }
}

/// Encodes a request message: command name followed by positional arguments.
pub fn encode_request(command: &str, args: &[String]) -> Message {
    let mut frames = Vec::with_capacity(1 + args.len());
    frames.push(Bytes::copy_from_slice(command.as_bytes()));
    frames.extend(args.iter().map(|a| Bytes::copy_from_slice(a.as_bytes())));
    frames
}

/// Decodes a request message into a command name and its arguments.
///
/// An empty message, or a command-name frame that is not valid UTF-8, is a protocol error; the
/// service classifies this as fatal and terminates the connection without replying.
pub fn decode_request(message: &Message) -> Result<(String, Vec<String>), FrameError> {
    let mut frames = message.iter();
    let command = frames
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "empty request message"))?;
    let command = std::str::from_utf8(command)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        .to_string();

    let mut args = Vec::with_capacity(message.len().saturating_sub(1));
    for frame in frames {
        let arg = std::str::from_utf8(frame)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
            .to_string();
        args.push(arg);
    }

    Ok((command, args))
}

/// Encodes a success reply: `["OK", ret0, ret1, ...]`.
pub fn encode_ok(returns: &[String]) -> Message {
    let mut frames = Vec::with_capacity(1 + returns.len());
    frames.push(Bytes::from_static(b"OK"));
    frames.extend(returns.iter().map(|r| Bytes::copy_from_slice(r.as_bytes())));
    frames
}

/// Encodes an error reply: exactly `["ERROR", code, message]`.
pub fn encode_error(code: &str, message: &str) -> Message {
    vec![
        Bytes::from_static(b"ERROR"),
        Bytes::copy_from_slice(code.as_bytes()),
        Bytes::copy_from_slice(message.as_bytes()),
    ]
}

/// A decoded reply, as seen from the client side of the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok(Vec<String>),
    Error { code: String, message: String },
}

/// Decodes a reply message.
///
/// An empty message, a first frame that is neither `OK` nor `ERROR`, an `ERROR` reply that does
/// not have exactly three frames, or any non-UTF-8 frame, is a protocol error.
pub fn decode_reply(message: &Message) -> Result<Reply, ReplyDecodeError> {
    if message.is_empty() {
        return Err(ReplyDecodeError::Empty);
    }

    let tag = std::str::from_utf8(&message[0]).map_err(|_| ReplyDecodeError::InvalidUtf8)?;

    match tag {
        "OK" => {
            let mut returns = Vec::with_capacity(message.len() - 1);
            for frame in &message[1..] {
                let s = std::str::from_utf8(frame).map_err(|_| ReplyDecodeError::InvalidUtf8)?;
                returns.push(s.to_string());
            }
            Ok(Reply::Ok(returns))
        }
        "ERROR" => {
            if message.len() != 3 {
                return Err(ReplyDecodeError::MalformedError {
                    frame_count: message.len(),
                });
            }
            let code =
                std::str::from_utf8(&message[1]).map_err(|_| ReplyDecodeError::InvalidUtf8)?;
            let text =
                std::str::from_utf8(&message[2]).map_err(|_| ReplyDecodeError::InvalidUtf8)?;
            Ok(Reply::Error {
                code: code.to_string(),
                message: text.to_string(),
            })
        }
        other => Err(ReplyDecodeError::UnknownTag(other.to_string())),
    }
}

/// Reasons a reply message failed to parse.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplyDecodeError {
    #[error("reply message is empty")]
    Empty,
    #[error("reply frame is not valid UTF-8")]
    InvalidUtf8,
    #[error("reply's first frame is neither OK nor ERROR: {0:?}")]
    UnknownTag(String),
    #[error("ERROR reply must have exactly 3 frames, got {frame_count}")]
    MalformedError { frame_count: usize },
}
