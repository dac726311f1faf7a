//! `reqrep`: the shared wire codec, metadata model, and client half of a small request/reply IPC
//! framework built on a length-delimited multi-part frame transport.
//!
//! The service half (the command registry and the receive/dispatch/reply state machine) lives in
//! the sibling `reqrep-service` crate, which depends on this one for the wire format and the
//! `Metadata` type both sides share.

mod client;
mod connection;
mod error;
mod frame;
mod metadata;

pub use client::Client;
pub use error::{ClientError, ErrorCode};
pub use frame::{
    decode_reply, decode_request, encode_error, encode_ok, encode_request, FrameCodec,
    FrameError, Message, Reply, ReplyDecodeError,
};
pub use metadata::{ArgumentDescriptor, ArgumentShape, Metadata, MetadataError, TimeoutClass};
