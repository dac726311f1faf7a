mod builtins;
mod dispatch;
mod handler;
mod help;
mod registry;
mod service;
mod state;

pub use dispatch::DispatchError;
pub use handler::{FnHandler, Handler, HandlerError};
pub use help::render as render_help;
pub use registry::{CommandEntry, Registry};
pub use service::Service;
pub use state::{Fsm, State, StateViolation};

/// A re-export of [`async-trait`](https://docs.rs/async-trait) for implementing [`Handler`].
pub use async_trait::async_trait;
