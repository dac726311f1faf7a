//! The handler contract: what a registered command implements, and how it signals failure.

use async_trait::async_trait;

/// A registered command's implementation.
///
/// Handlers run synchronously with respect to the service loop: even though `call` is `async`,
/// the loop awaits it to completion before replying and before receiving the next request.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Executes the command against the given positional arguments.
    async fn call(&self, args: &[String]) -> Result<Vec<String>, HandlerError>;
}

/// Errors a handler may signal: these are converted to wire `ERROR` replies by the dispatch
/// loop, never sent directly.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler rejected the arguments themselves (shape, count, or value). Wire token
    /// `ERROR_UNCATEGORISED`.
    #[error("{0}")]
    InvalidArguments(String),

    /// A name referenced by the handler's own arguments (not the dispatched command itself) is
    /// not registered — e.g. `metadata`'s command-name arguments. Wire token
    /// `ERROR_UNKNOWN_COMMAND`, carrying the offending name verbatim.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Any other handler failure. `fault` is a stable, human-readable identifier for the fault
    /// class (the closest analogue of `type(e).__name__` available without runtime reflection);
    /// `message` is the failure's own description. Wire token `ERROR_UNCATEGORISED`, rendered as
    /// `"{fault}: {message}"`.
    #[error("{fault}: {message}")]
    Failure { fault: &'static str, message: String },
}

impl HandlerError {
    /// Convenience constructor for [`HandlerError::Failure`].
    pub fn failure(fault: &'static str, message: impl Into<String>) -> Self {
        HandlerError::Failure {
            fault,
            message: message.into(),
        }
    }
}

/// Adapts a plain synchronous closure `Fn(&[String]) -> Result<Vec<String>, HandlerError>` into
/// a [`Handler`], for commands with no need to `await` anything.
pub struct FnHandler<F>(pub F)
where
    F: Fn(&[String]) -> Result<Vec<String>, HandlerError> + Send + Sync;

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: Fn(&[String]) -> Result<Vec<String>, HandlerError> + Send + Sync,
{
    async fn call(&self, args: &[String]) -> Result<Vec<String>, HandlerError> {
        (self.0)(args)
    }
}
