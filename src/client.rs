//! The matching client: a two-phase caller that probes a command's metadata before invoking it.

use std::time::Duration;

use url::Url;

use crate::connection::call_once;
use crate::error::{ClientError, ErrorCode};
use crate::frame::{encode_request, Reply};
use crate::metadata::Metadata;

/// Connects to a service endpoint and issues two-phase calls against it.
///
/// Opening a client parses and validates the endpoint URL but does not connect yet. Every [`call`]
/// opens its own, fresh socket for each phase, and the socket is never reused across calls.
///
/// [`call`]: Client::call
#[derive(Debug, Clone)]
pub struct Client {
    host: String,
    port: u16,
}

impl Client {
    /// Parses an endpoint URL of the form `tcp://host:port`.
    pub fn connect(endpoint: &str) -> Result<Self, ClientError> {
        let url = Url::parse(endpoint).map_err(|e| ClientError::Transport(e.to_string()))?;
        if url.scheme() != "tcp" {
            return Err(ClientError::Transport(format!(
                "unsupported scheme {:?}, expected \"tcp\"",
                url.scheme()
            )));
        }
        let host = url
            .host_str()
            .ok_or_else(|| ClientError::Transport("endpoint URL has no host".into()))?
            .to_string();
        let port = url
            .port()
            .ok_or_else(|| ClientError::Transport("endpoint URL has no port".into()))?;

        Ok(Self { host, port })
    }

    /// Issues a call to `command` with `args`, probing its metadata first (unless `command` is
    /// itself `"metadata"`, which has a fixed `DEFAULT` timeout and skips the probe).
    pub async fn call(&self, command: &str, args: &[String]) -> Result<Vec<String>, ClientError> {
        if command == "metadata" {
            return self
                .invoke(
                    command,
                    args,
                    Duration::from_millis(crate::metadata::TimeoutClass::DEFAULT_MS),
                )
                .await;
        }

        let metadata = self.probe(command).await?;
        self.invoke(command, args, Duration::from_millis(metadata.timeout.millis()))
            .await
    }

    /// Performs the metadata probe: `metadata(command)` with a 300 ms deadline.
    async fn probe(&self, command: &str) -> Result<Metadata, ClientError> {
        let probe_timeout = Duration::from_millis(crate::metadata::TimeoutClass::DEFAULT_MS);
        let request = encode_request("metadata", std::slice::from_ref(&command.to_string()));

        let reply = call_once((&self.host, self.port), request, probe_timeout).await?;

        match reply {
            Reply::Ok(returns) => {
                let document = returns
                    .first()
                    .ok_or_else(|| ClientError::Protocol("empty metadata probe reply".into()))?;
                let value: serde_json::Value = serde_json::from_str(document)
                    .map_err(|e| ClientError::Protocol(e.to_string()))?;
                Metadata::from_document(&value).map_err(|e| ClientError::Protocol(e.to_string()))
            }
            Reply::Error { code, message } => Err(classify_error(code, message)),
        }
    }

    /// Performs the real invocation with the given receive deadline.
    async fn invoke(
        &self,
        command: &str,
        args: &[String],
        deadline: Duration,
    ) -> Result<Vec<String>, ClientError> {
        let request = encode_request(command, args);
        let reply = call_once((&self.host, self.port), request, deadline).await?;

        match reply {
            Reply::Ok(returns) => Ok(returns),
            Reply::Error { code, message } => Err(classify_error(code, message)),
        }
    }
}

/// Converts a wire error code into a typed [`ClientError`]: `ERROR_UNKNOWN_COMMAND` becomes
/// [`ClientError::UnknownCommand`], anything else becomes a generic [`ClientError::Service`].
fn classify_error(code: String, message: String) -> ClientError {
    match ErrorCode::parse(&code) {
        Some(ErrorCode::UnknownCommand) => ClientError::UnknownCommand(message),
        _ => ClientError::Service { code, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_parses_tcp_endpoint() {
        let client = Client::connect("tcp://127.0.0.1:9000").unwrap();
        assert_eq!(client.host, "127.0.0.1");
        assert_eq!(client.port, 9000);
    }

    #[test]
    fn connect_rejects_non_tcp_scheme() {
        assert!(Client::connect("http://127.0.0.1:9000").is_err());
    }

    #[test]
    fn connect_rejects_missing_port() {
        assert!(Client::connect("tcp://127.0.0.1").is_err());
    }
}
