//! The service runtime: owns the command registry and runs the accept loop.

use std::sync::{Arc, RwLock};

use reqrep::Metadata;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::{error, info, instrument};

use crate::builtins::{
    describe_metadata, help_metadata, list_metadata, metadata_metadata, DescribeHandler,
    HelpHandler, ListHandler, MetadataHandler,
};
use crate::dispatch::{dispatch_one, DispatchError};
use crate::handler::Handler;
use crate::registry::Registry;

/// A running (or about-to-run) command service.
///
/// Commands are registered once, up front; the registry is then shared read-only across every
/// accepted connection. `describe`, `list`, `help`, and `metadata` are pre-registered by
/// [`Service::new`] and can be overridden by registering another handler under the same name.
#[derive(Clone)]
pub struct Service {
    registry: Arc<RwLock<Registry>>,
}

impl Service {
    /// Builds a service with the four reflection commands already registered.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let registry = Arc::new(RwLock::new(Registry::new()));
        let service = Self { registry };

        service.register_command(
            "describe",
            Arc::new(DescribeHandler {
                name: Arc::from(name.into()),
                description: Arc::from(description.into()),
            }),
            describe_metadata(),
        );
        service.register_command(
            "list",
            Arc::new(ListHandler {
                registry: Arc::clone(&service.registry),
            }),
            list_metadata(),
        );
        service.register_command(
            "help",
            Arc::new(HelpHandler {
                registry: Arc::clone(&service.registry),
            }),
            help_metadata(),
        );
        service.register_command(
            "metadata",
            Arc::new(MetadataHandler {
                registry: Arc::clone(&service.registry),
            }),
            metadata_metadata(),
        );

        service
    }

    /// Registers (or replaces) a command.
    pub fn register_command(&self, name: impl Into<String>, handler: Arc<dyn Handler>, metadata: Metadata) {
        self.registry
            .write()
            .expect("registry lock poisoned")
            .register(name, handler, metadata);
    }

    /// Binds `addr`, without yet accepting any connections.
    ///
    /// Split out from [`Service::run`] so callers that need the bound address — binding `:0` for
    /// an ephemeral port, for instance — can read it back before serving.
    pub async fn bind(&self, addr: impl ToSocketAddrs) -> std::io::Result<TcpListener> {
        TcpListener::bind(addr).await
    }

    /// Serves connections from `listener` until a fatal I/O error occurs.
    ///
    /// Each accepted connection is handled to completion (one request, one reply) before the
    /// next `accept` call, mirroring the single-request-in-flight contract the client relies on.
    #[instrument(skip(self, listener))]
    pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        info!(local_addr = ?listener.local_addr()?, "listening");

        loop {
            let (stream, peer) = listener.accept().await?;
            let registry = Arc::clone(&self.registry);
            tokio::spawn(async move {
                handle_connection(stream, registry).await;
                let _ = peer;
            });
        }
    }

    /// Binds `addr` and serves connections until a fatal I/O error occurs.
    pub async fn run(&self, addr: impl ToSocketAddrs) -> std::io::Result<()> {
        let listener = self.bind(addr).await?;
        self.serve(listener).await
    }
}

async fn handle_connection(mut stream: TcpStream, registry: Arc<RwLock<Registry>>) {
    let result = dispatch_one(&mut stream, &registry).await;

    if let Err(err) = result {
        match err {
            DispatchError::Incomplete => {
                // A peer that connects and disconnects without sending anything is routine
                // (e.g. a health check); nothing was owed to it.
            }
            other => error!(error = %other, "connection terminated without a reply"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_service_pre_registers_the_four_reflection_commands() {
        let service = Service::new("demo", "a demo service");
        let registry = service.registry.read().unwrap();
        assert_eq!(
            registry.names(),
            &[
                "describe".to_string(),
                "list".to_string(),
                "help".to_string(),
                "metadata".to_string(),
            ]
        );
    }
}
