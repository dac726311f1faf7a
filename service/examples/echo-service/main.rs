use std::ops::RangeInclusive;

use async_trait::async_trait;
use clap::Parser;
use reqrep::{ArgumentDescriptor, ArgumentShape, Metadata, TimeoutClass};
use reqrep_service::{Handler, HandlerError, Service};
use std::sync::Arc;
use tracing::info;

const DEFAULT_PORT: u16 = 7878;
const PORT_RANGE: RangeInclusive<usize> = 1..=65535;

fn port(s: &str) -> Result<u16, String> {
    let port: usize = s.parse().map_err(|_| "invalid port number".to_string())?;
    if PORT_RANGE.contains(&port) {
        Ok(port as u16)
    } else {
        Err(format!(
            "invalid port number: not in range {}-{}",
            PORT_RANGE.start(),
            PORT_RANGE.end()
        ))
    }
}

#[derive(Parser)]
#[command(name = "echo-service")]
#[command(about = "Demo reqrep service: registers a single echo command", long_about = None)]
struct Args {
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    #[arg(value_parser = port)]
    port: u16,
}

struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn call(&self, args: &[String]) -> Result<Vec<String>, HandlerError> {
        Ok(args.to_vec())
    }
}

fn echo_metadata() -> Metadata {
    Metadata {
        name: "echo".into(),
        description: "Echoes back the given arguments, unchanged.".into(),
        timeout: TimeoutClass::Default,
        arguments: ArgumentShape::VariableLength(ArgumentDescriptor::new(
            "value",
            "a value to echo back",
        )),
        returns: "the same arguments, in the same order".into(),
        errors: "none".into(),
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let service = Service::new("echo-service", "Echoes back whatever it is given.");
    service.register_command("echo", Arc::new(EchoHandler), echo_metadata());

    info!(port = args.port, "starting echo-service");
    service.run(("127.0.0.1", args.port)).await
}
