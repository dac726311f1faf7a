use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use reqrep::{ArgumentDescriptor, ArgumentShape, Client, ClientError, Metadata, TimeoutClass};
use reqrep_service::{Handler, HandlerError, Service};

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
        description: "echoes its arguments".into(),
        timeout: TimeoutClass::Default,
        arguments: ArgumentShape::VariableLength(ArgumentDescriptor::new("value", "a value")),
        returns: "the same arguments".into(),
        errors: "none".into(),
    }
}

struct SlowHandler;

#[async_trait]
impl Handler for SlowHandler {
    async fn call(&self, _args: &[String]) -> Result<Vec<String>, HandlerError> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(vec!["done".to_string()])
    }
}

fn slow_metadata() -> Metadata {
    Metadata {
        name: "slow".into(),
        description: "takes half a second to reply".into(),
        timeout: TimeoutClass::Long,
        arguments: ArgumentShape::None,
        returns: "\"done\"".into(),
        errors: "none".into(),
    }
}

struct ExplodingHandler;

#[async_trait]
impl Handler for ExplodingHandler {
    async fn call(&self, _args: &[String]) -> Result<Vec<String>, HandlerError> {
        Err(HandlerError::failure("DivisionByZero", "cannot divide by zero"))
    }
}

fn exploding_metadata() -> Metadata {
    Metadata {
        name: "explode".into(),
        description: "always fails".into(),
        timeout: TimeoutClass::Default,
        arguments: ArgumentShape::None,
        returns: "never returns".into(),
        errors: "always raises".into(),
    }
}

async fn spawn_service() -> (Service, String) {
    let service = Service::new("test-service", "a service used in tests");
    service.register_command("echo", Arc::new(EchoHandler), echo_metadata());
    service.register_command("slow", Arc::new(SlowHandler), slow_metadata());
    service.register_command("explode", Arc::new(ExplodingHandler), exploding_metadata());

    let listener = service.bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let running = service.clone();
    tokio::spawn(async move {
        running.serve(listener).await.unwrap();
    });

    (service, format!("tcp://{addr}"))
}

#[tokio::test]
async fn list_reports_builtins_and_registered_commands() {
    let (_service, endpoint) = spawn_service().await;
    let client = Client::connect(&endpoint).unwrap();

    let names = client.call("list", &[]).await.unwrap();
    assert_eq!(
        names,
        vec![
            "describe".to_string(),
            "list".to_string(),
            "help".to_string(),
            "metadata".to_string(),
            "echo".to_string(),
            "slow".to_string(),
            "explode".to_string(),
        ]
    );
}

#[tokio::test]
async fn echo_round_trips_its_arguments() {
    let (_service, endpoint) = spawn_service().await;
    let client = Client::connect(&endpoint).unwrap();

    let returns = client
        .call("echo", &["a".to_string(), "b".to_string()])
        .await
        .unwrap();
    assert_eq!(returns, vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn unknown_command_is_reported_as_such() {
    let (_service, endpoint) = spawn_service().await;
    let client = Client::connect(&endpoint).unwrap();

    let err = client.call("does-not-exist", &[]).await.unwrap_err();
    assert_eq!(err, ClientError::UnknownCommand("does-not-exist".to_string()));
}

#[tokio::test]
async fn metadata_probe_extends_the_deadline_for_a_long_running_command() {
    let (_service, endpoint) = spawn_service().await;
    let client = Client::connect(&endpoint).unwrap();

    // The handler sleeps 500ms; the default 300ms deadline would time it out. The probe must
    // have picked up its `Long` timeout class for the call to succeed.
    let returns = client.call("slow", &[]).await.unwrap();
    assert_eq!(returns, vec!["done".to_string()]);
}

#[tokio::test]
async fn metadata_with_no_arguments_is_an_invalid_arguments_error() {
    let (_service, endpoint) = spawn_service().await;
    let client = Client::connect(&endpoint).unwrap();

    let err = client.call("metadata", &[]).await.unwrap_err();
    match err {
        ClientError::Service { code, .. } => assert_eq!(code, "ERROR_UNCATEGORISED"),
        other => panic!("expected a Service error, got {other:?}"),
    }
}

#[tokio::test]
async fn a_handler_exception_is_reported_with_its_fault_class_and_message() {
    let (_service, endpoint) = spawn_service().await;
    let client = Client::connect(&endpoint).unwrap();

    let err = client.call("explode", &[]).await.unwrap_err();
    match err {
        ClientError::Service { code, message } => {
            assert_eq!(code, "ERROR_UNCATEGORISED");
            assert_eq!(message, "DivisionByZero: cannot divide by zero");
        }
        other => panic!("expected a Service error, got {other:?}"),
    }
}
