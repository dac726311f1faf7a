//! The four pre-registered commands: `describe`, `list`, `help`, `metadata`.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqrep::{ArgumentDescriptor, ArgumentShape, Metadata, TimeoutClass};

use crate::handler::{Handler, HandlerError};
use crate::help;
use crate::registry::Registry;

pub(crate) struct DescribeHandler {
    pub name: Arc<str>,
    pub description: Arc<str>,
}

#[async_trait]
impl Handler for DescribeHandler {
    async fn call(&self, _args: &[String]) -> Result<Vec<String>, HandlerError> {
        Ok(vec![self.name.to_string(), self.description.to_string()])
    }
}

pub(crate) fn describe_metadata() -> Metadata {
    Metadata {
        name: "describe".into(),
        description: "Returns the service's name and description.".into(),
        timeout: TimeoutClass::Default,
        arguments: ArgumentShape::None,
        returns: "[service_name, service_description]".into(),
        errors: "none".into(),
    }
}

pub(crate) struct ListHandler {
    pub registry: Arc<RwLock<Registry>>,
}

#[async_trait]
impl Handler for ListHandler {
    async fn call(&self, _args: &[String]) -> Result<Vec<String>, HandlerError> {
        let registry = self.registry.read().expect("registry lock poisoned");
        Ok(registry.names().to_vec())
    }
}

pub(crate) fn list_metadata() -> Metadata {
    Metadata {
        name: "list".into(),
        description: "Lists the names of all registered commands.".into(),
        timeout: TimeoutClass::Default,
        arguments: ArgumentShape::None,
        returns: "the registered command names, in registration order".into(),
        errors: "none".into(),
    }
}

pub(crate) struct HelpHandler {
    pub registry: Arc<RwLock<Registry>>,
}

#[async_trait]
impl Handler for HelpHandler {
    async fn call(&self, _args: &[String]) -> Result<Vec<String>, HandlerError> {
        let registry = self.registry.read().expect("registry lock poisoned");
        Ok(registry
            .entries_in_order()
            .map(|entry| help::render(&entry.metadata))
            .collect())
    }
}

pub(crate) fn help_metadata() -> Metadata {
    Metadata {
        name: "help".into(),
        description: "Renders human-readable help text for every registered command.".into(),
        timeout: TimeoutClass::Default,
        arguments: ArgumentShape::None,
        returns: "one rendered help string per command, in registration order".into(),
        errors: "uncategorised if a registered command is missing metadata".into(),
    }
}

pub(crate) struct MetadataHandler {
    pub registry: Arc<RwLock<Registry>>,
}

#[async_trait]
impl Handler for MetadataHandler {
    async fn call(&self, args: &[String]) -> Result<Vec<String>, HandlerError> {
        if args.is_empty() {
            return Err(HandlerError::InvalidArguments(
                "Expected one or more commands".into(),
            ));
        }

        let registry = self.registry.read().expect("registry lock poisoned");
        let mut documents = Vec::with_capacity(args.len());
        for name in args {
            let entry = registry
                .get(name)
                .ok_or_else(|| HandlerError::UnknownCommand(name.clone()))?;
            let document = serde_json::to_string(&entry.metadata.to_document())
                .map_err(|e| HandlerError::failure("SerializeError", e.to_string()))?;
            documents.push(document);
        }

        Ok(documents)
    }
}

pub(crate) fn metadata_metadata() -> Metadata {
    Metadata {
        name: "metadata".into(),
        description: "Returns the metadata document for one or more commands.".into(),
        timeout: TimeoutClass::Default,
        arguments: ArgumentShape::VariableLength(ArgumentDescriptor::new(
            "command",
            "the name of a registered command",
        )),
        returns: "one JSON metadata document per requested command name".into(),
        errors:
            "ERROR_UNKNOWN_COMMAND if a requested name is not registered; uncategorised if no names were given"
                .into(),
    }
}
