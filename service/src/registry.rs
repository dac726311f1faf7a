//! The command registry: name → {handler, metadata}, in insertion order.

use std::collections::HashMap;
use std::sync::Arc;

use reqrep::Metadata;

use crate::handler::Handler;

/// One registered command: its handler and its self-describing metadata.
#[derive(Clone)]
pub struct CommandEntry {
    pub handler: Arc<dyn Handler>,
    pub metadata: Metadata,
}

/// Mapping from command name to [`CommandEntry`].
///
/// Insertion replaces any prior entry under the same name, without duplicating its name in
/// [`Registry::names`]'s insertion-order listing.
#[derive(Default)]
pub struct Registry {
    order: Vec<String>,
    entries: HashMap<String, CommandEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `name`.
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn Handler>, metadata: Metadata) {
        let name = name.into();
        if self.entries.insert(name.clone(), CommandEntry { handler, metadata }).is_none() {
            self.order.push(name);
        }
    }

    /// Looks up a command by name.
    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.entries.get(name)
    }

    /// Command names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Entries in insertion order, for `help` rendering.
    pub fn entries_in_order(&self) -> impl Iterator<Item = &CommandEntry> {
        self.order.iter().map(move |name| &self.entries[name])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use reqrep::{ArgumentShape, TimeoutClass};

    use crate::handler::HandlerError;

    struct Noop;

    #[async_trait]
    impl Handler for Noop {
        async fn call(&self, _args: &[String]) -> Result<Vec<String>, HandlerError> {
            Ok(vec![])
        }
    }

    fn metadata(name: &str) -> Metadata {
        Metadata {
            name: name.to_string(),
            description: String::new(),
            timeout: TimeoutClass::Default,
            arguments: ArgumentShape::None,
            returns: String::new(),
            errors: String::new(),
        }
    }

    #[test]
    fn register_then_list_contains_the_command() {
        let mut registry = Registry::new();
        registry.register("echo", Arc::new(Noop), metadata("echo"));
        assert_eq!(registry.names(), &["echo".to_string()]);
    }

    #[test]
    fn re_registering_the_same_name_does_not_duplicate() {
        let mut registry = Registry::new();
        registry.register("echo", Arc::new(Noop), metadata("echo"));
        registry.register("echo", Arc::new(Noop), metadata("echo"));
        assert_eq!(registry.names(), &["echo".to_string()]);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut registry = Registry::new();
        registry.register("b", Arc::new(Noop), metadata("b"));
        registry.register("a", Arc::new(Noop), metadata("a"));
        assert_eq!(registry.names(), &["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn unregistered_command_is_not_found() {
        let registry = Registry::new();
        assert!(registry.get("nope").is_none());
    }
}
