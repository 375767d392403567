//! Handler chain and plugin registration
//!
//! A plugin contributes one setup function per address family. Each setup
//! function turns the plugin's string arguments into a handler, and the host
//! runs the configured handlers in order for every request.

use crate::{
    error::{ConfigError, PluginError},
    v4::reply::reply_template,
};
use dhcproto::{v4, v6};
use std::collections::HashMap;

/// Tells the host whether the next handler in the chain should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainAction {
    Continue,
    Stop,
}

/// A DHCPv4 request handler.
///
/// Handlers only read the request and write into the caller-owned reply, so
/// one instance may serve many requests at once.
pub trait Handler4: Send + Sync {
    fn handle4(&self, req: &v4::Message, resp: &mut v4::Message) -> ChainAction;
}

/// A DHCPv6 request handler.
pub trait Handler6: Send + Sync {
    fn handle6(&self, req: &v6::Message, resp: &mut v6::Message) -> ChainAction;
}

pub type Setup4 = fn(&[String]) -> Result<Box<dyn Handler4>, ConfigError>;
pub type Setup6 = fn(&[String]) -> Result<Box<dyn Handler6>, ConfigError>;

#[derive(Clone, Copy)]
pub struct Plugin {
    pub name: &'static str,
    pub setup6: Setup6,
    pub setup4: Setup4,
}

#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<&'static str, Plugin>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every plugin shipped with this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for plugin in crate::plugins::builtin() {
            if let Err(e) = registry.register(plugin) {
                tracing::error!("Skipping builtin plugin: {}", e);
            }
        }
        registry
    }

    pub fn register(&mut self, plugin: Plugin) -> Result<(), PluginError> {
        if self.plugins.contains_key(plugin.name) {
            return Err(PluginError::Duplicate(plugin.name.to_string()));
        }
        tracing::debug!("Registered plugin '{}'", plugin.name);
        self.plugins.insert(plugin.name, plugin);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Plugin> {
        self.plugins.get(name)
    }

    pub fn setup4(&self, name: &str, args: &[String]) -> Result<Box<dyn Handler4>, PluginError> {
        let plugin = self
            .get(name)
            .ok_or_else(|| PluginError::Unknown(name.to_string()))?;
        (plugin.setup4)(args).map_err(|source| PluginError::Setup {
            plugin: name.to_string(),
            source,
        })
    }

    pub fn setup6(&self, name: &str, args: &[String]) -> Result<Box<dyn Handler6>, PluginError> {
        let plugin = self
            .get(name)
            .ok_or_else(|| PluginError::Unknown(name.to_string()))?;
        (plugin.setup6)(args).map_err(|source| PluginError::Setup {
            plugin: name.to_string(),
            source,
        })
    }
}

/// An ordered list of DHCPv4 handlers.
#[derive(Default)]
pub struct Chain4 {
    handlers: Vec<Box<dyn Handler4>>,
}

impl Chain4 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handler: Box<dyn Handler4>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Builds the reply template for `req` and lets each handler fill it in
    /// until one of them stops the chain.
    pub fn run(&self, req: &v4::Message) -> v4::Message {
        let mut resp = reply_template(req);
        for handler in &self.handlers {
            if handler.handle4(req, &mut resp) == ChainAction::Stop {
                break;
            }
        }
        resp
    }
}
