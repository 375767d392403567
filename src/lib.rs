//! # Beacon - A Static-Network DHCPv4 Server
//!
//! Beacon answers DHCPv4 DISCOVER and REQUEST messages for a statically
//! configured network. Requests flow through a chain of plugin handlers;
//! the built-in `server` plugin validates the operator's network settings
//! once at startup and then attaches the subnet mask, server identifier and
//! router options to every OFFER and ACK.
//!
//! ## Example
//!
//! ```rust,no_run
//! use beacon::{Chain4, PluginRegistry, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let args = vec!["10.0.0.1/24".to_string(), "255.255.255.0".to_string()];
//!     let mut chain = Chain4::new();
//!     chain.push(PluginRegistry::with_builtin().setup4("server", &args)?);
//!
//!     let server = Server::bind(&ServerConfig::new(Some("eth0".to_string())), chain)?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod network;
pub mod plugin;
pub mod plugins;
pub mod server;
pub mod v4;
pub mod v6;

pub use config::{configure, is_valid_netmask, Args, NetworkConfig, ServerConfig};
pub use error::{BeaconError, ConfigError, PluginError};
pub use plugin::{Chain4, ChainAction, Handler4, Handler6, Plugin, PluginRegistry};
pub use server::Server;
