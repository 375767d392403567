//! The `server` plugin: hands out a fixed subnet mask and uses the server's
//! own address as server identifier and router.

use crate::{
    config::NetworkConfig,
    error::ConfigError,
    plugin::{Handler4, Handler6, Plugin},
    v4::ServerHandler,
};

pub const PLUGIN_NAME: &str = "server";

pub fn plugin() -> Plugin {
    Plugin {
        name: PLUGIN_NAME,
        setup6: setup_v6,
        setup4: setup_v4,
    }
}

/// Expects `[server CIDR, client subnet mask]`, e.g. `["10.0.0.1/24", "255.255.255.0"]`.
pub fn setup_v4(args: &[String]) -> Result<Box<dyn Handler4>, ConfigError> {
    let network = NetworkConfig::from_args(args)?;
    tracing::info!(
        "plugins/{}: loaded plugin for DHCPv4 (server {}, client subnet mask {})",
        PLUGIN_NAME,
        network.server_address(),
        network.client_subnet_mask()
    );
    Ok(Box::new(ServerHandler::new(network)))
}

pub fn setup_v6(_args: &[String]) -> Result<Box<dyn Handler6>, ConfigError> {
    Err(ConfigError::UnsupportedFamily)
}
