use beacon::{
    Args, BeaconError, Chain4, ConfigError, PluginError, PluginRegistry, Server, ServerConfig,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), BeaconError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let registry = PluginRegistry::with_builtin();

    // The plugin must load before any traffic is accepted.
    let mut chain = Chain4::new();
    chain.push(registry.setup4(&args.plugin, &args.plugin_args)?);

    match registry.setup6(&args.plugin, &args.plugin_args) {
        Ok(_) => tracing::warn!("DHCPv6 handler loaded but no DHCPv6 listener is available"),
        Err(PluginError::Setup {
            source: ConfigError::UnsupportedFamily,
            ..
        }) => tracing::info!(
            "Plugin '{}' does not support DHCPv6, serving DHCPv4 only",
            args.plugin
        ),
        Err(e) => return Err(e.into()),
    }

    let config = ServerConfig::from(&args);
    tracing::info!(
        "Binding to {} port {}...",
        config.interface.as_deref().unwrap_or("all interfaces"),
        config.server_port
    );
    let server = Server::bind(&config, chain)?;
    server.run().await
}
