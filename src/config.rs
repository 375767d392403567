use crate::error::ConfigError;
use clap::Parser;
use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// The network interface to serve on (e.g., 'eth0'). Binds to all interfaces when omitted
    #[arg(short, long)]
    pub interface: Option<String>,

    /// The UDP port to listen on
    #[arg(short, long, default_value_t = 67)]
    pub port: u16,

    /// Name of the registered plugin that answers DHCPv4 requests
    #[arg(long, default_value = "server")]
    pub plugin: String,

    /// Plugin arguments: the server address in CIDR notation followed by the client subnet mask
    #[arg(required = true, num_args = 1..)]
    pub plugin_args: Vec<String>,
}

pub struct ServerConfig {
    pub interface: Option<String>,
    pub server_port: u16,
    pub client_port: u16,
    pub broadcast_address: Ipv4Addr,
}

impl ServerConfig {
    pub fn new(interface: Option<String>) -> Self {
        Self {
            interface,
            server_port: 67,
            client_port: 68,
            broadcast_address: Ipv4Addr::BROADCAST,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.server_port = port;
        self
    }
}

impl From<&Args> for ServerConfig {
    fn from(args: &Args) -> Self {
        ServerConfig::new(args.interface.clone()).with_port(args.port)
    }
}

/// The validated network parameters handed out in every reply.
///
/// Only [`configure`] builds one, so holding a `NetworkConfig` means all three
/// addresses have already passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    server_address: Ipv4Addr,
    netmask: Ipv4Addr,
    client_subnet_mask: Ipv4Addr,
}

impl NetworkConfig {
    /// Builds the configuration from positional plugin arguments:
    /// `[0]` is the server CIDR, `[1]` the subnet mask given to clients.
    pub fn from_args(args: &[String]) -> Result<Self, ConfigError> {
        let [address_cidr, subnet_address, rest @ ..] = args else {
            return Err(ConfigError::MissingArguments {
                expected: 2,
                got: args.len(),
            });
        };
        if !rest.is_empty() {
            tracing::warn!("Ignoring {} extra plugin argument(s): {:?}", rest.len(), rest);
        }
        configure(address_cidr, subnet_address)
    }

    pub fn server_address(&self) -> Ipv4Addr {
        self.server_address
    }

    pub fn netmask(&self) -> Ipv4Addr {
        self.netmask
    }

    pub fn client_subnet_mask(&self) -> Ipv4Addr {
        self.client_subnet_mask
    }
}

/// Parses and validates the server CIDR and the client subnet mask.
///
/// The server netmask is the first octet of the CIDR mask repeated four
/// times, so any prefix of 8 bits or more yields `255.255.255.255` and
/// every shorter prefix is rejected.
pub fn configure(address_cidr: &str, subnet_address: &str) -> Result<NetworkConfig, ConfigError> {
    let network: Ipv4Net = address_cidr
        .parse()
        .map_err(|_| ConfigError::InvalidAddress(address_cidr.to_string()))?;

    let server_address = network.addr();
    if server_address.is_unspecified() {
        return Err(ConfigError::InvalidAddress(address_cidr.to_string()));
    }

    let first = network.netmask().octets()[0];
    let netmask = Ipv4Addr::new(first, first, first, first);
    if !is_valid_netmask(netmask) {
        return Err(ConfigError::InvalidNetmask(address_cidr.to_string()));
    }

    let client_subnet_mask: Ipv4Addr = subnet_address
        .parse()
        .map_err(|_| ConfigError::InvalidAddress(subnet_address.to_string()))?;
    if !is_valid_netmask(client_subnet_mask) {
        return Err(ConfigError::InvalidNetmask(subnet_address.to_string()));
    }

    tracing::debug!(
        "Configured server {} (netmask {}), clients get subnet mask {}",
        server_address,
        netmask,
        client_subnet_mask
    );

    Ok(NetworkConfig {
        server_address,
        netmask,
        client_subnet_mask,
    })
}

/// Returns true when `mask` is a non-zero run of one bits starting at the
/// most significant bit.
pub fn is_valid_netmask(mask: Ipv4Addr) -> bool {
    if mask.is_unspecified() {
        return false;
    }
    let inverted = !u32::from(mask);
    (inverted.wrapping_add(1) & inverted) == 0
}
