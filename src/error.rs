use crate::network::SocketError;
use std::io;
use thiserror::Error;

/// Errors raised while turning operator-supplied strings into a network configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("error parsing config: expected an IPv4 address, got: {0}")]
    InvalidAddress(String),

    #[error("error parsing config: netmask is not valid, got: {0}")]
    InvalidNetmask(String),

    #[error("error parsing config: need {expected} plugin arguments, got {got}")]
    MissingArguments { expected: usize, got: usize },

    #[error("error parsing config: address family is not supported by this plugin")]
    UnsupportedFamily,
}

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Plugin '{0}' is already registered")]
    Duplicate(String),

    #[error("Unknown plugin '{0}'")]
    Unknown(String),

    #[error("Failed to set up plugin '{plugin}'")]
    Setup {
        plugin: String,
        #[source]
        source: ConfigError,
    },
}

#[derive(Error, Debug)]
pub enum BeaconError {
    #[error("Invalid configuration")]
    Config(#[from] ConfigError),

    #[error("Plugin error")]
    Plugin(#[from] PluginError),

    #[error("Socket operation failed")]
    Socket(#[from] SocketError),

    #[error("I/O error")]
    Io(#[from] io::Error),

    #[error("Failed to decode DHCP message")]
    Decode(#[from] dhcproto::error::DecodeError),

    #[error("Failed to encode DHCP message")]
    Encode(#[from] dhcproto::error::EncodeError),
}
