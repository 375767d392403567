//! Plugins shipped with beacon.

pub mod server;

use crate::plugin::Plugin;

/// Every plugin `PluginRegistry::with_builtin` installs.
pub fn builtin() -> Vec<Plugin> {
    vec![server::plugin()]
}
