//! DHCPv4 protocol implementation
//!
//! This module contains the DHCPv4-specific implementation including:
//! - The reply write surface handed to handlers
//! - The static-network responder

pub mod handler;
pub mod reply;


pub use handler::{RequestKind, ServerHandler};
pub use reply::{reply_template, ReplyWriter};
