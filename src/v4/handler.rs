//! DHCPv4 responder for a statically configured network
//!
//! Answers DISCOVER with OFFER and REQUEST with ACK, attaching the subnet
//! mask, server identifier and router options from a [`NetworkConfig`].
//! Every other message type passes through untouched.

use super::reply::ReplyWriter;
use crate::{
    config::NetworkConfig,
    plugin::{ChainAction, Handler4},
};
use dhcproto::v4;

/// What a request asks the server for, as far as this responder cares.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RequestKind {
    Discover,
    Request,
    /// Any other message type, or none at all.
    Unhandled(Option<v4::MessageType>),
}

impl RequestKind {
    pub fn classify(req: &v4::Message) -> Self {
        match req.opts().msg_type() {
            Some(v4::MessageType::Discover) => RequestKind::Discover,
            Some(v4::MessageType::Request) => RequestKind::Request,
            other => RequestKind::Unhandled(other),
        }
    }
}

pub struct ServerHandler {
    network: NetworkConfig,
}

impl ServerHandler {
    pub fn new(network: NetworkConfig) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Populates `resp` according to the message type of `req`.
    ///
    /// Never stops the chain. A request with the wrong opcode is still
    /// answered.
    pub fn handle(&self, req: &v4::Message, resp: &mut impl ReplyWriter) -> ChainAction {
        if req.opcode() != v4::Opcode::BootRequest {
            tracing::warn!(
                "plugins/server: Not a BootRequest (opcode {:?}, xid {:#x})",
                req.opcode(),
                req.xid()
            );
        }

        match RequestKind::classify(req) {
            RequestKind::Discover => self.answer(v4::MessageType::Offer, resp),
            RequestKind::Request => self.answer(v4::MessageType::Ack, resp),
            RequestKind::Unhandled(msg_type) => {
                tracing::warn!(
                    "plugins/server: Unhandled message type: {:?} (xid {:#x})",
                    msg_type,
                    req.xid()
                );
            }
        }

        ChainAction::Continue
    }

    fn answer(&self, reply_type: v4::MessageType, resp: &mut impl ReplyWriter) {
        let server = self.network.server_address();
        tracing::debug!("Answering with {:?} from {}", reply_type, server);
        resp.set_message_type(reply_type);
        resp.update_option(v4::DhcpOption::SubnetMask(self.network.client_subnet_mask()));
        resp.update_option(v4::DhcpOption::ServerIdentifier(server));
        resp.update_option(v4::DhcpOption::Router(vec![server]));
    }
}

impl Handler4 for ServerHandler {
    fn handle4(&self, req: &v4::Message, resp: &mut v4::Message) -> ChainAction {
        self.handle(req, resp)
    }
}
