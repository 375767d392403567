//! The write surface a handler is given over a DHCPv4 reply.

use dhcproto::v4;

/// Named update operations on a caller-owned reply.
///
/// Updating an option replaces any value already present for the same code.
pub trait ReplyWriter {
    fn set_message_type(&mut self, msg_type: v4::MessageType);
    fn update_option(&mut self, opt: v4::DhcpOption);
}

impl ReplyWriter for v4::Message {
    fn set_message_type(&mut self, msg_type: v4::MessageType) {
        self.update_option(v4::DhcpOption::MessageType(msg_type));
    }

    fn update_option(&mut self, opt: v4::DhcpOption) {
        self.opts_mut().insert(opt);
    }
}

/// Constructs the reply a host passes down the handler chain for `req`.
///
/// The reply echoes the fields a client uses to match it to its request and
/// carries no options yet.
pub fn reply_template(req: &v4::Message) -> v4::Message {
    let mut resp = v4::Message::default();
    resp.set_opcode(v4::Opcode::BootReply)
        .set_htype(req.htype())
        .set_hops(0)
        .set_xid(req.xid())
        .set_secs(0)
        .set_flags(req.flags())
        .set_ciaddr(req.ciaddr())
        .set_giaddr(req.giaddr())
        .set_chaddr(req.chaddr());
    resp
}
