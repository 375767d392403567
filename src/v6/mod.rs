//! DHCPv6 is not served. [`V6Passthrough`] exists so a v6 chain slot can be
//! filled without touching the reply.

use crate::plugin::{ChainAction, Handler6};
use dhcproto::v6;

#[derive(Debug, Default)]
pub struct V6Passthrough;

impl Handler6 for V6Passthrough {
    fn handle6(&self, _req: &v6::Message, _resp: &mut v6::Message) -> ChainAction {
        ChainAction::Continue
    }
}
