//! UDP host runtime
//!
//! Receives DHCPv4 datagrams, runs each one through the handler chain on its
//! own task and sends the encoded reply back.

use crate::{config::ServerConfig, error::BeaconError, network, plugin::Chain4};
use bytes::{Bytes, BytesMut};
use dhcproto::{v4, Decodable, Encodable, Encoder};
use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    sync::Arc,
};
use tokio::net::UdpSocket;

const MAX_DATAGRAM_SIZE: usize = 1500;

pub struct Server {
    socket: Arc<UdpSocket>,
    chain: Arc<Chain4>,
    server_port: u16,
    client_port: u16,
    broadcast_address: Ipv4Addr,
}

impl Server {
    pub fn bind(config: &ServerConfig, chain: Chain4) -> Result<Self, BeaconError> {
        let socket =
            network::bind_server_socket(config.interface.as_deref(), config.server_port)?;
        Ok(Self::from_socket(socket, config, chain))
    }

    /// Wraps an already bound socket.
    pub fn from_socket(socket: UdpSocket, config: &ServerConfig, chain: Chain4) -> Self {
        Self {
            socket: Arc::new(socket),
            chain: Arc::new(chain),
            server_port: config.server_port,
            client_port: config.client_port,
            broadcast_address: config.broadcast_address,
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr, BeaconError> {
        Ok(self.socket.local_addr()?)
    }

    /// Serves until the socket fails. Problems with a single packet are
    /// logged and never end the loop.
    pub async fn run(&self) -> Result<(), BeaconError> {
        tracing::info!("Serving DHCPv4 on {}", self.local_addr()?);
        loop {
            let mut buf = BytesMut::zeroed(MAX_DATAGRAM_SIZE);
            let (len, peer) = self.socket.recv_from(&mut buf).await?;
            buf.truncate(len);
            tracing::debug!("Received {} bytes from {}", len, peer);

            let packet = buf.freeze();
            let socket = Arc::clone(&self.socket);
            let chain = Arc::clone(&self.chain);
            let dest = Destinations {
                server_port: self.server_port,
                client_port: self.client_port,
                broadcast_address: self.broadcast_address,
            };
            tokio::spawn(async move {
                if let Err(e) = serve_packet(&socket, &chain, dest, packet, peer).await {
                    tracing::warn!("Dropping packet from {}: {}", peer, e);
                }
            });
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Destinations {
    server_port: u16,
    client_port: u16,
    broadcast_address: Ipv4Addr,
}

impl Destinations {
    /// Picks where a reply goes, following RFC 2131 section 4.1: through the
    /// relay when `giaddr` is set, unicast to `ciaddr` for a client that
    /// already has an address, broadcast otherwise.
    ///
    /// Unicasting to `yiaddr` without the broadcast flag needs an ARP entry
    /// for the client and is not done; those replies are broadcast.
    fn reply_addr(&self, resp: &v4::Message) -> SocketAddr {
        let giaddr = resp.giaddr();
        let ciaddr = resp.ciaddr();
        if !giaddr.is_unspecified() {
            SocketAddrV4::new(giaddr, self.server_port).into()
        } else if !ciaddr.is_unspecified() {
            SocketAddrV4::new(ciaddr, self.client_port).into()
        } else {
            SocketAddrV4::new(self.broadcast_address, self.client_port).into()
        }
    }
}

async fn serve_packet(
    socket: &UdpSocket,
    chain: &Chain4,
    dest: Destinations,
    packet: Bytes,
    peer: SocketAddr,
) -> Result<(), BeaconError> {
    let reply = process(chain, &packet)?;
    let Some((resp, bytes)) = reply else {
        tracing::debug!("No reply for packet from {}", peer);
        return Ok(());
    };

    let target = dest.reply_addr(&resp);
    socket.send_to(&bytes, target).await?;
    tracing::debug!(
        "Sent {:?} ({} bytes) for xid {:#x} to {}",
        resp.opts().msg_type(),
        bytes.len(),
        resp.xid(),
        target
    );
    Ok(())
}

/// Decodes a request, runs the chain over it and encodes the reply.
///
/// Returns `None` when no handler set a message type, since such a reply
/// carries nothing a client could act on.
pub fn process(
    chain: &Chain4,
    packet: &[u8],
) -> Result<Option<(v4::Message, Vec<u8>)>, BeaconError> {
    let req = v4::Message::decode(&mut v4::Decoder::new(packet))?;
    let resp = chain.run(&req);
    if resp.opts().msg_type().is_none() {
        return Ok(None);
    }

    let mut buffer = Vec::new();
    let mut encoder = Encoder::new(&mut buffer);
    resp.encode(&mut encoder)?;
    Ok(Some((resp, buffer)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::v4::reply_template;

    fn destinations() -> Destinations {
        Destinations {
            server_port: 67,
            client_port: 68,
            broadcast_address: Ipv4Addr::BROADCAST,
        }
    }

    #[test]
    fn test_reply_addr_broadcasts_to_new_clients() {
        let resp = reply_template(&v4::Message::default());
        assert_eq!(
            destinations().reply_addr(&resp),
            SocketAddr::from((Ipv4Addr::BROADCAST, 68))
        );
    }

    #[test]
    fn test_reply_addr_unicasts_to_renewing_clients() {
        let mut req = v4::Message::default();
        req.set_ciaddr(Ipv4Addr::new(10, 0, 0, 42));
        let resp = reply_template(&req);
        assert_eq!(
            destinations().reply_addr(&resp),
            SocketAddr::from((Ipv4Addr::new(10, 0, 0, 42), 68))
        );
    }

    #[test]
    fn test_reply_addr_prefers_relay() {
        let mut req = v4::Message::default();
        req.set_ciaddr(Ipv4Addr::new(10, 0, 0, 42))
            .set_giaddr(Ipv4Addr::new(10, 0, 1, 1));
        let resp = reply_template(&req);
        assert_eq!(
            destinations().reply_addr(&resp),
            SocketAddr::from((Ipv4Addr::new(10, 0, 1, 1), 67))
        );
    }
}
