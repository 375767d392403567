use beacon::{
    configure, is_valid_netmask, server,
    v4::{reply_template, ServerHandler},
    Chain4, ChainAction, ConfigError, Handler4, PluginRegistry, Server, ServerConfig,
};
use bytes::Bytes;
use dhcproto::{v4, Decodable, Decoder, Encodable, Encoder};
use rand::Rng as _;
use std::{net::Ipv4Addr, sync::Arc, time::Duration};
use tokio::net::UdpSocket;

fn server_chain() -> Chain4 {
    let args = vec!["10.0.0.1/24".to_string(), "255.255.255.0".to_string()];
    let mut chain = Chain4::new();
    chain.push(PluginRegistry::with_builtin().setup4("server", &args).unwrap());
    chain
}

fn client_packet(msg_type: v4::MessageType, xid: u32) -> Vec<u8> {
    let mac_addr = Bytes::from_static(&[0x00, 0x0c, 0x29, 0xa8, 0x92, 0xf4]);
    let mut msg = v4::Message::default();
    msg.set_opcode(v4::Opcode::BootRequest)
        .set_chaddr(&mac_addr)
        .set_htype(v4::HType::Eth)
        .set_xid(xid)
        .set_flags(v4::Flags::default().set_broadcast());
    msg.opts_mut().insert(v4::DhcpOption::MessageType(msg_type));

    let mut buffer = Vec::new();
    let mut encoder = Encoder::new(&mut buffer);
    msg.encode(&mut encoder).unwrap();
    buffer
}

#[test]
fn test_netmask_matches_contiguous_definition() {
    let mut rng = rand::rng();
    for _ in 0..10_000 {
        let raw: u32 = rng.random();
        let expected = raw != 0 && raw.leading_ones() + raw.trailing_zeros() == 32;
        assert_eq!(is_valid_netmask(Ipv4Addr::from(raw)), expected, "{raw:#034b}");
    }
    for len in 1..=32u32 {
        let raw = u32::MAX << (32 - len);
        assert!(is_valid_netmask(Ipv4Addr::from(raw)), "prefix /{len}");
    }
}

#[test]
fn test_process_discover_end_to_end() {
    let chain = server_chain();
    let packet = client_packet(v4::MessageType::Discover, 0xdead_beef);

    let (resp, bytes) = server::process(&chain, &packet).unwrap().unwrap();
    assert_eq!(resp.xid(), 0xdead_beef);

    let decoded = v4::Message::decode(&mut Decoder::new(&bytes)).unwrap();
    assert_eq!(decoded.opcode(), v4::Opcode::BootReply);
    assert_eq!(decoded.opts().msg_type(), Some(v4::MessageType::Offer));
    assert!(matches!(
        decoded.opts().get(v4::OptionCode::SubnetMask),
        Some(v4::DhcpOption::SubnetMask(mask)) if *mask == Ipv4Addr::new(255, 255, 255, 0)
    ));
    assert!(matches!(
        decoded.opts().get(v4::OptionCode::Router),
        Some(v4::DhcpOption::Router(routers)) if routers == &vec![Ipv4Addr::new(10, 0, 0, 1)]
    ));
}

#[test]
fn test_process_release_produces_no_reply() {
    let chain = server_chain();
    let packet = client_packet(v4::MessageType::Release, 7);
    assert!(server::process(&chain, &packet).unwrap().is_none());
}

#[test]
fn test_process_rejects_garbage() {
    let chain = server_chain();
    assert!(server::process(&chain, &[0x01, 0x02, 0x03]).is_err());
}

#[test]
fn test_concurrent_handling_matches_sequential() {
    let handler = Arc::new(ServerHandler::new(
        configure("10.0.0.1/24", "255.255.255.0").unwrap(),
    ));
    let requests: Vec<v4::Message> = (0..64u32)
        .map(|i| {
            let msg_type = match i % 3 {
                0 => v4::MessageType::Discover,
                1 => v4::MessageType::Request,
                _ => v4::MessageType::Release,
            };
            let packet = client_packet(msg_type, i);
            v4::Message::decode(&mut Decoder::new(&packet)).unwrap()
        })
        .collect();

    let sequential: Vec<v4::Message> = requests
        .iter()
        .map(|req| {
            let mut resp = reply_template(req);
            assert_eq!(handler.handle4(req, &mut resp), ChainAction::Continue);
            resp
        })
        .collect();

    let concurrent: Vec<v4::Message> = std::thread::scope(|scope| {
        let workers: Vec<_> = requests
            .iter()
            .map(|req| {
                let handler = Arc::clone(&handler);
                scope.spawn(move || {
                    let mut resp = reply_template(req);
                    handler.handle4(req, &mut resp);
                    resp
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(concurrent, sequential);
}

#[test]
fn test_configure_rejections() {
    assert!(matches!(
        configure("999.999.999.999/24", "255.255.255.0"),
        Err(ConfigError::InvalidAddress(_))
    ));
    assert!(matches!(
        configure("10.0.0.0/24", "not-an-ip"),
        Err(ConfigError::InvalidAddress(_))
    ));
    assert!(matches!(
        configure("10.0.0.1/3", "255.255.255.0"),
        Err(ConfigError::InvalidNetmask(_))
    ));
    assert!(configure("10.0.0.1/24", "255.255.255.0").is_ok());
}

#[tokio::test]
async fn test_server_answers_over_udp() {
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let client_port = client.local_addr().unwrap().port();

    let mut config = ServerConfig::new(None);
    config.client_port = client_port;
    config.broadcast_address = Ipv4Addr::LOCALHOST;

    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let server = Server::from_socket(socket, &config, server_chain());
    let server_addr = server.local_addr().unwrap();
    let task = tokio::spawn(async move { server.run().await });

    let xid = rand::rng().random_range(0..=u32::MAX);
    client
        .send_to(&client_packet(v4::MessageType::Request, xid), server_addr)
        .await
        .unwrap();

    let mut buf = [0u8; 1500];
    let (len, _) = tokio::time::timeout(Duration::from_secs(5), client.recv_from(&mut buf))
        .await
        .expect("timed out waiting for reply")
        .unwrap();
    let msg = v4::Message::decode(&mut Decoder::new(&buf[..len])).unwrap();

    assert_eq!(msg.xid(), xid);
    assert_eq!(msg.opts().msg_type(), Some(v4::MessageType::Ack));
    assert!(matches!(
        msg.opts().get(v4::OptionCode::ServerIdentifier),
        Some(v4::DhcpOption::ServerIdentifier(ip)) if *ip == Ipv4Addr::new(10, 0, 0, 1)
    ));

    task.abort();
}

#[test]
fn test_server_config_defaults() {
    let config = ServerConfig::new(Some("eth0".to_string()));

    assert_eq!(config.interface.as_deref(), Some("eth0"));
    assert_eq!(config.server_port, 67);
    assert_eq!(config.client_port, 68);
    assert_eq!(config.broadcast_address, Ipv4Addr::BROADCAST);
}
