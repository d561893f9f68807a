//! Exercises the client against a fake scsynth on a loopback UDP socket.

use std::net::UdpSocket;
use std::time::Duration;

use rosc::{OscMessage, OscPacket, OscType};

use lunasa_server::{AddAction, Client, ROOT_GROUP_ID};
use lunasa_synthdef::ugens::{Out, SinOsc};
use lunasa_synthdef::SynthDef;

fn fake_server() -> (UdpSocket, String) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let addr = socket.local_addr().unwrap().to_string();
    (socket, addr)
}

fn recv_message(socket: &UdpSocket) -> (OscMessage, std::net::SocketAddr) {
    let mut buf = [0u8; 65_507];
    let (n, from) = socket.recv_from(&mut buf).unwrap();
    match rosc::decoder::decode_udp(&buf[..n]).unwrap().1 {
        OscPacket::Message(msg) => (msg, from),
        other => panic!("expected a message, got {:?}", other),
    }
}

#[test]
fn node_free_reaches_the_server() {
    let (server, addr) = fake_server();
    let client = Client::connect(&addr).unwrap();
    client.node_free(2001).unwrap();
    let (msg, _) = recv_message(&server);
    assert_eq!(msg.addr, "/n_free");
    assert_eq!(msg.args, vec![OscType::Int(2001)]);
}

#[test]
fn send_def_delivers_the_encoded_definition() {
    let (server, addr) = fake_server();
    let client = Client::connect(&addr).unwrap();
    let def = SynthDef::build("sine_tone", |g| {
        let sig = SinOsc::default().ar(g);
        Out {
            bus: 0.0.into(),
            channels: sig,
        }
        .ar(g)
    });
    client.send_def(&def).unwrap();
    let (msg, _) = recv_message(&server);
    assert_eq!(msg.addr, "/d_recv");
    let bytes = match &msg.args[0] {
        OscType::Blob(bytes) => bytes.clone(),
        other => panic!("expected Blob, got {:?}", other),
    };
    // The server-side bytes decode back to the definition we sent.
    let received = SynthDef::from_bytes(&bytes).unwrap();
    assert_eq!(received, def);
}

#[test]
fn synth_new_then_set_targets_the_same_node() {
    let (server, addr) = fake_server();
    let client = Client::connect(&addr).unwrap();
    let synth = client
        .synth_new("sine_tone", 1001, AddAction::ToHead, ROOT_GROUP_ID, &[])
        .unwrap();
    let (s_new, _) = recv_message(&server);
    assert_eq!(s_new.addr, "/s_new");
    assert_eq!(s_new.args[1], OscType::Int(1001));

    synth.set(&[("freq", 330.0)]).unwrap();
    let (n_set, _) = recv_message(&server);
    assert_eq!(n_set.addr, "/n_set");
    assert_eq!(
        n_set.args,
        vec![
            OscType::Int(1001),
            OscType::String("freq".to_string()),
            OscType::Float(330.0),
        ]
    );
}

#[test]
fn status_waits_for_the_reply() {
    let (server, addr) = fake_server();
    let client = Client::connect(&addr).unwrap();

    let responder = std::thread::spawn(move || {
        let (msg, from) = recv_message(&server);
        assert_eq!(msg.addr, "/status");
        let reply = OscPacket::Message(OscMessage {
            addr: "/status.reply".to_string(),
            args: vec![
                OscType::Int(1),
                OscType::Int(4),
                OscType::Int(2),
                OscType::Int(3),
                OscType::Int(7),
                OscType::Float(0.2),
                OscType::Float(0.5),
                OscType::Double(48000.0),
                OscType::Double(47999.99),
            ],
        });
        let buf = rosc::encoder::encode(&reply).unwrap();
        server.send_to(&buf, from).unwrap();
    });

    let status = client.status(Duration::from_secs(2)).unwrap();
    responder.join().unwrap();
    assert_eq!(status.num_synths, 2);
    assert_eq!(status.num_synthdefs, 7);
}

#[test]
fn status_times_out_without_a_reply() {
    let (_server, addr) = fake_server();
    let client = Client::connect(&addr).unwrap();
    let err = client.status(Duration::from_millis(100)).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
}
