//! OSC control client for scsynth.
//!
//! Sends control messages over UDP and correlates `/status.reply` responses
//! arriving on a background receive thread. Definition registration uses
//! `/d_recv` with the binary synthdef as an OSC blob.

use std::io;
use std::net::UdpSocket;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};
use rosc::{OscMessage, OscPacket, OscType};

use lunasa_synthdef::SynthDef;

use crate::status::{parse_status_reply, ServerStatus};

/// Where a new node lands relative to its target, per the server command
/// reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddAction {
    ToHead = 0,
    ToTail = 1,
    Before = 2,
    After = 3,
    Replace = 4,
}

/// The root group every server starts with.
pub const ROOT_GROUP_ID: i32 = 0;

/// A client connection to a running scsynth instance.
pub struct Client {
    socket: UdpSocket,
    server_addr: String,
    status_rx: Receiver<ServerStatus>,
    _recv_thread: JoinHandle<()>,
}

impl Client {
    /// Connect to a server at `addr` (e.g. `"127.0.0.1:57110"`).
    ///
    /// Binds an ephemeral local UDP port and starts the receive thread.
    pub fn connect(addr: &str) -> io::Result<Client> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        let recv_socket = socket.try_clone()?;
        recv_socket.set_read_timeout(Some(Duration::from_millis(50)))?;
        let (status_tx, status_rx) = mpsc::channel();
        let handle = thread::spawn(move || recv_loop(recv_socket, status_tx));
        info!("connected to scsynth at {}", addr);
        Ok(Client {
            socket,
            server_addr: addr.to_string(),
            status_rx,
            _recv_thread: handle,
        })
    }

    fn send(&self, msg: OscMessage) -> io::Result<()> {
        let buf = rosc::encoder::encode(&OscPacket::Message(msg))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        self.socket.send_to(&buf, &self.server_addr)?;
        Ok(())
    }

    /// Register a synth definition with the server (`/d_recv`).
    pub fn send_def(&self, def: &SynthDef) -> io::Result<()> {
        debug!("sending synthdef {:?}", def.name);
        self.send(build_d_recv(def.to_bytes()))
    }

    /// Create a synth node from a registered definition (`/s_new`).
    pub fn synth_new(
        &self,
        def_name: &str,
        id: i32,
        add_action: AddAction,
        target: i32,
        controls: &[(&str, f32)],
    ) -> io::Result<Synth<'_>> {
        self.send(build_s_new(def_name, id, add_action, target, controls))?;
        Ok(Synth {
            client: self,
            def_name: def_name.to_string(),
            id,
        })
    }

    /// Create a group node (`/g_new`).
    pub fn group_new(&self, id: i32, add_action: AddAction, target: i32) -> io::Result<Group<'_>> {
        self.send(build_g_new(id, add_action, target))?;
        Ok(Group { client: self, id })
    }

    /// Set named controls on a node (`/n_set`).
    pub fn node_set(&self, id: i32, controls: &[(&str, f32)]) -> io::Result<()> {
        self.send(build_n_set(id, controls))
    }

    /// Free a node (`/n_free`).
    pub fn node_free(&self, id: i32) -> io::Result<()> {
        self.send(build_n_free(id))
    }

    /// Query the server's status, waiting up to `timeout` for the reply.
    pub fn status(&self, timeout: Duration) -> io::Result<ServerStatus> {
        // Drop replies left over from earlier queries that timed out.
        loop {
            match self.status_rx.try_recv() {
                Ok(_) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        self.send(OscMessage {
            addr: "/status".to_string(),
            args: Vec::new(),
        })?;
        self.status_rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => {
                io::Error::new(io::ErrorKind::TimedOut, "no /status.reply from server")
            }
            RecvTimeoutError::Disconnected => {
                io::Error::new(io::ErrorKind::BrokenPipe, "receive thread stopped")
            }
        })
    }
}

/// A synth node on the server.
pub struct Synth<'c> {
    client: &'c Client,
    pub def_name: String,
    pub id: i32,
}

impl Synth<'_> {
    /// Set named controls on this synth.
    pub fn set(&self, controls: &[(&str, f32)]) -> io::Result<()> {
        self.client.node_set(self.id, controls)
    }

    /// Free this synth on the server.
    pub fn free(self) -> io::Result<()> {
        self.client.node_free(self.id)
    }
}

/// A group node on the server.
pub struct Group<'c> {
    client: &'c Client,
    pub id: i32,
}

impl Group<'_> {
    /// Free this group and everything in it.
    pub fn free(self) -> io::Result<()> {
        self.client.node_free(self.id)
    }
}

fn recv_loop(socket: UdpSocket, status_tx: Sender<ServerStatus>) {
    let mut buf = [0u8; 8192];
    loop {
        match socket.recv(&mut buf) {
            Ok(n) => {
                if let Ok((_, packet)) = rosc::decoder::decode_udp(&buf[..n]) {
                    handle_packet(&packet, &status_tx);
                }
            }
            Err(ref e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::TimedOut =>
            {
                continue
            }
            Err(_) => break,
        }
    }
}

fn handle_packet(packet: &OscPacket, status_tx: &Sender<ServerStatus>) {
    match packet {
        OscPacket::Message(msg) => match msg.addr.as_str() {
            "/status.reply" => {
                if let Some(status) = parse_status_reply(msg) {
                    let _ = status_tx.send(status);
                }
            }
            "/fail" => warn!("server reported failure: {:?}", msg.args),
            "/done" => debug!("server completed: {:?}", msg.args),
            _ => {}
        },
        OscPacket::Bundle(bundle) => {
            for p in &bundle.content {
                handle_packet(p, status_tx);
            }
        }
    }
}

fn build_d_recv(def_bytes: Vec<u8>) -> OscMessage {
    OscMessage {
        addr: "/d_recv".to_string(),
        args: vec![OscType::Blob(def_bytes)],
    }
}

fn build_s_new(
    def_name: &str,
    id: i32,
    add_action: AddAction,
    target: i32,
    controls: &[(&str, f32)],
) -> OscMessage {
    let mut args = vec![
        OscType::String(def_name.to_string()),
        OscType::Int(id),
        OscType::Int(add_action as i32),
        OscType::Int(target),
    ];
    for (name, value) in controls {
        args.push(OscType::String(name.to_string()));
        args.push(OscType::Float(*value));
    }
    OscMessage {
        addr: "/s_new".to_string(),
        args,
    }
}

fn build_g_new(id: i32, add_action: AddAction, target: i32) -> OscMessage {
    OscMessage {
        addr: "/g_new".to_string(),
        args: vec![
            OscType::Int(id),
            OscType::Int(add_action as i32),
            OscType::Int(target),
        ],
    }
}

fn build_n_set(id: i32, controls: &[(&str, f32)]) -> OscMessage {
    let mut args = vec![OscType::Int(id)];
    for (name, value) in controls {
        args.push(OscType::String(name.to_string()));
        args.push(OscType::Float(*value));
    }
    OscMessage {
        addr: "/n_set".to_string(),
        args,
    }
}

fn build_n_free(id: i32) -> OscMessage {
    OscMessage {
        addr: "/n_free".to_string(),
        args: vec![OscType::Int(id)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lunasa_synthdef::ugens::{Out, SinOsc};

    #[test]
    fn s_new_carries_controls_after_target() {
        let msg = build_s_new("sine_tone", 1001, AddAction::ToHead, ROOT_GROUP_ID, &[("freq", 330.0)]);
        assert_eq!(msg.addr, "/s_new");
        assert_eq!(
            msg.args,
            vec![
                OscType::String("sine_tone".to_string()),
                OscType::Int(1001),
                OscType::Int(0),
                OscType::Int(0),
                OscType::String("freq".to_string()),
                OscType::Float(330.0),
            ]
        );
    }

    #[test]
    fn d_recv_wraps_definition_bytes_in_a_blob() {
        let def = SynthDef::build("sine_tone", |g| {
            let sig = SinOsc::default().ar(g);
            Out {
                bus: 0.0.into(),
                channels: sig,
            }
            .ar(g)
        });
        let msg = build_d_recv(def.to_bytes());
        assert_eq!(msg.addr, "/d_recv");
        match &msg.args[0] {
            OscType::Blob(bytes) => assert_eq!(bytes, &def.to_bytes()),
            other => panic!("expected Blob, got {:?}", other),
        }
    }

    #[test]
    fn n_free_names_the_node() {
        let msg = build_n_free(2001);
        assert_eq!(msg.addr, "/n_free");
        assert_eq!(msg.args, vec![OscType::Int(2001)]);
    }
}
