//! scsynth process supervision.

use std::io;
use std::process::{Child, Command, Stdio};

use log::{info, warn};

/// Known install locations, tried in order.
const SCSYNTH_PATHS: &[&str] = &[
    "scsynth",
    "/Applications/SuperCollider.app/Contents/Resources/scsynth",
    "/usr/local/bin/scsynth",
    "/usr/bin/scsynth",
];

/// A supervised scsynth process.
///
/// The process is killed when this value drops. The server needs a moment
/// after spawning before it accepts OSC traffic; poll
/// [`Client::status`](crate::Client::status) to find out when it is ready.
pub struct Scsynth {
    child: Child,
    port: u16,
}

impl Scsynth {
    /// Spawn scsynth listening for UDP commands on `port`.
    pub fn spawn(port: u16) -> io::Result<Scsynth> {
        for path in SCSYNTH_PATHS {
            match Command::new(path)
                .args(["-u", &port.to_string()])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            {
                Ok(child) => {
                    info!("started {} on udp port {}", path, port);
                    return Ok(Scsynth { child, port });
                }
                Err(_) => continue,
            }
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            "could not find scsynth; install SuperCollider",
        ))
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The address a [`Client`](crate::Client) should connect to.
    pub fn addr(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}

impl Drop for Scsynth {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            warn!("failed to kill scsynth: {}", e);
        }
        let _ = self.child.wait();
    }
}
