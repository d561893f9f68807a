//! # lunasa-server
//!
//! Control-protocol client and process supervision for scsynth.
//!
//! Synth definitions built with `lunasa-synthdef` are registered with a
//! running server over OSC, after which synth and group nodes can be created
//! and controlled:
//!
//! ```no_run
//! use std::time::Duration;
//! use lunasa_server::{AddAction, Client, ROOT_GROUP_ID};
//! use lunasa_synthdef::{ugens::{Out, SinOsc}, SynthDef};
//!
//! # fn main() -> std::io::Result<()> {
//! let client = Client::connect("127.0.0.1:57110")?;
//! let def = SynthDef::build("sine_tone", |g| {
//!     let freq = g.add_param("freq", 440.0);
//!     let sig = SinOsc { freq, phase: 0.0.into() }.ar(g);
//!     Out { bus: 0.0.into(), channels: sig }.ar(g)
//! });
//! client.send_def(&def)?;
//! let synth = client.synth_new("sine_tone", 1001, AddAction::ToHead, ROOT_GROUP_ID, &[])?;
//! synth.set(&[("freq", 330.0)])?;
//! let status = client.status(Duration::from_secs(1))?;
//! println!("{} synths running", status.num_synths);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod process;
pub mod status;

pub use client::{AddAction, Client, Group, Synth, ROOT_GROUP_ID};
pub use process::Scsynth;
pub use status::ServerStatus;
