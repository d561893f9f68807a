//! # lunasa-synthdef
//!
//! Synth definition construction and encoding for SuperCollider.
//!
//! A synthdef describes a signal-processing graph of unit generators (ugens)
//! that scsynth instantiates when a synth is created. This crate provides a
//! small embedded DSL for building those graphs, a compiler that flattens a
//! graph into a deduplicated, topologically ordered definition, and a codec
//! for the binary `.scsyndef` format the server accepts.
//!
//! ```
//! use lunasa_synthdef::{ugens::{Out, SinOsc}, SynthDef};
//!
//! let def = SynthDef::build("sine_tone", |g| {
//!     let freq = g.add_param("freq", 440.0);
//!     let sig = SinOsc { freq, phase: 0.0.into() }.ar(g).mul(g, 0.5);
//!     Out { bus: 0.0.into(), channels: sig }.ar(g)
//! });
//! let bytes = def.to_bytes();
//! ```
//!
//! Sending definitions to a running server lives in `lunasa-server`.

mod codec;
mod graph;
mod rate;
mod synthdef;
pub mod ugens;

pub use codec::DecodeError;
pub use graph::{Input, NodeId, UgenGraph};
pub use rate::Rate;
pub use synthdef::{InputSpec, ParamName, SynthDef, UgenSpec, Variant};
