//! A small catalog of unit generator constructors.
//!
//! Each ugen is a plain struct whose fields are its inputs, with sensible
//! defaults where SuperCollider defines them. Constructors route through
//! [`UgenGraph::ugen`], so multichannel expansion applies uniformly: pass an
//! [`Input::Multi`](crate::Input::Multi) to any field and the ugen fans out.
//!
//! This is deliberately not an exhaustive catalog; it covers the input kinds
//! the definition builder has to handle (constants, parameters, single- and
//! multi-output ugens, sinks, zero-input generators).

use crate::graph::{Input, UgenGraph};
use crate::rate::Rate;

/// Sine oscillator.
#[derive(Debug, Clone)]
pub struct SinOsc {
    pub freq: Input,
    pub phase: Input,
}

impl Default for SinOsc {
    fn default() -> Self {
        Self {
            freq: 440.0.into(),
            phase: 0.0.into(),
        }
    }
}

impl SinOsc {
    pub fn rate(self, rate: Rate, graph: &mut UgenGraph) -> Input {
        graph.ugen("SinOsc", rate, 0, 0, vec![self.freq, self.phase])
    }

    pub fn ar(self, graph: &mut UgenGraph) -> Input {
        self.rate(Rate::Ar, graph)
    }

    pub fn kr(self, graph: &mut UgenGraph) -> Input {
        self.rate(Rate::Kr, graph)
    }
}

/// Band-limited sawtooth oscillator.
#[derive(Debug, Clone)]
pub struct Saw {
    pub freq: Input,
}

impl Default for Saw {
    fn default() -> Self {
        Self { freq: 440.0.into() }
    }
}

impl Saw {
    pub fn rate(self, rate: Rate, graph: &mut UgenGraph) -> Input {
        graph.ugen("Saw", rate, 0, 0, vec![self.freq])
    }

    pub fn ar(self, graph: &mut UgenGraph) -> Input {
        self.rate(Rate::Ar, graph)
    }

    pub fn kr(self, graph: &mut UgenGraph) -> Input {
        self.rate(Rate::Kr, graph)
    }
}

/// Writes its channels to an audio bus. A sink: it produces no outputs.
#[derive(Debug, Clone)]
pub struct Out {
    pub bus: Input,
    pub channels: Input,
}

impl Out {
    pub fn rate(self, rate: Rate, graph: &mut UgenGraph) -> Input {
        graph.ugen("Out", rate, 0, 0, vec![self.bus, self.channels])
    }

    pub fn ar(self, graph: &mut UgenGraph) -> Input {
        self.rate(Rate::Ar, graph)
    }

    pub fn kr(self, graph: &mut UgenGraph) -> Input {
        self.rate(Rate::Kr, graph)
    }
}

/// Equal-power stereo panner. Always produces two output channels.
#[derive(Debug, Clone)]
pub struct Pan2 {
    pub input: Input,
    pub pos: Input,
    pub level: Input,
}

impl Pan2 {
    pub fn rate(self, rate: Rate, graph: &mut UgenGraph) -> Input {
        graph.ugen("Pan2", rate, 0, 2, vec![self.input, self.pos, self.level])
    }

    pub fn ar(self, graph: &mut UgenGraph) -> Input {
        self.rate(Rate::Ar, graph)
    }
}

/// Brown noise generator. Takes no inputs.
#[derive(Debug, Clone, Default)]
pub struct BrownNoise;

impl BrownNoise {
    pub fn rate(self, rate: Rate, graph: &mut UgenGraph) -> Input {
        graph.ugen("BrownNoise", rate, 0, 0, Vec::new())
    }

    pub fn ar(self, graph: &mut UgenGraph) -> Input {
        self.rate(Rate::Ar, graph)
    }

    pub fn kr(self, graph: &mut UgenGraph) -> Input {
        self.rate(Rate::Kr, graph)
    }
}

/// Horizontal mouse position mapped into `min..max`.
#[derive(Debug, Clone)]
pub struct MouseX {
    pub min: Input,
    pub max: Input,
    /// Mapping curve: 0 is linear, 1 is exponential.
    pub warp: Input,
    /// Lag factor to dezipper cursor movement.
    pub lag: Input,
}

impl Default for MouseX {
    fn default() -> Self {
        Self {
            min: 0.0.into(),
            max: 1.0.into(),
            warp: 0.0.into(),
            lag: 0.2.into(),
        }
    }
}

impl MouseX {
    pub fn rate(self, rate: Rate, graph: &mut UgenGraph) -> Input {
        graph.ugen(
            "MouseX",
            rate,
            0,
            0,
            vec![self.min, self.max, self.warp, self.lag],
        )
    }

    pub fn kr(self, graph: &mut UgenGraph) -> Input {
        self.rate(Rate::Kr, graph)
    }
}

/// Leaky integrator.
#[derive(Debug, Clone)]
pub struct Integrator {
    pub input: Input,
    pub coef: Input,
}

impl Integrator {
    pub fn new(input: Input) -> Self {
        Self {
            input,
            coef: 1.0.into(),
        }
    }

    pub fn rate(self, rate: Rate, graph: &mut UgenGraph) -> Input {
        graph.ugen("Integrator", rate, 0, 0, vec![self.input, self.coef])
    }

    pub fn ar(self, graph: &mut UgenGraph) -> Input {
        self.rate(Rate::Ar, graph)
    }

    pub fn kr(self, graph: &mut UgenGraph) -> Input {
        self.rate(Rate::Kr, graph)
    }
}

/// Second-order band reject filter.
#[derive(Debug, Clone)]
pub struct Brf {
    pub input: Input,
    /// Center frequency in Hz.
    pub freq: Input,
    /// Reciprocal of Q.
    pub rq: Input,
}

impl Brf {
    pub fn new(input: Input) -> Self {
        Self {
            input,
            freq: 440.0.into(),
            rq: 1.0.into(),
        }
    }

    pub fn rate(self, rate: Rate, graph: &mut UgenGraph) -> Input {
        graph.ugen("BRF", rate, 0, 0, vec![self.input, self.freq, self.rq])
    }

    pub fn ar(self, graph: &mut UgenGraph) -> Input {
        self.rate(Rate::Ar, graph)
    }

    pub fn kr(self, graph: &mut UgenGraph) -> Input {
        self.rate(Rate::Kr, graph)
    }
}
