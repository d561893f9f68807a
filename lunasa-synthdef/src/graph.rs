//! Ugen graph construction.
//!
//! A [`UgenGraph`] is the mutable workspace a synthdef is built in. Ugen nodes
//! live in an arena owned by the graph and are addressed by [`NodeId`] handles,
//! so two uses of the same handle refer to the same node. The definition
//! builder relies on that: deduplication is by handle, never by comparing node
//! contents, which means two independently constructed but identical nodes stay
//! distinct in the compiled output.

use crate::rate::Rate;

/// Special index of `BinaryOpUGen` selecting the `+` operator.
pub(crate) const BINOP_ADD: i16 = 0;
/// Special index of `BinaryOpUGen` selecting the `*` operator.
pub(crate) const BINOP_MUL: i16 = 2;

/// A stable handle to a ugen node in a [`UgenGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// One input slot of a ugen under construction.
///
/// `Multi` represents an implicitly channel-expanded signal. It only exists
/// while a graph is being built: constructors fan out over it and the
/// definition builder flattens any that remain, so a `Multi` never appears in
/// a compiled [`SynthDef`](crate::SynthDef).
#[derive(Debug, Clone)]
pub enum Input {
    /// A numeric constant, deduplicated into the definition's constant pool.
    Const(f32),
    /// A named synthdef parameter, referenced by declaration index.
    Param(i32),
    /// The output of another node in the same graph.
    Ugen(NodeId),
    /// A parallel bundle of channels.
    Multi(Vec<Input>),
}

impl From<f32> for Input {
    fn from(value: f32) -> Self {
        Input::Const(value)
    }
}

impl Input {
    /// Multiply this signal by a constant.
    ///
    /// Returns the receiver unchanged when `n` is 1. Otherwise wraps the
    /// signal in a `BinaryOpUGen` at the operand's rate, which also forces the
    /// operand to materialize an output slot.
    pub fn mul(&self, graph: &mut UgenGraph, n: f32) -> Input {
        if n == 1.0 {
            return self.clone();
        }
        self.bin_op(graph, BINOP_MUL, n)
    }

    /// Add a constant to this signal.
    ///
    /// Returns the receiver unchanged when `n` is 0.
    pub fn add(&self, graph: &mut UgenGraph, n: f32) -> Input {
        if n == 0.0 {
            return self.clone();
        }
        self.bin_op(graph, BINOP_ADD, n)
    }

    fn bin_op(&self, graph: &mut UgenGraph, special_index: i16, n: f32) -> Input {
        match self {
            // Constant folding: no ugen is emitted for const-const arithmetic.
            Input::Const(c) => match special_index {
                BINOP_MUL => Input::Const(c * n),
                _ => Input::Const(c + n),
            },
            Input::Param(_) => graph.ugen(
                "BinaryOpUGen",
                Rate::Kr,
                special_index,
                0,
                vec![self.clone(), Input::Const(n)],
            ),
            Input::Ugen(id) => {
                let rate = graph.node(*id).rate;
                graph.ugen(
                    "BinaryOpUGen",
                    rate,
                    special_index,
                    0,
                    vec![self.clone(), Input::Const(n)],
                )
            }
            Input::Multi(channels) => Input::Multi(
                channels
                    .iter()
                    .map(|c| c.bin_op(graph, special_index, n))
                    .collect::<Vec<_>>(),
            ),
        }
    }

    /// Number of parallel channels this input fans out into.
    fn width(&self) -> usize {
        match self {
            Input::Multi(channels) => channels.len(),
            _ => 1,
        }
    }

    /// The channel used for expanded node `i`, cycling over narrower inputs.
    fn channel(&self, i: usize) -> Input {
        match self {
            Input::Multi(channels) => channels[i % channels.len()].clone(),
            other => other.clone(),
        }
    }
}

/// One ugen instance in the arena.
#[derive(Debug, Clone)]
pub(crate) struct UgenNode {
    pub name: String,
    pub rate: Rate,
    pub special_index: i16,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Rate>,
}

/// A named synthdef parameter.
#[derive(Debug, Clone)]
pub(crate) struct Param {
    pub name: String,
    pub index: i32,
    pub initial_value: f32,
}

/// Arena of ugen nodes plus the parameter registry for one synthdef build.
///
/// Created once per [`SynthDef::build`](crate::SynthDef::build) call, consumed
/// by the definition builder, then discarded.
#[derive(Debug, Default)]
pub struct UgenGraph {
    nodes: Vec<UgenNode>,
    params: Vec<Param>,
}

impl UgenGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a named parameter with an initial value.
    ///
    /// Parameters are indexed in declaration order, which is also the order
    /// control values must be passed when creating synths from the compiled
    /// definition.
    pub fn add_param(&mut self, name: &str, initial_value: f32) -> Input {
        assert!(
            name.len() <= 127,
            "parameter name longer than 127 bytes: {:?}",
            name
        );
        let index = self.params.len() as i32;
        self.params.push(Param {
            name: name.to_string(),
            index,
            initial_value,
        });
        Input::Param(index)
    }

    /// Construct a ugen, fanning out over any multichannel inputs.
    ///
    /// This is the single constructor path every ugen in the catalog goes
    /// through. If the widest input carries `n > 1` channels, `n` nodes are
    /// built and bundled into an [`Input::Multi`]; input `j` of node `i` is
    /// channel `i % width(j)` of the original input, so narrower multichannel
    /// inputs cycle rather than truncate.
    ///
    /// `num_outputs` fixes the output count for ugens that always produce a
    /// known number of channels (e.g. `Pan2`). Pass 0 for the common case of
    /// ugens whose single output slot materializes lazily when the node is
    /// first consumed as an input.
    pub fn ugen(
        &mut self,
        name: &str,
        rate: Rate,
        special_index: i16,
        num_outputs: usize,
        inputs: Vec<Input>,
    ) -> Input {
        let width = inputs.iter().map(Input::width).max().unwrap_or(1);
        if width <= 1 {
            let id = self.add_node(name, rate, special_index, num_outputs, inputs);
            return Input::Ugen(id);
        }
        let mut channels = Vec::with_capacity(width);
        for i in 0..width {
            let expanded = inputs.iter().map(|input| input.channel(i)).collect();
            let id = self.add_node(name, rate, special_index, num_outputs, expanded);
            channels.push(Input::Ugen(id));
        }
        Input::Multi(channels)
    }

    fn add_node(
        &mut self,
        name: &str,
        rate: Rate,
        special_index: i16,
        num_outputs: usize,
        inputs: Vec<Input>,
    ) -> NodeId {
        assert!(
            name.len() <= 127,
            "ugen name longer than 127 bytes: {:?}",
            name
        );
        for input in &inputs {
            self.mark_consumed(input);
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(UgenNode {
            name: name.to_string(),
            rate,
            special_index,
            inputs,
            outputs: vec![rate; num_outputs],
        });
        id
    }

    /// Give every ugen referenced by `input` an output slot.
    ///
    /// Output lists are lazy: a node only gains its single default output once
    /// something consumes it, which is what lets sink ugens like `Out` end up
    /// with zero outputs.
    fn mark_consumed(&mut self, input: &Input) {
        match input {
            Input::Ugen(id) => {
                let node = &mut self.nodes[id.0];
                if node.outputs.is_empty() {
                    let rate = node.rate;
                    node.outputs.push(rate);
                }
            }
            Input::Multi(channels) => {
                for channel in channels {
                    self.mark_consumed(channel);
                }
            }
            Input::Const(_) | Input::Param(_) => {}
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &UgenNode {
        &self.nodes[id.0]
    }

    pub(crate) fn params(&self) -> &[Param] {
        &self.params
    }
}
