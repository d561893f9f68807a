//! Compiled synth definitions and the flattening builder.

use std::collections::HashMap;
use std::io::{self, Write};

use log::debug;
use serde::Serialize;

use crate::graph::{Input, NodeId, UgenGraph};
use crate::rate::Rate;

/// Sentinel ugen index marking an input that reads from the constant pool.
///
/// Real ugen indices start at 0, so this value can never collide with one.
pub(crate) const CONSTANT_UGEN_INDEX: i32 = -1;

/// A named synth parameter and its position in the definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamName {
    pub name: String,
    pub index: i32,
}

/// One resolved input slot of a compiled ugen: `(ugen_index, output_index)`.
///
/// `ugen_index` is either a position in the definition's ugen list, or the
/// sentinel `-1` for a constant-pool reference (in which case `output_index`
/// is the constant's index). Parameter references point at the Control ugen,
/// which is always position 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSpec {
    pub ugen_index: i32,
    pub output_index: i32,
}

/// One ugen record in a compiled definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UgenSpec {
    pub name: String,
    pub rate: Rate,
    pub special_index: i16,
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<Rate>,
}

/// A named alternate set of default parameter values sharing one definition's
/// graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub name: String,
    pub initial_param_values: Vec<f32>,
}

/// A flattened, validated synth definition.
///
/// This is the structure scsynth expects at its `/d_recv` endpoint, in the
/// layout described by the [Synth Definition File Format]. Build one with
/// [`SynthDef::build`]; it is immutable afterwards.
///
/// [Synth Definition File Format]: https://doc.sccode.org/Reference/Synth-Definition-File-Format.html
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthDef {
    pub name: String,
    /// Constant pool in first-seen order, no duplicates by value.
    pub constants: Vec<f32>,
    /// Default parameter values, parallel to `param_names`.
    pub initial_param_values: Vec<f32>,
    pub param_names: Vec<ParamName>,
    /// Topologically sorted: every ugen appears after the ugens it reads from,
    /// with the Control ugen first whenever parameters exist.
    pub ugens: Vec<UgenSpec>,
    pub variants: Vec<Variant>,
}

impl SynthDef {
    /// Build a definition by constructing a ugen graph and flattening it.
    ///
    /// `graph_fn` receives a fresh [`UgenGraph`] and returns the root of the
    /// graph, typically an `Out` ugen. Declare any parameters inside
    /// `graph_fn` with [`UgenGraph::add_param`].
    ///
    /// Malformed graphs are programming errors and panic at construction
    /// time; this function never returns a partially built definition.
    ///
    /// # Examples
    ///
    /// ```
    /// use lunasa_synthdef::{ugens::{Out, SinOsc}, SynthDef};
    ///
    /// let def = SynthDef::build("sine_tone", |g| {
    ///     let sig = SinOsc::default().ar(g);
    ///     Out { bus: 0.0.into(), channels: sig }.ar(g)
    /// });
    /// assert_eq!(def.ugens.len(), 2);
    /// ```
    pub fn build(name: &str, graph_fn: impl FnOnce(&mut UgenGraph) -> Input) -> SynthDef {
        assert!(
            name.len() <= 127,
            "synthdef name longer than 127 bytes: {:?}",
            name
        );
        let mut graph = UgenGraph::new();
        let root = graph_fn(&mut graph);
        let def = Builder::new(&graph).flatten(name, &root);
        debug!(
            "built synthdef {:?}: {} ugens, {} constants, {} params",
            def.name,
            def.ugens.len(),
            def.constants.len(),
            def.param_names.len()
        );
        def
    }

    /// Attach a variant: an alternate preset of default parameter values.
    ///
    /// The value count must match the definition's parameter count.
    pub fn with_variant(mut self, name: &str, initial_param_values: Vec<f32>) -> SynthDef {
        assert!(
            name.len() <= 127,
            "variant name longer than 127 bytes: {:?}",
            name
        );
        assert!(
            initial_param_values.len() == self.initial_param_values.len(),
            "variant {:?} has {} values for {} params",
            name,
            initial_param_values.len(),
            self.initial_param_values.len()
        );
        self.variants.push(Variant {
            name: name.to_string(),
            initial_param_values,
        });
        self
    }

    /// Write a JSON representation of this definition.
    ///
    /// Convenience dump for debugging; scsynth only accepts the binary form.
    pub fn write_json<W: Write>(&self, writer: W) -> io::Result<()> {
        serde_json::to_writer(writer, self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Flattens one ugen graph into a [`SynthDef`].
struct Builder<'g> {
    graph: &'g UgenGraph,
    constants: Vec<f32>,
    ugens: Vec<UgenSpec>,
    /// Memoized positions of arena nodes already appended to `ugens`.
    /// Keyed by node handle: structurally identical nodes built separately
    /// are deliberately not merged.
    seen: HashMap<NodeId, usize>,
}

impl<'g> Builder<'g> {
    fn new(graph: &'g UgenGraph) -> Self {
        Builder {
            graph,
            constants: Vec::new(),
            ugens: Vec::new(),
            seen: HashMap::new(),
        }
    }

    fn flatten(mut self, name: &str, root: &Input) -> SynthDef {
        let params = self.graph.params();
        let initial_param_values: Vec<f32> = params.iter().map(|p| p.initial_value).collect();
        let param_names: Vec<ParamName> = params
            .iter()
            .map(|p| ParamName {
                name: p.name.clone(),
                index: p.index,
            })
            .collect();
        if !params.is_empty() {
            // The synthesized Control ugen exposes one control-rate output per
            // parameter and always sits at index 0.
            self.ugens.push(UgenSpec {
                name: "Control".to_string(),
                rate: Rate::Kr,
                special_index: 0,
                inputs: Vec::new(),
                outputs: vec![Rate::Kr; params.len()],
            });
        }

        for id in self.topsort(root) {
            if self.seen.contains_key(&id) {
                continue;
            }
            let index = self.ensure_added(id);
            let node = self.graph.node(id);
            let mut inputs = Vec::with_capacity(node.inputs.len());
            for input in &node.inputs {
                self.resolve(input, &mut inputs);
            }
            self.ugens[index].inputs = inputs;
        }

        SynthDef {
            name: name.to_string(),
            constants: self.constants,
            initial_param_values,
            param_names,
            ugens: self.ugens,
            variants: Vec::new(),
        }
    }

    /// Topologically order every node reachable from `root`.
    ///
    /// Reproduces the reference traversal: a depth-first walk that records
    /// each node on discovery and descends into its inputs last-input-first,
    /// then reads the record back to front. The result lists dependencies
    /// before dependents in first-input-first order. Nodes reached through
    /// several edges appear once per edge; callers keep the first occurrence.
    ///
    /// Uses an explicit work stack so arbitrarily deep graphs cannot overflow
    /// the call stack.
    fn topsort(&self, root: &Input) -> Vec<NodeId> {
        let mut discovered = Vec::new();
        let mut work = Vec::new();
        push_node_refs(root, &mut work);
        while let Some(id) = work.pop() {
            discovered.push(id);
            for input in &self.graph.node(id).inputs {
                push_node_refs(input, &mut work);
            }
        }
        discovered.reverse();
        discovered
    }

    /// Append the node's record if this handle has not been seen, and return
    /// its position in the ugen list.
    fn ensure_added(&mut self, id: NodeId) -> usize {
        if let Some(&index) = self.seen.get(&id) {
            return index;
        }
        let node = self.graph.node(id);
        let index = self.ugens.len();
        self.ugens.push(UgenSpec {
            name: node.name.clone(),
            rate: node.rate,
            special_index: node.special_index,
            inputs: Vec::new(),
            outputs: node.outputs.clone(),
        });
        self.seen.insert(id, index);
        index
    }

    /// Resolve one builder-time input into flat `(ugen_index, output_index)`
    /// entries.
    ///
    /// A ugen reference contributes one entry per output of the referenced
    /// node, so multi-output ugens fan all of their channels into the
    /// consumer. Multichannel inputs are flattened in place; none survive
    /// into the compiled definition.
    fn resolve(&mut self, input: &Input, out: &mut Vec<InputSpec>) {
        match input {
            Input::Const(value) => {
                let index = self.constant_index(*value);
                out.push(InputSpec {
                    ugen_index: CONSTANT_UGEN_INDEX,
                    output_index: index,
                });
            }
            Input::Param(index) => out.push(InputSpec {
                ugen_index: 0,
                output_index: *index,
            }),
            Input::Ugen(id) => {
                let ugen_index = self.ensure_added(*id) as i32;
                for output_index in 0..self.graph.node(*id).outputs.len() {
                    out.push(InputSpec {
                        ugen_index,
                        output_index: output_index as i32,
                    });
                }
            }
            Input::Multi(channels) => {
                for channel in channels {
                    self.resolve(channel, out);
                }
            }
        }
    }

    /// Index of `value` in the constant pool, appending it on first sight.
    fn constant_index(&mut self, value: f32) -> i32 {
        match self.constants.iter().position(|&c| c == value) {
            Some(index) => index as i32,
            None => {
                self.constants.push(value);
                (self.constants.len() - 1) as i32
            }
        }
    }
}

/// Push the ugens referenced by `input` onto the work stack in declaration
/// order, so the stack pops them last-input-first like the reference
/// recursion does.
fn push_node_refs(input: &Input, work: &mut Vec<NodeId>) {
    match input {
        Input::Ugen(id) => work.push(*id),
        Input::Multi(channels) => {
            for channel in channels {
                push_node_refs(channel, work);
            }
        }
        Input::Const(_) | Input::Param(_) => {}
    }
}
