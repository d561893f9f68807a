//! Server status reporting.

use rosc::{OscMessage, OscType};

/// A snapshot of scsynth's state, parsed from a `/status.reply` message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServerStatus {
    pub num_ugens: i32,
    pub num_synths: i32,
    pub num_groups: i32,
    pub num_synthdefs: i32,
    /// Average CPU load as a percentage.
    pub avg_cpu: f32,
    /// Peak CPU load as a percentage.
    pub peak_cpu: f32,
    pub nominal_sample_rate: f64,
    pub actual_sample_rate: f64,
}

/// Parse a `/status.reply` message.
///
/// Argument layout: `[unused, ugens, synths, groups, synthdefs, avg_cpu,
/// peak_cpu, nominal_sr, actual_sr]`. Returns `None` for malformed replies.
pub(crate) fn parse_status_reply(msg: &OscMessage) -> Option<ServerStatus> {
    if msg.args.len() < 9 {
        return None;
    }
    Some(ServerStatus {
        num_ugens: int_arg(&msg.args[1])?,
        num_synths: int_arg(&msg.args[2])?,
        num_groups: int_arg(&msg.args[3])?,
        num_synthdefs: int_arg(&msg.args[4])?,
        avg_cpu: float_arg(&msg.args[5])?,
        peak_cpu: float_arg(&msg.args[6])?,
        nominal_sample_rate: double_arg(&msg.args[7])?,
        actual_sample_rate: double_arg(&msg.args[8])?,
    })
}

fn int_arg(arg: &OscType) -> Option<i32> {
    match arg {
        OscType::Int(v) => Some(*v),
        _ => None,
    }
}

fn float_arg(arg: &OscType) -> Option<f32> {
    match arg {
        OscType::Float(v) => Some(*v),
        _ => None,
    }
}

fn double_arg(arg: &OscType) -> Option<f64> {
    match arg {
        OscType::Double(v) => Some(*v),
        OscType::Float(v) => Some(*v as f64),
        _ => None,
    }
}
