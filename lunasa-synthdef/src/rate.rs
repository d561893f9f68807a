//! Ugen computation rates.

use serde::{Serialize, Serializer};

/// The update-frequency class of a ugen's output.
///
/// The numeric values are fixed by the synthdef file format and must not
/// change: scalar = 0, control = 1, audio = 2, demand = 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rate {
    /// Initialization rate: computed once when a synth starts.
    Ir,
    /// Control rate: one value per control period.
    Kr,
    /// Audio rate: one value per sample.
    Ar,
    /// Demand rate: computed when demanded by a downstream ugen.
    Dr,
}

impl Rate {
    /// The wire representation of this rate.
    pub fn to_i8(self) -> i8 {
        match self {
            Rate::Ir => 0,
            Rate::Kr => 1,
            Rate::Ar => 2,
            Rate::Dr => 3,
        }
    }

    /// Decode a rate from its wire representation.
    pub fn from_i8(value: i8) -> Option<Rate> {
        match value {
            0 => Some(Rate::Ir),
            1 => Some(Rate::Kr),
            2 => Some(Rate::Ar),
            3 => Some(Rate::Dr),
            _ => None,
        }
    }
}

impl From<Rate> for i8 {
    fn from(rate: Rate) -> Self {
        rate.to_i8()
    }
}

// Serialized as the raw wire value so JSON dumps mirror the binary format.
impl Serialize for Rate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.to_i8())
    }
}
