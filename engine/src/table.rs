use serde::{Deserialize, Serialize};

use crate::EngineError;

/// One row of the Dungeon Master's Guide mob attack table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableBand {
    pub low: i32,
    pub high: i32,
    /// Attackers needed, on average, for one of them to hit.
    pub attackers: u32,
}

pub const TABLE: [TableBand; 7] = [
    TableBand { low: 1, high: 5, attackers: 1 },
    TableBand { low: 6, high: 12, attackers: 2 },
    TableBand { low: 13, high: 14, attackers: 3 },
    TableBand { low: 15, high: 16, attackers: 4 },
    TableBand { low: 17, high: 18, attackers: 5 },
    TableBand { low: 19, high: 19, attackers: 10 },
    TableBand { low: 20, high: 20, attackers: 20 },
];

/// How a table lookup treats a roll needed outside 1..=20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupPolicy {
    /// Rolls of 0 or less use the 1 band (only a natural 1 misses); rolls
    /// above 20 use the 20 band (only a natural 20 hits).
    #[default]
    Clamp,
    /// Reject with `EngineError::OutOfRange`.
    Strict,
}

impl LookupPolicy {
    pub fn divisor(self, roll_needed: i32) -> Result<u32, EngineError> {
        let lookup = match self {
            LookupPolicy::Clamp => roll_needed.clamp(1, 20),
            LookupPolicy::Strict => roll_needed,
        };
        attackers_per_hit(lookup).ok_or(EngineError::OutOfRange { roll_needed })
    }
}

/// Attackers needed for one hit given the d20 face needed to hit. Advantage,
/// disadvantage and natural 1s/20s are not modelled by the table.
pub fn attackers_per_hit(roll_needed: i32) -> Option<u32> {
    TABLE
        .iter()
        .find(|band| (band.low..=band.high).contains(&roll_needed))
        .map(|band| band.attackers)
}
