use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub mod api;
pub mod content;
pub mod error;
pub mod odds;
pub mod resolver;
pub mod table;

pub use error::EngineError;
pub use odds::{crit_chance, expected_hits, hit_chance};
pub use resolver::{
    attack, count_hits, estimate_hits, resolve, simulate_hits, AttackBatch, AttackRoll, HitCount,
    Resolution,
};
pub use table::{attackers_per_hit, LookupPolicy, TableBand, TABLE};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdMode {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

enum Source {
    Seeded(ChaCha8Rng),
    Scripted { faces: Vec<u8>, next: usize },
}

/// The random source every simulated roll is drawn from. Callers own it and
/// pass it in, so a seed (or a script) fully determines a simulation.
pub struct Dice {
    source: Source,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self { source: Source::Seeded(ChaCha8Rng::seed_from_u64(seed)) }
    }

    /// Replays `faces` in order, starting over once the script runs out.
    /// Faces are clamped into 1..=20; an empty script always rolls 1.
    pub fn from_scripted(faces: Vec<u8>) -> Self {
        let faces = faces.into_iter().map(|f| f.clamp(1, 20)).collect();
        Self { source: Source::Scripted { faces, next: 0 } }
    }

    fn roll_face(&mut self) -> u8 {
        match &mut self.source {
            Source::Seeded(rng) => rng.gen_range(1..=20),
            Source::Scripted { faces, next } => {
                if faces.is_empty() {
                    return 1;
                }
                let face = faces[*next % faces.len()];
                *next += 1;
                face
            }
        }
    }

    pub fn d20(&mut self, mode: AdMode) -> u8 {
        self.d20_detailed(mode).1
    }

    /// Roll a d20 under `mode`, returning every face drawn and the kept one.
    pub fn d20_detailed(&mut self, mode: AdMode) -> (Vec<u8>, u8) {
        let mut roll = || self.roll_face();
        match mode {
            AdMode::Normal => {
                let a = roll();
                (vec![a], a)
            }
            AdMode::Advantage => {
                let a = roll();
                let b = roll();
                (vec![a, b], a.max(b))
            }
            AdMode::Disadvantage => {
                let a = roll();
                let b = roll();
                (vec![a, b], a.min(b))
            }
        }
    }
}
