//! Closed-form per-attack probabilities under the same rules the simulation
//! uses: a kept 20 always hits, a kept 1 always misses.

use crate::{AdMode, AttackBatch};

/// Chance that a single d20 (no advantage) hits.
fn single_roll_chance(armor_class: i32, to_hit: i32) -> f64 {
    let faces = (2..=19i64)
        .filter(|face| face + i64::from(to_hit) >= i64::from(armor_class))
        .count() as f64;
    (faces + 1.0) / 20.0
}

pub fn hit_chance(armor_class: i32, to_hit: i32, mode: AdMode) -> f64 {
    let p = single_roll_chance(armor_class, to_hit);
    match mode {
        AdMode::Normal => p,
        AdMode::Advantage => 1.0 - (1.0 - p) * (1.0 - p),
        AdMode::Disadvantage => p * p,
    }
}

pub fn crit_chance(mode: AdMode) -> f64 {
    hit_chance(i32::MAX, 0, mode)
}

/// Expected number of hits for the batch if every attack were simulated.
pub fn expected_hits(batch: &AttackBatch) -> f64 {
    f64::from(batch.attacks) * hit_chance(batch.armor_class, batch.to_hit, batch.mode())
}
