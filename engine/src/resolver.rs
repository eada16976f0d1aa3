use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{AdMode, Dice, EngineError, LookupPolicy};

/// A group of identical attacks against one target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct AttackBatch {
    pub attacks: u32,
    pub armor_class: i32,
    pub to_hit: i32,
    #[serde(default)]
    pub damage_per_hit: Option<f64>,
    #[serde(default)]
    pub advantage: bool,
    #[serde(default)]
    pub disadvantage: bool,
    /// Use the mob attack table instead of rolling every attack.
    #[serde(default)]
    pub approximate: bool,
}

impl AttackBatch {
    pub fn new(attacks: u32, armor_class: i32, to_hit: i32) -> Self {
        Self {
            attacks,
            armor_class,
            to_hit,
            damage_per_hit: None,
            advantage: false,
            disadvantage: false,
            approximate: false,
        }
    }

    pub fn with_damage(mut self, damage_per_hit: f64) -> Self {
        self.damage_per_hit = Some(damage_per_hit);
        self
    }

    pub fn with_advantage(mut self) -> Self {
        self.advantage = true;
        self
    }

    pub fn with_disadvantage(mut self) -> Self {
        self.disadvantage = true;
        self
    }

    pub fn approximate(mut self) -> Self {
        self.approximate = true;
        self
    }

    /// Advantage wins when both flags are set.
    pub fn mode(&self) -> AdMode {
        if self.advantage {
            AdMode::Advantage
        } else if self.disadvantage {
            AdMode::Disadvantage
        } else {
            AdMode::Normal
        }
    }

    /// Minimum d20 face that hits, before natural 1/20 rules.
    pub fn roll_needed(&self) -> i32 {
        self.armor_class.saturating_sub(self.to_hit)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if let Some(dmg) = self.damage_per_hit {
            if !dmg.is_finite() || dmg < 0.0 {
                return Err(EngineError::InvalidArgument(format!(
                    "damage_per_hit must be a finite non-negative number, got {}",
                    dmg
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of a single simulated attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttackRoll {
    pub raw_rolls: Vec<u8>,
    pub roll: u8,
    pub total: i64,
    pub ac: i32,
    pub hit: bool,
    pub is_crit: bool,
    pub nat1: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HitCount {
    Exact { hits: u32, critical_hits: u32 },
    /// The table does not model critical hits.
    Approximate { hits: u32 },
}

impl HitCount {
    pub fn hits(&self) -> u32 {
        match *self {
            HitCount::Exact { hits, .. } | HitCount::Approximate { hits } => hits,
        }
    }

    pub fn critical_hits(&self) -> Option<u32> {
        match *self {
            HitCount::Exact { critical_hits, .. } => Some(critical_hits),
            HitCount::Approximate { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resolution {
    Hits(HitCount),
    HitsWithDamage { hits: HitCount, total_damage: f64 },
}

impl Resolution {
    pub fn hit_count(&self) -> HitCount {
        match *self {
            Resolution::Hits(hits) | Resolution::HitsWithDamage { hits, .. } => hits,
        }
    }

    pub fn hits(&self) -> u32 {
        self.hit_count().hits()
    }

    pub fn total_damage(&self) -> Option<f64> {
        match *self {
            Resolution::Hits(_) => None,
            Resolution::HitsWithDamage { total_damage, .. } => Some(total_damage),
        }
    }
}

/// Roll one attack: a kept 20 always hits and crits, a kept 1 always misses,
/// anything else hits when roll + to_hit meets the AC.
pub fn attack(dice: &mut Dice, mode: AdMode, to_hit: i32, ac: i32) -> AttackRoll {
    let (raw_rolls, roll) = dice.d20_detailed(mode);
    let total = i64::from(roll) + i64::from(to_hit);
    let nat20 = roll == 20;
    let nat1 = roll == 1;
    let hit = nat20 || (!nat1 && total >= i64::from(ac));
    trace!(?raw_rolls, roll, total, ac, hit, "attack rolled");
    AttackRoll { raw_rolls, roll, total, ac, hit, is_crit: nat20, nat1 }
}

/// Roll every attack in the batch.
pub fn simulate_hits(dice: &mut Dice, batch: &AttackBatch) -> HitCount {
    let mode = batch.mode();
    let mut hits = 0u32;
    let mut critical_hits = 0u32;
    for _ in 0..batch.attacks {
        let atk = attack(dice, mode, batch.to_hit, batch.armor_class);
        if atk.hit {
            hits += 1;
        }
        if atk.is_crit {
            critical_hits += 1;
        }
    }
    debug!(attacks = batch.attacks, ?mode, hits, critical_hits, "simulated batch");
    HitCount::Exact { hits, critical_hits }
}

/// Estimate hits from the mob attack table. Consumes no randomness.
pub fn estimate_hits(batch: &AttackBatch, policy: LookupPolicy) -> Result<HitCount, EngineError> {
    let roll_needed = batch.roll_needed();
    let divisor = policy.divisor(roll_needed)?;
    let hits = batch.attacks / divisor;
    debug!(attacks = batch.attacks, roll_needed, divisor, hits, "estimated batch from table");
    Ok(HitCount::Approximate { hits })
}

pub fn count_hits(
    dice: &mut Dice,
    batch: &AttackBatch,
    policy: LookupPolicy,
) -> Result<HitCount, EngineError> {
    if batch.approximate {
        estimate_hits(batch, policy)
    } else {
        Ok(simulate_hits(dice, batch))
    }
}

/// Count hits and, when the batch carries an average damage, total damage.
pub fn resolve(
    dice: &mut Dice,
    batch: &AttackBatch,
    policy: LookupPolicy,
) -> Result<Resolution, EngineError> {
    batch.validate()?;
    let hits = count_hits(dice, batch, policy)?;
    Ok(match batch.damage_per_hit {
        Some(dmg) => Resolution::HitsWithDamage {
            hits,
            total_damage: dmg * f64::from(hits.hits()),
        },
        None => Resolution::Hits(hits),
    })
}
