use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::content::builtin_batches;
use crate::odds::expected_hits;
use crate::{resolve, AttackBatch, Dice, EngineError, LookupPolicy, Resolution};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchFormat {
    Json,
    Yaml,
}

impl BatchFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Ok(BatchFormat::Json),
            Some("yaml") | Some("yml") => Ok(BatchFormat::Yaml),
            _ => bail!(
                "cannot tell batch format of {} (expected .json, .yaml or .yml)",
                path.display()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct NamedBatch {
    pub name: String,
    #[serde(flatten)]
    pub batch: AttackBatch,
}

/// On-disk shape of a `NamedBatch`. Spelled out rather than flattened so
/// misspelled keys are rejected.
#[derive(Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
struct NamedBatchEntry {
    name: String,
    attacks: u32,
    armor_class: i32,
    to_hit: i32,
    #[serde(default)]
    damage_per_hit: Option<f64>,
    #[serde(default)]
    advantage: bool,
    #[serde(default)]
    disadvantage: bool,
    #[serde(default)]
    approximate: bool,
}

impl From<NamedBatchEntry> for NamedBatch {
    fn from(e: NamedBatchEntry) -> Self {
        NamedBatch {
            name: e.name,
            batch: AttackBatch {
                attacks: e.attacks,
                armor_class: e.armor_class,
                to_hit: e.to_hit,
                damage_per_hit: e.damage_per_hit,
                advantage: e.advantage,
                disadvantage: e.disadvantage,
                approximate: e.approximate,
            },
        }
    }
}

impl<'de> Deserialize<'de> for NamedBatch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        NamedBatchEntry::deserialize(deserializer).map(NamedBatch::from)
    }
}

/// A set of batches resolved together with one dice stream.
///
/// `seed` and `policy` apply to every batch in the file. `resolve_batch_file`
/// uses them as written; callers that want to override either (the CLI's
/// `--seed`/`--strict`) replace the field before resolving. Unknown keys,
/// here or in any batch, fail the parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct BatchFile {
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub policy: LookupPolicy,
    pub batches: Vec<NamedBatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BatchReport {
    pub name: String,
    pub batch: AttackBatch,
    pub resolution: Resolution,
    /// Hits an infinitely long simulation would average.
    pub expected_hits: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TrialSummary {
    pub trials: u32,
    pub attacks: u32,
    pub approximate: bool,
    pub mean_hits: f64,
    pub min_hits: u32,
    pub max_hits: u32,
    pub hit_rate: f64,
    pub mean_critical_hits: Option<f64>,
    pub mean_damage: Option<f64>,
    pub expected_hits: f64,
}

pub fn parse_batches(text: &str, format: BatchFormat) -> Result<BatchFile> {
    let file: BatchFile = match format {
        BatchFormat::Json => serde_json::from_str(text).context("failed to parse batch JSON")?,
        BatchFormat::Yaml => serde_yaml::from_str(text).context("failed to parse batch YAML")?,
    };
    Ok(file)
}

pub fn load_batches(path: impl AsRef<Path>) -> Result<BatchFile> {
    let path = path.as_ref();
    let format = BatchFormat::from_path(path)?;
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read batch file: {}", path.display()))?;
    parse_batches(&text, format).with_context(|| format!("in {}", path.display()))
}

pub fn load_builtin(id: &str) -> Result<BatchFile> {
    let builtins = builtin_batches();
    let (format, text) = builtins
        .get(id)
        .ok_or_else(|| anyhow!("unknown builtin batch '{}'", id))?;
    parse_batches(text, *format).with_context(|| format!("builtin batch '{}'", id))
}

/// Resolve every batch in order, drawing from one dice stream seeded by the file.
pub fn resolve_batch_file(file: &BatchFile) -> Result<Vec<BatchReport>> {
    let mut dice = Dice::from_seed(file.seed);
    info!(seed = file.seed, batches = file.batches.len(), "resolving batch file");
    file.batches
        .iter()
        .map(|named| -> Result<BatchReport> {
            let resolution = resolve(&mut dice, &named.batch, file.policy)
                .with_context(|| format!("batch '{}'", named.name))?;
            Ok(BatchReport {
                name: named.name.clone(),
                batch: named.batch,
                resolution,
                expected_hits: expected_hits(&named.batch),
            })
        })
        .collect()
}

/// Resolve the same batch `trials` times; trial `i` rolls with `seed + i`.
pub fn resolve_many(
    batch: &AttackBatch,
    trials: u32,
    seed: u64,
    policy: LookupPolicy,
) -> Result<TrialSummary, EngineError> {
    batch.validate()?;
    let mut total_hits = 0u64;
    let mut total_crits = 0u64;
    let mut total_damage = 0.0f64;
    let mut min_hits = u32::MAX;
    let mut max_hits = 0u32;

    for i in 0..trials {
        let mut dice = Dice::from_seed(seed.wrapping_add(u64::from(i)));
        let res = resolve(&mut dice, batch, policy)?;
        let hits = res.hits();
        total_hits += u64::from(hits);
        total_crits += u64::from(res.hit_count().critical_hits().unwrap_or(0));
        total_damage += res.total_damage().unwrap_or(0.0);
        min_hits = min_hits.min(hits);
        max_hits = max_hits.max(hits);
    }

    let n = f64::from(trials.max(1));
    let mean_hits = total_hits as f64 / n;
    let hit_rate = if batch.attacks == 0 {
        0.0
    } else {
        mean_hits / f64::from(batch.attacks)
    };
    debug!(trials, mean_hits, "trials complete");

    Ok(TrialSummary {
        trials,
        attacks: batch.attacks,
        approximate: batch.approximate,
        mean_hits,
        min_hits: if trials == 0 { 0 } else { min_hits },
        max_hits,
        hit_rate,
        mean_critical_hits: (!batch.approximate).then(|| total_crits as f64 / n),
        mean_damage: batch.damage_per_hit.map(|_| total_damage / n),
        expected_hits: expected_hits(batch),
    })
}
