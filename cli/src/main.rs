use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use engine::api::{load_builtin, resolve_batch_file};
use engine::content::builtin_batches;
use engine::{crit_chance, hit_chance, resolve, AttackBatch, Dice, LookupPolicy, Resolution, TABLE};
use mobcalc_cli::{init_tracing, policy_from_flag, read_batch_file, to_mode, Adv};
use std::path::PathBuf;
use tracing::info;

/// Flags shared by every command that describes one batch of attacks.
#[derive(Args)]
struct BatchArgs {
    /// Number of identical attacks
    #[arg(long)]
    attacks: u32,
    /// Armor class of the target
    #[arg(long, allow_negative_numbers = true)]
    ac: i32,
    /// To-hit bonus of the attackers
    #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
    to_hit: i32,
    /// Average damage per hit; when given, total damage is reported
    #[arg(long)]
    damage: Option<f64>,
    /// Roll twice, keep the higher (wins over --disadvantage)
    #[arg(long)]
    advantage: bool,
    /// Roll twice, keep the lower
    #[arg(long)]
    disadvantage: bool,
    /// Use the DMG mob attack table instead of rolling
    #[arg(long)]
    approximate: bool,
    /// Fail instead of clamping when the roll needed is outside 1..=20
    #[arg(long)]
    strict: bool,
}

impl BatchArgs {
    fn batch(&self) -> AttackBatch {
        AttackBatch {
            attacks: self.attacks,
            armor_class: self.ac,
            to_hit: self.to_hit,
            damage_per_hit: self.damage,
            advantage: self.advantage,
            disadvantage: self.disadvantage,
            approximate: self.approximate,
        }
    }

    fn policy(&self) -> LookupPolicy {
        policy_from_flag(self.strict)
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Resolve one batch of attacks
    Resolve {
        #[command(flatten)]
        batch: BatchArgs,
        /// RNG seed for determinism
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Print the resolution as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the mob attack table
    Table,
    /// Exact per-attack hit and crit chances
    Odds {
        /// Armor class of the target
        #[arg(long, allow_negative_numbers = true)]
        ac: i32,
        /// To-hit bonus of the attacker
        #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
        to_hit: i32,
        /// Advantage mode
        #[arg(long, value_enum, default_value_t = Adv::Normal)]
        adv: Adv,
    },
    /// Resolve every batch in a JSON/YAML file (or a built-in one) and print JSON reports
    Batch {
        /// Path to a .json, .yaml or .yml batch file
        #[arg(long, conflicts_with = "builtin", required_unless_present_any = ["builtin", "list"])]
        file: Option<PathBuf>,
        /// Id of a built-in batch file
        #[arg(long)]
        builtin: Option<String>,
        /// List built-in batch ids and exit
        #[arg(long)]
        list: bool,
        /// Fail instead of clamping, whatever policy the file names
        #[arg(long)]
        strict: bool,
        /// Pretty-print JSON
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
}

#[derive(Parser)]
#[command(name = "mobcalc")]
#[command(about = "Estimate how many of a group of attacks hit, and for how much")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

fn describe(res: &Resolution) -> String {
    let mut out = format!("hits={}", res.hits());
    if let Some(crits) = res.hit_count().critical_hits() {
        out.push_str(&format!(" crits={}", crits));
    }
    if let Some(dmg) = res.total_damage() {
        out.push_str(&format!(" damage={:.1}", dmg));
    }
    out
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Resolve { batch, seed, json } => {
            info!(seed, "resolving single batch");
            let mut dice = Dice::from_seed(seed);
            let res = resolve(&mut dice, &batch.batch(), batch.policy())?;
            if json {
                println!("{}", serde_json::to_string(&res)?);
            } else {
                println!("{}", describe(&res));
            }
        }
        Cmd::Table => {
            println!("roll needed | attackers per hit");
            for band in TABLE {
                let range = if band.low == band.high {
                    band.low.to_string()
                } else {
                    format!("{}-{}", band.low, band.high)
                };
                println!("{:>11} | {}", range, band.attackers);
            }
        }
        Cmd::Odds { ac, to_hit, adv } => {
            let mode = to_mode(adv);
            println!(
                "hit={:.2}% crit={:.2}%",
                hit_chance(ac, to_hit, mode) * 100.0,
                crit_chance(mode) * 100.0
            );
        }
        Cmd::Batch {
            file,
            builtin,
            list,
            strict,
            pretty,
        } => {
            if list {
                for id in builtin_batches().keys() {
                    println!("{}", id);
                }
                return Ok(());
            }
            let batch_file = match (file, builtin) {
                (Some(path), _) => read_batch_file(&path, strict)?,
                (None, Some(id)) => {
                    let mut builtin = load_builtin(&id)?;
                    if strict {
                        builtin.policy = LookupPolicy::Strict;
                    }
                    builtin
                }
                (None, None) => anyhow::bail!("either --file or --builtin is required"),
            };
            let reports = resolve_batch_file(&batch_file).context("batch resolution failed")?;
            if pretty {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                println!("{}", serde_json::to_string(&reports)?);
            }
        }
    }
    Ok(())
}
