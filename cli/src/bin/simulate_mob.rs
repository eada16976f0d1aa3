use clap::Parser;
use engine::api::{resolve_many, NamedBatch, TrialSummary};
use engine::AttackBatch;
use mobcalc_cli::{init_tracing, policy_from_flag, read_batch_file, Adv};
use std::path::PathBuf;
use tracing::info;

const DEFAULT_SEED: u64 = 12345;

#[derive(Parser)]
#[command(name = "simulate-mob")]
#[command(about = "Monte Carlo sim: resolve a batch of attacks many times")]
struct Args {
    /// Batch file (.json/.yaml/.yml); every batch in it is simulated
    #[arg(long, conflicts_with_all = ["attacks", "ac", "to_hit", "damage", "adv", "approximate"])]
    file: Option<PathBuf>,

    /// Number of identical attacks per trial
    #[arg(long, required_unless_present = "file")]
    attacks: Option<u32>,

    /// Armor class of the target
    #[arg(long, allow_negative_numbers = true, default_value_t = 10)]
    ac: i32,

    /// To-hit bonus of the attackers
    #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
    to_hit: i32,

    /// Average damage per hit
    #[arg(long)]
    damage: Option<f64>,

    /// Advantage mode
    #[arg(long, value_enum, default_value_t = Adv::Normal)]
    adv: Adv,

    /// Use the DMG mob attack table instead of rolling
    #[arg(long, default_value_t = false)]
    approximate: bool,

    /// Fail instead of clamping when the roll needed is outside 1..=20;
    /// overrides the policy of a batch file
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Number of trials
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// RNG base seed (trial i uses seed+i); defaults to the batch file's
    /// seed, else 12345
    #[arg(long)]
    seed: Option<u64>,
}

fn batch_from_args(args: &Args, attacks: u32) -> AttackBatch {
    AttackBatch {
        attacks,
        armor_class: args.ac,
        to_hit: args.to_hit,
        damage_per_hit: args.damage,
        advantage: args.adv == Adv::Advantage,
        disadvantage: args.adv == Adv::Disadvantage,
        approximate: args.approximate,
    }
}

fn pct(x: f64) -> String {
    format!("{:.1}%", x * 100.0)
}

fn print_summary(name: &str, batch: &AttackBatch, summary: &TrialSummary) {
    println!("simulate-mob results: {}", name);
    println!("-------------------");
    println!("trials:             {}", summary.trials);
    println!(
        "batch:              {} attacks, {:+} vs AC {} ({:?})",
        batch.attacks,
        batch.to_hit,
        batch.armor_class,
        batch.mode()
    );
    println!(
        "mode:               {}",
        if summary.approximate { "table" } else { "rolled" }
    );
    println!();
    println!("mean hits:          {:.2}", summary.mean_hits);
    println!(
        "hits range:         {}..={}",
        summary.min_hits, summary.max_hits
    );
    println!("hit rate:           {}", pct(summary.hit_rate));
    println!("expected hits:      {:.2}", summary.expected_hits);
    if let Some(crits) = summary.mean_critical_hits {
        println!("mean crits:         {:.2}", crits);
    }
    if let Some(dmg) = summary.mean_damage {
        println!("mean damage:        {:.2}", dmg);
    }
    println!();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let (batches, policy, seed) = if let Some(path) = args.file.as_ref() {
        let file = read_batch_file(path, args.strict)?;
        let seed = args.seed.unwrap_or(file.seed);
        (file.batches, file.policy, seed)
    } else {
        let attacks = args
            .attacks
            .ok_or_else(|| anyhow::anyhow!("--attacks is required without --file"))?;
        let named = NamedBatch {
            name: "cli".to_string(),
            batch: batch_from_args(&args, attacks),
        };
        (
            vec![named],
            policy_from_flag(args.strict),
            args.seed.unwrap_or(DEFAULT_SEED),
        )
    };
    info!(batches = batches.len(), seed, ?policy, trials = args.trials, "simulating");

    println!("seed:               {}", seed);
    println!();
    for named in &batches {
        let summary = resolve_many(&named.batch, args.trials, seed, policy)?;
        print_summary(&named.name, &named.batch, &summary);
    }

    Ok(())
}
