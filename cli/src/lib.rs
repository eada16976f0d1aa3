//! Pieces shared by the `mobcalc` and `simulate-mob` binaries.

use std::{fs, path::Path};

use anyhow::Context;
use clap::ValueEnum;
use encoding_rs::Encoding;
use engine::api::{parse_batches, BatchFile, BatchFormat};
use engine::{AdMode, LookupPolicy};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Adv {
    Normal,
    Advantage,
    Disadvantage,
}

pub fn to_mode(a: Adv) -> AdMode {
    match a {
        Adv::Normal => AdMode::Normal,
        Adv::Advantage => AdMode::Advantage,
        Adv::Disadvantage => AdMode::Disadvantage,
    }
}

pub fn policy_from_flag(strict: bool) -> LookupPolicy {
    if strict {
        LookupPolicy::Strict
    } else {
        LookupPolicy::Clamp
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Read a text file, honouring a UTF-8/UTF-16 byte order mark if present.
pub fn read_text_auto(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path)?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

/// Load a batch file, picking JSON or YAML from the extension. A `--strict`
/// flag replaces the policy written in the file.
pub fn read_batch_file(path: &Path, strict: bool) -> anyhow::Result<BatchFile> {
    let format = BatchFormat::from_path(path)?;
    let text = read_text_auto(path)
        .with_context(|| format!("failed to read batch file: {}", path.display()))?;
    let mut file = parse_batches(&text, format).with_context(|| format!("in {}", path.display()))?;
    if strict {
        file.policy = LookupPolicy::Strict;
    }
    debug!(
        path = %path.display(),
        batches = file.batches.len(),
        seed = file.seed,
        policy = ?file.policy,
        "loaded batch file"
    );
    Ok(file)
}
