mod cli;

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use libtpop::intern::Interner;
use libtpop::markov::{MarkovModel, Trainer, NPREF};
use libtpop::table::TableConfig;
use libtpop::text::words::Words;
use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = TableConfig::default()
        .with_initial_buckets(cli.buckets)
        .with_growth_shift(cli.growth_shift);
    let mut trainer = Trainer::new(Interner::with_config(config)?, MarkovModel::with_config(config)?);

    let stdin = [PathBuf::from("-")];
    let files = if cli.files.is_empty() { &stdin[..] } else { &cli.files[..] };
    for path in files {
        let text = read_input(path)?;
        train(&mut trainer, &text).with_context(|| format!("failed to train on {}", path.display()))?;
    }
    debug!(words = trainer.interner().len(), prefixes = trainer.model().len(), "training done");

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy()
    };
    let words = trainer.model().generate(&mut rng, cli.count);
    if words.is_empty() {
        warn!("input has fewer than {} words, nothing to generate", NPREF + 1);
    }

    let mut out = BufWriter::new(io::stdout().lock());
    for word in &words {
        out.write_all(word)?;
        out.write_all(b"\n")?;
    }
    out.flush().context("failed to write generated text")?;
    return Ok(());
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    let mut text = Vec::new();
    if path.as_os_str() == "-" {
        io::stdin().lock().read_to_end(&mut text).context("failed to read stdin")?;
    } else {
        File::open(path)
            .and_then(|mut file| file.read_to_end(&mut text))
            .with_context(|| format!("failed to read {}", path.display()))?;
    }
    return Ok(text);
}

/// Feeds every word of `text` to `trainer`. Successive inputs continue one word stream, so a
/// prefix can span the end of one file and the start of the next.
fn train(trainer: &mut Trainer<NPREF>, text: &[u8]) -> libtpop::Result<()> {
    for word in Words::new(text) {
        trainer.feed(word)?;
    }
    return Ok(());
}
