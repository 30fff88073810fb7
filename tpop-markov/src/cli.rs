use clap::Parser;
use std::path::PathBuf;
use libtpop::markov::DEFAULT_STATE_BUCKETS;
use libtpop::table::DEFAULT_GROWTH_SHIFT;

/// Reads words from files or stdin, builds a Markov chain over two-word prefixes and prints
/// text generated from it, one word per line.
#[derive(Parser, Debug)]
#[command(name = "tpop-markov", version)]
pub struct Cli {
    /// Number of words to print. The initial prefix is always printed whole.
    #[arg(short = 'c', long, default_value_t = 100)]
    pub count: usize,

    /// Seed for the random generator. Without one every run differs.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Initial bucket count of the word and prefix tables.
    #[arg(long, default_value_t = DEFAULT_STATE_BUCKETS)]
    pub buckets: usize,

    /// Tables grow once more than `buckets >> growth-shift` buckets are occupied.
    #[arg(long = "growth-shift", default_value_t = DEFAULT_GROWTH_SHIFT)]
    pub growth_shift: u32,

    /// Log table growth and training progress to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Input files. `-` or no files at all reads stdin.
    pub files: Vec<PathBuf>,
}
