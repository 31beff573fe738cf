//! wordup: expand a seed vocabulary into a target-flavored wordlist.
//!
//! Seed material comes from local files: newline word lists (`--seed`) and
//! text or saved HTML documents (positional inputs, files or directories).
//! Optional outputs: rule-based variations of the most frequent words
//! (`--mangle`) and a JSON run report (`--stats`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use wordup_core::config::{
    DEFAULT_ATTEMPTS_PER_WORD, DEFAULT_MAX_SYNTH_LEN, DEFAULT_MIN_WORD_LEN, DEFAULT_MULTIPLIER,
    DEFAULT_ORDER, DEFAULT_SENTINEL, DEFAULT_STALL_LIMIT,
};
use wordup_core::corpus::top_words;
use wordup_core::io::{list_files, normalize_folder, read_file, read_wordlist, save_wordlist};
use wordup_core::{
    Engine, EngineReport, MangleOptions, Mangler, MarkovConfig, ModelStats, Outcome, SeedCorpus, WordExtractor,
};

const RAW_WORDLIST: &str = "wordlist_raw.txt";
const EXPANDED_WORDLIST: &str = "wordlist_expanded.txt";
const MANGLED_WORDLIST: &str = "wordlist_mangled.txt";
const STATS_FILE: &str = "wordlist_stats.json";
const DOCUMENT_EXTENSIONS: &[&str] = &["txt", "text", "html", "htm"];

#[derive(Parser, Debug)]
#[command(name = "wordup")]
#[command(about = "Content-aware wordlist generator: Markov expansion of a target's own vocabulary")]
#[command(version)]
struct Args {
    /// Text or HTML documents (or directories of them) to harvest words from
    inputs: Vec<PathBuf>,

    /// Newline-delimited seed word list (repeatable)
    #[arg(short = 's', long = "seed")]
    seeds: Vec<PathBuf>,

    /// Directory receiving wordlist_raw.txt and wordlist_expanded.txt
    #[arg(short = 'o', long, env = "WORDUP_OUTPUT_DIR", default_value = ".")]
    output_dir: String,

    /// Markov order (context length)
    #[arg(long, env = "WORDUP_ORDER", default_value_t = DEFAULT_ORDER)]
    order: usize,

    /// Minimum word length, for seeds and generated words
    #[arg(short = 'm', long = "min-len", env = "WORDUP_MIN_LEN", default_value_t = DEFAULT_MIN_WORD_LEN)]
    min_len: usize,

    /// Maximum length of a generated word
    #[arg(short = 'x', long = "max-len", env = "WORDUP_MAX_LEN", default_value_t = DEFAULT_MAX_SYNTH_LEN)]
    max_len: usize,

    /// Expansion factor: generate seed size * multiplier words
    #[arg(short = 'n', long, env = "WORDUP_MULTIPLIER", default_value_t = DEFAULT_MULTIPLIER)]
    multiplier: usize,

    /// Synthesis attempts allowed per requested word
    #[arg(long, env = "WORDUP_ATTEMPTS_PER_WORD", default_value_t = DEFAULT_ATTEMPTS_PER_WORD)]
    attempts_per_word: usize,

    /// Consecutive attempts without a new word before giving up
    #[arg(long, env = "WORDUP_STALL_LIMIT", default_value_t = DEFAULT_STALL_LIMIT)]
    stall_limit: usize,

    /// Worker threads (1 = single-threaded, 0 = one per CPU)
    #[arg(short = 'w', long, env = "WORDUP_WORKERS", default_value_t = 1)]
    workers: usize,

    /// Seed for the random generator, for reproducible runs
    #[arg(long, env = "WORDUP_RNG_SEED")]
    rng_seed: Option<u64>,

    /// Number of most frequent harvested words to report
    #[arg(short = 't', long, default_value_t = 20)]
    top: usize,

    /// Write leetspeak, separator, digit and suffix variations of the N most
    /// frequent words to wordlist_mangled.txt (0 = off)
    #[arg(long, env = "WORDUP_MANGLE", default_value_t = 0, value_name = "N")]
    mangle: usize,

    /// Write a JSON report of the run to wordlist_stats.json
    #[arg(long)]
    stats: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> MarkovConfig {
        MarkovConfig {
            order: self.order,
            min_word_len: self.min_len,
            max_synth_len: self.max_len,
            multiplier: self.multiplier,
            attempts_per_word: self.attempts_per_word,
            stall_limit: self.stall_limit,
            sentinel: DEFAULT_SENTINEL,
        }
    }
}

/// Contents of wordlist_stats.json.
#[derive(Serialize, Debug)]
struct RunStats<'a> {
    config: &'a MarkovConfig,
    seed_words: usize,
    usable_words: usize,
    harvested_tokens: usize,
    target: usize,
    generated: usize,
    attempts: usize,
    outcome: String,
    mangled_words: usize,
    top_words: Vec<(String, usize)>,
    model: Option<ModelStats>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    run(&args)
}

fn run(args: &Args) -> Result<()> {
    // Fail fast on a bad configuration, before touching any input
    let engine = Engine::new(args.config()).context("Invalid configuration")?;

    let output_dir = normalize_folder(&args.output_dir);
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Cannot create output directory {}", output_dir.display()))?;

    // Phase 1: seed corpus
    let (corpus, harvested) = collect_corpus(args)?;
    info!("Total unique seed words: {}", corpus.len());

    let top = top_words(&harvested, args.top);
    if !top.is_empty() {
        println!("Top {} harvested words:", args.top);
        for (word, count) in &top {
            println!("    {word}: {count}");
        }
    }

    let raw_path = output_dir.join(RAW_WORDLIST);
    let raw_count = save_wordlist(&raw_path, corpus.iter())?;
    println!("Raw wordlist saved: {} ({} words)", raw_path.display(), raw_count);

    // Phase 2: Markov expansion
    let report = expand(&engine, &corpus, args)?;
    if let Some(stats) = &report.model {
        debug!("Model statistics: {stats:?}");
    }

    let expansion = &report.expansion;
    let expanded_path = output_dir.join(EXPANDED_WORDLIST);
    let expanded_count = save_wordlist(&expanded_path, &expansion.words)?;

    match expansion.outcome {
        Outcome::Complete => {}
        Outcome::EmptyCorpus => warn!("No usable seed words, nothing to expand"),
        Outcome::Partial(_) => warn!(
            "Target of {} words not reachable from this corpus ({})",
            expansion.target, expansion.outcome
        ),
    }

    println!("{} words generated", expanded_count);
    println!("Expanded wordlist saved: {}", expanded_path.display());

    // Phase 3: rule-based variations
    let mut mangled_words = 0;
    if args.mangle > 0 {
        let bases = mangle_bases(&corpus, &harvested, args.mangle);
        let mangled = Mangler::new(MangleOptions::default()).mangle_all(&bases);
        let mangled_path = output_dir.join(MANGLED_WORDLIST);
        mangled_words = save_wordlist(&mangled_path, &mangled)?;
        println!(
            "Mangled wordlist saved: {} ({} variations of {} words)",
            mangled_path.display(),
            mangled_words,
            bases.len()
        );
    }

    if args.stats {
        let stats = RunStats {
            config: engine.config(),
            seed_words: corpus.len(),
            usable_words: engine.usable_words(&corpus),
            harvested_tokens: harvested.len(),
            target: expansion.target,
            generated: expanded_count,
            attempts: expansion.attempts,
            outcome: expansion.outcome.to_string(),
            mangled_words,
            top_words: top,
            model: report.model,
        };
        let stats_path = output_dir.join(STATS_FILE);
        let json = serde_json::to_string_pretty(&stats).context("Cannot serialize run statistics")?;
        std::fs::write(&stats_path, json)
            .with_context(|| format!("Cannot write {}", stats_path.display()))?;
        println!("Statistics saved: {}", stats_path.display());
    }

    Ok(())
}

/// The most frequent harvested words, or the first seed words when nothing
/// was harvested from documents.
fn mangle_bases(corpus: &SeedCorpus, harvested: &[String], limit: usize) -> Vec<String> {
    if harvested.is_empty() {
        corpus.iter().take(limit).map(str::to_owned).collect()
    } else {
        top_words(harvested, limit).into_iter().map(|(word, _)| word).collect()
    }
}

/// Reads every seed list and document into one corpus.
///
/// Returns the corpus and every harvested document token (duplicates kept,
/// for frequency reporting).
fn collect_corpus(args: &Args) -> Result<(SeedCorpus, Vec<String>)> {
    let mut corpus = SeedCorpus::new(args.min_len);
    let mut harvested = Vec::new();
    let extractor = WordExtractor::new(args.min_len)?;

    for seed in &args.seeds {
        let words = read_wordlist(seed)?;
        debug!("{}: {} seed lines", seed.display(), words.len());
        corpus.extend(words);
    }

    for input in &args.inputs {
        for document in expand_input(input)? {
            let text = read_file(&document)?;
            let words = extractor.document_words(&text);
            debug!("{}: {} words", document.display(), words.len());
            corpus.extend(&words);
            harvested.extend(words);
        }
    }

    Ok((corpus, harvested))
}

/// A file stands for itself, a directory for the documents it contains.
fn expand_input(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_dir() {
        Ok(list_files(input, DOCUMENT_EXTENSIONS)?)
    } else {
        Ok(vec![input.to_path_buf()])
    }
}

fn expand(engine: &Engine, corpus: &SeedCorpus, args: &Args) -> Result<EngineReport> {
    let report = if args.workers == 1 {
        let mut rng = match args.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        engine.expand(corpus, &mut rng)?
    } else {
        let seed = args.rng_seed.unwrap_or_else(rand::random);
        engine.expand_parallel(corpus, args.workers, seed)?
    };
    Ok(report)
}
