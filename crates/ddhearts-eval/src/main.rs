use std::fs;
use std::ops::ControlFlow;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use ddhearts_core::AppInfo;
use ddhearts_core::game::{DealSnapshot, GameState};
use ddhearts_core::model::card::parse_cards;
use ddhearts_core::search::run_exhaustive_search;
use ddhearts_eval::config::{LoggingConfig, StatsConfig};
use ddhearts_eval::evaluator::evaluate_fixed_hand;
use ddhearts_eval::hands::sort_for_report;
use ddhearts_eval::logging::init_logging;
use ddhearts_eval::runner::run_to_csv;

/// Double-dummy search and hand statistics for Hearts.
#[derive(Debug, Parser)]
#[command(
    name = "ddhearts",
    author,
    version,
    about = "Exhaustive Hearts search and fixed-hand playout statistics"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Enumerate every line of play from a deal.
    Search(SearchArgs),
    /// Estimate the score of one 10-card hand.
    Eval(EvalArgs),
    /// Evaluate many random hands in parallel and write them to CSV.
    Stats(StatsArgs),
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Seed for a random deal (two of clubs with North).
    #[arg(long, value_name = "SEED", conflicts_with = "deal")]
    seed: Option<u64>,

    /// JSON deal file with `north`, `east`, `south` and `west` card lists.
    #[arg(long, value_name = "FILE")]
    deal: Option<PathBuf>,

    /// Stop after this many finished positions.
    #[arg(long, value_name = "COUNT")]
    max_leaves: Option<u64>,
}

#[derive(Debug, Args)]
struct EvalArgs {
    /// Ten cards, e.g. "SQ,HA,HK,D2,D3,C4,C5,S2,S3,H9".
    #[arg(long, value_name = "CARDS")]
    hand: String,

    /// Number of random playouts.
    #[arg(long, value_name = "COUNT", default_value_t = 1_000)]
    samples: usize,

    /// RNG seed; random when omitted.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
}

#[derive(Debug, Args)]
struct StatsArgs {
    /// Path to a YAML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the number of hands to evaluate.
    #[arg(long, value_name = "HANDS")]
    hands: Option<usize>,

    /// Override the playouts per hand.
    #[arg(long, value_name = "COUNT")]
    samples: Option<usize>,

    /// Override the worker thread count.
    #[arg(long, value_name = "COUNT")]
    workers: Option<usize>,

    /// Override the master RNG seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the CSV path ({run_id} is substituted).
    #[arg(long, value_name = "PATH")]
    output: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Search(args) => search(args),
        Command::Eval(args) => eval(args),
        Command::Stats(args) => stats(args),
    }
}

fn search(args: SearchArgs) -> anyhow::Result<()> {
    let _logging_guard = init_logging(&LoggingConfig::default(), None)?;

    let mut game = match args.deal.as_ref() {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading deal file {}", path.display()))?;
            DealSnapshot::from_json(&json)
                .with_context(|| format!("parsing deal file {}", path.display()))?
                .restore()?
        }
        None => {
            let mut rng = StdRng::seed_from_u64(args.seed.unwrap_or(0));
            GameState::new_game(true, &mut rng)
        }
    };

    println!("{} {}", AppInfo::name(), AppInfo::version());
    println!("{game}");

    let limit = args.max_leaves.unwrap_or(u64::MAX);
    let mut seen = 0u64;
    let stats = run_exhaustive_search(&mut game, |_| {
        seen += 1;
        if seen >= limit {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;

    println!(
        "{} {} leaves ({} tricks played, max depth {})",
        if stats.completed { "Exhausted" } else { "Stopped after" },
        stats.leaves,
        stats.tricks_played,
        stats.max_depth
    );
    Ok(())
}

fn eval(args: EvalArgs) -> anyhow::Result<()> {
    let _logging_guard = init_logging(&LoggingConfig::default(), None)?;

    let mut hand = parse_cards(&args.hand)?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let evaluation = evaluate_fixed_hand(&hand, args.samples, &mut rng)?;

    sort_for_report(&mut hand);
    let cards: Vec<String> = hand.iter().map(ToString::to_string).collect();
    println!(
        "{}: mean {:.3}, stddev {:.3} over {} playouts",
        cards.join(" "),
        evaluation.mean,
        evaluation.stddev,
        evaluation.samples
    );
    Ok(())
}

fn stats(args: StatsArgs) -> anyhow::Result<()> {
    let mut config = match args.config.as_ref() {
        Some(path) => StatsConfig::from_path(path)?,
        None => StatsConfig::default(),
    };

    if let Some(hands) = args.hands {
        config.hands = hands;
    }

    if let Some(samples) = args.samples {
        config.samples_per_hand = samples;
    }

    if let Some(workers) = args.workers {
        config.workers = workers;
    }

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    if let Some(output) = args.output {
        config.output = output;
    }

    config.validate()?;

    let log_file = config.resolved_log_file();
    let _logging_guard = init_logging(&config.logging, log_file.as_deref())?;

    println!(
        "Loaded configuration '{}' ({} hands × {} playouts on {} worker{})",
        config.run_id,
        config.hands,
        config.samples_per_hand,
        config.workers,
        if config.workers == 1 { "" } else { "s" }
    );

    let (summary, path) = run_to_csv(&config)?;
    println!(
        "Wrote {} of {} hands to {} in {:.1}s (seed {})",
        summary.hands_written,
        summary.hands_requested,
        path.display(),
        summary.elapsed.as_secs_f64(),
        summary.seed
    );
    if summary.failures > 0 {
        bail!("{} hand evaluations failed; see the log for details", summary.failures);
    }
    Ok(())
}
