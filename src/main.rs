//! lshmatch - batch MinHash/LSH matcher
//!
//! Indexes one or more JSON-lines corpus files, then matches a JSON-lines
//! query file against them and prints every accepted match.

use std::path::PathBuf;

use anyhow::{bail, Context};
use lshmatch::{open_json_lines, Engine, LshMatchConfig, MatchOutcome};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: lshmatch [--config FILE] --queries FILE CORPUS...";

struct Args {
    config: Option<PathBuf>,
    queries: PathBuf,
    corpora: Vec<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut config = None;
    let mut queries = None;
    let mut corpora = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            "-c" | "--config" => {
                config = Some(PathBuf::from(args.next().context("--config needs a file")?));
            }
            "-q" | "--queries" => {
                queries = Some(PathBuf::from(args.next().context("--queries needs a file")?));
            }
            flag if flag.starts_with('-') => bail!("unknown option {flag}\n{USAGE}"),
            path => corpora.push(PathBuf::from(path)),
        }
    }

    let Some(queries) = queries else {
        bail!("missing --queries\n{USAGE}");
    };
    if corpora.is_empty() {
        bail!("at least one corpus file is required\n{USAGE}");
    }
    Ok(Args {
        config,
        queries,
        corpora,
    })
}

fn main() -> anyhow::Result<()> {
    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => LshMatchConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LshMatchConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut engine = Engine::new(config)?;
    let lsh = &engine.config().lsh;
    info!(
        BANDS = lsh.minhash_bands,
        ROWS = lsh.minhash_rows_per_band,
        NUM_HASHES = lsh.num_hashes()?,
        SIMILARITY_THRESHOLD = engine.similarity_threshold(),
        "lsh parameters"
    );

    for path in &args.corpora {
        let records = open_json_lines(path)
            .with_context(|| format!("opening corpus {}", path.display()))?;
        let stats = engine.index_corpus(records);
        info!(
            source = %path.display(),
            total = stats.total_count,
            indexed = stats.indexed_count,
            failed = stats.failed_count,
            "corpus source done"
        );
        for failure in &stats.failures {
            warn!(source = %path.display(), %failure, "corpus record skipped");
        }
    }

    let queries = open_json_lines(&args.queries)
        .with_context(|| format!("opening queries {}", args.queries.display()))?;
    let report = engine.match_queries(queries)?;

    for result in &report.results {
        match &result.outcome {
            MatchOutcome::Matched { hit } => println!(
                "{} ({}) -> {} ({}) score={:.3}",
                result.query_title, result.query_id, hit.title, hit.id, hit.lsh_similarity
            ),
            MatchOutcome::BelowThreshold { best, threshold } => println!(
                "{} ({}) -> no match (best {} at {:.3} < {:.3})",
                result.query_title, result.query_id, best.id, best.lsh_similarity, threshold
            ),
            MatchOutcome::NoCandidates => println!(
                "{} ({}) -> no candidates",
                result.query_title, result.query_id
            ),
        }
    }

    for failure in &report.failures {
        println!("query failed: {failure}");
    }

    let stats = &report.stats;
    println!(
        "requests={} matched={} unmatched={} failed={}",
        stats.request_count,
        stats.matched,
        stats.unmatched(),
        stats.failed
    );
    match &report.accuracy {
        Some(acc) => println!("MSE={:.6} RMSE={:.6} over {} pairs", acc.mse, acc.rmse, acc.pairs),
        None => println!("MSE=n/a RMSE=n/a (no scored pairs)"),
    }

    Ok(())
}
