use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use cleanup_constraint::domain::closure::{ClosureStrategy, compute_closures_with};
use cleanup_constraint::domain::storage::{FileSizeSource, cleanup_summary, estimate_all};
use cleanup_constraint::domain::workflow::job::JobKind;
use cleanup_constraint::error::Result;
use cleanup_constraint::{load_workflow, logger};

/// Prints the ancestor count and storage delta of every job in a workflow.
#[derive(Debug, Parser)]
#[command(name = "cleanup-report", version)]
struct Cli {
    /// Workflow description (JSON).
    #[arg(long)]
    workflow: PathBuf,

    /// Size manifest (CSV). Declared file sizes are used without it.
    #[arg(long)]
    sizes: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = StrategyArg::LevelMarker)]
    strategy: StrategyArg,

    /// error, warn, info, debug or trace. Overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    LevelMarker,
    Topological,
}

impl From<StrategyArg> for ClosureStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::LevelMarker => ClosureStrategy::LevelMarker,
            StrategyArg::Topological => ClosureStrategy::Topological,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = cli.log_level.as_deref().and_then(|s| s.parse::<LevelFilter>().ok());
    logger::init_with_level(level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let dag = load_workflow(&cli.workflow)?;
    let sizes = FileSizeSource::load_or_fallback(cli.sizes.as_deref());
    log::info!("File sizes resolved in {:?} mode.", sizes.mode());

    let closures = compute_closures_with(&dag, cli.strategy.into());
    let deltas = estimate_all(&dag, &sizes)?;

    let mut rows: Vec<_> = dag.iter().collect();
    rows.sort_by(|(_, a), (_, b)| a.id.cmp(&b.id));

    println!("{:<32} {:<20} {:>10} {:>16}", "job", "kind", "ancestors", "delta_bytes");
    for (key, job) in &rows {
        let ancestors = closures.ancestors(*key).map(|set| set.len()).unwrap_or(0);
        let delta = deltas.get(key).copied().unwrap_or(0);
        println!("{:<32} {:<20} {:>10} {:>16}", job.id, job.kind, ancestors, delta);
    }

    for (key, job) in &rows {
        if job.kind == JobKind::Cleanup {
            println!("{}", cleanup_summary(&dag, *key, &sizes)?);
        }
    }

    Ok(())
}
