//! halflife: Monte Carlo simulation of radioactive decay chains.
//!
//! `simulate` runs a population through a chain and writes `<base>.sim` and
//! `<base>.events`; `inspect` prints a chain; `report` turns a finished run
//! into CSV on stdout.

mod settings;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use halflife_core::model::{BranchingPolicy, ChainSpec, DecayChain};
use halflife_core::time::{format_seconds, parse_duration};
use halflife_core::SimulationConfig;
use halflife_io::analysis::{
    energy_series_by, population_series, summarize, EnergyAttribution, IsotopeSeries,
};
use halflife_io::{read_results, write_results};
use halflife_sim::{Execution, PopulationSimulator};
use tracing::{info, warn};

use crate::settings::{LogFormat, Settings};

/// Monte Carlo simulation of radioactive decay chains.
#[derive(Parser, Debug)]
#[command(name = "halflife", version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). Overrides HALFLIFE_LOG_LEVEL.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format. Overrides HALFLIFE_LOG_FORMAT.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a population of particles and write the results.
    Simulate(SimulateArgs),
    /// Print the isotopes and channels of a chain definition.
    Inspect(InspectArgs),
    /// Print a CSV report of a finished run.
    Report(ReportArgs),
}

#[derive(Args, Debug)]
struct ChainArgs {
    /// JSON chain definition.
    #[arg(long)]
    chain: PathBuf,

    /// Accept two-channel isotopes whose probabilities do not sum to 100.
    #[arg(long)]
    allow_unbalanced_branching: bool,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[command(flatten)]
    chain: ChainArgs,

    /// Number of particles, all starting on the first isotope.
    #[arg(long)]
    particles: u64,

    /// Time horizon, e.g. "10 a" or "3.5 h".
    #[arg(long)]
    total_time: String,

    /// Base name of the output files.
    #[arg(long)]
    output: String,

    /// Master seed. Overrides HALFLIFE_SEED; a random seed is used if neither is set.
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads. Overrides HALFLIFE_THREADS; 1 runs on the calling thread.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[command(flatten)]
    chain: ChainArgs,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Base name of a run, or its `.sim` file.
    #[arg(long)]
    input: PathBuf,

    #[arg(long, value_enum, default_value_t = ReportKind::Summary)]
    kind: ReportKind,

    /// Isotopes credited with a decay's energy in the `energy` report.
    #[arg(long, value_enum, default_value_t = Attribution::Source)]
    attribution: Attribution,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Attribution {
    /// The decaying isotope only.
    Source,
    /// The decaying isotope and its daughter.
    Both,
}

impl From<Attribution> for EnergyAttribution {
    fn from(a: Attribution) -> Self {
        match a {
            Attribution::Source => EnergyAttribution::Source,
            Attribution::Both => EnergyAttribution::SourceAndDestination,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ReportKind {
    /// Particles on each isotope over time.
    Population,
    /// Cumulative energy released by each isotope over time.
    Energy,
    /// Per-isotope totals.
    Summary,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let level = cli.log_level.as_deref().unwrap_or(&settings.log_level);
    let format = cli.log_format.unwrap_or(settings.log_format);
    init_logging(level, format);

    match cli.command {
        Commands::Simulate(args) => simulate(args, &settings),
        Commands::Inspect(args) => inspect(args),
        Commands::Report(args) => report(args),
    }
}

fn init_logging(level: &str, format: LogFormat) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so CSV on stdout stays clean.
    if format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_chain(args: &ChainArgs) -> Result<DecayChain> {
    let text = std::fs::read_to_string(&args.chain)
        .with_context(|| format!("reading chain file {}", args.chain.display()))?;
    let spec: ChainSpec = serde_json::from_str(&text)
        .with_context(|| format!("parsing chain file {}", args.chain.display()))?;
    let policy = if args.allow_unbalanced_branching {
        BranchingPolicy::Permissive
    } else {
        BranchingPolicy::Strict
    };
    let chain = spec
        .build(policy)
        .with_context(|| format!("invalid chain in {}", args.chain.display()))?;
    if chain.has_cycle() {
        warn!("chain contains a cycle; trajectories are bounded by the time horizon only");
    }
    Ok(chain)
}

fn simulate(args: SimulateArgs, settings: &Settings) -> Result<()> {
    let chain = load_chain(&args.chain)?;
    let total_time = parse_duration(&args.total_time)
        .with_context(|| format!("invalid --total-time {:?}", args.total_time))?;
    let seed = args
        .seed
        .or(settings.seed)
        .unwrap_or_else(rand::random::<u64>);
    let execution = match args.threads.or(settings.threads) {
        Some(1) => Execution::Sequential,
        threads => Execution::Parallel { threads },
    };

    let config =
        SimulationConfig::new(chain, args.particles, total_time, args.output)?.with_seed(seed);
    info!(
        isotopes = config.decay_chain().len(),
        particles = config.num_particles(),
        horizon = %format_seconds(total_time),
        seed,
        "halflife v{}",
        env!("CARGO_PKG_VERSION")
    );

    let results = PopulationSimulator::new(&config)
        .execution(execution)
        .run()
        .context("simulation failed")?;
    let files = write_results(&results).context("writing results")?;

    println!(
        "{} events from {} of {} particles (seed {seed})",
        results.events().len(),
        results.decayed_particles(),
        config.num_particles()
    );
    println!("  {}", files.sim.display());
    println!("  {}", files.events.display());
    Ok(())
}

fn inspect(args: InspectArgs) -> Result<()> {
    let chain = load_chain(&args.chain)?;
    let mut out = std::io::stdout().lock();

    writeln!(out, "{} isotopes, start: {}", chain.len(), chain.start().name())?;
    for isotope in &chain {
        if isotope.is_stable() {
            writeln!(out, "{:>3}  {:<12} stable", isotope.index(), isotope.name())?;
            continue;
        }
        for (mode, channel) in isotope.channels().iter() {
            writeln!(
                out,
                "{:>3}  {:<12} {:<5} -> {:<12} {:>7.3}%  t½ {:<16} {:.4} MeV",
                isotope.index(),
                isotope.name(),
                mode.to_string(),
                chain.isotope(channel.to_isotope()).name(),
                channel.probability(),
                format_seconds(channel.half_life()),
                channel.energy(),
            )?;
        }
    }
    for (index, sum) in chain.branching_imbalances() {
        writeln!(
            out,
            "warning: {} branching sums to {sum}%; beta takes the remainder",
            chain.isotope(index).name()
        )?;
    }
    if chain.has_cycle() {
        writeln!(out, "note: chain contains a cycle")?;
    }
    Ok(())
}

fn report(args: ReportArgs) -> Result<()> {
    let results = read_results(&args.input)
        .with_context(|| format!("reading run {}", args.input.display()))?;
    let mut out = std::io::stdout().lock();

    match args.kind {
        ReportKind::Population => {
            write_series(&mut out, "population", &population_series(&results))?
        }
        ReportKind::Energy => write_series(
            &mut out,
            "energy_MeV",
            &energy_series_by(&results, args.attribution.into()),
        )?,
        ReportKind::Summary => {
            writeln!(out, "isotope,name,decays,arrivals,final_population,energy_MeV")?;
            for row in summarize(&results) {
                writeln!(
                    out,
                    "{},{},{},{},{},{}",
                    row.isotope, row.name, row.decays, row.arrivals, row.final_population, row.energy
                )?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn write_series(out: &mut impl Write, value: &str, series: &[IsotopeSeries]) -> Result<()> {
    writeln!(out, "isotope,name,time_sec,{value}")?;
    for s in series {
        for p in &s.points {
            writeln!(out, "{},{},{},{}", s.isotope, s.name, p.time, p.value)?;
        }
    }
    Ok(())
}
