use anyhow::Context;
use clap::{Parser, Subcommand};
use fpshadow::ops::{Conversion, Event, ShadowOp};
use fpshadow::{ShadowConfig, ShadowContext};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const APP_NAME: &str = "fpshadow";

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct FpShadowParams {
    #[command(subcommand)]
    pub command: Commands,
    /// Working precision of shadow values, in bits
    #[arg(long)]
    pub precision: Option<u32>,
    /// Bits of error at which an operation is reported
    #[arg(long)]
    pub error_threshold: Option<f64>,
    /// Where to write the report
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Write s-expressions instead of prose
    #[arg(long)]
    pub machine_readable: bool,
    /// Annotate benchmarks with the precision they ran at
    #[arg(long)]
    pub typed_bench: bool,
    /// Skip building and reporting expressions
    #[arg(long)]
    pub no_exprs: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Feeds a recorded trace, one JSON event per line, through the runtime and writes a report
    Replay { trace: PathBuf },
    /// Lists every operation and conversion that can be shadowed
    Ops,
}

impl FpShadowParams {
    fn apply(&self, mut config: ShadowConfig) -> ShadowConfig {
        if let Some(precision) = self.precision {
            config.precision = precision;
        }
        if let Some(threshold) = self.error_threshold {
            config.error_threshold = threshold;
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if self.machine_readable {
            config.human_readable = false;
        }
        if self.typed_bench {
            config.typed_bench = true;
        }
        if self.no_exprs {
            config.report_exprs = false;
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let params = FpShadowParams::parse();
    let config = update_config(&params)?;
    match params.command {
        Commands::Replay { trace } => replay(config, trace),
        Commands::Ops => {
            list_ops();
            Ok(())
        }
    }
}

fn update_config(params: &FpShadowParams) -> anyhow::Result<ShadowConfig> {
    let stored: ShadowConfig =
        confy::load(APP_NAME, None).context("Couldn't load the stored configuration")?;
    let config = params.apply(stored.clone());
    config.validate()?;
    if stored != config {
        confy::store(APP_NAME, None, config.clone())
            .context("Couldn't store the configuration")?;
    }
    Ok(config)
}

fn replay(config: ShadowConfig, trace: PathBuf) -> anyhow::Result<()> {
    let output = config.output_path.clone();
    let mut ctx = ShadowContext::new(config)?;
    let file = File::open(&trace)
        .with_context(|| format!("Couldn't open trace {}", trace.display()))?;
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: Event = serde_json::from_str(&line)
            .with_context(|| format!("Malformed event on line {}", idx + 1))?;
        ctx.handle(&event)
            .with_context(|| format!("Couldn't shadow the event on line {}", idx + 1))?;
    }
    ctx.write_report(&output)?;
    println!("Wrote report out to {}", output.display());
    Ok(())
}

fn list_ops() {
    for op in ShadowOp::CATALOG {
        let shape = if op.is_packable() { "scalar, packed" } else { "scalar" };
        println!(
            "{:<14}{:<10}{} operand(s), {}: {}",
            op.name(),
            op.symbol(),
            op.arity(),
            shape,
            op.plain_name()
        );
    }
    for conv in Conversion::CATALOG {
        println!(
            "{:<14}{:?} -> {:?}",
            format!("{:?}", conv),
            conv.arg_types(),
            conv.result_type()
        );
    }
}
