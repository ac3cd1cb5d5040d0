//! `procsim`: run a command file through the simulator and write the trace.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};

use prometheus_process_sim::builders::SimulatorBuilder;
use prometheus_process_sim::config::SimulatorConfig;
use prometheus_process_sim::core::{AppResult, CommandSource, TracingAuditSink};
use prometheus_process_sim::infra::{JsonLinesSource, TokenStreamSource, TraceWriter};
use prometheus_process_sim::runtime::{check_invariants, snapshot};
use prometheus_process_sim::util::init_tracing;

/// Input encodings.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Whitespace-separated words (`cr A 1 req R1 1 ...`).
    Text,
    /// One JSON command object per line.
    Jsonl,
}

/// Process and resource manager simulator.
#[derive(Debug, Parser)]
#[command(name = "procsim", version)]
struct Opts {
    /// Command file; stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// Trace destination; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input encoding.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// JSON configuration file. Falls back to PROCSIM_* variables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the process pool size.
    #[arg(long)]
    max_processes: Option<usize>,

    /// Log one audit event per command (visible with RUST_LOG=info).
    #[arg(long)]
    audit: bool,

    /// Print the final state as JSON on stderr.
    #[arg(long)]
    dump_state: bool,
}

fn load_config(opts: &Opts) -> AppResult<SimulatorConfig> {
    let mut cfg = match &opts.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            SimulatorConfig::from_json_str(&raw).map_err(anyhow::Error::msg)?
        }
        None => SimulatorConfig::from_env().map_err(anyhow::Error::msg)?,
    };
    if let Some(max) = opts.max_processes {
        cfg.max_processes = max;
    }
    Ok(cfg)
}

fn open_input(opts: &Opts) -> AppResult<Box<dyn BufRead>> {
    Ok(match &opts.input {
        Some(path) if path.as_os_str() != "-" => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        _ => Box::new(io::stdin().lock()),
    })
}

fn open_output(opts: &Opts) -> AppResult<Box<dyn Write>> {
    Ok(match &opts.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn main() -> AppResult<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let opts = Opts::parse();
    let cfg = load_config(&opts)?;

    let reader = open_input(&opts)?;
    let source: Box<dyn CommandSource> = match opts.format {
        Format::Text => Box::new(TokenStreamSource::new(reader)),
        Format::Jsonl => Box::new(JsonLinesSource::new(reader)),
    };
    let sink = TraceWriter::from_config(open_output(&opts)?, &cfg);

    let mut builder = SimulatorBuilder::new(cfg);
    if opts.audit {
        builder = builder.with_audit(Box::new(TracingAuditSink));
    }
    let mut sim = builder.build(source, sink)?;
    let summary = sim.run();

    let (core, _, sink) = sim.into_parts();
    sink.finish().context("writing trace")?;
    tracing::info!("{:?}", summary);

    if opts.dump_state {
        let state = snapshot(&core);
        for violation in check_invariants(&state) {
            tracing::error!("invariant violated: {}", violation);
        }
        eprintln!("{}", serde_json::to_string_pretty(&state)?);
    }
    Ok(())
}
