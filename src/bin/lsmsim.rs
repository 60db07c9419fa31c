//! lsmsim Binary
//!
//! Drives an engine from a script file or stdin, one command per line.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lsmsim::command::Command;
use lsmsim::{Config, Engine, EngineState};
use tracing_subscriber::{fmt, EnvFilter};

/// lsmsim
#[derive(Parser, Debug)]
#[command(name = "lsmsim")]
#[command(about = "Interactive leveled LSM-tree simulator")]
#[command(version)]
struct Args {
    /// Max distinct keys in the memtable
    #[arg(long, default_value_t = Config::DEFAULT_MEMTABLE_MAX_SIZE)]
    memtable_max_size: usize,

    /// Max runs in level 0
    #[arg(long, default_value_t = Config::DEFAULT_L0_MAX_SSTABLES)]
    l0_max_sstables: usize,

    /// Per-level growth factor of run capacity
    #[arg(long, default_value_t = Config::DEFAULT_LEVEL_MAX_SSTABLES_FACTOR)]
    level_factor: usize,

    /// Max entries per compacted run
    #[arg(long, default_value_t = Config::DEFAULT_SSTABLE_MAX_ITEMS)]
    sstable_max_items: usize,

    /// Number of levels
    #[arg(long, default_value_t = Config::DEFAULT_MAX_LEVELS)]
    max_levels: usize,

    /// Read commands from this file instead of stdin
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Restore engine state from a JSON snapshot (overrides config flags)
    #[arg(long)]
    load: Option<PathBuf>,

    /// Save engine state as a JSON snapshot on exit
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lsmsim=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    tracing::info!("lsmsim v{}", lsmsim::VERSION);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> lsmsim::Result<()> {
    let mut engine = match &args.load {
        Some(path) => {
            tracing::info!("Loading snapshot: {}", path.display());
            Engine::from_state(EngineState::load_from_file(path)?)?
        }
        None => Engine::new(
            Config::builder()
                .memtable_max_size(args.memtable_max_size)
                .l0_max_sstables(args.l0_max_sstables)
                .level_max_sstables_factor(args.level_factor)
                .sstable_max_items(args.sstable_max_items)
                .max_levels(args.max_levels)
                .build(),
        ),
    };

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        // Failed commands are reported and the session carries on
        match Command::parse(line).and_then(|command| engine.execute(command)) {
            Ok(response) => writeln!(out, "{}", response)?,
            Err(e) => writeln!(out, "ERR {}", e)?,
        }
    }

    if let Some(path) = &args.save {
        engine.state().save_to_file(path)?;
        tracing::info!("Saved snapshot: {}", path.display());
    }

    Ok(())
}
