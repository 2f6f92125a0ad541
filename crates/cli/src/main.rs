//! Protean CLI: run agent replies through the entity engine.
//!
//! Modes:
//! - **Argument**: `protean '{"action": "read", "entity": "cliente"}'` handles one reply
//! - **Pipe**: `cat replies.ndjson | protean` handles one reply per stdin line
//! - **Whole**: `protean --whole < reply.md` handles all of stdin as one reply
//! - **Init**: `protean init [path]` writes a default `protean.toml`
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `warn`).

mod commands;
mod format;
mod pipe;

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use protean_executor::{EngineConfig, Executor, MemoryStore, CONFIG_FILE_NAME};
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_definitions, OutputMode};

fn main() {
    let matches = build_cli().get_matches();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    if let Some(("init", sub)) = matches.subcommand() {
        let path = sub
            .get_one::<String>("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        process::exit(run_init(&path));
    }

    let output_mode = if matches.get_flag("human") {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    let config = match load_config(matches.get_one::<String>("config").map(Path::new)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("(error) {}", e);
            process::exit(2);
        }
    };
    let executor = Executor::new(Arc::new(MemoryStore::new()), config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = if let Some(reply) = matches.get_one::<String>("reply") {
        pipe::run_one(&executor, reply, output_mode, &mut out)
    } else if matches.get_flag("whole") {
        pipe::run_whole(&executor, io::stdin().lock(), output_mode, &mut out)
    } else {
        if io::stdin().is_terminal() {
            eprintln!("Reading agent replies from stdin, one per line (Ctrl-D to finish)");
        }
        pipe::run_lines(&executor, io::stdin().lock(), output_mode, &mut out)
    };

    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("(error) {}", e);
            process::exit(2);
        }
    };
    info!(target: "protean::cli", handled = stats.handled, failed = stats.failed, "Done");

    if matches.get_flag("describe") {
        println!("{}", format_definitions(&executor.definitions(), output_mode));
    }
    process::exit(stats.exit_code());
}

/// `--config` if given, else `./protean.toml` if present, else defaults.
fn load_config(explicit: Option<&Path>) -> Result<EngineConfig, String> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if !local.exists() {
                return Ok(EngineConfig::default());
            }
            local
        }
    };
    EngineConfig::from_file(&path).map_err(|e| e.to_string())
}

fn run_init(path: &Path) -> i32 {
    if path.exists() {
        eprintln!("{} already exists, leaving it untouched", path.display());
        return 0;
    }
    match EngineConfig::write_default_if_missing(path) {
        Ok(()) => {
            eprintln!("Wrote {}", path.display());
            0
        }
        Err(e) => {
            eprintln!("(error) {}", e);
            1
        }
    }
}
