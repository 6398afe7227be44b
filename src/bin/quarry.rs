//! Quarry CLI binary.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use quarry::cli::args::QuarryArgs;
use quarry::cli::commands::execute_command;

/// Map `-q`/`-v` verbosity to a log level; `RUST_LOG` can still override it.
fn level_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn main() -> ExitCode {
    let args = QuarryArgs::parse();

    Builder::new()
        .filter_level(level_filter(args.verbosity()))
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    match execute_command(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
