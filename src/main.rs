use clap::Parser;
use clue::{run, Cli};
use std::io;
use std::process::ExitCode;

fn init_log() {
    let mut builder = env_logger::Builder::new();

    builder
        .filter(None, log::LevelFilter::Warn)
        .filter(Some("clue"), log::LevelFilter::Info)
        .filter(Some("clue_forecast"), log::LevelFilter::Info)
        .filter(Some("clue_stats"), log::LevelFilter::Info)
        // RUST_LOG wins over the defaults above
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    init_log();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match run(&cli, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
