//! Chromatap CLI — camera color sampler with button input, LED indicator, and OSC output.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;

mod cli;

/// Shared shutdown flag — set by Ctrl+C handler.
pub static RUNNING: AtomicBool = AtomicBool::new(true);

#[derive(Parser)]
#[command(
    name = "chromatap",
    version,
    about = "Samples a color from the camera, shows it on the LED strip, and reports it over OSC"
)]
struct Args {
    /// Output as JSON (for sample, palette, config)
    #[arg(long, global = true)]
    json: bool,

    /// Use this config file instead of the platform default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: cli::Command,
}

fn main() {
    let args = Args::parse();

    // `run` reports each capture at info level; everything else stays quiet.
    let default_level = if args.verbose {
        "debug"
    } else if args.command.is_loop() {
        "info"
    } else {
        "warn"
    };
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    logger.format_timestamp(None).format_target(false);
    if args.command.uses_raw_terminal() {
        logger.format_suffix("\r\n");
    }
    logger.init();

    // Install Ctrl+C handler
    ctrlc::set_handler(move || {
        RUNNING.store(false, Ordering::SeqCst);
    })
    .ok();

    if let Err(e) = cli::run(args.command, args.json, args.config.as_deref()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
