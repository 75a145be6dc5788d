//! Receptes CLI — recipe catalog service.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "receptes",
    version,
    about = "Recipe catalog — CSV-backed store, search, ingredient frequency chart"
)]
struct Cli {
    #[command(flatten)]
    global: receptes::cli::GlobalArgs,

    #[command(subcommand)]
    command: receptes::cli::Commands,
}

fn run(cli: Cli) -> Result<(), String> {
    let config = receptes::cli::resolve_config(&cli.global, |k| std::env::var(k).ok())?;
    receptes::logging::init(config.log_file.as_deref())?;
    receptes::cli::dispatch(cli.command, config)
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
