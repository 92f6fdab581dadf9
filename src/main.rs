use clap::Parser;
use color_eyre::eyre::{Report, Result};
use varlens::pipeline::run;
use varlens::{cli, cli::Cli};

#[tokio::main]
async fn main() -> Result<(), Report> {
    // ------------------------------------------------------------------------
    // CLI Setup

    // Parse CLI parameters
    let args = Cli::parse();

    // initialize color_eyre crate for colorized logs
    color_eyre::install()?;

    // Set logging/verbosity level via RUST_LOG
    std::env::set_var("RUST_LOG", args.verbosity.to_string());

    // initialize env_logger crate for logging/verbosity level
    env_logger::init();

    // check which CLI command we're running (parse, lookup, analyze)
    match args.command {
        cli::Command::Parse(args) => _ = run::parse_file(&args)?,
        cli::Command::Lookup(args) => _ = run::lookup_file(&args)?,
        cli::Command::Analyze(args) => _ = run::analyze(&args).await?,
    }

    Ok(())
}
