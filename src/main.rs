use std::io;

use anyhow::Result;
use clap::Parser;
use rtlocsum::app;
use rtlocsum::config::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    app::run(&cli, io::stdout().lock(), io::stderr().lock())
}
