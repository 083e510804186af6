use std::process::ExitCode;

use clap::Parser;
use folio::args::Args;
use folio::commands;

fn main() -> eyre::Result<ExitCode> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    commands::run(args)
}
