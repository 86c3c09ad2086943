mod cli;
mod coerce;
mod error;
mod fmt;
mod header;
mod logging;
mod mapper;
mod matcher;
mod models;
mod names;
mod output;
mod roster;
mod schema;
mod settings;
mod table;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Inspect { file, rows }) => cli::inspect::run(&file, rows),
        Some(Commands::Init {
            output_dir,
            archive_dir,
        }) => cli::init::run(output_dir, archive_dir),
        None => cli::fill::run(cli.fill),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
