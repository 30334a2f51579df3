//! yaml-config - print typed values from YAML configuration files
//!
//! One-shot commands log to stderr only. `watch` runs until interrupted and
//! also keeps a rolling log file.

use std::{error::Error, process};

use clap::Parser;
use yaml_config::{
    cli::{self, Cli, Commands, formatting::format_error},
    config::ConfigPaths,
    tracing_config,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Watch { .. }) {
        tracing_config::init_with_file(&ConfigPaths::log_dir()?)?;
    } else {
        tracing_config::init()?;
    }

    match cli::run(cli).await {
        Ok(output) => {
            if !output.trim().is_empty() {
                println!("{output}");
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", format_error(&e.to_string()));
            process::exit(1);
        }
    }
}
