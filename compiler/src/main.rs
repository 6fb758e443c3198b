use clap::Parser;
use monkey_lang::cli::{Cli, CliHandler};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let handler = CliHandler::new();

    if let Err(e) = handler.handle(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
