use clap::Parser;
use tracing_subscriber::EnvFilter;

mod analysis;
mod app;
mod cli;
mod config;
mod feedback;
mod metadata;
mod scrape;
mod semantic;
mod suggest;
mod web;

use app::AppFactory;

/// Logs go to stderr; stdout carries only json.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    init_logging();

    match args.command {
        cli::Command::Suggest { title, seed } => cli::handle_suggest(title, seed),

        cli::Command::Check {
            title,
            check_args,
            compact,
        } => {
            let config = match AppFactory::load_config() {
                Ok(config) => config,
                Err(e) => {
                    println!("{}", cli::error_json(&cli::unexpected_error_message(&e)));
                    return Err(e);
                }
            };
            cli::handle_check(title, check_args, compact, &config)
        }

        cli::Command::Search { query, num_results } => {
            let config = AppFactory::load_config()?;
            cli::handle_search(query, num_results, &config)
        }

        cli::Command::Daemon { listen, check_args } => {
            let config = AppFactory::load_config()?;
            cli::handle_daemon(listen, check_args, &config)
        }
    }
}
