use clap::{Args as ClapArgs, Parser, Subcommand};

pub mod errors;
mod handlers;
mod validation;

pub use handlers::*;

#[derive(Parser, Debug)]
#[command(version, about = "Check whether a research title is novel", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct CheckArgs {
    /// How many publications to compare against (defaults to config)
    #[clap(short = 'n', long)]
    pub num_results: Option<usize>,

    /// Don't enrich feedback with book metadata
    #[clap(long, default_value = "false")]
    pub no_books: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a title against existing publications.
    /// Reads the title from stdin when not given.
    Check {
        /// Title to check
        #[clap(allow_hyphen_values = true)]
        title: Option<String>,

        #[clap(flatten)]
        check_args: CheckArgs,

        /// Print single-line json
        #[clap(long, default_value = "false")]
        compact: bool,
    },
    /// List the publications a title would be compared against
    Search {
        /// Search query
        #[clap(allow_hyphen_values = true)]
        query: String,

        #[clap(short = 'n', long)]
        num_results: Option<usize>,
    },
    /// Suggest a rephrased title
    Suggest {
        title: String,

        /// Seed for reproducible suggestions
        #[clap(long)]
        seed: Option<u64>,
    },
    /// Start titlecheck as a service.
    Daemon {
        /// Address to listen on (defaults to config)
        #[clap(short, long)]
        listen: Option<String>,

        #[clap(flatten)]
        check_args: CheckArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_with_title() {
        let args = Args::try_parse_from(["titlecheck", "check", "My title", "-n", "3"]).unwrap();
        match args.command {
            Command::Check {
                title,
                check_args,
                compact,
            } => {
                assert_eq!(title.as_deref(), Some("My title"));
                assert_eq!(check_args.num_results, Some(3));
                assert!(!check_args.no_books);
                assert!(!compact);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_check_from_stdin() {
        let args = Args::try_parse_from(["titlecheck", "check", "--no-books"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Check { title: None, check_args: CheckArgs { no_books: true, .. }, .. }
        ));
    }

    #[test]
    fn test_parse_daemon() {
        let args = Args::try_parse_from(["titlecheck", "daemon", "--listen", "127.0.0.1:9000"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Daemon { listen: Some(ref l), .. } if l == "127.0.0.1:9000"
        ));
    }
}
