use crate::{
    app::{AppFactory, CheckError, CheckerOverrides, TitleChecker},
    cli::errors::CliResult,
    cli::validation::{validate_num_results, validate_title},
    config::Config,
    suggest::suggest_better_title,
    web,
};
use anyhow::{bail, Result};
use rand::{rngs::StdRng, SeedableRng};
use serde_json::json;
use std::io::Read;

use super::CheckArgs;

/// Title from the argument, or everything on `input` when absent.
pub fn read_title(title: Option<String>, input: impl Read) -> CliResult<String> {
    let raw = match title {
        Some(title) => title,
        None => std::io::read_to_string(input)?,
    };

    validate_title(&raw)
}

/// `{"error": message}`, the shape callers parse on failure
pub fn error_json(message: &str) -> String {
    json!({ "error": message }).to_string()
}

/// Message reported for a failed check.
pub fn check_error_message(err: &CheckError) -> String {
    match err {
        CheckError::EmptyTitle => err.to_string(),
        _ => format!("An unexpected error occurred: {err}"),
    }
}

fn overrides(check_args: &CheckArgs) -> CheckerOverrides {
    CheckerOverrides {
        num_results: check_args.num_results,
        no_books: check_args.no_books,
    }
}

pub fn handle_check(
    title: Option<String>,
    check_args: CheckArgs,
    compact: bool,
    config: &Config,
) -> Result<()> {
    let title = match read_title(title, std::io::stdin()) {
        Ok(title) => title,
        Err(e) => {
            println!("{}", error_json(e.message()));
            bail!(e);
        }
    };

    if let Err(e) = validate_num_results(&check_args.num_results) {
        println!("{}", error_json(e.message()));
        bail!(e);
    }

    let checker = match AppFactory::create_checker(config, &overrides(&check_args)) {
        Ok(checker) => checker,
        Err(e) => {
            println!("{}", error_json(&unexpected_error_message(&e)));
            return Err(e);
        }
    };

    println!("{}", run_check(&checker, &title, compact)?);
    Ok(())
}

/// `{"error": ...}` text for failures outside the check itself.
pub fn unexpected_error_message(err: &anyhow::Error) -> String {
    format!("An unexpected error occurred: {err:#}")
}

/// Run one check and render the report as json.
///
/// On failure the `{"error": ...}` line is printed before returning the error.
pub fn run_check(checker: &TitleChecker, title: &str, compact: bool) -> Result<String> {
    match checker.check(title) {
        Ok(analysis) => {
            let out = if compact {
                serde_json::to_string(&analysis)?
            } else {
                serde_json::to_string_pretty(&analysis)?
            };
            Ok(out)
        }
        Err(e) => {
            let message = check_error_message(&e);
            println!("{}", error_json(&message));
            bail!(message)
        }
    }
}

pub fn handle_search(query: String, num_results: Option<usize>, config: &Config) -> Result<()> {
    let query = validate_title(&query)?;
    validate_num_results(&num_results)?;

    let overrides = CheckerOverrides {
        num_results,
        no_books: true,
    };
    let checker = AppFactory::create_checker(config, &overrides)?;
    let results = checker.search(&query, checker.num_results())?;

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

pub fn handle_suggest(title: String, seed: Option<u64>) -> Result<()> {
    let title = validate_title(&title)?;

    let suggestion = match seed {
        Some(seed) => suggest_better_title(&title, &mut StdRng::seed_from_u64(seed)),
        None => suggest_better_title(&title, &mut rand::rng()),
    };

    match suggestion {
        Some(s) => println!("{s}"),
        None => bail!("could not build a suggestion for {title:?}"),
    }

    Ok(())
}

pub fn handle_daemon(listen: Option<String>, check_args: CheckArgs, config: &Config) -> Result<()> {
    validate_num_results(&check_args.num_results)?;

    let listen = listen.unwrap_or_else(|| config.daemon.listen.clone());
    let checker = AppFactory::create_checker(config, &overrides(&check_args))?;

    web::start_daemon(checker, &listen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::scholar::ScholarError;
    use crate::tests::fakes::{checker, BrokenEmbedder, FakeSource, WordEmbedder};

    #[test]
    fn test_read_title_prefers_argument() {
        let title = read_title(Some(" Arg title ".to_string()), "ignored".as_bytes()).unwrap();
        assert_eq!(title, "Arg title");
    }

    #[test]
    fn test_read_title_from_input() {
        let title = read_title(None, "Stdin title\n".as_bytes()).unwrap();
        assert_eq!(title, "Stdin title");
    }

    #[test]
    fn test_read_title_empty_input() {
        let err = read_title(None, "\n".as_bytes()).unwrap_err();
        assert_eq!(error_json(err.message()), r#"{"error":"No title provided!"}"#);
    }

    #[test]
    fn test_check_error_messages() {
        assert_eq!(check_error_message(&CheckError::EmptyTitle), "No title provided!");

        let message = check_error_message(&CheckError::Search(ScholarError::Blocked));
        assert!(message.starts_with("An unexpected error occurred: "));
    }

    #[test]
    fn test_run_check_pretty_and_compact() {
        let checker = checker(
            FakeSource::with_titles(&["bread baking techniques"]),
            WordEmbedder::new(),
            None,
        );

        let pretty = run_check(&checker, "Sourdough fermentation kinetics", false).unwrap();
        assert!(pretty.contains('\n'));

        let compact = run_check(&checker, "Sourdough fermentation kinetics", true).unwrap();
        assert!(!compact.contains("\n  "));
        assert!(compact.starts_with(r#"{"input":"Sourdough fermentation kinetics","output":{"#));

        let pretty: serde_json::Value = serde_json::from_str(&pretty).unwrap();
        let compact: serde_json::Value = serde_json::from_str(&compact).unwrap();
        assert_eq!(pretty["input"], compact["input"]);
        assert_eq!(pretty["output"]["queried_title"], "bread baking techniques");
        assert_eq!(compact["output"]["queried_title"], "bread baking techniques");
    }

    #[test]
    fn test_run_check_failure() {
        let checker = checker(FakeSource::with_titles(&["a title"]), BrokenEmbedder, None);

        let err = run_check(&checker, "some title", false).unwrap_err();
        assert!(err.to_string().starts_with("An unexpected error occurred: "));
    }

    #[test]
    fn test_unexpected_error_message() {
        let err = anyhow::anyhow!("boom").context("failed to create books client");
        assert_eq!(
            unexpected_error_message(&err),
            "An unexpected error occurred: failed to create books client: boom"
        );
        assert_eq!(
            error_json(&unexpected_error_message(&err)),
            r#"{"error":"An unexpected error occurred: failed to create books client: boom"}"#
        );
    }
}
