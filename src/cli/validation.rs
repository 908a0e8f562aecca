use crate::cli::errors::{CliError, CliResult};

const MAX_NUM_RESULTS: usize = 20;

/// Validates a submitted title and returns it trimmed
pub fn validate_title(title: &str) -> CliResult<String> {
    let title = title.trim();

    if title.is_empty() {
        return Err(CliError::validation("title", "No title provided!"));
    }

    Ok(title.to_string())
}

/// Validates the per-request candidate count
pub fn validate_num_results(num_results: &Option<usize>) -> CliResult<()> {
    if let Some(n) = num_results {
        if *n == 0 || *n > MAX_NUM_RESULTS {
            return Err(CliError::validation(
                "num-results",
                format!("Number of results must be between 1 and {MAX_NUM_RESULTS}"),
            ));
        }
    }

    Ok(())
}
