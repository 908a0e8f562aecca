use crate::{
    analysis::Thresholds,
    app::checker::TitleChecker,
    config::{self, Config},
    metadata::{BooksLookup, GoogleBooksFetcher},
    scrape::scholar::ScholarSource,
    semantic::LazyEmbeddingModel,
};
use anyhow::{Context, Result};

/// Application factory for creating and configuring application components
pub struct AppFactory;

/// Per-invocation switches layered over the config file.
#[derive(Debug, Clone, Default)]
pub struct CheckerOverrides {
    pub num_results: Option<usize>,
    pub no_books: bool,
}

impl AppFactory {
    /// Load config from the default base path.
    pub fn load_config() -> Result<Config> {
        let base_path = config::base_path()?;
        Config::load_with(&base_path)
            .with_context(|| format!("failed to load config from {}", base_path.display()))
    }

    /// Wire the production checker: Google Scholar, fastembed, Google Books.
    pub fn create_checker(config: &Config, overrides: &CheckerOverrides) -> Result<TitleChecker> {
        let source = ScholarSource::new(&config.scholar);
        let embedder = LazyEmbeddingModel::new(&config.semantic.model, config.models_dir());

        let books: Option<Box<dyn BooksLookup>> = if config.books.enabled && !overrides.no_books {
            Some(Box::new(
                GoogleBooksFetcher::new(&config.books).context("failed to create books client")?,
            ))
        } else {
            None
        };

        let thresholds = Thresholds {
            duplicate: config.semantic.duplicate_threshold,
            similar: config.semantic.similar_threshold,
        };

        let num_results = overrides.num_results.unwrap_or(config.scholar.num_results);
        if num_results == 0 {
            anyhow::bail!("number of results must be greater than 0");
        }

        Ok(TitleChecker::new(
            Box::new(source),
            Box::new(embedder),
            books,
            thresholds,
            num_results,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_checker_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_with(tmp.path()).unwrap();

        let checker = AppFactory::create_checker(&config, &CheckerOverrides::default()).unwrap();
        assert_eq!(checker.num_results(), 5);
    }

    #[test]
    fn test_create_checker_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_with(tmp.path()).unwrap();

        let overrides = CheckerOverrides {
            num_results: Some(3),
            no_books: true,
        };
        let checker = AppFactory::create_checker(&config, &overrides).unwrap();
        assert_eq!(checker.num_results(), 3);

        let overrides = CheckerOverrides {
            num_results: Some(0),
            no_books: true,
        };
        assert!(AppFactory::create_checker(&config, &overrides).is_err());
    }
}
