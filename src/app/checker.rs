use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::analysis::{self, Analysis, Thresholds, Verdict};
use crate::app::errors::CheckError;
use crate::feedback::compose_feedback;
use crate::metadata::BooksLookup;
use crate::scrape::scholar::{Publication, PublicationSource};
use crate::semantic::{score_candidates, Embedder};
use crate::suggest::suggest_better_title;

/// Runs the fetch -> score -> decide -> feedback pipeline for one title.
pub struct TitleChecker {
    source: Box<dyn PublicationSource>,
    embedder: Box<dyn Embedder>,
    books: Option<Box<dyn BooksLookup>>,
    thresholds: Thresholds,
    num_results: usize,
    rng: Mutex<StdRng>,
}

impl TitleChecker {
    pub fn new(
        source: Box<dyn PublicationSource>,
        embedder: Box<dyn Embedder>,
        books: Option<Box<dyn BooksLookup>>,
        thresholds: Thresholds,
        num_results: usize,
    ) -> Self {
        Self {
            source,
            embedder,
            books,
            thresholds,
            num_results,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Make title suggestions reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn num_results(&self) -> usize {
        self.num_results
    }

    pub fn check(&self, title: &str) -> Result<Analysis, CheckError> {
        self.check_with_limit(title, self.num_results)
    }

    pub fn check_with_limit(&self, title: &str, limit: usize) -> Result<Analysis, CheckError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CheckError::EmptyTitle);
        }

        log::info!("submitted title: {title}");

        let results = self.search(title, limit)?;
        self.analyze_uniqueness(title, &results)
    }

    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<Publication>, CheckError> {
        let limit = limit.max(1);
        log::debug!("searching {} for up to {limit} results", self.source.name());
        let mut results = self.source.search(query, limit)?;
        results.truncate(limit);
        Ok(results)
    }

    pub fn analyze_uniqueness(
        &self,
        submitted: &str,
        results: &[Publication],
    ) -> Result<Analysis, CheckError> {
        log::info!("analyzing uniqueness of the title");

        if results.is_empty() {
            log::info!("no search results found");
            return Ok(analysis::no_results(submitted));
        }

        let titles: Vec<String> = results.iter().map(|r| r.title.clone()).collect();
        log::debug!("scoring {} candidates with {}", titles.len(), self.embedder.name());
        let scores = score_candidates(self.embedder.as_ref(), submitted, &titles)?;
        log::debug!("similarity scores: {scores:?}");

        let verdict = analysis::decide(&titles, &scores, self.thresholds);
        let feedback = self.feedback_for(submitted, &verdict);

        Ok(verdict.into_analysis(submitted, feedback))
    }

    pub fn suggest(&self, title: &str) -> Option<String> {
        match self.rng.lock() {
            Ok(mut rng) => suggest_better_title(title, &mut *rng),
            Err(_) => suggest_better_title(title, &mut rand::rng()),
        }
    }

    fn feedback_for(&self, submitted: &str, verdict: &Verdict) -> String {
        let reason = verdict.reason().unwrap_or_default();
        let books = self.books.as_ref().map(|books| {
            log::debug!("looking up books via {}", books.name());
            books.lookup(submitted)
        });
        let suggestion = self.suggest(submitted);

        compose_feedback(books, &reason, suggestion.as_deref())
    }
}
