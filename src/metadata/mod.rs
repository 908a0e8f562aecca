pub mod google_books;
pub mod types;

pub use google_books::GoogleBooksFetcher;
pub use types::{BookLookup, BooksError};

/// Book metadata source used to enrich feedback
pub trait BooksLookup: Send + Sync {
    /// Look up the first volume whose title matches `title`
    fn lookup(&self, title: &str) -> Result<BookLookup, BooksError>;

    /// Get the name of this source for logging/debugging
    fn name(&self) -> &'static str;
}
