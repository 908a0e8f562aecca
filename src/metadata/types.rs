use serde::{Deserialize, Serialize};

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, thiserror::Error)]
pub enum BooksError {
    #[error("books request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("books api returned status {0}")]
    Status(u16),
}

/// The parts of a volume record that end up in feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BookDetails {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub published_date: Option<String>,
}

impl BookDetails {
    pub fn title_or_na(&self) -> &str {
        self.title.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    /// Authors joined by ", ", or "N/A" when none are listed.
    pub fn authors_or_na(&self) -> String {
        if self.authors.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            self.authors.join(", ")
        }
    }

    pub fn published_date_or_na(&self) -> &str {
        self.published_date.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookLookup {
    /// First matching volume
    Found(BookDetails),
    /// The api answered but listed no volumes
    NoMatches,
}
