use crate::scrape::scholar::ScholarError;
use crate::semantic::EmbeddingError;

#[derive(thiserror::Error, Debug)]
pub enum CheckError {
    #[error("No title provided!")]
    EmptyTitle,

    #[error("search error: {0}")]
    Search(#[from] ScholarError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}
