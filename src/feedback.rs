use crate::metadata::{BookLookup, BooksError};

pub const NO_BOOK_DETAILS: &str = "No book details found.";
pub const NO_MATCHING_BOOKS: &str = "No matching books found.";

/// Render human-readable feedback for a verdict.
///
/// `books` is `None` when enrichment is disabled; then only the similarity
/// reason and the suggestion are rendered.
pub fn compose_feedback(
    books: Option<Result<BookLookup, BooksError>>,
    reason: &str,
    suggestion: Option<&str>,
) -> String {
    let mut feedback = String::new();

    match books {
        None => {}
        Some(Err(e)) => {
            log::warn!("book lookup failed: {e}");
            return NO_BOOK_DETAILS.to_string();
        }
        Some(Ok(BookLookup::NoMatches)) => return NO_MATCHING_BOOKS.to_string(),
        Some(Ok(BookLookup::Found(book))) => {
            feedback.push_str(&format!("Book Title: {}\n", book.title_or_na()));
            feedback.push_str(&format!("Author(s): {}\n", book.authors_or_na()));
            feedback.push_str(&format!(
                "Publication Year: {}\n",
                book.published_date_or_na()
            ));
        }
    }

    feedback.push_str(&format!("Similarity: {reason}\n"));
    if let Some(suggestion) = suggestion {
        feedback.push_str(&format!("Suggested Title: {suggestion}\n"));
    }

    feedback
}
