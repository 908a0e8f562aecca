use crate::config::BooksConfig;
use crate::metadata::types::{BookDetails, BookLookup, BooksError};
use crate::metadata::BooksLookup;
use serde_json::Value;
use std::time::Duration;

pub struct GoogleBooksFetcher {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl GoogleBooksFetcher {
    pub fn new(config: &BooksConfig) -> Result<Self, BooksError> {
        let api_key = std::env::var("GOOGLE_BOOKS_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        if api_key.is_none() {
            log::warn!(
                "GOOGLE_BOOKS_API_KEY is missing; using public API (rate limits may apply)"
            );
        }

        let client = reqwest::blocking::Client::builder()
            .user_agent(crate::scrape::USER_AGENT_DEFAULT)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key,
            client,
        })
    }

    /// Pick the first volume out of a volumes search response.
    pub fn extract_first_book(resp: &Value) -> BookLookup {
        let volume_info = resp
            .get("items")
            .and_then(|v| v.as_array())
            .and_then(|items| items.first())
            .and_then(|item| item.get("volumeInfo"));

        let Some(info) = volume_info else {
            return BookLookup::NoMatches;
        };

        let title = info
            .get("title")
            .and_then(|v| v.as_str())
            .map(str::to_owned);
        let authors = info
            .get("authors")
            .and_then(|v| v.as_array())
            .map(|authors| {
                authors
                    .iter()
                    .filter_map(|a| a.as_str())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        let published_date = info
            .get("publishedDate")
            .and_then(|v| v.as_str())
            .map(str::to_owned);

        BookLookup::Found(BookDetails {
            title,
            authors,
            published_date,
        })
    }
}

impl BooksLookup for GoogleBooksFetcher {
    fn lookup(&self, title: &str) -> Result<BookLookup, BooksError> {
        let q = format!("intitle:{title}");
        let mut req = self.client.get(&self.endpoint).query(&[("q", q.as_str())]);
        if let Some(key) = &self.api_key {
            req = req.query(&[("key", key.as_str())]);
        }

        let resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            log::error!("error fetching book details: {status}");
            return Err(BooksError::Status(status.as_u16()));
        }

        let body = resp.json::<Value>()?;
        Ok(Self::extract_first_book(&body))
    }

    fn name(&self) -> &'static str {
        "Google Books"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_first_book() {
        let json = serde_json::json!({
            "kind": "books#volumes",
            "totalItems": 2,
            "items": [
                {"volumeInfo": {
                    "title": "Deep Learning",
                    "authors": ["Ian Goodfellow", "Yoshua Bengio", "Aaron Courville"],
                    "publishedDate": "2016-11-18"
                }},
                {"volumeInfo": {"title": "Something else"}}
            ]
        });

        let lookup = GoogleBooksFetcher::extract_first_book(&json);
        let BookLookup::Found(book) = lookup else {
            panic!("expected a book");
        };
        assert_eq!(book.title_or_na(), "Deep Learning");
        assert_eq!(
            book.authors_or_na(),
            "Ian Goodfellow, Yoshua Bengio, Aaron Courville"
        );
        assert_eq!(book.published_date_or_na(), "2016-11-18");
    }

    #[test]
    fn test_extract_missing_fields_render_na() {
        let json = serde_json::json!({"items": [{"volumeInfo": {}}]});

        let BookLookup::Found(book) = GoogleBooksFetcher::extract_first_book(&json) else {
            panic!("expected a book");
        };
        assert_eq!(book.title_or_na(), "N/A");
        assert_eq!(book.authors_or_na(), "N/A");
        assert_eq!(book.published_date_or_na(), "N/A");
    }

    #[test]
    fn test_extract_no_items() {
        let json = serde_json::json!({"kind": "books#volumes", "totalItems": 0});
        assert_eq!(
            GoogleBooksFetcher::extract_first_book(&json),
            BookLookup::NoMatches
        );

        let json = serde_json::json!({"items": []});
        assert_eq!(
            GoogleBooksFetcher::extract_first_book(&json),
            BookLookup::NoMatches
        );
    }

    #[test]
    #[ignore = "requires network access"]
    fn test_live_lookup() {
        let fetcher = GoogleBooksFetcher::new(&BooksConfig::default()).unwrap();
        let lookup = fetcher.lookup("The Great Gatsby").unwrap();
        assert!(matches!(lookup, BookLookup::Found(_)));
    }
}
