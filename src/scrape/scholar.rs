//! Candidate publications from Google Scholar result pages.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{get_with_retries, RequestPolicy, ScrapeError};
use crate::config::ScholarConfig;

pub const NO_LINK: &str = "No link available";

/// Scholar serves at most this many results per page
const RESULTS_PER_PAGE: usize = 10;

/// `[PDF]`, `[BOOK]`, `[B]`, `[CITATION]`, ... prefixed to result titles
static MARKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*\[[A-Z]+\]\s*)+").expect("valid marker regex"));

static RESULT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.gs_ri").expect("valid selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h3.gs_rt").expect("valid selector"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));
static CAPTCHA_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"#gs_captcha_ccl, form#captcha-form, form[id*="captcha"]"#)
        .expect("valid selector")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub title: String,
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ScholarError {
    #[error("search request failed: {0}")]
    Request(#[from] ScrapeError),

    #[error("search source refused the query (captcha or unusual traffic page)")]
    Blocked,
}

/// Anything that can produce candidate publications for a title.
pub trait PublicationSource: Send + Sync {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Publication>, ScholarError>;

    fn name(&self) -> &'static str;
}

pub struct ScholarSource {
    base_url: String,
    policy: RequestPolicy,
}

impl ScholarSource {
    pub fn new(config: &ScholarConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            policy: RequestPolicy {
                max_retries: config.max_retries,
                timeout: Duration::from_secs(config.timeout_secs),
                ..Default::default()
            },
        }
    }

    fn fetch_page(&self, query: &str, start: usize) -> Result<String, ScholarError> {
        let offset = start.to_string();
        let mut params = vec![("q", query), ("hl", "en")];
        if start > 0 {
            params.push(("start", offset.as_str()));
        }

        let (_status, bytes) = get_with_retries(&self.base_url, &params, &self.policy)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl PublicationSource for ScholarSource {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Publication>, ScholarError> {
        log::info!("fetching top results for query: '{query}'");

        let results = collect_pages(limit, |start| self.fetch_page(query, start))?;
        log::info!("fetched {} results", results.len());

        Ok(results)
    }

    fn name(&self) -> &'static str {
        "Google Scholar"
    }
}

/// Walk result pages until `limit` publications are collected or a page
/// comes back empty. `fetch_page` gets the offset of the page's first result.
fn collect_pages<F>(limit: usize, mut fetch_page: F) -> Result<Vec<Publication>, ScholarError>
where
    F: FnMut(usize) -> Result<String, ScholarError>,
{
    let mut results = Vec::with_capacity(limit);
    let mut start = 0;

    while results.len() < limit {
        let html = fetch_page(start)?;
        let page = parse_results(&html, RESULTS_PER_PAGE);

        if page.is_empty() {
            if is_blocked_page(&html) {
                if start == 0 {
                    return Err(ScholarError::Blocked);
                }
                log::warn!("captcha after {} results, keeping what we have", results.len());
            } else {
                log::info!("no more results found");
            }
            break;
        }

        let remaining = limit - results.len();
        results.extend(page.into_iter().take(remaining));
        start += RESULTS_PER_PAGE;
    }

    Ok(results)
}

/// A captcha page carries no results, only the challenge form.
fn is_blocked_page(html: &str) -> bool {
    let document = Html::parse_document(html);
    document.select(&RESULT_SELECTOR).next().is_none()
        && document.select(&CAPTCHA_SELECTOR).next().is_some()
}

/// Extract up to `limit` publications from a result page, in page order.
pub fn parse_results(html: &str, limit: usize) -> Vec<Publication> {
    let document = Html::parse_document(html);

    document
        .select(&RESULT_SELECTOR)
        .filter_map(|result_el| {
            let heading = result_el.select(&TITLE_SELECTOR).next()?;
            let link = heading.select(&LINK_SELECTOR).next();

            let raw_title = match link {
                Some(a) => a.text().collect::<String>(),
                None => heading.text().collect::<String>(),
            };
            let title = clean_title(&raw_title);
            if title.is_empty() {
                return None;
            }

            let url = link
                .and_then(|a| a.value().attr("href"))
                .map(str::to_owned)
                .unwrap_or_else(|| NO_LINK.to_string());

            Some(Publication { title, url })
        })
        .take(limit)
        .collect()
}

/// Strip result-type markers and collapse whitespace.
pub fn clean_title(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    MARKER_REGEX.replace(&collapsed, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"
        <html><body><div id="gs_res_ccl_mid">
          <div class="gs_r gs_or gs_scl" data-cid="a1">
            <div class="gs_ri">
              <h3 class="gs_rt"><a href="https://example.org/attention">Attention is <b>all</b> you need</a></h3>
              <div class="gs_a">A Vaswani - 2017</div>
            </div>
          </div>
          <div class="gs_r gs_or gs_scl" data-cid="a2">
            <div class="gs_ri">
              <h3 class="gs_rt">
                <span class="gs_ctu"><span class="gs_ct1">[CITATION]</span><span class="gs_ct2">[C]</span></span>
                Deep   residual learning for image recognition
              </h3>
            </div>
          </div>
          <div class="gs_r gs_or gs_scl" data-cid="a3">
            <div class="gs_ri">
              <h3 class="gs_rt"><span class="gs_ctc"><span class="gs_ct1">[BOOK]</span><span class="gs_ct2">[B]</span></span>
                <a href="https://example.org/book">Pattern recognition and machine learning</a></h3>
            </div>
          </div>
          <div class="gs_r gs_or gs_scl" data-cid="a4">
            <div class="gs_ri"><h3 class="gs_rt">   </h3></div>
          </div>
        </div></body></html>
    "#;

    #[test]
    fn test_parse_results_in_page_order() {
        let results = parse_results(RESULTS_PAGE, 5);
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0],
            Publication {
                title: "Attention is all you need".to_string(),
                url: "https://example.org/attention".to_string(),
            }
        );
        assert_eq!(results[1].title, "Deep residual learning for image recognition");
        assert_eq!(results[1].url, NO_LINK);
        assert_eq!(results[2].title, "Pattern recognition and machine learning");
    }

    #[test]
    fn test_parse_results_respects_limit() {
        let results = parse_results(RESULTS_PAGE, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].title, "Deep residual learning for image recognition");
    }

    #[test]
    fn test_parse_results_empty_page() {
        assert!(parse_results("<html><body>nothing here</body></html>", 5).is_empty());
    }

    #[test]
    fn test_clean_title_markers() {
        assert_eq!(clean_title("[PDF] Some  title"), "Some title");
        assert_eq!(clean_title("[BOOK][B] A book"), "A book");
        assert_eq!(clean_title("Title with [brackets] inside"), "Title with [brackets] inside");
    }

    #[test]
    fn test_blocked_page_detection() {
        assert!(is_blocked_page(
            r#"<div id="gs_captcha_ccl">Please show you're not a robot</div>"#
        ));
        assert!(is_blocked_page(
            r#"<p>Our systems have detected unusual traffic</p><form id="captcha-form"></form>"#
        ));
        assert!(!is_blocked_page(RESULTS_PAGE));
        assert!(!is_blocked_page("<html><body>nothing here</body></html>"));
    }

    fn page(first: usize, count: usize) -> String {
        let results: String = (first..first + count)
            .map(|i| {
                format!(
                    r#"<div class="gs_r gs_or gs_scl"><div class="gs_ri"><h3 class="gs_rt"><a href="https://example.org/{i}">Result number {i}</a></h3></div></div>"#
                )
            })
            .collect();
        format!("<html><body>{results}</body></html>")
    }

    #[test]
    fn test_result_mentioning_unusual_traffic_is_not_blocked() {
        let html = r#"
            <html><body>
              <form id="gs_hdr_frm"><input name="q" value="unusual traffic detection"></form>
              <div class="gs_r gs_or gs_scl"><div class="gs_ri">
                <h3 class="gs_rt"><a href="https://example.org/net">Detecting unusual traffic patterns in backbone networks</a></h3>
              </div></div>
            </body></html>
        "#;

        assert!(!is_blocked_page(html));
        let results = collect_pages(5, |start| {
            Ok(if start == 0 { html.to_string() } else { String::new() })
        })
        .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].title,
            "Detecting unusual traffic patterns in backbone networks"
        );
    }

    #[test]
    fn test_collect_pages_walks_offsets() {
        let mut offsets = vec![];
        let results = collect_pages(20, |start| {
            offsets.push(start);
            Ok(page(start, 10))
        })
        .unwrap();

        assert_eq!(offsets, vec![0, 10]);
        assert_eq!(results.len(), 20);
        assert_eq!(results[0].title, "Result number 0");
        assert_eq!(results[19].title, "Result number 19");
    }

    #[test]
    fn test_collect_pages_stops_on_empty_page() {
        let mut offsets = vec![];
        let results = collect_pages(20, |start| {
            offsets.push(start);
            Ok(if start == 0 { page(0, 10) } else { page(0, 0) })
        })
        .unwrap();

        assert_eq!(offsets, vec![0, 10]);
        assert_eq!(results.len(), 10);
    }

    #[test]
    fn test_collect_pages_single_page_for_small_limit() {
        let mut calls = 0;
        let results = collect_pages(5, |start| {
            calls += 1;
            Ok(page(start, 10))
        })
        .unwrap();

        assert_eq!(calls, 1);
        assert_eq!(results.len(), 5);
    }

    #[test]
    fn test_collect_pages_captcha() {
        let captcha = r#"<div id="gs_captcha_ccl"><form id="captcha-form"></form></div>"#;

        let err = collect_pages(5, |_| Ok(captcha.to_string())).unwrap_err();
        assert!(matches!(err, ScholarError::Blocked));

        let results = collect_pages(20, |start| {
            Ok(if start == 0 { page(0, 10) } else { captcha.to_string() })
        })
        .unwrap();
        assert_eq!(results.len(), 10);
    }

    #[test]
    #[ignore = "requires network access"]
    fn test_live_search() {
        let source = ScholarSource::new(&ScholarConfig::default());
        let results = source.search("attention is all you need", 5).unwrap();
        assert!(!results.is_empty());
        assert!(results.len() <= 5);
    }
}
