pub mod scholar;

use reqwest::StatusCode;
use std::{error::Error, thread::sleep, time::Duration};

pub const USER_AGENT_DEFAULT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0";

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("invalid url {0}: {1}")]
    InvalidUrl(String, url::ParseError),

    #[error("request failed with status {0}")]
    Status(StatusCode),

    #[error("request failed after {attempts} attempts: {message}")]
    Exhausted { attempts: u64, message: String },

    #[error("failed to build http client: {0}")]
    Client(String),
}

/// Knobs for a single retried GET.
#[derive(Debug, Clone)]
pub struct RequestPolicy {
    pub max_retries: u64,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            timeout: Duration::from_secs(10),
            user_agent: USER_AGENT_DEFAULT.to_string(),
        }
    }
}

fn get_error(error: &reqwest::Error) -> String {
    match error.source() {
        Some(e) => match e.source() {
            Some(e) => e.to_string(),
            None => e.to_string(),
        },
        None => error.to_string(),
    }
}

/// GET `url` with retries.
///
/// Connection errors and client errors switch to `OPT_PROXY` (when set)
/// for the next attempt. 429 backs off linearly.
pub fn get_with_retries(
    url: &str,
    query: &[(&str, &str)],
    policy: &RequestPolicy,
) -> Result<(StatusCode, Vec<u8>), ScrapeError> {
    let opt_proxy = std::env::var("OPT_PROXY").unwrap_or_default();

    let url_parsed = reqwest::Url::parse(url)
        .map_err(|e| ScrapeError::InvalidUrl(url.to_string(), e))?;

    let host = url_parsed.host_str().unwrap_or_default();
    let path = url_parsed.path();
    let iden = format!("{host}{path}");

    let mut r = 0;
    let mut force_proxy = false;
    let mut last_error = String::from("no attempts made");

    loop {
        if r >= policy.max_retries {
            return Err(ScrapeError::Exhausted {
                attempts: r,
                message: last_error,
            });
        }

        if r > 0 {
            log::debug!("{iden}: retrying");
        }

        r += 1;

        let mut client = reqwest::blocking::Client::builder()
            .user_agent(policy.user_agent.as_str())
            .timeout(policy.timeout)
            .pool_idle_timeout(policy.timeout);

        if force_proxy && !opt_proxy.is_empty() {
            log::debug!("{iden}: using proxy {opt_proxy:#?}");
            let proxy = reqwest::Proxy::all(&opt_proxy)
                .map_err(|e| ScrapeError::Client(e.to_string()))?;
            client = client.proxy(proxy);
        }

        let client = client
            .build()
            .map_err(|e| ScrapeError::Client(e.to_string()))?;

        log::debug!("{iden}: requesting");

        let resp = match client.get(url_parsed.clone()).query(query).send() {
            Ok(r) => r,
            Err(err) => {
                force_proxy = true;
                last_error = get_error(&err);
                log::error!("{iden}: {err}: {last_error:#?}");
                continue;
            }
        };

        let status = resp.status();

        if status.is_success() {
            let bytes = match resp.bytes() {
                Ok(b) => b,
                Err(err) => {
                    log::debug!("{iden}: body read failed, timeout={}", err.is_timeout());
                    last_error = get_error(&err);
                    force_proxy = true;
                    continue;
                }
            };

            return Ok((status, bytes.into()));
        }

        log::debug!("{iden}: {}", status);
        last_error = status.to_string();

        if status == StatusCode::TOO_MANY_REQUESTS {
            sleep(Duration::from_secs(r * 4));
            continue;
        }

        if status.is_client_error() {
            // no need to try again, it's over...
            if force_proxy || opt_proxy.is_empty() {
                return Err(ScrapeError::Status(status));
            }

            force_proxy = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_rejected_before_request() {
        let err = get_with_retries("not a url", &[], &RequestPolicy::default()).unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidUrl(..)));
    }

    #[test]
    fn test_zero_retries_makes_no_request() {
        let policy = RequestPolicy {
            max_retries: 0,
            ..Default::default()
        };
        let err = get_with_retries("https://example.com/", &[], &policy).unwrap_err();
        assert!(matches!(err, ScrapeError::Exhausted { attempts: 0, .. }));
    }
}
