use std::future::Future;
use std::time::Duration;

use reqwest::Client;

use crate::parser::{ParseError, parse_listing};
use crate::types::{FallbackDate, Headline};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

const RETRY_PAUSE: Duration = Duration::from_secs(3);

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("HTTP request failed after {attempts} attempts: {source}")]
    FetchExhausted {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    base_url: String,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            base_url: crate::BASE_URL.to_string(),
        })
    }

    /// Fetch one listing page and extract its headlines.
    ///
    /// A non-2xx status is not an error: invalid grid dates 404 and the
    /// body still parses to an empty listing. Only transport failures are
    /// retried.
    pub async fn fetch_listing(
        &self,
        url_or_path: &str,
        fallback: FallbackDate,
        max_attempts: u32,
    ) -> Result<Vec<Headline>, ScraperError> {
        let url = if url_or_path.starts_with("http") {
            url_or_path.to_string()
        } else {
            format!("{}{}", self.base_url, url_or_path)
        };

        log::info!("Fetching news listing: {}", url);

        let html = self.get_html(&url, max_attempts).await?;
        let fallback_label = fallback.label_for(&url);

        Ok(parse_listing(&html, &fallback_label)?)
    }

    async fn get_html(&self, url: &str, max_attempts: u32) -> Result<String, ScraperError> {
        retry(max_attempts, RETRY_PAUSE, || async move {
            self.client.get(url).send().await?.text().await
        })
        .await
        .map_err(|(attempts, source)| ScraperError::FetchExhausted { attempts, source })
    }
}

/// Run `op` up to `max_attempts` times, sleeping `pause` between attempts.
/// Returns the attempt count alongside the last error on exhaustion.
async fn retry<T, E, F, Fut>(max_attempts: u32, pause: Duration, mut op: F) -> Result<T, (u32, E)>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts => {
                log::warn!("Request attempt {}/{} failed: {}", attempt, max_attempts, e);
                tokio::time::sleep(pause).await;
            }
            Err(e) => return Err((attempt, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn test_retry_succeeds_after_two_failures() {
        let calls = Cell::new(0u32);

        let result = retry(5, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            let attempt = calls.get();
            async move {
                if attempt <= 2 {
                    Err("connection reset")
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        // Two failed attempts, each followed by a backoff wait, then success.
        assert_eq!(result, Ok(3));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_retry_exhausts_attempt_budget() {
        let calls = Cell::new(0u32);

        let result: Result<(), _> = retry(5, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            async { Err("timed out") }
        })
        .await;

        assert_eq!(calls.get(), 5);
        let (attempts, source) = result.unwrap_err();
        assert_eq!(attempts, 5);
        assert_eq!(source, "timed out");
    }

    #[tokio::test]
    async fn test_retry_first_attempt_success_does_not_wait() {
        let calls = Cell::new(0u32);

        let result = retry(1, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            async { Ok::<_, &str>("page") }
        })
        .await;

        assert_eq!(result, Ok("page"));
        assert_eq!(calls.get(), 1);
    }
}
