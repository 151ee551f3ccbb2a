//! Retrying page fetcher
//!
//! Performs one logical page fetch with a bounded attempt budget and
//! class-specific backoff. The fetcher mutates no shared state; it either
//! returns a validated page or reports exhaustion to the orchestrator, never
//! panicking past that boundary.

use crate::catalog::CatalogPage;
use crate::config::{HarvesterConfig, SourceConfig};
use crate::harvest::backoff::{backoff_delay, ErrorClass};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Classified failure of a single fetch attempt
#[derive(Debug)]
pub enum FetchFailure {
    /// HTTP 429 from the upstream
    RateLimited,

    /// Any other non-success status
    Status(u16),

    /// Request timed out
    Timeout,

    /// Connection-level error
    Transport(String),

    /// 2xx response whose body failed structural validation
    InvalidPayload(String),
}

impl FetchFailure {
    /// Maps the failure onto its backoff class
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::RateLimited => ErrorClass::RateLimited,
            Self::Status(_) | Self::Timeout | Self::Transport(_) | Self::InvalidPayload(_) => {
                ErrorClass::Standard
            }
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate limited"),
            Self::Status(code) => write!(f, "HTTP {}", code),
            Self::Timeout => write!(f, "request timeout"),
            Self::Transport(e) => write!(f, "transport error: {}", e),
            Self::InvalidPayload(e) => write!(f, "invalid payload: {}", e),
        }
    }
}

/// A page's retry budget was consumed without success
#[derive(Debug)]
pub struct Exhausted {
    /// The page that failed
    pub page: u32,

    /// Attempts consumed
    pub attempts: u32,

    /// The failure observed on the final attempt
    pub last: FetchFailure,
}

impl fmt::Display for Exhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page {} exhausted after {} attempts (last: {})",
            self.page, self.attempts, self.last
        )
    }
}

/// Fetches one catalog page with retries and backoff
///
/// Per attempt: issue the request; a 2xx response is structurally validated
/// and returned immediately. A 429 sleeps the extended schedule and consumes
/// an attempt. Any other failure sleeps the standard schedule before the next
/// attempt (no sleep after the final one).
///
/// The caller is expected to hold an admission gate pass for the duration of
/// this call; backoff sleeps deliberately happen inside the slot.
pub async fn fetch_page(
    client: &Client,
    source: &SourceConfig,
    harvester: &HarvesterConfig,
    page: u32,
) -> Result<CatalogPage, Exhausted> {
    let unit = Duration::from_millis(harvester.backoff_unit_ms);
    let max_attempts = harvester.max_attempts;
    let mut last = FetchFailure::Transport("no attempt made".to_string());

    for attempt in 0..max_attempts {
        match attempt_fetch(client, source, page).await {
            Ok(catalog_page) => {
                tracing::debug!(
                    "Page {} fetched successfully (attempt {})",
                    page,
                    attempt + 1
                );
                return Ok(catalog_page);
            }
            Err(failure) => {
                tracing::warn!(
                    "Page {} attempt {}/{} failed: {}",
                    page,
                    attempt + 1,
                    max_attempts,
                    failure
                );

                let class = failure.class();
                last = failure;

                match class {
                    ErrorClass::RateLimited => {
                        // Extended backoff applies even before giving up
                        let delay = backoff_delay(class, attempt, unit);
                        tracing::warn!(
                            "Rate limit hit on page {}. Waiting {:?}...",
                            page,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                    ErrorClass::Standard => {
                        if attempt + 1 < max_attempts {
                            tokio::time::sleep(backoff_delay(class, attempt, unit)).await;
                        }
                    }
                }
            }
        }
    }

    tracing::error!("Failed to fetch page {} after {} attempts", page, max_attempts);
    Err(Exhausted {
        page,
        attempts: max_attempts,
        last,
    })
}

/// Issues one request and classifies the outcome
async fn attempt_fetch(
    client: &Client,
    source: &SourceConfig,
    page: u32,
) -> Result<CatalogPage, FetchFailure> {
    let response = client
        .get(&source.base_url)
        .query(&[("page", page), ("per_page", source.per_page)])
        .query(&source.params)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                FetchFailure::Timeout
            } else {
                FetchFailure::Transport(e.to_string())
            }
        })?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(FetchFailure::RateLimited);
    }
    if !status.is_success() {
        return Err(FetchFailure::Status(status.as_u16()));
    }

    let body: Value = response.json().await.map_err(|e| {
        if e.is_timeout() {
            FetchFailure::Timeout
        } else {
            FetchFailure::InvalidPayload(e.to_string())
        }
    })?;

    CatalogPage::from_value(body).map_err(FetchFailure::InvalidPayload)
}
