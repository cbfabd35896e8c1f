//! Crossref-backed [`DateSource`].
//!
//! One `lookup` = one admission through the run's [`RateLimiter`] followed by
//! one `GET {base}/works/{doi}`. Crossref is treated as untrusted and
//! unreliable: timeouts, 429s, 5xx and malformed bodies are all expected and
//! classified rather than raised.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::config::ResolverConfig;
use crate::date::ResolvedDate;
use crate::doi::Doi;
use crate::error::ResolverError;
use crate::limiter::RateLimiter;
use crate::outcome::{FatalCause, LookupOutcome, TransientCause};
use crate::source::DateSource;

/// Shape of the works endpoint response we care about:
/// `{"message": {"created": {"date-parts": [[y, m, d]]}}}`.
#[derive(Deserialize)]
struct WorksResponse {
    message: WorkMessage,
}

#[derive(Deserialize)]
struct WorkMessage {
    created: Option<PartedDate>,
}

#[derive(Deserialize)]
struct PartedDate {
    #[serde(rename = "date-parts")]
    date_parts: Vec<Vec<i64>>,
}

/// HTTP client for the Crossref works endpoint, rate-limited per run.
pub struct CrossrefClient {
    http: reqwest::Client,
    base_url: String,
    limiter: Arc<RateLimiter>,
    timeout: Duration,
}

impl CrossrefClient {
    /// Builds the client and this run's limiter from the configuration.
    ///
    /// Validates the configuration first, so a degenerate rate or timeout is
    /// rejected here rather than surfacing later inside the limiter.
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolverError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter: Arc::new(RateLimiter::new(config.rate_per_sec)),
            timeout: config.request_timeout,
        })
    }
}

#[async_trait]
impl DateSource for CrossrefClient {
    async fn lookup(&self, doi: &Doi) -> LookupOutcome {
        // The limiter wait counts against the request timeout, so a saturated
        // queue surfaces as a transient timeout instead of blocking forever.
        if tokio::time::timeout(self.timeout, self.limiter.acquire())
            .await
            .is_err()
        {
            return LookupOutcome::TransientError(TransientCause::Timeout);
        }

        let url = format!("{}/works/{}", self.base_url, doi.as_str());
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(err) if err.is_timeout() => {
                return LookupOutcome::TransientError(TransientCause::Timeout)
            }
            Err(err) => {
                return LookupOutcome::TransientError(TransientCause::Network(err.to_string()))
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) if err.is_timeout() => {
                return LookupOutcome::TransientError(TransientCause::Timeout)
            }
            Err(err) => {
                return LookupOutcome::TransientError(TransientCause::Network(err.to_string()))
            }
        };

        let outcome = classify_response(status, &body);
        debug!(doi = %doi, status = status.as_u16(), outcome = ?outcome, "crossref lookup");
        outcome
    }
}

/// Maps one Crossref response to an outcome. Pure, so the mapping is
/// testable without a server.
fn classify_response(status: StatusCode, body: &[u8]) -> LookupOutcome {
    match status {
        StatusCode::OK => parse_created(body),
        StatusCode::NOT_FOUND => LookupOutcome::NotFound,
        StatusCode::TOO_MANY_REQUESTS => {
            LookupOutcome::TransientError(TransientCause::RateLimited)
        }
        status if status.is_server_error() => {
            LookupOutcome::TransientError(TransientCause::Server(status.as_u16()))
        }
        status => LookupOutcome::FatalError(FatalCause::Status(status.as_u16())),
    }
}

fn parse_created(body: &[u8]) -> LookupOutcome {
    let parsed: WorksResponse = match serde_json::from_slice(body) {
        Ok(parsed) => parsed,
        Err(err) => return LookupOutcome::FatalError(FatalCause::MalformedBody(err.to_string())),
    };
    // A work without a created date is a legitimate miss, not an error.
    let Some(created) = parsed.message.created else {
        return LookupOutcome::NotFound;
    };
    let Some(parts) = created.date_parts.first() else {
        return LookupOutcome::NotFound;
    };
    match ResolvedDate::from_date_parts(parts) {
        Some(date) => LookupOutcome::Resolved(date),
        None => LookupOutcome::FatalError(FatalCause::MalformedBody(
            "unusable date-parts".to_string(),
        )),
    }
}
