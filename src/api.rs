//! Synchronous client for **REST Countries** style endpoints (v3.1).
//!
//! This module issues one logical GET against `{base}/all` with a `fields`
//! query parameter restricting the payload to the attributes the normalized
//! table uses, and hands the raw record array to `table::CountryTable::build`.
//!
//! ### Notes
//! - Transient server errors (HTTP 500/502/503/504) and connection errors are
//!   retried up to 5 times with exponentially growing delays; 4xx and other
//!   unexpected statuses are surfaced immediately.
//! - Network timeouts use a sane default (30s) and can be adjusted via
//!   [`Client::new`].
//!
//! Typical usage:
//! ```no_run
//! # use countries_rs::Client;
//! let client = Client::default();
//! let table = client.fetch_table()?;
//! # Ok::<(), countries_rs::FetchError>(())
//! ```

use crate::table::CountryTable;
use anyhow::{Context, Result, ensure};
use log::debug;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::Url;
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Public REST Countries deployment; override via [`Client::new`].
const DEFAULT_BASE_URL: &str = "https://restcountries.com/v3.1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// First retry delay; doubled on every further retry.
const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

/// Retry ceiling for transient failures (a request makes at most
/// `1 + MAX_RETRIES` attempts).
const MAX_RETRIES: u32 = 5;

/// Statuses treated as transient and retried.
const RETRY_STATUS: [u16; 4] = [500, 502, 503, 504];

/// Attributes requested via the `fields` filter: everything the normalized
/// record carries and nothing else, to keep the payload small.
const FIELDS: [&str; 11] = [
    "name",
    "population",
    "area",
    "capital",
    "flags",
    "currencies",
    "languages",
    "region",
    "subregion",
    "borders",
    "timezones",
];

/// Failure modes of one logical fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// An attempt exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// Could not reach the endpoint, even after retries.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// Non-success status, after any applicable retries.
    #[error("request failed with HTTP {0}")]
    HttpStatus(u16),
    /// Body was not a JSON array of country objects.
    #[error("invalid JSON payload: {0}")]
    InvalidJson(String),
    /// Transport succeeded but the payload held zero records, so there is
    /// nothing to build a table from.
    #[error("endpoint returned an empty country list")]
    EmptyPayload,
}

// Allow -, _, . unescaped in field names
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc_join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(|s| percent_encoding::utf8_percent_encode(s.trim(), SAFE).to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    http: HttpClient,
    backoff: Duration,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT).expect("default client configuration")
    }
}

impl Client {
    /// Build a client for the given base URL
    /// (e.g. `https://restcountries.com/v3.1`).
    ///
    /// The URL must be well-formed and absolute and the timeout positive;
    /// both are caller configuration, checked here so [`Client::fetch_raw`]
    /// only ever reports transport outcomes.
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        ensure!(!timeout.is_zero(), "timeout must be positive");

        let base_url = base_url.as_ref().trim_end_matches('/').to_string();
        let parsed =
            Url::parse(&base_url).with_context(|| format!("invalid base URL {base_url:?}"))?;
        ensure!(parsed.has_host(), "base URL must be absolute: {base_url:?}");

        let http = HttpClient::builder()
            .timeout(timeout) // total request timeout
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("countries_rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("reqwest client build")?;

        Ok(Self {
            base_url,
            http,
            backoff: DEFAULT_BACKOFF,
        })
    }

    /// Override the first retry delay (tests shrink it to milliseconds).
    pub fn with_backoff(mut self, initial: Duration) -> Self {
        self.backoff = initial;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the raw per-country objects, in upstream order.
    ///
    /// One logical GET with bounded retry: HTTP 500/502/503/504 and
    /// connection errors are retried up to 5 times with doubling delays and
    /// surface as [`FetchError::HttpStatus`] / [`FetchError::ConnectionFailed`]
    /// once the ceiling is exhausted. Other non-success statuses and timeouts
    /// fail immediately. A body that is valid JSON but not an array is
    /// [`FetchError::InvalidJson`]; an empty array is
    /// [`FetchError::EmptyPayload`].
    pub fn fetch_raw(&self) -> Result<Vec<Value>, FetchError> {
        let url = format!("{}/all?fields={}", self.base_url, enc_join(FIELDS));
        let body = self.get_with_retry(&url)?;

        let v: Value =
            serde_json::from_str(&body).map_err(|e| FetchError::InvalidJson(e.to_string()))?;
        let records = match v {
            Value::Array(a) => a,
            _ => {
                return Err(FetchError::InvalidJson(
                    "expected a top-level array".to_string(),
                ));
            }
        };

        if records.is_empty() {
            return Err(FetchError::EmptyPayload);
        }
        Ok(records)
    }

    /// Fetch and normalize in one step: the raw payload from
    /// [`Client::fetch_raw`] run through `CountryTable::build`.
    pub fn fetch_table(&self) -> Result<CountryTable, FetchError> {
        Ok(CountryTable::build(&self.fetch_raw()?))
    }

    fn get_with_retry(&self, url: &str) -> Result<String, FetchError> {
        let mut delay = self.backoff;
        let mut retries = 0u32;
        loop {
            let failure = match self.http.get(url).send() {
                Ok(r) if r.status().is_success() => {
                    return r.text().map_err(|e| map_transport_error(&e));
                }
                Ok(r) if RETRY_STATUS.contains(&r.status().as_u16()) => {
                    FetchError::HttpStatus(r.status().as_u16())
                }
                Ok(r) => return Err(FetchError::HttpStatus(r.status().as_u16())),
                Err(e) if e.is_timeout() => return Err(FetchError::Timeout),
                Err(e) if e.is_connect() => FetchError::ConnectionFailed(e.to_string()),
                Err(e) => return Err(map_transport_error(&e)),
            };

            retries += 1;
            if retries > MAX_RETRIES {
                return Err(failure);
            }
            debug!("GET {url}: {failure}; retry {retries}/{MAX_RETRIES} in {delay:?}");
            thread::sleep(delay);
            delay *= 2;
        }
    }
}

fn map_transport_error(e: &reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::ConnectionFailed(e.to_string())
    }
}
