//! Client for the CTIS public API.
//!
//! Two endpoints matter: `POST /search` serves paged trial overviews,
//! `GET /retrieve/{ctNumber}` serves the complete trial document.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER, USER_AGENT};
use serde_json::json;

use super::types::{FullTrial, SearchResponse};

/// Browser-equivalent headers; the public endpoint rejects obviously
/// scripted user agents.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:130.0) Gecko/20100101 Firefox/130.0",
        ),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(
        ORIGIN,
        HeaderValue::from_static("https://euclinicaltrials.eu"),
    );
    headers.insert(
        REFERER,
        HeaderValue::from_static("https://euclinicaltrials.eu/ctis-public/search?lang=en"),
    );
    headers
}

pub struct CtisClient {
    client: reqwest::Client,
    base_url: String,
    page_size: u32,
}

impl CtisClient {
    pub fn new(base_url: &str, page_size: u32, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .default_headers(browser_headers())
            .timeout(timeout)
            .build()
            .context("failed to build CTIS http client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size,
        })
    }

    fn search_body(&self, page: u32) -> serde_json::Value {
        json!({
            "pagination": {"page": page, "size": self.page_size},
            "sort": {"property": "decisionDate", "direction": "DESC"},
            "searchCriteria": {"containAll": "", "containAny": "", "containNot": ""},
        })
    }

    /// Fetch one page of trial overviews. Pages count from 1; the
    /// response says whether another page follows.
    pub async fn search_page(&self, page: u32) -> Result<SearchResponse> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&self.search_body(page))
            .send()
            .await
            .with_context(|| format!("search request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("search page {page} rejected"))?;
        response
            .json()
            .await
            .with_context(|| format!("invalid search response for page {page}"))
    }

    /// Number of trials the portal currently advertises.
    pub async fn total_records(&self) -> Result<u64> {
        Ok(self.search_page(1).await?.pagination.total_records)
    }

    /// Fetch the complete document for one trial.
    pub async fn full_trial(&self, ct_number: &str) -> Result<FullTrial> {
        let url = format!("{}/retrieve/{}", self.base_url, ct_number);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("retrieve request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("retrieve rejected for {ct_number}"))?;
        response
            .json()
            .await
            .with_context(|| format!("invalid trial document for {ct_number}"))
    }
}
