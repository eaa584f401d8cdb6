// file: src/tools/search.rs
// description: Serper web search used to ground idea generation
// reference: https://serper.dev/api-reference

use crate::error::{CrewError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    num: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

pub struct SerperSearch {
    client: Client,
    api_key: String,
    results: usize,
}

impl SerperSearch {
    pub fn new(api_key: String, results: usize, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            CrewError::SearchRequest(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            api_key,
            results,
        })
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        debug!("Searching the web for: {}", query);

        let response = self
            .client
            .post(SERPER_ENDPOINT)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&SearchRequest {
                q: query,
                num: self.results,
            })
            .send()
            .await
            .map_err(|e| CrewError::SearchRequest(format!("Failed to send search request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CrewError::SearchRequest(format!(
                "Search request failed with status {}: {}",
                status, error_text
            )));
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| {
            CrewError::SearchRequest(format!("Failed to parse search response: {}", e))
        })?;

        let mut hits = parsed.organic;
        hits.truncate(self.results);
        debug!("Search returned {} results", hits.len());
        Ok(hits)
    }
}

/// Numbered Markdown list of hits for inclusion in a prompt.
pub fn render_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            if hit.snippet.trim().is_empty() {
                format!("{}. [{}]({})", i + 1, hit.title, hit.link)
            } else {
                format!("{}. [{}]({}): {}", i + 1, hit.title, hit.link, hit.snippet.trim())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
