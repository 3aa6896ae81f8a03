use crate::models::{RankInfo, RankResult, SectionResult};
use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_SERP_ENDPOINT: &str = "https://serpapi.com/search";
const RESULTS_PER_PAGE: &str = "10";
pub const NOT_FOUND_MESSAGE: &str = "Domain ilk sayfada bulunamadı.";

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub link: String,
    pub position: Option<u32>,
}

/// Client for the SerpAPI Google search endpoint.
pub struct RankClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RankClient {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        }
    }

    /// Looks up where `domain` ranks for `keyword` on the first results page.
    pub async fn lookup(&self, keyword: &str, domain: &str) -> RankResult {
        match self.search(keyword).await {
            Ok(results) => SectionResult::Success(find_rank(keyword, domain, &results)),
            Err(e) => {
                tracing::warn!(keyword = %keyword, error = %e, "Rank lookup failed");
                e.into()
            }
        }
    }

    async fn search(&self, keyword: &str) -> Result<Vec<OrganicResult>> {
        let mut query = vec![
            ("engine", "google"),
            ("q", keyword),
            ("num", RESULTS_PER_PAGE),
        ];
        if let Some(key) = &self.api_key {
            query.push(("api_key", key.as_str()));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await
            .context("Failed to send search request")?;

        let status = response.status();
        let body: SerpResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse search response (status {})", status))?;

        if let Some(error) = body.error {
            anyhow::bail!("Search API error: {}", error);
        }
        if !status.is_success() {
            anyhow::bail!("API error: {}", status.as_u16());
        }

        Ok(body.organic_results)
    }
}

/// Returns the position of the first result whose link contains `domain`.
///
/// This is a plain case-sensitive substring test on the whole link, so
/// `ab.com` also matches `https://grab.com/x`.
pub fn find_rank(keyword: &str, domain: &str, results: &[OrganicResult]) -> RankInfo {
    let hit = results.iter().find(|result| result.link.contains(domain));

    match hit {
        Some(result) => RankInfo {
            keyword: keyword.to_string(),
            domain: domain.to_string(),
            rank: result.position,
            message: None,
        },
        None => RankInfo {
            keyword: keyword.to_string(),
            domain: domain.to_string(),
            rank: None,
            message: Some(NOT_FOUND_MESSAGE.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(link: &str, position: u32) -> OrganicResult {
        OrganicResult {
            link: link.to_string(),
            position: Some(position),
        }
    }

    #[test]
    fn test_first_match_wins() {
        let results = vec![
            result("https://other.org/", 1),
            result("https://example.com/a", 2),
            result("https://example.com/b", 3),
        ];
        let info = find_rank("seo", "example.com", &results);
        assert_eq!(info.rank, Some(2));
        assert_eq!(info.message, None);
    }

    #[test]
    fn test_no_match_reports_message() {
        let results = vec![result("https://other.org/", 1)];
        let info = find_rank("seo", "example.com", &results);
        assert_eq!(info.rank, None);
        assert_eq!(info.message.as_deref(), Some(NOT_FOUND_MESSAGE));
        assert_eq!(info.keyword, "seo");
        assert_eq!(info.domain, "example.com");
    }

    #[test]
    fn test_match_is_case_sensitive_substring() {
        let results = vec![result("https://EXAMPLE.com/", 1), result("https://grab.com/x", 2)];
        assert_eq!(find_rank("seo", "example.com", &results).rank, None);
        // Known limitation of the substring match
        assert_eq!(find_rank("seo", "ab.com", &results).rank, Some(2));
    }
}
