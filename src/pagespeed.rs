use crate::models::{PageSpeedMetrics, PageSpeedResult, SectionResult};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_PAGESPEED_ENDPOINT: &str =
    "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";
pub const DEFAULT_STRATEGY: &str = "desktop";

#[derive(Debug, Default, Deserialize)]
struct PageSpeedResponse {
    #[serde(rename = "lighthouseResult", default)]
    lighthouse_result: LighthouseResult,
}

#[derive(Debug, Default, Deserialize)]
struct LighthouseResult {
    #[serde(default)]
    categories: Categories,
    #[serde(default)]
    audits: HashMap<String, Audit>,
}

#[derive(Debug, Default, Deserialize)]
struct Categories {
    performance: Option<Category>,
}

#[derive(Debug, Deserialize)]
struct Category {
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Audit {
    #[serde(rename = "displayValue")]
    display_value: Option<String>,
}

impl LighthouseResult {
    fn display_value(&self, audit_id: &str) -> Option<String> {
        self.audits
            .get(audit_id)
            .and_then(|audit| audit.display_value.clone())
    }

    fn into_metrics(self) -> PageSpeedMetrics {
        PageSpeedMetrics {
            performance_score: self
                .categories
                .performance
                .as_ref()
                .and_then(|category| category.score),
            first_contentful_paint: self.display_value("first-contentful-paint"),
            speed_index: self.display_value("speed-index"),
            largest_contentful_paint: self.display_value("largest-contentful-paint"),
            total_blocking_time: self.display_value("total-blocking-time"),
            cumulative_layout_shift: self.display_value("cumulative-layout-shift"),
        }
    }
}

/// Client for the PageSpeed Insights `runPagespeed` API.
pub struct PageSpeedClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    strategy: String,
}

impl PageSpeedClient {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: Option<String>,
        strategy: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            strategy: strategy.into(),
        }
    }

    /// Measures `url`. A non-200 status becomes `{error: "API error: <code>"}`;
    /// transport and decoding failures are wrapped the same way.
    pub async fn measure(&self, url: &str) -> PageSpeedResult {
        match self.request(url).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "PageSpeed request failed");
                e.into()
            }
        }
    }

    async fn request(&self, url: &str) -> Result<PageSpeedResult> {
        let mut query = vec![("url", url), ("strategy", self.strategy.as_str())];
        if let Some(key) = &self.api_key {
            query.push(("key", key.as_str()));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await
            .context("Failed to send PageSpeed request")?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Ok(SectionResult::failed(format!(
                "API error: {}",
                status.as_u16()
            )));
        }

        let body: PageSpeedResponse = response
            .json()
            .await
            .context("Failed to parse PageSpeed response")?;

        Ok(SectionResult::Success(body.lighthouse_result.into_metrics()))
    }
}
