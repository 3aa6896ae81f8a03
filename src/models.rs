use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// One submission from the UI or the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub url: String,
    pub keyword: String,
    pub domain: String,
}

impl AnalysisRequest {
    /// Builds a request with surrounding whitespace removed from every field.
    pub fn new(url: &str, keyword: &str, domain: &str) -> Self {
        Self {
            url: url.trim().to_string(),
            keyword: keyword.trim().to_string(),
            domain: domain.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        if self.keyword.is_empty() {
            return Err(ValidationError::EmptyKeyword);
        }
        if self.domain.is_empty() {
            return Err(ValidationError::EmptyDomain);
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ValidationError::InvalidScheme);
        }
        Ok(())
    }
}

/// Outcome of one analyzer: either the full success payload or an error
/// message, never a mix of both.
///
/// Serialized untagged so a failure reads as `{"error": "..."}` in the JSON
/// snapshot and the generative prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionResult<T> {
    Failed { error: String },
    Success(T),
}

impl<T> SectionResult<T> {
    pub fn failed(message: impl Into<String>) -> Self {
        SectionResult::Failed {
            error: message.into(),
        }
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            SectionResult::Success(value) => Some(value),
            SectionResult::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SectionResult::Failed { error } => Some(error),
            SectionResult::Success(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SectionResult::Failed { .. })
    }
}

impl<T> From<anyhow::Error> for SectionResult<T> {
    fn from(err: anyhow::Error) -> Self {
        SectionResult::failed(format!("{:#}", err))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSpeedMetrics {
    /// Lighthouse performance score in the 0-1 range
    pub performance_score: Option<f64>,
    pub first_contentful_paint: Option<String>,
    pub speed_index: Option<String>,
    pub largest_contentful_paint: Option<String>,
    pub total_blocking_time: Option<String>,
    pub cumulative_layout_shift: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankInfo {
    pub keyword: String,
    pub domain: String,
    /// 1-based position in the organic results, `None` when the domain is absent
    pub rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMetrics {
    pub keyword: String,
    pub total_words: usize,
    pub keyword_count: usize,
    pub keyword_density_percent: f64,
    pub in_title: bool,
    pub in_meta_description: bool,
    pub readability_score: f64,
}

pub type PageSpeedResult = SectionResult<PageSpeedMetrics>;
pub type RankResult = SectionResult<RankInfo>;
pub type KeywordResult = SectionResult<KeywordMetrics>;

/// Which assembler path produced the report text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    Generative,
    Template,
}

/// Snapshot persisted as `seo_report_<timestamp>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: String,
    pub url: String,
    pub keyword: String,
    pub domain: String,
    pub mode: ReportMode,
    pub result: String,
    pub pagespeed: PageSpeedResult,
    pub rank: RankResult,
    pub keywords: KeywordResult,
}
