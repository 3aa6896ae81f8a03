use crate::models::{KeywordMetrics, KeywordResult, SectionResult};
use crate::readability::flesch_reading_ease;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node, Selector};

// Cached selectors
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("title selector should be valid"));
static META_DESC_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[name='description']").expect("meta description selector should be valid")
});

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w+\b").expect("token regex should be valid"));

/// Elements whose text content never renders.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Fetches a page and measures how it uses a target keyword.
pub struct KeywordAnalyzer {
    client: reqwest::Client,
}

impl KeywordAnalyzer {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Never fails: transport and decoding problems come back as the error
    /// variant of [`KeywordResult`].
    pub async fn analyze(&self, url: &str, keyword: &str) -> KeywordResult {
        match self.fetch_html(url).await {
            Ok(html) => SectionResult::Success(Self::analyze_html(&html, keyword)),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Keyword analysis failed");
                e.into()
            }
        }
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        // The body is analysed whatever the status code; error pages still
        // carry text worth counting.
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = %status, "Analysing non-success response body");
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))
    }

    /// Computes keyword metrics for an already fetched HTML document.
    pub fn analyze_html(html: &str, keyword: &str) -> KeywordMetrics {
        let document = Html::parse_document(html);
        let text = Self::extract_visible_text(&document);

        let keyword_lower = keyword.to_lowercase();
        let text_lower = text.to_lowercase();
        let tokens: Vec<&str> = TOKEN_RE.find_iter(&text_lower).map(|m| m.as_str()).collect();

        let total_words = tokens.len();
        let keyword_count = tokens.iter().filter(|token| **token == keyword_lower).count();

        let title = Self::extract_title(&document);
        let meta_description = Self::extract_meta_description(&document);

        KeywordMetrics {
            keyword: keyword.to_string(),
            total_words,
            keyword_count,
            keyword_density_percent: keyword_density(keyword_count, total_words),
            in_title: title.to_lowercase().contains(&keyword_lower),
            in_meta_description: meta_description.to_lowercase().contains(&keyword_lower),
            readability_score: flesch_reading_ease(&text),
        }
    }

    /// Joins every rendered text node with single spaces.
    pub fn extract_visible_text(document: &Html) -> String {
        let mut fragments = Vec::new();

        for node in document.tree.root().descendants() {
            let Node::Text(text) = node.value() else {
                continue;
            };

            let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
                Node::Element(el) => HIDDEN_ELEMENTS.contains(&el.name()),
                _ => false,
            });
            if hidden {
                continue;
            }

            let trimmed = text.trim();
            if !trimmed.is_empty() {
                fragments.push(trimmed);
            }
        }

        fragments.join(" ")
    }

    fn extract_title(document: &Html) -> String {
        document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }

    fn extract_meta_description(document: &Html) -> String {
        document
            .select(&META_DESC_SELECTOR)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(|s| s.to_string())
            .unwrap_or_default()
    }
}

/// Percentage of tokens equal to the keyword, rounded to 2 decimals.
///
/// Exact halves round to even, so 1 in 800 words is `0.12`, not `0.13`.
pub fn keyword_density(keyword_count: usize, total_words: usize) -> f64 {
    if total_words == 0 {
        return 0.0;
    }
    let density = keyword_count as f64 * 100.0 / total_words as f64;
    (density * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Rust SEO Guide</title>
    <meta name="description" content="Learn how to improve your SEO with Rust.">
    <style>body { color: seo; }</style>
    <script>var seo = "seo seo seo";</script>
</head>
<body>
    <h1>SEO basics</h1>
    <p>Good seo starts with content. Write for readers first.</p>
    <noscript>seo fallback</noscript>
</body>
</html>"#;

    #[test]
    fn test_keyword_density_zero_words() {
        assert_eq!(keyword_density(0, 0), 0.0);
        assert_eq!(keyword_density(3, 0), 0.0);
    }

    #[test]
    fn test_keyword_density_rounds_to_two_decimals() {
        assert_eq!(keyword_density(1, 3), 33.33);
        assert_eq!(keyword_density(2, 3), 66.67);
        assert_eq!(keyword_density(5, 10), 50.0);
    }

    #[test]
    fn test_keyword_density_ties_round_to_even() {
        // 0.125 and 0.0625 are exact halves at the second decimal
        assert_eq!(keyword_density(1, 800), 0.12);
        assert_eq!(keyword_density(3, 800), 0.38);
        assert_eq!(keyword_density(1, 1600), 0.06);
    }

    #[test]
    fn test_hidden_text_is_ignored() {
        let document = Html::parse_document(PAGE);
        let text = KeywordAnalyzer::extract_visible_text(&document);
        assert!(text.contains("Good seo starts with content."));
        assert!(!text.contains("var seo"));
        assert!(!text.contains("color"));
        assert!(!text.contains("fallback"));
    }

    #[test]
    fn test_analyze_html_counts_case_insensitively() {
        let metrics = KeywordAnalyzer::analyze_html(PAGE, "SEO");
        // title(3) + h1(2) + paragraph(9)
        assert_eq!(metrics.total_words, 14);
        assert_eq!(metrics.keyword_count, 3);
        assert_eq!(metrics.keyword_density_percent, 21.43);
        assert_eq!(metrics.keyword, "SEO");

        let lower = KeywordAnalyzer::analyze_html(PAGE, "seo");
        assert_eq!(lower.keyword_count, metrics.keyword_count);
        assert_eq!(lower.keyword_density_percent, metrics.keyword_density_percent);
    }

    #[test]
    fn test_title_and_meta_membership() {
        let metrics = KeywordAnalyzer::analyze_html(PAGE, "rust");
        assert!(metrics.in_title);
        assert!(metrics.in_meta_description);

        let metrics = KeywordAnalyzer::analyze_html(PAGE, "readers");
        assert!(!metrics.in_title);
        assert!(!metrics.in_meta_description);

        // Substring, not token, membership
        let metrics = KeywordAnalyzer::analyze_html(PAGE, "GUI");
        assert!(metrics.in_title);
    }

    #[test]
    fn test_missing_title_and_meta() {
        let metrics = KeywordAnalyzer::analyze_html("<html><body><p>seo</p></body></html>", "seo");
        assert!(!metrics.in_title);
        assert!(!metrics.in_meta_description);
        assert_eq!(metrics.keyword_count, 1);
        assert_eq!(metrics.keyword_density_percent, 100.0);
    }

    #[test]
    fn test_empty_page_has_zero_density() {
        let metrics = KeywordAnalyzer::analyze_html("<html><body></body></html>", "seo");
        assert_eq!(metrics.total_words, 0);
        assert_eq!(metrics.keyword_count, 0);
        assert_eq!(metrics.keyword_density_percent, 0.0);
        assert_eq!(metrics.readability_score, 0.0);
    }

    #[test]
    fn test_multi_word_keyword_never_matches_single_tokens() {
        let metrics = KeywordAnalyzer::analyze_html(PAGE, "seo guide");
        assert_eq!(metrics.keyword_count, 0);
        assert!(metrics.in_title);
    }
}
