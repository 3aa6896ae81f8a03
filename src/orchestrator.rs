use crate::assembler::{ReportAssembler, ReportInput};
use crate::config::Settings;
use crate::error::ValidationError;
use crate::http_client::build_http_client;
use crate::keyword_analyzer::KeywordAnalyzer;
use crate::llm::{GeminiClient, TextGenerator};
use crate::models::{AnalysisRequest, KeywordResult, PageSpeedResult, RankResult, Report};
use crate::pagespeed::PageSpeedClient;
use crate::rank::RankClient;
use crate::reporter::{Reporter, TIMESTAMP_FORMAT};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait PageSpeedSource: Send + Sync {
    async fn measure(&self, url: &str) -> PageSpeedResult;
}

#[async_trait]
pub trait RankSource: Send + Sync {
    async fn lookup(&self, keyword: &str, domain: &str) -> RankResult;
}

#[async_trait]
pub trait KeywordSource: Send + Sync {
    async fn analyze(&self, url: &str, keyword: &str) -> KeywordResult;
}

#[async_trait]
impl PageSpeedSource for PageSpeedClient {
    async fn measure(&self, url: &str) -> PageSpeedResult {
        PageSpeedClient::measure(self, url).await
    }
}

#[async_trait]
impl RankSource for RankClient {
    async fn lookup(&self, keyword: &str, domain: &str) -> RankResult {
        RankClient::lookup(self, keyword, domain).await
    }
}

#[async_trait]
impl KeywordSource for KeywordAnalyzer {
    async fn analyze(&self, url: &str, keyword: &str) -> KeywordResult {
        KeywordAnalyzer::analyze(self, url, keyword).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStatus {
    Completed,
    InvalidInput,
    Failed,
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AnalysisStatus::Completed => "✅ Analysis complete",
            AnalysisStatus::InvalidInput => "❌ Invalid input",
            AnalysisStatus::Failed => "❌ An error occurred",
        };
        f.write_str(label)
    }
}

/// What the presentation layer gets back from one analysis.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// Markdown report, or the message explaining why there is none
    pub report_text: String,
    pub report_path: Option<PathBuf>,
    pub status: AnalysisStatus,
    pub report: Option<Report>,
}

impl AnalysisOutcome {
    fn invalid(err: ValidationError) -> Self {
        Self {
            report_text: format!("❌ {}", err),
            report_path: None,
            status: AnalysisStatus::InvalidInput,
            report: None,
        }
    }

    fn failed(err: anyhow::Error) -> Self {
        Self {
            report_text: format!("❌ An error occurred during analysis: {:#}", err),
            report_path: None,
            status: AnalysisStatus::Failed,
            report: None,
        }
    }
}

/// Runs the three analyzers one after another, assembles the report and
/// persists it.
pub struct Orchestrator {
    pagespeed: Box<dyn PageSpeedSource>,
    rank: Box<dyn RankSource>,
    keywords: Box<dyn KeywordSource>,
    assembler: ReportAssembler,
    output_dir: PathBuf,
    progress_bar: Option<ProgressBar>,
}

impl Orchestrator {
    pub fn new(
        pagespeed: Box<dyn PageSpeedSource>,
        rank: Box<dyn RankSource>,
        keywords: Box<dyn KeywordSource>,
        assembler: ReportAssembler,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            pagespeed,
            rank,
            keywords,
            assembler,
            output_dir: output_dir.into(),
            progress_bar: None,
        }
    }

    /// Wires the production clients from resolved settings. One HTTP client
    /// is shared by all of them.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = build_http_client(settings.timeout_secs)?;

        let generator = settings.gemini_api_key.as_ref().map(|key| {
            Box::new(GeminiClient::new(
                client.clone(),
                &settings.gemini_endpoint,
                &settings.gemini_model,
                key,
            )) as Box<dyn TextGenerator>
        });

        Ok(Self::new(
            Box::new(PageSpeedClient::new(
                client.clone(),
                &settings.pagespeed_endpoint,
                settings.pagespeed_api_key.clone(),
                &settings.strategy,
            )),
            Box::new(RankClient::new(
                client.clone(),
                &settings.serp_endpoint,
                settings.serp_api_key.clone(),
            )),
            Box::new(KeywordAnalyzer::new(client)),
            ReportAssembler::new(generator),
            &settings.output_dir,
        ))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn is_generative(&self) -> bool {
        self.assembler.is_generative()
    }

    /// Enable progress bar for the analysis stages
    pub fn enable_progress_bar(&mut self) {
        let pb = ProgressBar::new(100);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}% {msg}")
                .expect("Progress bar template should be valid")
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
    }

    fn progress(&self, position: u64, message: &'static str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_position(position);
            pb.set_message(message);
        }
    }

    /// Never fails: invalid input and unexpected errors are reported through
    /// [`AnalysisOutcome::status`].
    pub async fn analyze(&self, request: AnalysisRequest) -> AnalysisOutcome {
        if let Err(e) = request.validate() {
            tracing::info!(error = %e, "Rejected analysis request");
            return AnalysisOutcome::invalid(e);
        }

        match self.run(&request).await {
            Ok((report, path)) => {
                if let Some(ref pb) = self.progress_bar {
                    pb.finish_with_message("Analysis complete");
                }
                AnalysisOutcome {
                    report_text: report.result.clone(),
                    report_path: Some(path),
                    status: AnalysisStatus::Completed,
                    report: Some(report),
                }
            }
            Err(e) => {
                tracing::error!(url = %request.url, error = %e, "Analysis failed");
                if let Some(ref pb) = self.progress_bar {
                    pb.abandon_with_message("Analysis failed");
                }
                AnalysisOutcome::failed(e)
            }
        }
    }

    async fn run(&self, request: &AnalysisRequest) -> Result<(Report, PathBuf)> {
        tracing::info!(
            url = %request.url,
            keyword = %request.keyword,
            domain = %request.domain,
            "Starting analysis"
        );
        self.progress(10, "Starting analysis");

        self.progress(30, "Measuring page speed");
        let pagespeed = self.pagespeed.measure(&request.url).await;

        self.progress(45, "Looking up search rank");
        let rank = self.rank.lookup(&request.keyword, &request.domain).await;

        self.progress(60, "Analysing keywords");
        let keywords = self.keywords.analyze(&request.url, &request.keyword).await;

        self.progress(80, "Preparing report");
        let generated_at = Local::now();
        let assembled = self
            .assembler
            .assemble(&ReportInput {
                request,
                pagespeed: &pagespeed,
                rank: &rank,
                keywords: &keywords,
                generated_at,
            })
            .await;

        let report = Report {
            timestamp: generated_at.format(TIMESTAMP_FORMAT).to_string(),
            url: request.url.clone(),
            keyword: request.keyword.clone(),
            domain: request.domain.clone(),
            mode: assembled.mode,
            result: assembled.text,
            pagespeed,
            rank,
            keywords,
        };

        let path = Reporter::save_json_report(&report, &self.output_dir)?;
        self.progress(100, "Analysis complete");

        Ok((report, path))
    }
}
