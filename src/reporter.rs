use crate::models::{Report, ReportMode, SectionResult};
use anyhow::{Context, Result};
use colored::*;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Format used both in report file names and in the `timestamp` field.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

static REPORT_FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^seo_report_\d{8}_\d{6}\.json$").expect("report file regex should be valid")
});

pub struct Reporter;

impl Reporter {
    pub fn report_filename(timestamp: &str) -> String {
        format!("seo_report_{}.json", timestamp)
    }

    /// True for names produced by [`Reporter::report_filename`].
    pub fn is_report_filename(name: &str) -> bool {
        REPORT_FILE_RE.is_match(name)
    }

    /// Writes `report` as pretty JSON into `dir` and returns the file path.
    pub fn save_json_report(report: &Report, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

        let path = dir.join(Self::report_filename(&report.timestamp));
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&path)
            .with_context(|| format!("Failed to create report file: {}", path.display()))?;
        file.write_all(json.as_bytes())?;

        tracing::info!(path = %path.display(), "Report saved");
        Ok(path)
    }

    pub fn print_text_report(report: &Report) {
        println!("\n{}", "=".repeat(80).bright_blue());
        println!("{}", "Infera - SEO Analysis Report".bright_cyan().bold());
        println!("{}", "=".repeat(80).bright_blue());
        println!();

        println!("{}: {}", "URL".bright_white().bold(), report.url);
        println!("{}: {}", "Keyword".bright_white().bold(), report.keyword);
        println!("{}: {}", "Domain".bright_white().bold(), report.domain);
        println!("{}: {}", "Timestamp".bright_white().bold(), report.timestamp);
        println!(
            "{}: {}",
            "Mode".bright_white().bold(),
            match report.mode {
                ReportMode::Generative => "generative".bright_magenta(),
                ReportMode::Template => "template".normal(),
            }
        );
        println!();

        println!("{}", "Data Sources".bright_yellow().bold().underline());
        Self::print_source_status("PageSpeed", &report.pagespeed);
        Self::print_source_status("Search rank", &report.rank);
        Self::print_source_status("Keywords", &report.keywords);
        println!();

        println!("{}", report.result);
        println!("{}", "=".repeat(80).bright_blue());
    }

    fn print_source_status<T>(label: &str, result: &SectionResult<T>) {
        match result.error() {
            None => println!("  {:<12} {}", label, "ok".bright_green()),
            Some(error) => println!("  {:<12} {} {}", label, "failed".bright_red(), error.dimmed()),
        }
    }
}
