pub mod assembler;
pub mod cli;
pub mod config;
pub mod error;
pub mod http_client;
pub mod keyword_analyzer;
pub mod llm;
pub mod models;
pub mod orchestrator;
pub mod pagespeed;
pub mod rank;
pub mod readability;
pub mod reporter;
pub mod web;

use anyhow::Result;
use cli::{AnalyzeArgs, Cli, Command};
use colored::*;
use config::{Config, Settings};
use models::AnalysisRequest;
use orchestrator::{AnalysisStatus, Orchestrator};
use reporter::Reporter;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "info,infera=debug"
    } else {
        "warn,infera=info"
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let config = Config::load(&args)?.with_env_overrides();
    let settings = config.resolve(&args);

    match &args.command {
        Command::Analyze(analyze) => run_analyze(&settings, analyze, args.verbose).await,
        Command::Serve(_) => {
            settings.warn_missing_credentials();
            web::serve(&settings).await
        }
        Command::Check => {
            print_credentials(&settings);
            Ok(())
        }
    }
}

async fn run_analyze(settings: &Settings, args: &AnalyzeArgs, verbose: bool) -> Result<()> {
    let json_output = args.output == "json";

    if !json_output {
        println!("{}", "Infera - SEO Analysis".bright_cyan().bold());
        println!("{}", "=".repeat(50).bright_blue());
        println!();
        println!("{} {}", "URL:".bright_white().bold(), args.url);
        println!("{} {}", "Keyword:".bright_white().bold(), args.keyword);
        println!("{} {}", "Domain:".bright_white().bold(), args.domain);
        println!();
    }

    settings.warn_missing_credentials();

    let mut orchestrator = Orchestrator::from_settings(settings)?;
    if !json_output && !verbose {
        orchestrator.enable_progress_bar();
    }

    let request = AnalysisRequest::new(&args.url, &args.keyword, &args.domain);
    let outcome = orchestrator.analyze(request).await;

    match outcome.status {
        AnalysisStatus::Completed => {}
        AnalysisStatus::InvalidInput | AnalysisStatus::Failed => {
            anyhow::bail!("{}", outcome.report_text.trim_start_matches("❌ "));
        }
    }

    let Some(report) = outcome.report else {
        anyhow::bail!("Analysis completed without a report");
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        Reporter::print_text_report(&report);
    }

    if let Some(path) = outcome.report_path {
        if json_output {
            eprintln!("Report saved to: {}", path.display());
        } else {
            println!("Report saved to: {}", path.display().to_string().bright_green());
        }
    }

    Ok(())
}

fn print_credentials(settings: &Settings) {
    let status = settings.credential_status();
    let line = |name: &str, present: bool| {
        let state = if present {
            "set".bright_green()
        } else {
            "missing".bright_red()
        };
        println!("  {:<20} {}", name, state);
    };

    println!("{}", "API keys".bright_yellow().bold().underline());
    line(config::PAGESPEED_KEY_VAR, status.pagespeed);
    line(config::SERP_KEY_VAR, status.serp);
    line(config::GEMINI_KEY_VAR, status.gemini);
    println!();

    if status.is_complete() {
        println!("{}", "✅ All API keys are configured.".bright_green());
    } else {
        println!(
            "{} {}",
            "⚠️  Missing API keys:".yellow(),
            status.missing().join(", ")
        );
        if !status.gemini {
            println!("Reports will use the built-in template.");
        }
    }
}
