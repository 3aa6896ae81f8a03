use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "infera")]
#[command(
    about = "SEO analysis from page speed, search rank and keyword data",
    long_about = None
)]
pub struct Cli {
    /// Path to configuration file (JSON, TOML, or YAML)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// HTTP request timeout in seconds (default: 60)
    #[arg(short, long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a single page and print the report
    Analyze(AnalyzeArgs),

    /// Serve the web interface
    Serve(ServeArgs),

    /// Report which API keys are configured
    Check,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Page to analyze (must start with http:// or https://)
    #[arg(value_name = "URL")]
    pub url: String,

    /// Keyword to measure on the page and look up in search results
    #[arg(value_name = "KEYWORD")]
    pub keyword: String,

    /// Domain to find in the search results, e.g. example.com
    #[arg(value_name = "DOMAIN")]
    pub domain: String,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    pub output: String,

    /// Directory the JSON report is written to
    #[arg(long)]
    pub output_dir: Option<String>,

    /// PageSpeed strategy: desktop or mobile
    #[arg(short, long)]
    pub strategy: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on (default: 127.0.0.1:7860)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Directory JSON reports are written to and served from
    #[arg(long)]
    pub output_dir: Option<String>,
}
