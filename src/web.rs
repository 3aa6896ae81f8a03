//! Form-based web interface.
//!
//! `GET /` shows the form, `POST /analyze` runs one analysis and renders the
//! report with a download link for its JSON snapshot.

use crate::config::{CredentialStatus, Settings};
use crate::models::AnalysisRequest;
use crate::orchestrator::{AnalysisOutcome, AnalysisStatus, Orchestrator};
use crate::reporter::Reporter;
use anyhow::{Context, Result};
use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use pulldown_cmark::{Event, Options, Parser, html};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub credentials: CredentialStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub domain: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    credentials: CredentialStatus,
    missing: Vec<&'static str>,
    generative: bool,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/analyze", post(analyze_handler))
        .route("/reports/:file", get(download_handler))
        .route("/api/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(settings: &Settings) -> Result<()> {
    let orchestrator = Orchestrator::from_settings(settings)?;
    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        credentials: settings.credential_status(),
    };

    let listener = tokio::net::TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("Failed to bind to address {}", settings.bind))?;

    tracing::info!("Web interface listening on http://{}", settings.bind);

    axum::serve(listener, build_router(state))
        .await
        .context("Server error")?;

    Ok(())
}

async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&state, &AnalyzeForm::default(), None))
}

async fn analyze_handler(
    State(state): State<AppState>,
    Form(form): Form<AnalyzeForm>,
) -> Html<String> {
    let request = AnalysisRequest::new(&form.url, &form.keyword, &form.domain);
    let outcome = state.orchestrator.analyze(request).await;
    Html(render_page(&state, &form, Some(&outcome)))
}

async fn download_handler(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, StatusCode> {
    if !Reporter::is_report_filename(&file) {
        tracing::warn!(file = %file, "Rejected report download");
        return Err(StatusCode::NOT_FOUND);
    }

    let path = state.orchestrator.output_dir().join(&file);
    let contents = tokio::fs::read(&path).await.map_err(|e| {
        tracing::debug!(path = %path.display(), error = %e, "Report not readable");
        StatusCode::NOT_FOUND
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file),
            ),
        ],
        contents,
    )
        .into_response())
}

async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        credentials: state.credentials,
        missing: state.credentials.missing(),
        generative: state.orchestrator.is_generative(),
    })
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Minimal HTML escaping for text and attribute values
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders a Markdown report as HTML. Raw HTML in the source is shown as
/// text, since reports echo user input and model output.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, events);
    output
}

fn render_credentials(credentials: &CredentialStatus) -> String {
    let missing = credentials.missing();
    if missing.is_empty() {
        return "<p class=\"ok\">✅ All API keys are configured.</p>".to_string();
    }

    let mut html = format!(
        "<p class=\"warn\">⚠️ Missing API keys: {}</p>",
        escape_html(&missing.join(", "))
    );
    if !credentials.gemini {
        html.push_str("<p class=\"note\">Reports will use the built-in template.</p>");
    }
    html
}

fn render_outcome(outcome: &AnalysisOutcome) -> String {
    let class = match outcome.status {
        AnalysisStatus::Completed => "ok",
        AnalysisStatus::InvalidInput | AnalysisStatus::Failed => "error",
    };

    let mut html = format!(
        "<section class=\"result\"><p class=\"status {}\">{}</p>",
        class,
        escape_html(&outcome.status.to_string())
    );

    if let Some(name) = outcome
        .report_path
        .as_ref()
        .and_then(|path| path.file_name())
        .and_then(|name| name.to_str())
    {
        html.push_str(&format!(
            "<p><a class=\"download\" href=\"/reports/{0}\" download>📥 {0}</a></p>",
            escape_html(name)
        ));
    }

    html.push_str(&format!(
        "<article class=\"report\">{}</article></section>",
        render_markdown(&outcome.report_text)
    ));
    html
}

pub fn render_page(
    state: &AppState,
    form: &AnalyzeForm,
    outcome: Option<&AnalysisOutcome>,
) -> String {
    let result = outcome.map(render_outcome).unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Infera - SEO Analysis</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; }}
form {{ display: grid; gap: 0.75rem; }}
input {{ padding: 0.5rem; font-size: 1rem; }}
button {{ padding: 0.6rem; font-size: 1rem; cursor: pointer; }}
.ok {{ color: #17803d; }}
.warn, .error {{ color: #b42318; }}
.note {{ color: #555; }}
article.report {{ background: #f6f8fa; padding: 0.5rem 1.5rem; border-radius: 6px; }}
article.report ul {{ padding-left: 1.25rem; }}
</style>
</head>
<body>
<h1>🚀 Infera - SEO Analysis</h1>
<section class="credentials">{credentials}</section>
<form method="post" action="/analyze">
<label>Website URL <input name="url" type="text" placeholder="https://example.com" value="{url}"></label>
<label>Keyword <input name="keyword" type="text" placeholder="seo analysis" value="{keyword}"></label>
<label>Domain <input name="domain" type="text" placeholder="example.com" value="{domain}"></label>
<button type="submit">🔍 Analyze</button>
</form>
{result}
</body>
</html>
"#,
        credentials = render_credentials(&state.credentials),
        url = escape_html(&form.url),
        keyword = escape_html(&form.keyword),
        domain = escape_html(&form.domain),
        result = result,
    )
}
