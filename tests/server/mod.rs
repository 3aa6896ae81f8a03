use actix_web::{App, HttpResponse, HttpServer, web};

#[allow(dead_code)]
pub const ARTICLE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Testing Guide for Beginners</title>
    <meta name="description" content="A practical TEST guide.">
    <script>var test = "test test test";</script>
    <style>.test { color: red; }</style>
</head>
<body>
    <h1>Test basics</h1>
    <p>Every test tells a story. Write the test first, then the code.</p>
    <p>Good tests are small.</p>
</body>
</html>"#;

#[allow(dead_code)]
pub const BARE_HTML: &str = "<html><head></head><body><p>Nothing to see here.</p></body></html>";

/// Serves a handful of fixed pages on an ephemeral port and returns the base URL.
pub async fn get_test_server_url() -> String {
    let http_server = HttpServer::new(|| {
        App::new()
            .route(
                "/article",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("text/html; charset=utf-8")
                        .body(ARTICLE_HTML)
                }),
            )
            .route(
                "/bare",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("text/html; charset=utf-8")
                        .body(BARE_HTML)
                }),
            )
            .route(
                "/empty",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("text/html; charset=utf-8")
                        .body("<html><body></body></html>")
                }),
            )
            .route(
                "/missing",
                web::get().to(|| async {
                    HttpResponse::NotFound()
                        .content_type("text/html; charset=utf-8")
                        .body("<html><head><title>Not Found</title></head><body>Page not found</body></html>")
                }),
            )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind test server");

    let addr = http_server
        .addrs()
        .first()
        .cloned()
        .expect("No address bound");
    let url = format!("http://{}", addr);

    let app_server = http_server.run();

    tokio::spawn(async move {
        if let Err(e) = app_server.await {
            eprintln!("Test server error: {}", e);
        }
    });

    url
}
