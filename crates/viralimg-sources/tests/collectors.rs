//! Integration tests for the page fetcher and the source collectors.
//!
//! Each test stands up a `wiremock` server in place of the real platform so
//! no network traffic is made. Fetchers are built with retries disabled
//! unless the test is about retries.

use std::sync::Arc;

use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use viralimg_core::{AppConfig, Category, ContentType};
use viralimg_sources::{
    build_page_fetcher, FacebookCollector, HttpPageFetcher, ImageSearchCollector,
    InstagramCollector, PageFetcher, RenderedPageFetcher, SourceCollector, SourceError,
    YouTubeCollector,
};

fn test_fetcher() -> Arc<dyn PageFetcher> {
    Arc::new(HttpPageFetcher::new(5, "viralimg-test/0.1", 0, 0).expect("build test fetcher"))
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

// ---------------------------------------------------------------------------
// HttpPageFetcher
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetcher_retries_transient_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html("<html>ok</html>"))
        .mount(&server)
        .await;

    let fetcher = HttpPageFetcher::new(5, "viralimg-test/0.1", 2, 0).expect("build fetcher");
    let body = fetcher
        .fetch(&format!("{}/page", server.uri()))
        .await
        .expect("second attempt should succeed");

    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test]
async fn fetcher_does_not_retry_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpPageFetcher::new(5, "viralimg-test/0.1", 3, 0).expect("build fetcher");
    let result = fetcher.fetch(&format!("{}/missing", server.uri())).await;

    match result {
        Err(SourceError::UnexpectedStatus { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected UnexpectedStatus(404), got: {other:?}"),
    }
}

#[tokio::test]
async fn fetcher_reports_rate_limit_with_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "12"))
        .mount(&server)
        .await;

    let result = test_fetcher()
        .fetch(&format!("{}/busy", server.uri()))
        .await;

    match result {
        Err(SourceError::RateLimited {
            retry_after_secs, ..
        }) => assert_eq!(retry_after_secs, 12),
        other => panic!("expected RateLimited, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// RenderedPageFetcher
// ---------------------------------------------------------------------------

#[tokio::test]
async fn renderer_posts_target_url_with_encoded_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/content"))
        .and(query_param("token", "s3cr&t key"))
        .and(body_json(serde_json::json!({ "url": "https://example.test/page" })))
        .respond_with(html("<html>rendered</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let base_url = format!("{}/", server.uri());
    let fetcher = RenderedPageFetcher::new(&base_url, Some("s3cr&t key"), 5, 0, 0)
        .expect("build renderer");
    let body = fetcher
        .fetch("https://example.test/page")
        .await
        .expect("rendered page");

    assert_eq!(body, "<html>rendered</html>");
    assert_eq!(fetcher.name(), "renderer");
}

#[tokio::test]
async fn renderer_rejection_is_render_error_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/content"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid url"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher =
        RenderedPageFetcher::new(&server.uri(), None, 5, 3, 0).expect("build renderer");
    let result = fetcher.fetch("not a url").await;

    match result {
        Err(SourceError::Render { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "invalid url");
        }
        other => panic!("expected Render(400), got: {other:?}"),
    }
}

#[tokio::test]
async fn renderer_retries_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/content"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/content"))
        .respond_with(html("<html>second try</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher =
        RenderedPageFetcher::new(&server.uri(), None, 5, 2, 0).expect("build renderer");
    let body = fetcher
        .fetch("https://example.test/page")
        .await
        .expect("second attempt should succeed");

    assert_eq!(body, "<html>second try</html>");
}

#[test]
fn configured_renderer_url_selects_rendering_fetcher() {
    let rendered = AppConfig {
        renderer_url: Some("http://renderer.test".to_string()),
        ..AppConfig::default()
    };
    let fetcher = build_page_fetcher(&rendered).expect("build fetcher");
    assert_eq!(fetcher.name(), "renderer");

    let fetcher = build_page_fetcher(&AppConfig::default()).expect("build fetcher");
    assert_eq!(fetcher.name(), "http");
}

// ---------------------------------------------------------------------------
// Instagram
// ---------------------------------------------------------------------------

#[tokio::test]
async fn instagram_follows_hashtag_posts_and_reads_open_graph() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/explore/tags/marketing/"))
        .respond_with(html(
            r#"<a href="/p/AAA111/">one</a><a href="/p/BBB222/">two</a><a href="/about/">x</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/AAA111/"))
        .respond_with(html(
            r#"<meta property="og:title" content="Campanha &amp; resultado">
               <meta property="og:description" content="Veja #marketing #growth">
               <img src="/static/sprite.png"><img src="/scontent/photo1.jpg">"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/BBB222/"))
        .respond_with(html(r#"<img src="/scontent/photo2.jpg">"#))
        .mount(&server)
        .await;

    let collector = InstagramCollector::new(test_fetcher()).with_base_url(&server.uri());
    let candidates = collector.collect("marketing", 5).await;

    assert_eq!(candidates.len(), 2, "only two posts are linked");
    let first = &candidates[0];
    assert_eq!(first.category, Category::Instagram);
    assert_eq!(first.image_url, format!("{}/scontent/photo1.jpg", server.uri()));
    assert_eq!(first.origin_url, format!("{}/p/AAA111/", server.uri()));
    assert_eq!(first.title, "Campanha & resultado");
    assert_eq!(first.description, "Veja #marketing #growth");
    assert_eq!(first.author.as_deref(), Some("@user_0"));

    assert_eq!(candidates[1].title, "Instagram Post 1", "missing og:title falls back");
}

#[tokio::test]
async fn instagram_respects_requested_count() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/explore/tags/marketing/"))
        .respond_with(html(
            r#"<a href="/p/A/">1</a><a href="/p/B/">2</a><a href="/p/C/">3</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/A/"))
        .respond_with(html(r#"<img src="/scontent/a.jpg">"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/B/"))
        .respond_with(html(r#"<img src="/scontent/b.jpg">"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/C/"))
        .respond_with(html(r#"<img src="/scontent/c.jpg">"#))
        .expect(0)
        .mount(&server)
        .await;

    let collector = InstagramCollector::new(test_fetcher()).with_base_url(&server.uri());
    let candidates = collector.collect("marketing", 2).await;

    assert_eq!(candidates.len(), 2);
}

// ---------------------------------------------------------------------------
// Facebook
// ---------------------------------------------------------------------------

#[tokio::test]
async fn facebook_unavailable_returns_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let collector = FacebookCollector::new(test_fetcher()).with_base_url(&server.uri());
    let candidates = collector.collect("marketing digital", 6).await;

    assert!(candidates.is_empty());
}

#[tokio::test]
async fn facebook_collects_cdn_images_from_result_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/pages/"))
        .respond_with(html(r#"<a href="/pages/acme/1">Acme</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pages/acme/1"))
        .respond_with(html(
            r#"<img src="/fbcdn/post1.jpg"><img src="/static/banner.jpg"><img src="/fbcdn/post2.jpg">"#,
        ))
        .mount(&server)
        .await;

    let collector = FacebookCollector::new(test_fetcher()).with_base_url(&server.uri());
    let candidates = collector.collect("marketing", 6).await;

    let urls: Vec<&str> = candidates.iter().map(|c| c.image_url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/fbcdn/post1.jpg", server.uri()),
            format!("{}/fbcdn/post2.jpg", server.uri()),
        ]
    );
    assert_eq!(candidates[0].title, "Facebook Post Image 1");
    assert_eq!(candidates[1].author.as_deref(), Some("@page_1"));
}

// ---------------------------------------------------------------------------
// YouTube
// ---------------------------------------------------------------------------

#[tokio::test]
async fn youtube_falls_back_to_results_page_when_feed_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feeds/videos.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/results"))
        .and(query_param("sp", "CAMSAhAB"))
        .respond_with(html(
            r#"<a href="/watch?v=abcdefghijk">one</a><a href="/watch?v=ZYXWVUTSRQP">two</a>"#,
        ))
        .mount(&server)
        .await;

    let collector = YouTubeCollector::new(test_fetcher()).with_base_urls(&server.uri(), "https://img.test");
    let candidates = collector.collect("marketing", 6).await;

    assert_eq!(candidates.len(), 2);
    let first = &candidates[0];
    assert_eq!(first.content_type, ContentType::Thumbnail);
    assert_eq!(first.image_url, "https://img.test/vi/abcdefghijk/maxresdefault.jpg");
    assert_eq!(
        first.fallback_image_urls,
        vec![
            "https://img.test/vi/abcdefghijk/hqdefault.jpg".to_string(),
            "https://img.test/vi/abcdefghijk/mqdefault.jpg".to_string(),
        ]
    );
    assert_eq!(first.author.as_deref(), Some("YouTube channel"));
}

#[tokio::test]
async fn youtube_uses_feed_metadata_when_available() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feeds/videos.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<feed xmlns="http://www.w3.org/2005/Atom">
                 <entry>
                   <title>Lançamento viral</title>
                   <link rel="alternate" href="https://www.youtube.com/watch?v=abcdefghijk"/>
                   <author><name>Canal</name></author>
                 </entry>
               </feed>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/results"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let collector = YouTubeCollector::new(test_fetcher()).with_base_urls(&server.uri(), "https://img.test");
    let candidates = collector.collect("marketing", 6).await;

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].title, "Lançamento viral");
    assert_eq!(candidates[0].author.as_deref(), Some("Canal"));
    assert_eq!(candidates[0].origin_url, "https://www.youtube.com/watch?v=abcdefghijk");
}

// ---------------------------------------------------------------------------
// News / commercial image search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn news_search_filters_chrome_and_caps_at_quota() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("tbm", "isch"))
        .respond_with(html(
            r#"<img src="/img/foto1.jpg"><img src="/static/logo.png"><img src="/img/foto2.jpg">"#,
        ))
        .mount(&server)
        .await;

    let collector = ImageSearchCollector::news(test_fetcher()).with_base_url(&server.uri());
    let candidates = collector.collect("eleicoes", 4).await;

    assert_eq!(candidates.len(), 4);
    assert!(candidates.iter().all(|c| c.category == Category::News));
    assert!(candidates.iter().all(|c| !c.image_url.contains("logo")));
    assert_eq!(candidates[0].title, "News Image 1");
    assert_eq!(candidates[3].title, "News Image 4");
    assert_eq!(candidates[2].author.as_deref(), Some("@news_creator_2"));
}

#[tokio::test]
async fn commercial_search_adds_landing_page_scope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "cafe landing page produto"))
        .respond_with(html(r#"<img src="/img/produto.webp">"#))
        .expect(1)
        .mount(&server)
        .await;

    let collector = ImageSearchCollector::commercial(test_fetcher()).with_base_url(&server.uri());
    let candidates = collector.collect("cafe", 3).await;

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].category, Category::Commercial);
    assert_eq!(
        candidates[0].description,
        "Viral commercial image with high conversion potential"
    );
}
