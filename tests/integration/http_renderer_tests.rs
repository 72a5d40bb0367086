//! HttpRenderer against a mock HTTP server

use std::time::Duration;
use trawl::config::RendererConfig;
use trawl::renderer::HttpRenderer;
use trawl::{PageRenderer, RenderError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn renderer_config(page_timeout: u64) -> RendererConfig {
    RendererConfig {
        user_agent: "trawl-test/1.0".to_string(),
        page_timeout,
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

#[tokio::test]
async fn test_navigate_and_read_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "trawl-test/1.0"))
        .respond_with(html(
            r#"<html><body><a href="/one">1</a><a href="two">2</a><a href="mailto:x@y.z">m</a></body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut renderer = HttpRenderer::new(&renderer_config(5)).unwrap();
    renderer.navigate(&format!("{}/", server.uri())).await.unwrap();

    let body = renderer.current_html().await.unwrap();
    assert!(body.contains("<a href=\"/one\">"));

    let anchors = renderer.anchors().await.unwrap();
    assert_eq!(
        anchors,
        vec![
            format!("{}/one", server.uri()),
            format!("{}/two", server.uri()),
            "mailto:x@y.z".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_error_status_is_a_navigation_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut renderer = HttpRenderer::new(&renderer_config(5)).unwrap();
    let url = format!("{}/missing", server.uri());
    let err = renderer.navigate(&url).await.unwrap_err();

    assert_eq!(
        err,
        RenderError::Navigation {
            url,
            message: "HTTP 404".to_string()
        }
    );
    assert!(err.is_transient());
    assert_eq!(renderer.current_html().await.unwrap_err(), RenderError::NoPage);
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<html></html>").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut renderer = HttpRenderer::new(&renderer_config(1)).unwrap();
    let url = format!("{}/slow", server.uri());
    let err = renderer.navigate(&url).await.unwrap_err();

    assert_eq!(err, RenderError::Timeout { url });
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new/"))
        .respond_with(html(r#"<html><body><a href="child">c</a></body></html>"#))
        .mount(&server)
        .await;

    let mut renderer = HttpRenderer::new(&renderer_config(5)).unwrap();
    renderer
        .navigate(&format!("{}/old", server.uri()))
        .await
        .unwrap();

    assert_eq!(
        renderer.anchors().await.unwrap(),
        vec![format!("{}/new/child", server.uri())]
    );
}

#[tokio::test]
async fn test_click_reports_missing_and_unsupported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html(r#"<html><body><button id="more">More</button></body></html>"#))
        .mount(&server)
        .await;

    let mut renderer = HttpRenderer::new(&renderer_config(5)).unwrap();
    renderer.navigate(&server.uri()).await.unwrap();

    assert_eq!(
        renderer.click("#absent").await.unwrap_err(),
        RenderError::ElementNotFound {
            selector: "#absent".to_string()
        }
    );
    let unsupported = renderer.click("#more").await.unwrap_err();
    assert_eq!(unsupported, RenderError::Unsupported("click"));
    assert!(!unsupported.is_transient());
}
