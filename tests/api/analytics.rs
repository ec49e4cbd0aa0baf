use anyhow::Result;
use reqwest::{header, StatusCode};
use serde_json::json;

use crate::helpers::{TestApp, TEST_TRACKING_ID};

const INIT_SCRIPT_MARKER: &str = r#"id="gtag-init""#;

#[tokio::test]
async fn home_page_carries_the_analytics_tags_once() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get("/").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let page = res.text().await?;

    let loader = format!(
        r#"<script async src="https://www.googletagmanager.com/gtag/js?id={TEST_TRACKING_ID}"></script>"#
    );
    assert_eq!(page.matches(&loader).count(), 1);
    assert_eq!(page.matches(INIT_SCRIPT_MARKER).count(), 1);
    assert!(page.contains(&format!(r#"gtag('config', "{TEST_TRACKING_ID}""#)));

    // Injected into the head, before the page's own markup.
    let snippet_at = page.find(INIT_SCRIPT_MARKER).unwrap_or(usize::MAX);
    let head_end = page.find("</head>").unwrap_or(0);
    assert!(snippet_at < head_end);

    Ok(())
}

#[tokio::test]
async fn page_view_follows_path_and_query() -> Result<()> {
    let app = TestApp::spawn().await?;

    let page = app.get("/").await?.text().await?;
    assert!(page.contains(r#"page_path: "/","#));

    let page = app.get("/?utm_source=newsletter").await?.text().await?;
    assert!(page.contains(r#"page_path: "/?utm_source=newsletter","#));

    Ok(())
}

#[tokio::test]
async fn injected_page_has_a_correct_content_length() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get("/").await?;
    let content_length = res
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    let page = res.text().await?;

    assert_eq!(content_length, Some(page.len()));

    Ok(())
}

#[tokio::test]
async fn api_responses_are_not_touched() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.post_subscribe(&json!({ "email": "nope" })).await?;
    let body = res.text().await?;

    assert!(!body.contains("gtag"));

    Ok(())
}

#[tokio::test]
async fn no_tags_when_analytics_is_disabled() -> Result<()> {
    let app = TestApp::spawn_with(|config| config.analytics_config.tracking_id = None).await?;

    let res = app.get("/").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let page = res.text().await?;

    assert!(page.contains(r#"id="subscribe-form""#));
    assert!(!page.contains("googletagmanager"));
    assert!(!page.contains(INIT_SCRIPT_MARKER));

    Ok(())
}
