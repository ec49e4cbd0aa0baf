use anyhow::Result;
use reqwest::{header, StatusCode};
use serde_json::json;
use signup_relay::web::routes::SUBSCRIBED_MSG;
use wiremock::{
    matchers::{any, body_json, header as header_matcher, method, path, path_regex},
    Mock, ResponseTemplate,
};

use crate::helpers::{api_message, TestApp};

const GENERIC_FAILURE: &str = "Failed to subscribe. Please try again.";

#[tokio::test]
async fn api_subscribe_ok() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_create_subscriber(json!("31897397363737859"), 1).await;
    app.mock_assign_group("31897397363737859", 200, 1).await;

    let res = app
        .post_subscribe(&json!({ "email": "le_guin@example.com" }))
        .await?;

    assert_eq!(res.status(), StatusCode::OK, "Wrong response StatusCode");
    assert_eq!(
        res.headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    assert_eq!(api_message(res).await?, SUBSCRIBED_MSG);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_sends_active_subscriber_to_provider() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(path("/api/subscribers"))
        .and(method("POST"))
        .and(header_matcher("Authorization", "Bearer local-api-key"))
        .and(body_json(json!({
            "email": "ursula@example.com",
            "status": "active"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "id": 7 } })))
        .expect(1)
        .mount(&app.mailing_list_server)
        .await;
    app.mock_assign_group("7", 200, 1).await;

    // Surrounding whitespace doesn't reach the provider.
    let res = app
        .post_subscribe(&json!({ "email": "  ursula@example.com " }))
        .await?;

    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_without_subscriber_id_returns_500() -> Result<()> {
    let provider_bodies = [
        json!({ "data": {} }),
        json!({ "data": { "id": "" } }),
        json!({ "data": { "id": 0 } }),
        json!({ "data": { "id": -5 } }),
        json!({ "data": { "id": true } }),
        json!({ "data": null }),
        json!({}),
    ];

    for provider_body in provider_bodies {
        let app = TestApp::spawn().await?;
        Mock::given(path("/api/subscribers"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(provider_body.clone()))
            .expect(1)
            .mount(&app.mailing_list_server)
            .await;
        // The group assignment must not be attempted.
        Mock::given(path_regex(r"/groups/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&app.mailing_list_server)
            .await;

        let res = app
            .post_subscribe(&json!({ "email": "le_guin@example.com" }))
            .await?;

        assert_eq!(
            res.status(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "provider body: {provider_body}"
        );
        assert_eq!(api_message(res).await?, "Error creating subscriber");
    }

    Ok(())
}

#[tokio::test]
async fn api_subscribe_provider_failure_returns_generic_500() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(path("/api/subscribers"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(422))
        .expect(1)
        .mount(&app.mailing_list_server)
        .await;

    let res = app
        .post_subscribe(&json!({ "email": "le_guin@example.com" }))
        .await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(api_message(res).await?, GENERIC_FAILURE);
    // Only the upsert was sent.
    let received = app
        .mailing_list_server
        .received_requests()
        .await
        .unwrap_or_default();
    assert_eq!(received.len(), 1);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_group_assignment_failure_returns_generic_500() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_create_subscriber(json!("42"), 1).await;
    app.mock_assign_group("42", 500, 1).await;

    let res = app
        .post_subscribe(&json!({ "email": "le_guin@example.com" }))
        .await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(api_message(res).await?, GENERIC_FAILURE);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_provider_timeout_returns_generic_500() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(30)),
        )
        .expect(1)
        .mount(&app.mailing_list_server)
        .await;

    let res = app
        .post_subscribe(&json!({ "email": "le_guin@example.com" }))
        .await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(api_message(res).await?, GENERIC_FAILURE);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_returns_a_400_when_email_is_invalid() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.mailing_list_server)
        .await;

    let cases = [
        (json!({ "email": "" }), "Empty email"),
        (json!({ "email": "not an email" }), "Invalid email"),
        (json!({ "email": "@domain.com" }), "Missing local part"),
    ];

    for (body, description) in cases {
        let res = app.post_subscribe(&body).await?;
        assert_eq!(
            400,
            res.status().as_u16(),
            "The API did not return a 400 BAD REQUEST the payload was {description}."
        );
        assert!(api_message(res)
            .await?
            .starts_with("Received invalid input"));
    }

    Ok(())
}

#[tokio::test]
async fn api_subscribe_unprocessable_entity() -> Result<()> {
    let app = TestApp::spawn().await?;

    let tests = [
        (json!({}), "Empty json"),
        (json!({ "email": null }), "Null email"),
        (json!({ "mail": "jd@example.com" }), "Wrong field"),
    ];

    for (json_request, params) in tests {
        let res = app.post_subscribe(&json_request).await?;
        assert_eq!(
            res.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "Wrong response: ({}), Expected: ({}); for request with: {params}",
            res.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert!(api_message(res)
            .await?
            .starts_with("Received invalid input"));
    }

    Ok(())
}

#[tokio::test]
async fn api_subscribe_rejects_malformed_body() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .http_client
        .post(app.url("/api/subscribe"))
        .header(header::CONTENT_TYPE, "application/json")
        .body("{ not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .http_client
        .post(app.url("/api/subscribe"))
        .body(r#"{"email": "jd@example.com"}"#)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(res.headers().contains_key("x-request-id"));

    Ok(())
}
