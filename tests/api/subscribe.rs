use anyhow::Result;
use email_collector::model::MemoryStore;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::helpers::{TestApp, TEST_USER_AGENT};

#[tokio::test]
async fn api_subscribe_ok() -> Result<()> {
    let app = TestApp::spawn().await?;

    let body = json!({
        "email": "User@Example.com",
        "source": "product-a",
        "pageUrl": "/landing"
    });

    let res = app.post_subscribe(&body).await?;

    assert_eq!(
        res.status(),
        StatusCode::CREATED,
        "Wrong response StatusCode: {}",
        res.status()
    );
    let res_body: Value = res.json().await?;
    assert_eq!(
        res_body,
        json!({ "success": true, "message": "Email collected successfully." })
    );

    let records = app.store.records().await;
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.email, "user@example.com");
    assert_eq!(record.source, "product-a");
    assert_eq!(record.metadata.page_url.as_deref(), Some("/landing"));
    assert_eq!(record.metadata.referrer, None);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_records_request_metadata() -> Result<()> {
    let app = TestApp::spawn().await?;

    let body = json!({
        "email": "jd@example.com",
        "source": "product-b",
        "referrer": "https://news.example"
    });

    let res = app.post_subscribe(&body).await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .http_client
        .post(app.url("/api/subscribe"))
        .header("X-Forwarded-For", "203.0.113.7")
        .json(&body)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let records = app.store.records().await;
    assert_eq!(records.len(), 2);

    let direct = &records[0].metadata;
    assert_eq!(direct.ip.as_deref(), Some("127.0.0.1"));
    assert_eq!(direct.user_agent.as_deref(), Some(TEST_USER_AGENT));
    assert_eq!(direct.referrer.as_deref(), Some("https://news.example"));

    let forwarded = &records[1].metadata;
    assert_eq!(forwarded.ip.as_deref(), Some("203.0.113.7"));

    Ok(())
}

#[tokio::test]
async fn api_subscribe_same_email_twice_is_stored_twice() -> Result<()> {
    let app = TestApp::spawn().await?;
    let body = json!({ "email": "jd@example.com", "source": "product-a" });

    for _ in 0..2 {
        let res = app.post_subscribe(&body).await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let records = app.store.records().await;
    assert_eq!(records.len(), 2);
    assert_ne!(records[0].id, records[1].id);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_returns_a_400_when_required_fields_are_missing() -> Result<()> {
    let app = TestApp::spawn().await?;

    let cases = [
        (json!({ "source": "product-a" }), "Missing email"),
        (json!({ "email": "jd@example.com" }), "Missing source"),
        (
            json!({ "email": null, "source": "product-a" }),
            "Null email",
        ),
        (json!({ "email": "", "source": "product-a" }), "Empty email"),
        (json!({}), "Empty json"),
    ];

    for (body, description) in cases {
        let res = app.post_subscribe(&body).await?;
        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "Wrong response: ({}), Expected: ({}); for request with: {description}",
            res.status(),
            StatusCode::BAD_REQUEST
        );

        let res_body: Value = res.json().await?;
        assert_eq!(
            res_body,
            json!({ "success": false, "message": "Email and Source are required fields." }),
            "Wrong body for request with: {description}"
        );
    }
    assert!(app.store.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_returns_a_400_when_fields_are_present_but_invalid() -> Result<()> {
    let app = TestApp::spawn().await?;

    let cases = [
        (
            json!({ "email": "not-an-email", "source": "product-b" }),
            "Please use a valid email address.",
        ),
        (
            json!({ "email": "jd@example", "source": "product-b" }),
            "Please use a valid email address.",
        ),
        (
            json!({ "email": "   ", "source": "product-b" }),
            "Email is required",
        ),
        (
            json!({ "email": "not an email", "source": "  " }),
            "Please use a valid email address., Source is required",
        ),
    ];

    for (body, expected_message) in cases {
        let res = app.post_subscribe(&body).await?;
        assert_eq!(
            400,
            res.status().as_u16(),
            "The API did not return a 400 BAD REQUEST the payload was {body}."
        );

        let res_body: Value = res.json().await?;
        assert_eq!(res_body["success"], json!(false));
        assert_eq!(res_body["message"], json!(expected_message));
    }
    assert!(app.store.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_returns_a_400_for_malformed_bodies() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .http_client
        .post(app.url("/api/subscribe"))
        .header("Content-Type", "application/json")
        .body("{ not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let res_body: Value = res.json().await?;
    assert_eq!(
        res_body,
        json!({ "success": false, "message": "Invalid request body." })
    );

    let res = app
        .post_subscribe(&json!({ "email": ["jd@example.com"], "source": "product-a" }))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let res_body: Value = res.json().await?;
    assert_eq!(res_body["message"], json!("Invalid request body."));
    assert!(app.store.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_reads_scalar_fields_as_strings() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_subscribe(&json!({
            "email": "jd@example.com",
            "source": "product-a",
            "pageUrl": 5,
            "referrer": null
        }))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let records = app.store.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].metadata.page_url.as_deref(), Some("5"));
    assert_eq!(records[0].metadata.referrer, None);

    // A numeric email reaches validation instead of failing the body.
    let res = app
        .post_subscribe(&json!({ "email": 42, "source": "product-a" }))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let res_body: Value = res.json().await?;
    assert_eq!(
        res_body,
        json!({ "success": false, "message": "Please use a valid email address." })
    );
    assert_eq!(app.store.len().await, 1);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_without_json_content_type_is_missing_fields() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .http_client
        .post(app.url("/api/subscribe"))
        .header("Content-Type", "text/plain")
        .body(r#"{"email":"jd@example.com","source":"product-a"}"#)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let res_body: Value = res.json().await?;
    assert_eq!(
        res_body,
        json!({ "success": false, "message": "Email and Source are required fields." })
    );
    assert!(app.store.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_returns_a_500_when_the_store_is_down() -> Result<()> {
    let app = TestApp::spawn_with_store(MemoryStore::unavailable()).await?;

    let body = json!({ "email": "jd@example.com", "source": "product-a" });
    let res = app.post_subscribe(&body).await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.headers().contains_key("x-request-id"));
    let res_body: Value = res.json().await?;
    assert_eq!(
        res_body,
        json!({ "success": false, "message": "Server Error. Please try again later." })
    );
    assert!(app.store.is_empty().await);

    // The store coming back is picked up without a restart.
    app.store.set_available(true);
    let res = app.post_subscribe(&body).await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(app.store.len().await, 1);

    Ok(())
}

#[tokio::test]
async fn cors_preflight_is_allowed_from_any_origin() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .http_client
        .request(reqwest::Method::OPTIONS, app.url("/api/subscribe"))
        .header("Origin", "https://product-a.example")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await?;

    assert!(res.status().is_success());
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );

    let res = app
        .http_client
        .post(app.url("/api/subscribe"))
        .header("Origin", "https://product-b.example")
        .json(&json!({ "source": "product-b" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.headers().contains_key("access-control-allow-origin"));

    Ok(())
}
