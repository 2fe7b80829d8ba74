mod common;

use axum::http::StatusCode;
use common::{TEST_PUBLIC_URL, TEST_SECRET, TestApp};
use editor_service::dtos::SessionTicket;
use editor_service::models::{DocumentKind, SessionKey};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::json;
use std::collections::HashSet;

fn descriptor_claims(token: &str) -> serde_json::Value {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims = HashSet::new();

    jsonwebtoken::decode::<serde_json::Value>(
        token,
        &DecodingKey::from_secret(TEST_SECRET.as_bytes()),
        &validation,
    )
    .expect("token must verify against the configured secret")
    .claims
}

#[tokio::test]
async fn token_issuance_works_for_authorized_user() {
    let app = TestApp::spawn().await;
    app.given_user("u1").await;
    app.given_access("candidates", "42", "u1", true).await;
    app.given_document("candidates", "42", "generated/cv-42.docx")
        .await;

    let response = app
        .client
        .post(format!("{}/onlyoffice/token/candidate/42", app.address))
        .header("X-User-ID", "u1")
        .json(&json!({ "documentKey": "candidate_42" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, response.status());
    let ticket: SessionTicket = response.json().await.expect("Failed to parse JSON");

    // The access URL points back at this service's proxy, wrapping the
    // signed blob URL.
    assert!(ticket
        .access_url
        .starts_with(&format!("{}/project/proxy_document?blob_url=", TEST_PUBLIC_URL)));
    assert!(ticket.access_url.contains("generated/cv-42.docx"));

    // The descriptor verifies against the shared secret and carries a
    // decodable session key for the right document and user.
    let claims = descriptor_claims(&ticket.token);
    assert_eq!(claims["documentType"], "word");
    assert_eq!(claims["document"]["fileType"], "docx");
    assert_eq!(claims["document"]["url"], ticket.access_url);
    assert_eq!(claims["document"]["permissions"]["edit"], true);
    assert_eq!(claims["document"]["permissions"]["download"], false);
    assert_eq!(
        claims["editorConfig"]["callbackUrl"],
        format!("{}/onlyoffice/callback", TEST_PUBLIC_URL)
    );

    let key = SessionKey::decode(claims["document"]["key"].as_str().unwrap()).unwrap();
    assert_eq!(key.object_name(), "generated/cv-42.docx");
    assert_eq!(key.kind(), DocumentKind::Candidate);
    assert_eq!(key.document_id(), "42");
    assert_eq!(key.user_id(), "u1");

    app.cleanup().await;
}

#[tokio::test]
async fn token_issuance_for_job_post_uses_its_own_lookups() {
    let app = TestApp::spawn().await;
    app.given_user("u2").await;
    app.given_access("job_posts", "7", "u2", true).await;
    app.given_document("job_posts", "7", "generated/jp-7.docx")
        .await;

    let response = app
        .client
        .post(format!("{}/onlyoffice/token/job_post/7", app.address))
        .header("X-User-ID", "u2")
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, response.status());
    let ticket: SessionTicket = response.json().await.expect("Failed to parse JSON");

    let claims = descriptor_claims(&ticket.token);
    let key = SessionKey::decode(claims["document"]["key"].as_str().unwrap()).unwrap();
    assert_eq!(key.kind(), DocumentKind::JobPost);
    assert_eq!(key.document_id(), "7");

    app.cleanup().await;
}

#[tokio::test]
async fn unauthorized_user_gets_403() {
    let app = TestApp::spawn().await;
    app.given_user("u1").await;
    app.given_access("candidates", "42", "u1", false).await;
    app.given_document("candidates", "42", "generated/cv-42.docx")
        .await;

    let response = app
        .client
        .post(format!("{}/onlyoffice/token/candidate/42", app.address))
        .header("X-User-ID", "u1")
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::FORBIDDEN, response.status());

    app.cleanup().await;
}

#[tokio::test]
async fn unknown_kind_gets_400() {
    let app = TestApp::spawn().await;
    app.given_user("u1").await;

    let response = app
        .client
        .post(format!("{}/onlyoffice/token/invoice/42", app.address))
        .header("X-User-ID", "u1")
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_REQUEST, response.status());

    app.cleanup().await;
}

#[tokio::test]
async fn document_without_generated_file_gets_404() {
    let app = TestApp::spawn().await;
    app.given_user("u1").await;
    app.given_access("candidates", "42", "u1", true).await;
    // No document registered: the directory answers 404.

    let response = app
        .client
        .post(format!("{}/onlyoffice/token/candidate/42", app.address))
        .header("X-User-ID", "u1")
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::NOT_FOUND, response.status());

    app.cleanup().await;
}

#[tokio::test]
async fn missing_user_header_gets_401() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/onlyoffice/token/candidate/42", app.address))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::UNAUTHORIZED, response.status());

    app.cleanup().await;
}

#[tokio::test]
async fn missing_signing_secret_gets_500() {
    let app = TestApp::spawn_with_secret(None).await;
    app.given_user("u1").await;
    app.given_access("candidates", "42", "u1", true).await;
    app.given_document("candidates", "42", "generated/cv-42.docx")
        .await;

    let response = app
        .client
        .post(format!("{}/onlyoffice/token/candidate/42", app.address))
        .header("X-User-ID", "u1")
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());

    app.cleanup().await;
}
