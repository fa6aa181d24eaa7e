//! # Photo Processing Endpoint Tests
//!
//! Drives `POST /api/processphoto` against a scripted `MockAiProvider` to check
//! status codes, response bodies and how many gateway calls each outcome makes.

mod common;

use anyhow::Result;
use common::{image_form, test_config, TestApp};
use litlens::{BookTable, VerificationPolicy};
use litlens_server::config::AppConfig;
use litlens_test_utils::{
    fake_jpeg, MockAiProvider, EXTRACTION_MARKER, RAW_CATCHER_CSV, VERIFICATION_MARKER,
    VERIFIED_CATCHER_CSV,
};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};

fn scripted(extraction: &str, verification: &str) -> MockAiProvider {
    let mock = MockAiProvider::new();
    mock.add_response(EXTRACTION_MARKER, extraction);
    mock.add_response(VERIFICATION_MARKER, verification);
    mock
}

#[tokio::test]
async fn test_end_to_end_catcher_in_the_rye() -> Result<()> {
    let mock = scripted(RAW_CATCHER_CSV, VERIFIED_CATCHER_CSV);
    let app = TestApp::spawn_with_mock(&mock, VerificationPolicy::Always).await?;

    let response = app.post_photo().await?;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await?;
    let expected = "title,author,coordinates\n\
                    \"The Catcher in the Rye\",\"J.D. Salinger\",\"[0.25,0.1,0.45,0.15]\"";
    assert_eq!(body, json!({ "csv": expected }));
    assert_eq!(mock.call_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_success_response_follows_csv_contract() -> Result<()> {
    let raw = "title,author,coordinates\n\
               \"THE LONG WALK\",\"Stephen King\",\"[0.1, 0.05, 0.9, 0.12]\"\n\
               \"Unknown\",\"Steven Kng\",\"[0.1, 0.13, 0.9, 0.2]\"\n\
               \"Moby Dck\",\"Herman Melvlle\",\"[0.1, 0.21, 0.9, 0.3]\"";
    let verified = "title,author,coordinates\n\
                    \"The Long Walk\",\"Stephen King\",\"[0.1, 0.05, 0.9, 0.12]\"\n\
                    \"The Shining\",\"Stephen King\",\"[0.1, 0.13, 0.9, 0.2]\"\n\
                    \"Moby-Dick\",\"Herman Melville\",\"[0.1, 0.21, 0.9, 0.3]\"";
    let mock = scripted(raw, verified);
    let app = TestApp::spawn_with_mock(&mock, VerificationPolicy::Always).await?;

    let response = app.post_photo().await?;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await?;
    let csv = body["csv"].as_str().expect("csv is a string");

    assert_eq!(csv.lines().next(), Some("title,author,coordinates"));
    let table = BookTable::parse(csv)?;
    assert_eq!(table.len(), 3);
    assert_eq!(table.coordinates(), BookTable::parse(raw)?.coordinates());
    Ok(())
}

#[tokio::test]
async fn test_missing_image_returns_400_without_calling_the_model() -> Result<()> {
    let mock = scripted(RAW_CATCHER_CSV, VERIFIED_CATCHER_CSV);
    let app = TestApp::spawn_with_mock(&mock, VerificationPolicy::Always).await?;

    // A form with no `image` part at all.
    let response = app
        .post_form(Form::new().text("note", "forgot the photo"))
        .await?;
    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body, json!({ "error": "Please provide an image file to process." }));

    // An `image` part that is a plain text field, not a file.
    let response = app.post_form(Form::new().text("image", "shelf.jpg")).await?;
    assert_eq!(400, response.status().as_u16());

    // A file under a different field name.
    let part = Part::bytes(fake_jpeg()).file_name("shelf.jpg");
    let response = app.post_form(Form::new().part("photo", part)).await?;
    assert_eq!(400, response.status().as_u16());

    assert_eq!(mock.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_non_multipart_body_is_rejected_without_calling_the_model() -> Result<()> {
    let mock = scripted(RAW_CATCHER_CSV, VERIFIED_CATCHER_CSV);
    let app = TestApp::spawn_with_mock(&mock, VerificationPolicy::Always).await?;

    let response = app
        .client
        .post(format!("{}/api/processphoto", app.address))
        .json(&json!({ "image": "base64..." }))
        .send()
        .await?;

    assert!(response.status().is_client_error());
    assert_eq!(mock.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_extraction_failure_returns_500_and_skips_verification() -> Result<()> {
    let mock = MockAiProvider::new();
    mock.add_failure(EXTRACTION_MARKER, "RESOURCE_EXHAUSTED: quota exceeded");
    mock.add_response(VERIFICATION_MARKER, VERIFIED_CATCHER_CSV);
    let app = TestApp::spawn_with_mock(&mock, VerificationPolicy::Always).await?;

    let response = app.post_photo().await?;

    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body, json!({ "error": "Failed to process photo." }));
    assert_eq!(mock.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_verification_failure_returns_500_without_raw_csv() -> Result<()> {
    let mock = MockAiProvider::new();
    mock.add_response(EXTRACTION_MARKER, RAW_CATCHER_CSV);
    mock.add_failure(VERIFICATION_MARKER, "upstream timeout");
    let app = TestApp::spawn_with_mock(&mock, VerificationPolicy::Always).await?;

    let response = app.post_photo().await?;

    assert_eq!(500, response.status().as_u16());
    let text = response.text().await?;
    assert!(!text.contains("Crtcher"));
    assert!(!text.contains("upstream timeout"));
    let body: Value = serde_json::from_str(&text)?;
    assert_eq!(body, json!({ "error": "Failed to process photo." }));
    assert_eq!(mock.call_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_disabled_verification_returns_raw_csv() -> Result<()> {
    let mock = MockAiProvider::new();
    mock.add_response(EXTRACTION_MARKER, RAW_CATCHER_CSV);
    mock.add_failure(VERIFICATION_MARKER, "must not be called");
    let app = TestApp::spawn_with_mock(&mock, VerificationPolicy::Disabled).await?;

    let response = app.post_photo().await?;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body, json!({ "csv": RAW_CATCHER_CSV }));
    assert_eq!(mock.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_upload_mime_type_and_bytes_reach_the_gateway() -> Result<()> {
    let mock = scripted(RAW_CATCHER_CSV, VERIFIED_CATCHER_CSV);
    let app = TestApp::spawn_with_mock(&mock, VerificationPolicy::Always).await?;

    // Larger than axum's default 2 MiB body limit.
    let photo = vec![7u8; 3 * 1024 * 1024];
    let form = image_form(photo.clone(), "image/png")?.text("note", "ignored");
    let response = app.post_form(form).await?;
    assert_eq!(200, response.status().as_u16());

    let calls = mock.get_calls();
    let image = calls[0].image.as_ref().expect("extraction call carries the image");
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(image.bytes.len(), photo.len());
    assert!(calls[1].image.is_none());
    Ok(())
}

#[tokio::test]
async fn test_missing_api_key_from_gateway_returns_500() -> Result<()> {
    let mock = MockAiProvider::new();
    mock.add_missing_key(EXTRACTION_MARKER);
    mock.add_response(VERIFICATION_MARKER, VERIFIED_CATCHER_CSV);
    let app = TestApp::spawn_with_mock(&mock, VerificationPolicy::Always).await?;

    let response = app.post_photo().await?;

    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(
        body,
        json!({ "error": "Server is missing API key configuration." })
    );
    assert_eq!(mock.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_upload_over_configured_limit_returns_413() -> Result<()> {
    let mock = scripted(RAW_CATCHER_CSV, VERIFIED_CATCHER_CSV);
    let config = AppConfig {
        max_upload_bytes: Some(1024),
        ..test_config()
    };
    let app = TestApp::spawn_with_config(&mock, config).await?;

    let response = app
        .post_form(image_form(vec![0u8; 4096], "image/jpeg")?)
        .await?;

    assert_eq!(413, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body, json!({ "error": "Uploaded image is too large." }));
    assert_eq!(mock.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_only_the_first_image_part_is_processed() -> Result<()> {
    let mock = scripted(RAW_CATCHER_CSV, VERIFIED_CATCHER_CSV);
    let app = TestApp::spawn_with_mock(&mock, VerificationPolicy::Always).await?;

    let second = Part::bytes(vec![1u8; 64])
        .file_name("other.png")
        .mime_str("image/png")?;
    let form = image_form(fake_jpeg(), "image/jpeg")?.part("image", second);
    let response = app.post_form(form).await?;

    assert_eq!(200, response.status().as_u16());
    let calls = mock.get_calls();
    assert_eq!(calls.len(), 2);
    let image = calls[0].image.as_ref().expect("extraction call carries the image");
    assert_eq!(image.mime_type, "image/jpeg");
    assert_eq!(image.bytes, fake_jpeg());
    Ok(())
}
