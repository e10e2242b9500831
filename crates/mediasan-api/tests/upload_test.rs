//! Upload endpoint integration tests.
//!
//! Run with: `cargo test -p mediasan-api --test upload_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::fixtures;
use helpers::{file_form, setup_test_app, setup_test_app_with, UPLOAD_PATH};
use serde_json::{json, Value};

#[tokio::test]
async fn test_valid_png_is_sanitized() {
    let app = setup_test_app().await;

    let png = fixtures::create_test_png(24, 16);
    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form(png, "holiday.png", "image/png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({ "message": "File uploaded and sanitized successfully" })
    );

    assert_eq!(app.output_files(), vec!["holiday.png".to_string()]);
    let written = image::open(app.output_dir.path().join("holiday.png")).unwrap();
    assert_eq!((written.width(), written.height()), (24, 16));
    assert!(app.temp_files().is_empty());
}

#[tokio::test]
async fn test_valid_jpeg_is_converted_to_png() {
    let app = setup_test_app().await;

    let jpeg = fixtures::create_test_jpeg(32, 32);
    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form(jpeg, "camera.jpg", "image/jpeg"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(app.output_files(), vec!["camera.png".to_string()]);
    let bytes = std::fs::read(app.output_dir.path().join("camera.png")).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);
}

#[tokio::test]
async fn test_jpeg_markers_declared_as_png_are_rejected() {
    let app = setup_test_app().await;

    let data = fixtures::jpeg_markers_around_noise(1024);
    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form(data, "fake.png", "image/png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["message"], "Invalid file content according to byte check");
    assert_eq!(body["code"], "CONTENT_SIGNATURE_MISMATCH");
    assert!(app.output_files().is_empty());
}

#[tokio::test]
async fn test_oversized_upload_is_rejected_by_validator() {
    let app = setup_test_app().await;

    let data = fixtures::png_signature_buffer(6 * 1024 * 1024);
    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form(data, "huge.png", "image/png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["message"], "File size exceeds the limit of 5MB.");
    assert_eq!(body["code"], "FILE_TOO_LARGE");
    assert!(app.output_files().is_empty());
}

#[tokio::test]
async fn test_zero_bytes_declared_as_audio_are_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form(vec![0u8; 2048], "silence.mp3", "audio/mpeg"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["message"],
        "Invalid file content according to byte check"
    );
    assert!(app.output_files().is_empty());
    assert!(app.temp_files().is_empty());
}

#[tokio::test]
async fn test_unlisted_declared_type_is_rejected() {
    let app = setup_test_app().await;

    let png = fixtures::create_test_png(4, 4);
    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form(png, "page.html", "text/html"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["message"],
        "Invalid file type. Only JPG, PNG, GIF, MP4, and MPEG are allowed."
    );
}

#[tokio::test]
async fn test_declared_type_with_parameters_is_rejected() {
    let app = setup_test_app().await;

    let png = fixtures::create_test_png(4, 4);
    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form(png, "photo.png", "image/png; x=y"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(
        body["message"],
        "Invalid file type. Only JPG, PNG, GIF, MP4, and MPEG are allowed."
    );
    assert_eq!(body["code"], "UNSUPPORTED_FILE_TYPE");
    assert!(app.output_files().is_empty());
}

#[tokio::test]
async fn test_category_policy_accepts_same_category_mismatch() {
    let app = setup_test_app_with(&[("TYPE_MATCH_POLICY", "category")]).await;

    let jpeg = fixtures::create_test_jpeg(8, 8);
    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form(jpeg, "mislabelled.png", "image/png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(app.output_files(), vec!["mislabelled.png".to_string()]);
}

#[tokio::test]
async fn test_corrupt_image_is_sanitization_failure() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form(fixtures::corrupt_png(), "broken.png", "image/png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json::<Value>();
    assert_eq!(body["message"], "File sanitization failed");
    assert!(body.get("details").is_none());
    assert!(app.output_files().is_empty());
}

#[tokio::test]
async fn test_video_with_missing_encoder_cleans_up() {
    let app = setup_test_app_with(&[("FFMPEG_PATH", "/nonexistent/bin/ffmpeg")]).await;

    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form(fixtures::minimal_mp4(), "clip.mp4", "video/mp4"))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>()["message"],
        "File sanitization failed"
    );
    assert!(app.temp_files().is_empty());
    assert!(app.output_files().is_empty());
}

#[tokio::test]
async fn test_path_components_are_stripped_from_output_name() {
    let app = setup_test_app().await;

    let png = fixtures::create_test_png(4, 4);
    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form(png, "../../escape.png", "image/png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(app.output_files(), vec!["escape.png".to_string()]);
}

#[tokio::test]
async fn test_missing_file_field_is_rejected() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_text("description", "no file here");
    let response = app.client().post(UPLOAD_PATH).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["message"], "No file provided");
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_multiple_file_fields_are_rejected() {
    let app = setup_test_app().await;

    let png = fixtures::create_test_png(4, 4);
    let form = MultipartForm::new()
        .add_part(
            "file",
            Part::bytes(png.clone())
                .file_name("a.png")
                .mime_type("image/png"),
        )
        .add_part(
            "file",
            Part::bytes(png).file_name("b.png").mime_type("image/png"),
        );
    let response = app.client().post(UPLOAD_PATH).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(app.output_files().is_empty());
}

#[tokio::test]
async fn test_non_multipart_body_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(UPLOAD_PATH)
        .json(&json!({ "file": "not really" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "status": "alive" }));
}
