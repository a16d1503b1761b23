use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gemini_nodes::prelude::*;

mod support;

const EDIT_PATH: &str = "/models/gemini-2.0-flash-exp:generateContent";

fn editor(base_url: &str, dir: &tempfile::TempDir) -> GeminiImageEditor {
    GeminiImageEditor::new(support::settings_with_key(base_url, dir.path())).expect("editor")
}

#[tokio::test]
async fn inline_image_becomes_tensor_with_status_0() {
    let server = MockServer::start().await;
    let edited = ImageTensor::zeros(1, 32, 48);

    Mock::given(method("POST"))
        .and(path(EDIT_PATH))
        .and(body_partial_json(serde_json::json!({
            "generationConfig": {"responseModalities": ["IMAGE", "TEXT"]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::image_body(&edited)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let original = ImageTensor::zeros(1, 800, 1500);
    let (image, status) = editor(&server.uri(), &dir)
        .edit_image("make it blue", &original, "")
        .await
        .expect("edit");

    assert_eq!(status, EditStatus::Success);
    assert_eq!(status.code(), 0);
    assert_eq!(image.shape(), &[1, 32, 48, 3]);
}

#[tokio::test]
async fn request_carries_resized_png_then_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(EDIT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::text_body("no")))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let original = ImageTensor::zeros(1, 800, 1500);
    editor(&server.uri(), &dir)
        .edit_image("make it blue", &original, "")
        .await
        .expect("edit");

    let requests = server.received_requests().await.expect("recording enabled");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let parts = body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
    assert_eq!(parts[1]["text"], "make it blue");

    use base64::Engine;
    let png = base64::engine::general_purpose::STANDARD
        .decode(parts[0]["inlineData"]["data"].as_str().unwrap())
        .unwrap();
    let sent = gemini_nodes::media::bytes_to_image_tensor(&png).unwrap();
    assert_eq!(sent.shape(), &[1, 546, 1024, 3]);
}

#[tokio::test]
async fn candidate_without_parts_returns_original_with_status_2() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"finishReason": "PROHIBITED_CONTENT"}]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let original = ImageTensor::zeros(1, 10, 10);
    let (image, status) = editor(&server.uri(), &dir)
        .edit_image("x", &original, "")
        .await
        .expect("edit");

    assert_eq!(status, EditStatus::NoParts);
    assert_eq!(image, original);
}

#[tokio::test]
async fn text_only_answer_returns_original_with_status_3() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(support::text_body("I cannot edit this image.")),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let original = ImageTensor::zeros(1, 10, 10);
    let (image, status) = editor(&server.uri(), &dir)
        .edit_image("x", &original, "")
        .await
        .expect("edit");

    assert_eq!(status.code(), 3);
    assert_eq!(image, original);
}

#[tokio::test]
async fn vendor_error_returns_original_with_status_1() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": {"code": 500, "message": "Internal error encountered.", "status": "INTERNAL"}
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let original = ImageTensor::zeros(1, 10, 10);
    let (image, status) = editor(&server.uri(), &dir)
        .edit_image("x", &original, "")
        .await
        .expect("vendor failures degrade");

    assert_eq!(status, EditStatus::VendorCallFailed);
    assert_eq!(image, original);
}

#[tokio::test]
async fn missing_key_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let mut editor =
        GeminiImageEditor::new(support::settings("http://127.0.0.1:9", dir.path())).unwrap();

    let err = editor
        .edit_image("x", &ImageTensor::zeros(1, 4, 4), "")
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::MissingCredential(_)));
}

#[tokio::test]
async fn malformed_tensor_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let mut editor = editor("http://127.0.0.1:9", &dir);
    let rgba = ImageTensor::new(ndarray::ArrayD::zeros(ndarray::IxDyn(&[1, 4, 4, 4])));

    let err = editor.edit_image("x", &rgba, "").await.unwrap_err();
    assert!(matches!(err, NodeError::InvalidShape(_)));
}

#[test]
fn blocking_entry_point() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(support::image_body(&ImageTensor::zeros(1, 8, 8))),
            )
            .mount(&server)
            .await;
        server
    });

    let dir = tempfile::tempdir().unwrap();
    let (image, status) = editor(&server.uri(), &dir)
        .edit_image_blocking("x", &ImageTensor::zeros(1, 4, 4), "")
        .expect("edit");
    assert_eq!(status, EditStatus::Success);
    assert_eq!(image.shape(), &[1, 8, 8, 3]);

    drop(server);
}
