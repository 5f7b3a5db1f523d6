use crate::e2e::helpers;

use helpers::assertions::{assert_audio_headers, assert_chunk_plan};
use helpers::{pdf_bytes, TestContext, MOCK_FRAME_HEADER};
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

fn multi_chunk_text() -> String {
    "Short sentences keep the chunker honest. ".repeat(30)
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_convert_text_to_audio(ctx: &TestContext) {

    let response = ctx
        .client
        .post(
            "/api/convert/text",
            &json!({ "text": "Dr. Smith went to the store. He bought apples for the party." }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_audio_headers(&response.headers);
    response.assert_header("x-language-detected", "latin");
    response.assert_header("x-chunk-count", "1");

    let mut expected = MOCK_FRAME_HEADER.to_vec();
    expected.push(1);
    assert_eq!(response.body_bytes, expected);

    let texts = ctx.tts.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("Doctor Smith"));
    assert_eq!(
        response.header("x-character-count").map(|v| v.as_str()),
        Some(texts[0].chars().count().to_string().as_str())
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_concatenate_chunks_in_order(ctx: &TestContext) {

    let response = ctx
        .client
        .post(
            "/api/convert/text",
            &json!({ "text": multi_chunk_text(), "max_chunk_size": 200 }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let calls = ctx.tts.call_count();
    assert!(calls > 1, "expected several chunks, got {}", calls);
    response.assert_header("x-chunk-count", &calls.to_string());

    let expected: Vec<u8> = (1..=calls)
        .flat_map(|call| {
            let mut frame = MOCK_FRAME_HEADER.to_vec();
            frame.push(call as u8);
            frame
        })
        .collect();
    assert_eq!(response.body_bytes, expected);

    for text in ctx.tts.texts() {
        assert!(text.chars().count() <= 200);
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_pass_voice_options_to_every_chunk(ctx: &TestContext) {

    let response = ctx
        .client
        .post(
            "/api/convert/text",
            &json!({
                "text": multi_chunk_text(),
                "voice": "nova",
                "instructions": "Read like a calm narrator",
                "speed": 1.5,
                "max_chunk_size": 300
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let settings = ctx.tts.settings();
    assert!(settings.len() > 1);
    for s in settings {
        assert_eq!(s.voice.as_deref(), Some("nova"));
        assert_eq!(s.instructions.as_deref(), Some("Read like a calm narrator"));
        assert_eq!(s.speed, 1.5);
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_text(ctx: &TestContext) {

    let response = ctx
        .client
        .post("/api/convert/text", &json!({ "text": "   " }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Text cannot be empty");
    assert_eq!(ctx.tts.call_count(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_text_over_limit(ctx: &TestContext) {

    let text = "a".repeat(ctx.config.max_text_length + 1);
    let response = ctx
        .client
        .post("/api/convert/text", &json!({ "text": text }))
        .await
        .unwrap();

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(ctx.tts.call_count(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_out_of_range_speed(ctx: &TestContext) {

    let response = ctx
        .client
        .post(
            "/api/convert/text",
            &json!({ "text": "A perfectly readable sentence for the test.", "speed": 9.0 }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("speed must be between");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_malformed_json(ctx: &TestContext) {

    let response = ctx
        .client
        .post_bytes("/api/convert/text", "application/json", b"{\"text\":".to_vec())
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.body.as_ref().and_then(|b| b.get("message")).is_some());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_map_quota_errors_and_stop_at_failing_chunk(ctx: &TestContext) {

    ctx.tts
        .fail_on_call(2, "You exceeded your current quota, please check your plan and billing details.");

    let response = ctx
        .client
        .post(
            "/api/convert/text",
            &json!({ "text": multi_chunk_text(), "max_chunk_size": 200 }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::TOO_MANY_REQUESTS)
        .assert_error_message("chunk 2 of");
    assert_eq!(ctx.tts.call_count(), 2, "no chunk is synthesized after a failure");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_invalid_api_key(ctx: &TestContext) {

    ctx.tts
        .fail_on_call(1, "OpenAI TTS error: Incorrect API key provided");

    let response = ctx
        .client
        .post(
            "/api/convert/text",
            &json!({ "text": "A perfectly readable sentence for the test." }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_error_message("rejected the configured API key");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_preview_chunks_without_synthesis(ctx: &TestContext) {

    let response = ctx
        .client
        .post(
            "/api/convert/preview",
            &json!({ "text": multi_chunk_text(), "max_chunk_size": 200 }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let plan = response.body.as_ref().unwrap();
    assert_chunk_plan(plan, "latin");
    assert_eq!(plan.get("language_tag").and_then(|v| v.as_str()), Some("en"));
    assert!(plan["chunks"].as_array().unwrap().len() > 1);
    assert_eq!(ctx.tts.call_count(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_preview_arabic_text(ctx: &TestContext) {

    let response = ctx
        .client
        .post(
            "/api/convert/preview",
            &json!({ "text": "مرحبا بكم في العالم وأهلا وسهلا بالجميع" }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let plan = response.body.as_ref().unwrap();
    assert_chunk_plan(plan, "arabic");
    assert_eq!(plan.get("language_tag").and_then(|v| v.as_str()), Some("ar"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_convert_pdf_to_audio(ctx: &TestContext) {

    ctx.pdf.set_pages(&[
        "Chapter one begins here with a quiet morning.",
        "",
        "Chapter two follows with a busy afternoon.",
    ]);

    let response = ctx
        .client
        .post_bytes("/api/convert", "application/pdf", pdf_bytes())
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_audio_headers(&response.headers);

    let texts = ctx.tts.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Chapter one begins here"));
    assert!(texts[0].contains("Chapter two follows"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_read_pdf_options_from_query(ctx: &TestContext) {

    ctx.pdf
        .set_pages(&["A single page with enough words to be read aloud."]);

    let response = ctx
        .client
        .post_bytes("/api/convert?voice=onyx&speed=1.25", "application/pdf", pdf_bytes())
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let settings = ctx.tts.settings();
    assert_eq!(settings[0].voice.as_deref(), Some("onyx"));
    assert_eq!(settings[0].speed, 1.25);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_non_pdf_upload(ctx: &TestContext) {

    let response = ctx
        .client
        .post_bytes("/api/convert", "application/pdf", b"PK\x03\x04 zip file".to_vec())
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("not a PDF");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_upload(ctx: &TestContext) {

    let response = ctx
        .client
        .post_bytes("/api/convert", "application/pdf", Vec::new())
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("empty");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_unprocessable_when_pdf_cannot_be_parsed(ctx: &TestContext) {

    let response = ctx
        .client
        .post_bytes("/api/convert", "application/pdf", pdf_bytes())
        .await
        .unwrap();

    response
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_error_message("Could not extract readable text");
    assert_eq!(ctx.tts.call_count(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_unprocessable_for_scanned_pdf(ctx: &TestContext) {

    ctx.pdf.set_pages(&["", "  \n ", "\u{200B}"]);

    let response = ctx
        .client
        .post_bytes("/api/convert", "application/pdf", pdf_bytes())
        .await
        .unwrap();

    response
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_error_message("Could not extract readable text");
    assert_eq!(ctx.tts.call_count(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_payload_too_large_for_oversized_text_body(ctx: &TestContext) {

    let text = "b".repeat(ctx.config.max_upload_bytes + 10);
    let response = ctx
        .client
        .post("/api/convert/text", &json!({ "text": text }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE)
        .assert_error_message("Payload too large");
    assert_eq!(ctx.tts.call_count(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_payload_too_large_for_oversized_pdf(ctx: &TestContext) {

    ctx.pdf
        .set_pages(&["A single page with enough words to be read aloud."]);

    let mut upload = pdf_bytes();
    upload.resize(ctx.config.max_upload_bytes + 10, b' ');

    let response = ctx
        .client
        .post_bytes("/api/convert", "application/pdf", upload)
        .await
        .unwrap();

    response
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE)
        .assert_error_message("Payload too large");
    assert_eq!(ctx.tts.call_count(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_json_error_for_malformed_query(ctx: &TestContext) {

    ctx.pdf
        .set_pages(&["A single page with enough words to be read aloud."]);

    let response = ctx
        .client
        .post_bytes("/api/convert?speed=fast", "application/pdf", pdf_bytes())
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("query string");
    assert_eq!(ctx.tts.call_count(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_validate_speed_on_preview(ctx: &TestContext) {

    let response = ctx
        .client
        .post(
            "/api/convert/preview",
            &json!({ "text": "A perfectly readable sentence for the test.", "speed": 9.0 }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("speed must be between");
}
