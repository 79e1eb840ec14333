//! HTTP behaviour of the provider clients against a mock upstream.

use std::sync::Arc;

use mastermind::bot::Composer;
use mastermind::config::{GeminiSettings, HackerGptSettings, OpenAiSettings};
use mastermind::providers::{
    GeminiClient, HackerGptClient, OpenAiClient, Provider, ProviderError, ProviderSelector,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn openai(server: &MockServer, key: Option<&str>) -> OpenAiClient {
    let settings = OpenAiSettings {
        base_url: server.uri(),
        ..OpenAiSettings::default()
    };
    OpenAiClient::new(key.map(str::to_string), settings).unwrap()
}

fn gemini(server: &MockServer) -> GeminiClient {
    let settings = GeminiSettings {
        base_url: server.uri(),
        ..GeminiSettings::default()
    };
    GeminiClient::new(Some("gemini-key".to_string()), settings).unwrap()
}

fn hackergpt(server: &MockServer) -> HackerGptClient {
    let settings = HackerGptSettings {
        url: format!("{}/api/hackergpt.php", server.uri()),
        ..HackerGptSettings::default()
    };
    HackerGptClient::new(settings).unwrap()
}

fn completion(text: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_openai_research_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "max_tokens": 1000,
            "messages": [
                { "role": "system", "content": "You are a helpful research assistant." },
                { "role": "user", "content": "what is rust" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("A language.")))
        .expect(1)
        .mount(&server)
        .await;

    let answer = openai(&server, Some("sk-test")).answer("what is rust").await.unwrap();
    assert_eq!(answer, "A language.");
}

#[tokio::test]
async fn test_openai_compose_uses_writing_budget() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "max_tokens": 3000,
            "messages": [{ "role": "system", "content": "write a thesis" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Chapter one.")))
        .expect(1)
        .mount(&server)
        .await;

    let text = openai(&server, Some("sk-test")).compose("write a thesis").await.unwrap();
    assert_eq!(text, "Chapter one.");
}

#[tokio::test]
async fn test_openai_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = openai(&server, Some("sk-test")).answer("q").await.unwrap_err();
    match err {
        ProviderError::Api(message) => {
            assert!(message.contains("429"));
            assert!(message.contains("rate limited"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_openai_without_key_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("x")))
        .expect(0)
        .mount(&server)
        .await;

    let err = openai(&server, None).answer("q").await.unwrap_err();
    assert!(matches!(err, ProviderError::MissingKey("OPENAI_API_KEY")));
}

#[tokio::test]
async fn test_gemini_concatenates_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-pro:generateContent"))
        .and(query_param("key", "gemini-key"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "hello" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hel" }, { "text": "lo!" }] }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(gemini(&server).answer("hello").await.unwrap(), "Hello!");
}

#[tokio::test]
async fn test_gemini_without_candidates_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = gemini(&server).answer("hello").await.unwrap_err();
    assert!(matches!(err, ProviderError::Empty));
}

#[tokio::test]
async fn test_hackergpt_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/hackergpt.php"))
        .and(body_partial_json(json!({ "text": "scan", "max_tokens": 1024 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "done" })))
        .mount(&server)
        .await;

    assert_eq!(hackergpt(&server).answer("scan").await.unwrap(), "done");
}

#[tokio::test]
async fn test_hackergpt_missing_response_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    assert_eq!(hackergpt(&server).answer("scan").await.unwrap(), "لا يوجد رد");
}

#[tokio::test]
async fn test_hackergpt_non_ok_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = hackergpt(&server).answer("scan").await.unwrap_err();
    assert!(matches!(err, ProviderError::Status(503)));
    assert_eq!(err.to_string(), "HTTP error 503");
}

#[tokio::test]
async fn test_selector_rotates_over_real_clients() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "gemini says hi" }] } }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/hackergpt.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let providers: Vec<Arc<dyn Provider>> = vec![
        Arc::new(openai(&server, None)),
        Arc::new(gemini(&server)),
        Arc::new(hackergpt(&server)),
    ];
    let selector = ProviderSelector::new(providers).unwrap();

    assert_eq!(selector.search("hi", None).await, "🔍 Gemini يقول:\n\ngemini says hi");
    assert_eq!(
        selector.search("hi", None).await,
        "⚠️ فشل البحث باستخدام hackergpt: HTTP error 500"
    );
    assert_eq!(
        selector.search("hi", None).await,
        "⚠️ فشل البحث باستخدام openai: OPENAI_API_KEY is not configured"
    );
}
