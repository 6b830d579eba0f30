use semcache_core::embeddings::openai::OpenAIEmbedder;
use semcache_core::embeddings::{Embedder, EmbeddingClient};
use semcache_core::providers::llm::openai::OpenAIClient;
use semcache_core::providers::llm::{LlmClient, ResponseGenerator};
use semcache_core::storage::{ErrorSink, Store};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn embedder(server: &MockServer) -> OpenAIEmbedder {
    OpenAIEmbedder::new("text-embedding-3-small".into(), "sk-test".into())
        .with_base_url(format!("{}/v1/", server.uri()))
}

fn chat(server: &MockServer) -> OpenAIClient {
    OpenAIClient::new("gpt-3.5-turbo".into(), "sk-test".into())
        .with_base_url(format!("{}/v1", server.uri()))
}

#[tokio::test]
async fn embeddings_request_and_parse() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "text-embedding-3-small",
            "input": ["hello"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "index": 0, "embedding": [0.5, -0.25, 1.0] }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let e = embedder(&server).embed("hello").await.unwrap();
    assert_eq!(e.model, "text-embedding-3-small");
    assert_eq!(e.values, vec![0.5, -0.25, 1.0]);
}

#[tokio::test]
async fn embeddings_rate_limit_is_typed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit reached"))
        .mount(&server)
        .await;

    let err = embedder(&server).embed("hello").await.unwrap_err();
    assert_eq!(err.kind(), "RateLimited");
    assert!(err.message().contains("Rate limit reached"));
}

#[tokio::test]
async fn embeddings_malformed_body_is_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let err = embedder(&server).embed("hello").await.unwrap_err();
    assert_eq!(err.kind(), "ServiceError");
}

#[tokio::test]
async fn chat_completion_is_trimmed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [{ "role": "user", "content": "capital of France?" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "\n  Paris.  \n" } }]
        })))
        .mount(&server)
        .await;

    let resp = chat(&server).complete("capital of France?").await.unwrap();
    assert_eq!(resp.text, "Paris.");
    assert_eq!(resp.model, "gpt-3.5-turbo");
    assert_eq!(resp.provider, "openai");
}

#[tokio::test]
async fn chat_server_error_is_reported_to_sink() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let store = Store::memory()?;
    store.init_schema()?;
    let sink: Arc<dyn ErrorSink> = Arc::new(store.clone());
    let generator = ResponseGenerator::new(Arc::new(chat(&server)), sink);

    let err = generator.generate("hi").await.unwrap_err();
    assert_eq!(err.kind(), "ServiceError");

    let logged = store.recent_errors(5)?;
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].error_type, "ServiceError");
    assert!(logged[0].error_message.contains("overloaded"));
    Ok(())
}

#[tokio::test]
async fn slow_server_times_out() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_json(json!({ "data": [{ "embedding": [1.0] }] })),
        )
        .mount(&server)
        .await;

    let store = Store::memory()?;
    store.init_schema()?;
    let client = EmbeddingClient::new(Arc::new(embedder(&server)), Arc::new(store.clone()))
        .with_timeout(Duration::from_millis(100));

    let err = client.embed("hello").await.unwrap_err();
    assert_eq!(err.kind(), "TimedOut");
    assert_eq!(store.stats()?.errors, 1);
    Ok(())
}

#[tokio::test]
async fn unreachable_host_is_connection_failure() {
    // Nothing listens on port 1.
    let e = OpenAIEmbedder::new("m".into(), "k".into()).with_base_url("http://127.0.0.1:1/v1");
    let err = e.embed("hello").await.unwrap_err();
    assert_eq!(err.kind(), "ConnectionFailed");
}
