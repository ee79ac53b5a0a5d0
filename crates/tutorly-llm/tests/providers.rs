//! End-to-end client tests against mock vendor servers

use secrecy::SecretString;
use serde_json::json;
use tutorly_llm::{
    CallSelector, CostInfo, CostScope, Error, GeminiClient, GeminiConfig, JobKind, ModelParams,
    OpenAiClient, OpenAiConfig, Prompt, ProviderClient,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn openai_client(server: &MockServer, model: &str) -> OpenAiClient {
    let config = OpenAiConfig::new(SecretString::from("sk-test")).with_base_url(server.uri());
    OpenAiClient::new(
        config,
        ModelParams::new(model),
        Prompt::new("The people is goes to market.")
            .with_instructions("You are a grammar checker."),
    )
    .unwrap()
}

fn gemini_client(server: &MockServer, model: &str) -> GeminiClient {
    let config = GeminiConfig::new(SecretString::from("gm-test")).with_base_url(server.uri());
    GeminiClient::new(config, ModelParams::new(model), Prompt::new("Hello")).unwrap()
}

fn chat_completion(id: &str, prompt_tokens: u64, completion_tokens: u64) -> serde_json::Value {
    json!({
        "id": id,
        "object": "chat.completion",
        "created": 1_700_000_000u64,
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "The people go to the market."},
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens
        }
    })
}

#[tokio::test]
async fn openai_submit_records_cost() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": "You are a grammar checker."},
                {"role": "user", "content": "The people is goes to market."}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("chatcmpl-1", 100, 50)))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = openai_client(&server, "gpt-4o");
    let response = client.submit(JobKind::ChatCompletion).await.unwrap();
    assert_eq!(response.id, "chatcmpl-1");
    assert_eq!(response.text(), Some("The people go to the market."));

    let info = client
        .cost_info(CostScope::Individual, Some(CallSelector::Index(0)))
        .unwrap();
    let CostInfo::Single(record) = info else {
        panic!("expected a single record");
    };
    assert_eq!(record.id, "chatcmpl-1");
    assert_eq!(record.input_tokens, 100);
    assert_eq!(record.output_tokens, 50);
    assert_eq!(record.total_tokens, 150);
    assert!((record.input_cost - 0.00025).abs() < 1e-12);
    assert!((record.output_cost - 0.0005).abs() < 1e-12);
    assert!((record.total_cost - 0.00075).abs() < 1e-12);
}

#[tokio::test]
async fn openai_calls_keep_order_and_aggregate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("first", 100, 50)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("second", 200, 20)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("third", 0, 0)))
        .mount(&server)
        .await;

    let mut client = openai_client(&server, "gpt-4o");
    for _ in 0..3 {
        client.submit(JobKind::ChatCompletion).await.unwrap();
    }

    let CostInfo::All(records) = client
        .cost_info(CostScope::Individual, Some(CallSelector::All))
        .unwrap()
    else {
        panic!("expected all records");
    };
    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["first", "second", "third"]);

    let CostInfo::Aggregated(aggregated) = client.cost_info(CostScope::Aggregated, None).unwrap()
    else {
        panic!("expected aggregate");
    };
    assert_eq!(aggregated.overall_input_tokens, 300);
    assert_eq!(aggregated.overall_output_tokens, 70);
    assert_eq!(aggregated.overall_total_tokens, 370);
    assert!((aggregated.overall_total_cost - 0.00145).abs() < 1e-12);

    let metadata = client.metadata();
    assert_eq!(metadata.job_cost.individual.len(), 3);
    assert_eq!(metadata.job_cost.aggregated, Some(aggregated));
}

#[tokio::test]
async fn vendor_error_propagates_and_records_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string(r#"{"error":{"message":"boom"}}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut client = openai_client(&server, "gpt-4o-mini");
    let err = client.submit(JobKind::ChatCompletion).await.unwrap_err();
    match err {
        Error::Api {
            provider,
            status,
            body,
        } => {
            assert_eq!(provider, "openai");
            assert_eq!(status, 500);
            assert_eq!(body, r#"{"error":{"message":"boom"}}"#);
        }
        other => panic!("expected api error, got {other:?}"),
    }
    assert!(client.ledger().is_empty());
}

#[tokio::test]
async fn undecodable_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let mut client = openai_client(&server, "gpt-4o");
    let err = client.submit(JobKind::ChatCompletion).await.unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)));
    assert!(client.ledger().is_empty());
}

#[tokio::test]
async fn text_embedding_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("x", 1, 1)))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = openai_client(&server, "gpt-4o");
    let err = client.submit(JobKind::TextEmbedding).await.unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation(ref kind) if kind == "text_embedding"));
    assert!(client.ledger().is_empty());
}

#[tokio::test]
async fn gemini_submit_records_cost() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", "gm-test"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Hello"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hi there"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 1000,
                "candidatesTokenCount": 2000,
                "totalTokenCount": 3000
            },
            "responseId": "gem-abc",
            "modelVersion": "gemini-1.5-flash"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = gemini_client(&server, "gemini-1.5-flash");
    let response = client.submit(JobKind::ChatCompletion).await.unwrap();
    assert_eq!(response.text().as_deref(), Some("Hi there"));

    let CostInfo::Single(record) = client
        .cost_info(CostScope::Individual, Some(CallSelector::Index(0)))
        .unwrap()
    else {
        panic!("expected a single record");
    };
    assert_eq!(record.id, "gem-abc");
    assert_eq!(record.total_tokens, 3000);
    assert!((record.input_cost - 0.000075).abs() < 1e-12);
    assert!((record.output_cost - 0.0006).abs() < 1e-12);

    assert!(matches!(
        client.cost_info(CostScope::Individual, Some(CallSelector::Index(1))),
        Err(Error::OutOfRange { index: 1, len: 1 })
    ));
}

#[tokio::test]
async fn gemini_error_status_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let mut client = gemini_client(&server, "gemini-1.5-pro");
    let err = client.submit(JobKind::ChatCompletion).await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 429, ref body, .. } if body == "quota exceeded"));
    assert!(err.to_string().contains("gemini"));
    assert!(client.ledger().is_empty());
}
