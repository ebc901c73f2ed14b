//! Integration tests for the Ollama-backed arbiter using wiremock HTTP mocks.

use std::time::Duration;

use petprice_arbiter::{
    select_best_match, ArbiterError, CandidateResolver, LlmArbiter, MatchMethod, OllamaClient,
    ResolveTarget, TextGenerator,
};
use petprice_core::{Candidate, RawCandidate};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> OllamaClient {
    OllamaClient::with_base_url(base_url, "qwen2.5:latest", 0.1)
        .expect("client construction should not fail")
}

fn test_arbiter(base_url: &str, timeout: Duration) -> LlmArbiter<OllamaClient> {
    LlmArbiter::new(test_client(base_url), timeout)
}

fn generate_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "model": "qwen2.5:latest",
        "response": text,
        "done": true
    }))
}

fn candidate(title: &str, price: &str) -> Candidate {
    Candidate {
        display_title: title.to_string(),
        observed_price: price.parse().unwrap(),
        link: format!("https://www.petz.com.br/p/{}", title.len()),
        sales_count: None,
    }
}

fn bravecto_candidates() -> Vec<Candidate> {
    vec![
        candidate("Bravecto Cães 4.5 a 10kg", "180"),
        candidate("Bravecto Cães 20 a 40kg", "230"),
        candidate("Bravecto Cães 10 a 20kg", "210"),
    ]
}

#[tokio::test]
async fn generate_posts_non_streaming_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(serde_json::json!({
            "model": "qwen2.5:latest",
            "stream": false
        })))
        .respond_with(generate_reply("2"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let text = client.generate("pick one").await.expect("should generate");
    assert_eq!(text, "2");
}

#[tokio::test]
async fn generate_surfaces_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.generate("pick one").await.unwrap_err();
    assert!(
        matches!(err, ArbiterError::UnexpectedStatus { status: 500, ref body } if body == "model crashed"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn generate_rejects_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.generate("pick one").await.unwrap_err();
    assert!(matches!(err, ArbiterError::Deserialize { .. }), "got: {err:?}");
}

#[tokio::test]
async fn arbiter_returns_model_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(generate_reply("2"))
        .mount(&server)
        .await;

    let arbiter = test_arbiter(&server.uri(), Duration::from_secs(5));
    let idx = select_best_match(&arbiter, &bravecto_candidates(), "Bravecto 10 a 20 kg").await;
    assert_eq!(idx, 2);
}

#[tokio::test]
async fn arbiter_non_numeric_reply_is_no_match() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(generate_reply("Nenhum dos candidatos é ração Royal Canin."))
        .mount(&server)
        .await;

    let arbiter = test_arbiter(&server.uri(), Duration::from_secs(5));
    let candidates = vec![
        candidate("Shampoo Sanol Dog 500ml", "25.90"),
        candidate("Tapete Higiênico", "49.90"),
    ];
    assert_eq!(select_best_match(&arbiter, &candidates, "Ração Royal Canin").await, -1);
}

#[tokio::test]
async fn arbiter_server_error_is_no_match() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let arbiter = test_arbiter(&server.uri(), Duration::from_secs(5));
    assert_eq!(
        select_best_match(&arbiter, &bravecto_candidates(), "Bravecto 10 a 20 kg").await,
        -1
    );
}

#[tokio::test]
async fn arbiter_slow_service_times_out_to_no_match() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(generate_reply("0").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let arbiter = test_arbiter(&server.uri(), Duration::from_millis(200));
    assert_eq!(
        select_best_match(&arbiter, &bravecto_candidates(), "Bravecto 10 a 20 kg").await,
        -1
    );
}

#[tokio::test]
async fn arbiter_out_of_range_reply_is_no_match() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(generate_reply("7"))
        .mount(&server)
        .await;

    let arbiter = test_arbiter(&server.uri(), Duration::from_secs(5));
    assert_eq!(
        select_best_match(&arbiter, &bravecto_candidates(), "Bravecto 10 a 20 kg").await,
        -1
    );
}

#[tokio::test]
async fn resolver_asks_model_only_when_size_is_ambiguous() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(generate_reply("1"))
        .expect(1)
        .mount(&server)
        .await;

    let arbiter = test_arbiter(&server.uri(), Duration::from_secs(5));
    let resolver = CandidateResolver::new(&arbiter);
    let raw = |title: &str, price: &str| RawCandidate {
        title: title.to_string(),
        price_text: price.to_string(),
        link: format!("https://www.cobasi.com.br/p/{}", title.len()),
        sales_count: Some(10),
    };

    let target = ResolveTarget::new("Ração Golden Special Adulto Frango 15kg", None);
    let resolution = resolver
        .resolve(
            &target,
            &[
                raw("Kit 2 Ração Golden Special 15kg", "R$ 359,90"),
                raw("Ração Golden Special Cães Adultos Frango 15kg", "R$ 179,90"),
                raw("Ração Golden Special Cães Adultos Frango 3kg", "R$ 59,90"),
            ],
        )
        .await;

    let m = resolution.matched().expect("expected a match");
    assert_eq!(m.index, 1);
    assert_eq!(m.method, MatchMethod::Arbiter);
}
