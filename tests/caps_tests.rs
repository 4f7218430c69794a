use hf_forward::{Error, SessionManager, caps::fetch_caps};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

#[tokio::test]
async fn test_fetch_caps() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/caps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cloud_name": "Refact",
            "code_chat_models": {
                "gpt-4o": {"n_ctx": 32000, "similar_models": ["gpt-4o-mini"], "supports_tools": true}
            },
            "code_chat_default_model": "gpt-4o",
            "embedding_model": "thenlper/gte-base"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionManager::new().acquire().unwrap();
    let caps = fetch_caps(&session, &format!("{}/", server.uri())).await.unwrap();

    assert_eq!(caps.cloud_name, "Refact");
    assert_eq!(caps.resolve_model(None), "gpt-4o");
    assert_eq!(caps.n_ctx("gpt-4o"), Some(32000));
    assert_eq!(caps.code_chat_models["gpt-4o"].similar_models, vec!["gpt-4o-mini"]);
}

#[tokio::test]
async fn test_fetch_caps_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/caps"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let session = SessionManager::new().acquire().unwrap();
    let result = fetch_caps(&session, &server.uri()).await;

    assert!(matches!(result, Err(Error::Endpoint { status: 500, .. })));
}
