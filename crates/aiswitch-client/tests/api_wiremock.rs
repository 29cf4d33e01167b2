//! Integration tests for the HTTP console API using wiremock
//!
//! These tests mock the aiswitch backend to verify methods, paths and bodies.

use aiswitch_client::{ApiConfig, ClientError, ConsoleApi, ConsoleStore, HttpConsoleApi};
use aiswitch_core::log::{LogColumn, LogId, LogQuery, LogSort};
use aiswitch_core::mutation::{ActiveProviderAction, Mutation};
use aiswitch_core::provider::{Preset, Provider, ProviderPatch};
use aiswitch_core::transcript::{ChatMessage, TranscriptStatus};
use std::sync::Arc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_string, method, path, query_param},
};

fn connect(server: &MockServer) -> HttpConsoleApi {
    HttpConsoleApi::new(ApiConfig::new(format!("{}/api", server.uri()))).unwrap()
}

fn ack(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "message": message }))
}

#[tokio::test]
async fn test_list_providers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/config/providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "id": "local",
            "name": "Local",
            "api_url": "http://localhost:5000/v1",
            "api_key": "none",
            "presets": [{"id": "fast", "name": "Fast", "overrides": {"temperature": 0.2}}],
            "preset": "fast"
        }])))
        .mount(&mock_server)
        .await;

    let providers = connect(&mock_server).providers().await.unwrap();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].id, "local");
    assert_eq!(
        providers[0].active_preset().map(|p| p.name.as_str()),
        Some("Fast")
    );
}

#[tokio::test]
async fn test_active_provider_null_and_set() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/config/active-provider"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/config/active-provider"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"local\""))
        .mount(&mock_server)
        .await;

    let api = connect(&mock_server);
    assert_eq!(api.active_provider().await.unwrap(), None);
    assert_eq!(api.active_provider().await.unwrap(), Some("local".to_string()));
}

#[tokio::test]
async fn test_create_provider_posts_full_object() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/config/providers/p2"))
        .and(body_json(serde_json::json!({
            "id": "p2",
            "name": "P2",
            "api_url": "http://p2",
            "api_key": "secret",
            "presets": []
        })))
        .respond_with(ack("Service added successfully"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mutation = Mutation::AddProvider {
        id: "p2".into(),
        provider: Provider::new("p2", "P2", "http://p2", "secret"),
    };
    let ack = connect(&mock_server).apply(&mutation).await.unwrap();
    assert_eq!(ack.message, "Service added successfully");
}

#[tokio::test]
async fn test_update_provider_sends_patch_without_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/config/providers/p1"))
        .and(body_json(serde_json::json!({
            "name": "Renamed",
            "api_url": "http://p1",
            "api_key": "k"
        })))
        .respond_with(ack("Service updated successfully"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mutation = Mutation::UpdateProvider {
        id: "p1".into(),
        patch: ProviderPatch {
            name: "Renamed".into(),
            api_url: "http://p1".into(),
            api_key: "k".into(),
        },
    };
    connect(&mock_server).apply(&mutation).await.unwrap();
}

#[tokio::test]
async fn test_delete_provider_rejection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/config/providers/ghost"))
        .respond_with(ack("Provider not found"))
        .mount(&mock_server)
        .await;

    let result = connect(&mock_server)
        .apply(&Mutation::DeleteProvider { id: "ghost".into() })
        .await;
    match result {
        Err(ClientError::Rejected(message)) => assert_eq!(message, "Provider not found"),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_set_and_clear_active_provider_raw_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/config/active-provider"))
        .and(body_string("local"))
        .respond_with(ack("Service updated successfully"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/config/active-provider"))
        .and(body_string(""))
        .respond_with(ack("Service updated successfully"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = connect(&mock_server);
    api.apply(&Mutation::SetActiveProvider(ActiveProviderAction::toggle(
        None, "local",
    )))
    .await
    .unwrap();
    api.apply(&Mutation::SetActiveProvider(ActiveProviderAction::toggle(
        Some("local"),
        "local",
    )))
    .await
    .unwrap();
}

#[tokio::test]
async fn test_preset_create_update_and_select() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/config/providers/local/presets"))
        .and(body_json(serde_json::json!({
            "id": "my-preset",
            "name": "My Preset",
            "overrides": {}
        })))
        .respond_with(ack("Preset added successfully"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/config/providers/local/presets/my-preset"))
        .respond_with(ack("Preset updated successfully"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/config/providers/local/active-preset"))
        .and(body_string("my-preset"))
        .respond_with(ack("Preset updated successfully"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = connect(&mock_server);
    let preset = Preset::named("My Preset");
    api.apply(&Mutation::AddPreset {
        provider_id: "local".into(),
        preset: preset.clone(),
    })
    .await
    .unwrap();
    api.apply(&Mutation::UpdatePreset {
        provider_id: "local".into(),
        preset_id: preset.id.clone(),
        preset,
    })
    .await
    .unwrap();
    api.apply(&Mutation::SetActivePreset {
        provider_id: "local".into(),
        preset_id: Some("my-preset".into()),
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_path_segments_are_encoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/config/providers/my%20provider"))
        .respond_with(ack("Service deleted successfully"))
        .expect(1)
        .mount(&mock_server)
        .await;

    connect(&mock_server)
        .apply(&Mutation::DeleteProvider {
            id: "my provider".into(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_logs_query_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .and(query_param("page", "1"))
        .and(query_param("size", "10"))
        .and(query_param("sort", "speed,desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "rowCount": 11,
            "logs": [{
                "id": 1,
                "provider_id": "local",
                "model": "m",
                "chat": true,
                "request_time": "2024-05-01 10:00:00",
                "response_time": "2024-05-01 10:00:01",
                "speed": 12
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = LogQuery {
        page: 1,
        size: 10,
        sort: Some(LogSort {
            column: LogColumn::Speed,
            descending: true,
        }),
    };
    let page = connect(&mock_server).logs(&query).await.unwrap();
    assert_eq!(page.row_count, 11);
    assert_eq!(page.page_count(10), 2);
    assert_eq!(page.logs[0].speed, Some(12));
}

#[tokio::test]
async fn test_log_not_found_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/logs/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let entry = connect(&mock_server).log(&LogId::new("404")).await.unwrap();
    assert!(entry.is_none());
}

#[tokio::test]
async fn test_server_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    match connect(&mock_server).config().await {
        Err(ClientError::Status {
            status_code,
            message,
        }) => {
            assert_eq!(status_code, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_store_refetches_after_invalidation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/config/providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/config/providers/p1/active-preset"))
        .and(body_string(""))
        .respond_with(ack("Preset removed successfully"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(ConsoleStore::new(Arc::new(connect(&mock_server))));
    store.providers().await.unwrap();
    store.providers().await.unwrap();

    store
        .dispatch(Mutation::SetActivePreset {
            provider_id: "p1".into(),
            preset_id: None,
        })
        .await
        .unwrap()
        .unwrap();

    store.providers().await.unwrap();
}

#[tokio::test]
async fn test_store_transcript() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/logs/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 3,
            "provider_id": "local",
            "chat": true,
            "model": "llama",
            "request": {
                "model": "llama",
                "stream": false,
                "messages": [{"role": "user", "content": "hi"}]
            },
            "response": {
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "hello"}}]
            },
            "request_time": "2024-05-01 10:00:00",
            "response_time": "2024-05-01 10:00:01"
        })))
        .mount(&mock_server)
        .await;

    let store = ConsoleStore::new(Arc::new(connect(&mock_server)));
    let transcript = store.transcript(&LogId::new("3")).await.unwrap();
    assert_eq!(
        transcript.messages,
        vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")]
    );
    assert_eq!(transcript.status, TranscriptStatus::Complete);
}
