use serde_json::json;
use std::time::Duration;
use tryit_panel::fragment::{FieldKey, OperationResolver, SchemaFieldExtractor};
use tryit_panel::{
    mount, Panel, PanelSettings, RenderTarget, RequestExecutor, RequestFailure, SubmitBlocked,
    TextTarget,
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pets_payload(server: &str) -> String {
    json!({
        "/pets": {
            "get": {
                "parameters": [{"name": "limit", "in": "query", "required": true}],
                "servers": [{"url": server}]
            }
        }
    })
    .to_string()
}

fn executor() -> RequestExecutor {
    RequestExecutor::new(&PanelSettings::default()).expect("client should build")
}

#[tokio::test]
async fn submit_with_limit_issues_query_request_and_pretty_prints() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pets"))
        .and(query_param("limit", "5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"a":1,"b":[1,2]}"#, "application/json"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut target = TextTarget::new();
    let payload = pets_payload(&mock_server.uri());
    let mut panel =
        mount(&mut target, &payload, &PanelSettings::default()).expect("payload should mount");
    panel.set_value(&FieldKey::query("limit"), "5").unwrap();

    let pending = panel.begin_submit().expect("submission should start");
    assert_eq!(
        pending.plan().url.as_str(),
        format!("{}/pets?limit=5", mock_server.uri())
    );

    let done = pending.run(&executor()).await;
    assert!(panel.complete(done));
    let response = panel
        .outcome()
        .expect("outcome should be stored")
        .as_ref()
        .expect("request should succeed");

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "{\n  \"a\": 1,\n  \"b\": [\n    1,\n    2\n  ]\n}");
    assert_eq!(response.matched_response, None);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/pets");
    assert_eq!(requests[0].url.query(), Some("limit=5"));
}

#[tokio::test]
async fn empty_required_field_blocks_the_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut panel =
        Panel::from_payload(&pets_payload(&mock_server.uri()), &PanelSettings::default()).unwrap();
    panel.set_value(&FieldKey::query("limit"), "").unwrap();

    match panel.submit(&executor()).await {
        Err(SubmitBlocked::Invalid(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors.get(&FieldKey::query("limit")).unwrap(), "limit is required");
        }
        other => panic!("expected validation errors, got {:?}", other),
    }
    assert!(panel.outcome().is_none());
}

#[tokio::test]
async fn post_routes_path_header_and_body_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/owners/7/pets"))
        .and(query_param("notify", "yes"))
        .and(header("x-request-id", "req-1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "Rex", "species": "dog"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 99})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let payload = json!({
        "/owners/{ownerId}/pets": {
            "post": {
                "parameters": [
                    {"name": "ownerId", "in": "path", "required": true},
                    {"name": "notify", "in": "query"},
                    {"name": "X-Request-Id", "in": "header"}
                ],
                "requestBody": {
                    "required": true,
                    "content": {"application/json": {"schema": {
                        "type": "object",
                        "required": ["name"],
                        "properties": {
                            "name": {"type": "string"},
                            "species": {"type": "string"},
                            "nickname": {"type": "string"}
                        }
                    }}}
                },
                "responses": {"201": {"description": "created"}, "default": {}},
                "servers": [{"url": mock_server.uri()}]
            }
        }
    })
    .to_string();

    let mut panel = Panel::from_payload(&payload, &PanelSettings::default()).unwrap();
    panel.set_named("ownerId", "7").unwrap();
    panel.set_named("notify", "yes").unwrap();
    panel.set_named("X-Request-Id", "req-1").unwrap();
    panel.set_named("name", "Rex").unwrap();
    panel.set_named("species", "dog").unwrap();

    let outcome = panel.submit(&executor()).await.unwrap();
    let response = outcome.as_ref().unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.matched_response.as_deref(), Some("201"));
    assert_eq!(response.body, "{\n  \"id\": 99\n}");
}

#[tokio::test]
async fn non_json_response_is_a_distinct_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pets"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<h1>hi</h1>", "text/html"))
        .mount(&mock_server)
        .await;

    let mut panel =
        Panel::from_payload(&pets_payload(&mock_server.uri()), &PanelSettings::default()).unwrap();
    panel.set_named("limit", "1").unwrap();

    let outcome = panel.submit(&executor()).await.unwrap();
    assert_eq!(
        outcome,
        &Err(RequestFailure::NonJsonBody {
            status: 200,
            content_type: "text/html".to_string()
        })
    );
}

#[tokio::test]
async fn broken_json_response_is_a_decode_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pets"))
        .respond_with(ResponseTemplate::new(500).set_body_raw("{\"oops\":", "application/json"))
        .mount(&mock_server)
        .await;

    let mut panel =
        Panel::from_payload(&pets_payload(&mock_server.uri()), &PanelSettings::default()).unwrap();
    panel.set_named("limit", "1").unwrap();

    let outcome = panel.submit(&executor()).await.unwrap();
    assert!(matches!(outcome, Err(RequestFailure::Decode { status: 500, .. })));
}

#[tokio::test]
async fn network_failure_leaves_form_resubmittable() {
    let mock_server = MockServer::start().await;
    let live_uri = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/pets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let payload = json!({
        "/pets": {"get": {
            "parameters": [{"name": "limit", "in": "query", "required": true}],
            "servers": [{"url": "http://127.0.0.1:1"}, {"url": live_uri}]
        }}
    })
    .to_string();

    let mut panel = Panel::from_payload(&payload, &PanelSettings::default()).unwrap();
    panel.set_named("limit", "3").unwrap();
    let executor = executor();

    let outcome = panel.submit(&executor).await.unwrap();
    assert!(matches!(outcome, Err(RequestFailure::Network(_))));

    panel.select_server(1).unwrap();
    assert_eq!(panel.form().value(&FieldKey::query("limit")), Some("3"));

    let outcome = panel.submit(&executor).await.unwrap();
    assert_eq!(outcome.as_ref().unwrap().body, "[\n  1\n]");
}

#[tokio::test]
async fn stale_response_never_overwrites_newer_state() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pets"))
        .and(query_param("limit", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"which": "first"}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pets"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"which": "second"})))
        .mount(&mock_server)
        .await;

    let mut panel =
        Panel::from_payload(&pets_payload(&mock_server.uri()), &PanelSettings::default()).unwrap();
    let executor = executor();

    panel.set_named("limit", "1").unwrap();
    let first = panel.begin_submit().unwrap();
    panel.set_named("limit", "2").unwrap();
    let second = panel.begin_submit().unwrap();

    let (first_done, second_done) = tokio::join!(first.run(&executor), second.run(&executor));

    assert!(panel.complete(second_done));
    assert!(!panel.complete(first_done));

    let response = panel.outcome().unwrap().as_ref().unwrap();
    assert!(response.body.contains("second"));
    assert!(!panel.is_pending());
}

#[tokio::test]
async fn array_body_schema_renders_without_fields() {
    let payload = json!({
        "/pets": {"put": {
            "requestBody": {"content": {"application/json": {"schema": {
                "type": "array",
                "items": {"type": "string"}
            }}}}
        }}
    })
    .to_string();

    let mut target = TextTarget::new();
    let panel = mount(&mut target, &payload, &PanelSettings::default()).unwrap();

    assert!(panel.fields().is_empty());
    assert!(panel.fields().validators.is_empty());
    assert!(target.output().contains("Fields:\n  (none)\n"));
}

#[tokio::test]
async fn rendered_outcome_shows_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let mut target = TextTarget::new();
    let mut panel =
        mount(&mut target, &pets_payload(&mock_server.uri()), &PanelSettings::default()).unwrap();
    panel.set_named("limit", "1").unwrap();
    panel.submit(&executor()).await.unwrap();

    target.take();
    target.render_panel(&panel);
    let out = target.output();

    assert!(out.contains("Result: HTTP 200\n"));
    assert!(out.contains("{\n  \"ok\": true\n}\n"));
}

#[tokio::test]
async fn execute_values_routes_submitted_values() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/pets/12"))
        .and(query_param("hard", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": 12})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let payload = json!({
        "/pets/{petId}": {"delete": {
            "parameters": [
                {"name": "petId", "in": "path", "required": true},
                {"name": "hard", "in": "query"},
                {"name": "reason", "in": "query"}
            ],
            "responses": {"2XX": {}}
        }}
    })
    .to_string();

    let operation = OperationResolver::resolve(&payload).unwrap();
    let fields = SchemaFieldExtractor::extract(&operation);
    let mut values = fields.default_values();
    values.insert(FieldKey::path("petId"), "12".to_string());
    values.insert(FieldKey::query("hard"), "true".to_string());

    let response = executor()
        .execute_values(&operation, &fields, &values, &mock_server.uri())
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.matched_response.as_deref(), Some("2XX"));
    assert_eq!(response.body, "{\n  \"deleted\": 12\n}");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("hard=true"));
}

#[tokio::test]
async fn execute_values_reports_missing_path_value_without_sending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let payload = json!({
        "/pets/{petId}": {"delete": {"parameters": [{"name": "petId", "in": "path"}]}}
    })
    .to_string();
    let operation = OperationResolver::resolve(&payload).unwrap();
    let fields = SchemaFieldExtractor::extract(&operation);

    let values = fields.default_values();
    let outcome = executor()
        .execute_values(&operation, &fields, &values, &mock_server.uri())
        .await;

    assert_eq!(outcome, Err(RequestFailure::MissingPathParameter("petId".to_string())));
}
