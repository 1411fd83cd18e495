use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::request::Parts;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use waypoint_auth::{
    AuthError, AuthGate, BearerGate, BearerGateConfig, IdentityProvider, IdentityProviderConfig,
    KeySet, SessionGate, SESSION_COOKIE,
};
use waypoint_core::{LinkName, LinkTable, ReadRepository, RemoteUrl, Repository, StorageError};
use waypoint_gateway::{App, AppState};
use waypoint_registry::RegistryService;
use waypoint_storage::InMemoryRepository;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct AllowAll;

#[async_trait]
impl AuthGate for AllowAll {
    async fn authorize(&self, _request: &Parts) -> Result<(), AuthError> {
        Ok(())
    }
}

struct DenyAll;

#[async_trait]
impl AuthGate for DenyAll {
    async fn authorize(&self, _request: &Parts) -> Result<(), AuthError> {
        Err(AuthError::MissingAuthorization)
    }
}

/// A store whose every call fails with the given error.
struct FailingRepository(StorageError);

#[async_trait]
impl ReadRepository for FailingRepository {
    async fn list_all(&self) -> waypoint_core::error::Result<LinkTable> {
        Err(self.0.clone())
    }

    async fn resolve(&self, _name: &LinkName) -> waypoint_core::error::Result<Option<RemoteUrl>> {
        Err(self.0.clone())
    }
}

#[async_trait]
impl Repository for FailingRepository {
    async fn insert(&self, _name: &LinkName, _url: &RemoteUrl) -> waypoint_core::error::Result<()> {
        Err(self.0.clone())
    }
}

fn app_with(gate: impl AuthGate) -> (Router, RegistryService<InMemoryRepository>) {
    let registry = RegistryService::new(InMemoryRepository::new());
    let state = AppState::new(Arc::new(registry.clone()), Arc::new(gate));
    (App::router(state), registry)
}

fn failing_app(error: StorageError) -> Router {
    let registry = RegistryService::new(FailingRepository(error));
    App::router(AppState::new(Arc::new(registry), Arc::new(AllowAll)))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let (app, _) = app_with(DenyAll);

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn created_entry_redirects() {
    let (app, _) = app_with(AllowAll);

    let response = app
        .clone()
        .oneshot(post("/api/v1/entries", r#"{"shop":"https://example.com/store"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        json_body(response).await,
        json!({ "data": { "shop": "https://example.com/store" }, "error": "" })
    );

    let response = app.clone().oneshot(get("/shop")).await.unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://example.com/store"
    );

    let response = app.oneshot(get("/api/v1/shop/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://example.com/store"
    );
}

#[tokio::test]
async fn unknown_name_is_not_found() {
    let (app, _) = app_with(AllowAll);

    let response = app.oneshot(get("/missing")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await,
        json!({ "data": null, "error": "entry not found" })
    );
}

#[tokio::test]
async fn names_are_case_sensitive() {
    let (app, _) = app_with(AllowAll);
    app.clone()
        .oneshot(post("/api/v1/entries", r#"{"Shop":"https://example.com"}"#))
        .await
        .unwrap();

    let response = app.oneshot(get("/shop")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_url_is_not_found() {
    let (app, _) = app_with(AllowAll);
    let response = app
        .clone()
        .oneshot(post("/api/v1/entries", r#"{"blank":""}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(get("/blank")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_name_keeps_first_url() {
    let (app, _) = app_with(AllowAll);
    app.clone()
        .oneshot(post("/api/v1/entries", r#"{"docs":"https://first.example"}"#))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post("/api/v1/entries", r#"{"docs":"https://second.example"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "data": null, "error": "entry with name already exist" })
    );

    let response = app.oneshot(get("/docs")).await.unwrap();
    assert_eq!(response.headers()[header::LOCATION], "https://first.example");
}

#[tokio::test]
async fn payload_must_hold_exactly_one_pair() {
    let (app, registry) = app_with(AllowAll);

    for body in [r#"{}"#, r#"{"a":"https://a.example","b":"https://b.example"}"#] {
        let response = app
            .clone()
            .oneshot(post("/api/v1/entries", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({ "data": null, "error": "json must contain one element" })
        );
    }

    assert!(registry.repository().is_empty());
}

#[tokio::test]
async fn unparsable_payload_is_rejected() {
    let (app, registry) = app_with(AllowAll);

    for body in ["not json", r#"["a","b"]"#, r#"{"a":1}"#] {
        let response = app
            .clone()
            .oneshot(post("/api/v1/entries", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({ "data": null, "error": "parsing request data failed" })
        );
    }

    assert!(registry.repository().is_empty());
}

#[tokio::test]
async fn lists_every_entry() {
    let (app, _) = app_with(AllowAll);

    let response = app.clone().oneshot(get("/api/v1/entries")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "data": {}, "error": "" }));

    for body in [r#"{"a":"https://a.example"}"#, r#"{"b":"https://b.example"}"#] {
        app.clone()
            .oneshot(post("/api/v1/entries", body))
            .await
            .unwrap();
    }

    let response = app.oneshot(get("/api/v1/entries")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "data": { "a": "https://a.example", "b": "https://b.example" },
            "error": ""
        })
    );
}

#[tokio::test]
async fn rejected_requests_never_reach_the_registry() {
    let (app, registry) = app_with(DenyAll);

    let response = app
        .clone()
        .oneshot(post("/api/v1/entries", r#"{"x":"https://x.example"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        json_body(response).await,
        json!({ "data": null, "error": "Authorization header is empty" })
    );

    let response = app.oneshot(get("/api/v1/entries")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    assert!(registry.repository().is_empty());
}

#[tokio::test]
async fn redirect_ignores_the_gate() {
    let registry = RegistryService::new(InMemoryRepository::new());
    let allowed = App::router(AppState::new(Arc::new(registry.clone()), Arc::new(AllowAll)));
    let denied = App::router(AppState::new(Arc::new(registry), Arc::new(DenyAll)));
    allowed
        .oneshot(post("/api/v1/entries", r#"{"open":"https://open.example"}"#))
        .await
        .unwrap();

    let response = denied.oneshot(get("/open")).await.unwrap();

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
}

#[tokio::test]
async fn listing_failure_returns_empty_object() {
    let app = failing_app(StorageError::Unavailable("connection refused".to_string()));

    let response = app.oneshot(get("/api/v1/entries")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "data": {}, "error": "cannot get entries from db" })
    );
}

#[tokio::test]
async fn undecodable_listing_is_reported() {
    let app = failing_app(StorageError::Corrupt("bad row".to_string()));

    let response = app.oneshot(get("/api/v1/entries")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "data": {}, "error": "cannot parse entries from db" })
    );
}

#[tokio::test]
async fn store_failures_map_to_server_errors() {
    let app = failing_app(StorageError::Timeout("pool timed out".to_string()));

    let response = app
        .clone()
        .oneshot(post("/api/v1/entries", r#"{"x":"https://x.example"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "data": null, "error": "cannot push entry to db" })
    );

    let response = app.oneshot(get("/x")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "data": null, "error": "cannot get entry from db" })
    );
}

#[tokio::test]
async fn unsendable_stored_url_is_a_server_error() {
    let (app, _) = app_with(AllowAll);
    let response = app
        .clone()
        .oneshot(post("/api/v1/entries", r#"{"bad":"https://x.example/\nSet-Cookie: a=b"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(get("/bad")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get(header::LOCATION).is_none());
    assert_eq!(
        json_body(response).await,
        json!({ "data": null, "error": "cannot redirect to stored url" })
    );
}

async fn bearer_app() -> (Router, RegistryService<InMemoryRepository>, MockServer) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": [] })))
        .mount(&server)
        .await;

    let keys = KeySet::load(format!("{}/jwks", server.uri())).await.unwrap();
    let gate = BearerGate::new(keys, BearerGateConfig::default());
    let registry = RegistryService::new(InMemoryRepository::new());
    let app = App::router(AppState::new(Arc::new(registry.clone()), Arc::new(gate)));
    (app, registry, server)
}

#[tokio::test]
async fn bearer_gate_rejects_unverifiable_tokens() {
    let (app, registry, _server) = bearer_app().await;

    for authorization in ["Bearer junk", "bearer junk", "Basic YWRtaW46YWRtaW4="] {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/entries")
            .header(header::AUTHORIZATION, authorization)
            .body(Body::from(r#"{"x":"https://x.example"}"#))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{authorization}");
        assert_eq!(
            json_body(response).await,
            json!({ "data": null, "error": "invalid authorization token" })
        );
    }

    let response = app.oneshot(get("/api/v1/entries")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        json_body(response).await,
        json!({ "data": null, "error": "Authorization header is empty" })
    );

    assert!(registry.repository().is_empty());
}

fn session_gate(endpoint: &str) -> Arc<SessionGate> {
    let provider = IdentityProvider::new(IdentityProviderConfig {
        endpoint: endpoint.to_string(),
        app_id: "app".to_string(),
        app_secret: "secret".to_string(),
    });
    Arc::new(SessionGate::new(provider, "http://localhost:8080"))
}

fn session_app_for(endpoint: &str) -> (Router, RegistryService<InMemoryRepository>) {
    let gate = session_gate(endpoint);
    let registry = RegistryService::new(InMemoryRepository::new());
    let state = AppState::new(Arc::new(registry.clone()), gate.clone());
    (App::session_router(state, gate, false), registry)
}

fn session_app() -> (Router, RegistryService<InMemoryRepository>) {
    session_app_for("https://id.example.com/")
}

/// The `name=value` pair of the session cookie set by `response`.
fn session_cookie(response: &Response) -> String {
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    request
}

#[tokio::test]
async fn session_gate_without_session_layer_cannot_decide() {
    let registry = RegistryService::new(InMemoryRepository::new());
    let gate = session_gate("https://id.example.com/");
    let app = App::router(AppState::new(Arc::new(registry.clone()), gate));

    let response = app
        .oneshot(post("/api/v1/entries", r#"{"x":"https://x.example"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "data": null, "error": "cannot authenticate request" })
    );
    assert!(registry.repository().is_empty());
}

#[tokio::test]
async fn signed_in_session_can_create_entries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oidc/token"))
        .and(body_string_contains("code=the-code"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id_token": "header.payload.signature" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let (app, registry) = session_app_for(&server.uri());

    let response = app.clone().oneshot(get("/sign-in")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let cookie = session_cookie(&response);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    let state = location
        .split(['?', '&'])
        .find_map(|pair| pair.strip_prefix("state="))
        .unwrap()
        .to_string();

    let callback = format!("/auth-callback?code=the-code&state={state}");
    let response = app
        .clone()
        .oneshot(with_cookie(get(&callback), &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/admin");
    let cookie = session_cookie(&response);

    let response = app
        .clone()
        .oneshot(with_cookie(
            post("/api/v1/entries", r#"{"shop":"https://example.com/store"}"#),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(registry.repository().len(), 1);

    let response = app
        .oneshot(with_cookie(get("/api/v1/entries"), &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "data": { "shop": "https://example.com/store" }, "error": "" })
    );
}

#[tokio::test]
async fn session_gate_rejects_anonymous_callers() {
    let (app, registry) = session_app();

    let response = app
        .oneshot(post("/api/v1/entries", r#"{"x":"https://x.example"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        json_body(response).await,
        json!({ "data": null, "error": "client is not authenticated via logto" })
    );
    assert!(registry.repository().is_empty());
}

#[tokio::test]
async fn sign_in_redirects_to_provider_with_session_cookie() {
    let (app, _) = session_app();

    let response = app.oneshot(get("/sign-in")).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with("https://id.example.com/oidc/auth?"));
    assert!(location.contains("client_id=app"));

    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with(&format!("{SESSION_COOKIE}=")));
}

#[tokio::test]
async fn callback_without_sign_in_fails() {
    let (app, _) = session_app();

    let response = app
        .oneshot(get("/auth-callback?code=abc&state=forged"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
