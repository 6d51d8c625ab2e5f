use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::Extension,
    http::{Request, StatusCode},
    middleware,
    response::Response,
    routing::get,
    Json, Router,
};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{Map, Value};
use service_guard::auth::{authenticate, AuthContext, AuthState, TokenVerifier};
use service_guard::config::Locale;
use service_guard::secrets::{
    self, CredentialProvider, MountedSecretStore, SecretKey, SecretOrigin, SecretResolver,
    SecretSource,
};
use tempfile::TempDir;

/// Mounted store that counts lookups.
pub struct CountingStore {
    inner: MountedSecretStore,
    fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl SecretSource for CountingStore {
    fn origin(&self) -> SecretOrigin {
        self.inner.origin()
    }

    async fn fetch(&self, key: &SecretKey) -> secrets::Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(key).await
    }
}

pub struct TestApp {
    pub router: Router,
    pub secret_lookups: Arc<AtomicUsize>,
    pub handler_calls: Arc<AtomicUsize>,
    _dir: TempDir,
}

impl TestApp {
    pub fn lookups(&self) -> usize {
        self.secret_lookups.load(Ordering::SeqCst)
    }

    pub fn handler_calls(&self) -> usize {
        self.handler_calls.load(Ordering::SeqCst)
    }
}

/// Router with one protected route that echoes the decoded claims.
///
/// `secret_file` is written verbatim to `<mount>/jwt_secret`; `None` leaves
/// the signing secret unconfigured.
pub fn build_app(secret_file: Option<&str>, locale: Locale) -> TestApp {
    let dir = tempfile::tempdir().expect("create secrets dir");
    if let Some(contents) = secret_file {
        std::fs::write(dir.path().join("jwt_secret"), contents).expect("write secret");
    }

    let secret_lookups = Arc::new(AtomicUsize::new(0));
    let store = CountingStore {
        inner: MountedSecretStore::new(dir.path()),
        fetches: secret_lookups.clone(),
    };
    let provider = CredentialProvider::new(
        SecretResolver::new(vec![Box::new(store)]),
        SecretKey::new("database_uri_auth_test"),
    );
    let verifier = Arc::new(TokenVerifier::new(Arc::new(provider), 0));
    let state = AuthState::new(verifier, locale);

    let handler_calls = Arc::new(AtomicUsize::new(0));
    let calls = handler_calls.clone();
    let router = Router::new()
        .route(
            "/protected",
            get(move |Extension(context): Extension<AuthContext>| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Json(context.into_claims())
                }
            })
            .options(|| async { StatusCode::NO_CONTENT }),
        )
        .route_layer(middleware::from_fn_with_state(state, authenticate));

    TestApp { router, secret_lookups, handler_calls, _dir: dir }
}

pub fn sign(claims: &Value, secret: &str) -> String {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("sign token")
}

pub fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock after epoch")
        .as_secs()
}

pub fn get_with_auth(authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/protected");
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).expect("build request")
}

pub async fn read_json(response: Response) -> Map<String, Value> {
    let bytes = response.into_body().collect().await.expect("read body").to_bytes();
    match serde_json::from_slice(&bytes).expect("json body") {
        Value::Object(map) => map,
        other => panic!("expected object body, got {other}"),
    }
}
