use std::collections::HashMap;
use std::sync::Arc;

use actix_web::body::{to_bytes, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::middleware::{from_fn, Next};
use actix_web::test::{call_service, init_service, TestRequest};
use actix_web::web::{self, Data};
use actix_web::{App, Error, HttpMessage, HttpRequest, HttpResponse};
use async_trait::async_trait;
use routeguard::context::RequestContext;
use routeguard::guard::{request_context, rule_guard, Authorized};
use routeguard::provider::{check_scope, AuthProvider, AuthResult, ProviderError};
use routeguard::response::CommonResponse;
use routeguard::rule::engine::RuleEngine;
use routeguard::rule::{
    ExplicitlyAllowedRule, ExplicitlyDeniedRule, UnionRule, ValidateTokenRule,
};
use routeguard::token::{Scope, Token, TokenInfo};

/// Knows a fixed set of tokens, everything else is invalid.
struct StaticProvider {
    tokens: HashMap<String, TokenInfo>,
}

impl StaticProvider {
    fn new() -> Self {
        let mut tokens = HashMap::new();
        tokens.insert(String::from("reader"), info("alice", &["uid", "read"]));
        tokens.insert(String::from("guest"), info("bob", &["uid"]));
        Self { tokens }
    }
}

#[async_trait]
impl AuthProvider for StaticProvider {
    async fn valid(
        &self,
        token: Option<&Token>,
        scope: &Scope,
    ) -> Result<AuthResult, ProviderError> {
        let token = match token {
            Some(token) => token,
            None => return Ok(AuthResult::Empty),
        };
        if token.as_str() == "broken" {
            return Err(ProviderError::Status(502));
        }
        Ok(match self.tokens.get(token.as_str()) {
            Some(info) => check_scope(info.clone(), scope),
            None => AuthResult::Invalid,
        })
    }
}

fn info(uid: &str, scope: &[&str]) -> TokenInfo {
    TokenInfo {
        access_token: String::from(uid),
        scope: scope.iter().map(|s| Scope::new(*s)).collect(),
        token_type: TokenInfo::default_token_type(),
        uid: uid.to_string(),
        realm: String::from("/employees"),
        expires_in: None,
    }
}

fn build_engine() -> RuleEngine {
    let provider: Arc<dyn AuthProvider> = Arc::new(StaticProvider::new());
    let rules: Vec<UnionRule> = vec![
        ExplicitlyAllowedRule::new("GET", "/health").unwrap().into(),
        ExplicitlyDeniedRule::new(provider.clone(), "DELETE", "/api/.*")
            .unwrap()
            .into(),
        ValidateTokenRule::new(provider.clone(), "GET", "/api/.*", Scope::new("read"))
            .unwrap()
            .into(),
        ValidateTokenRule::new(provider.clone(), "GET", "/profile", Scope::default())
            .unwrap()
            .into(),
    ];
    RuleEngine::with_catch_all(rules, provider)
}

async fn whoami(user: Authorized) -> String {
    user.uid.clone()
}

async fn health(req: HttpRequest) -> HttpResponse {
    let attrs = request_context(&req).map(|ctx| ctx.len()).unwrap_or_default();
    HttpResponse::Ok().body(format!("ok {attrs}"))
}

macro_rules! app {
    () => {
        init_service(
            App::new()
                .app_data(Data::new(build_engine()))
                .wrap(from_fn(rule_guard))
                .route("/health", web::get().to(health))
                .route("/profile", web::get().to(whoami))
                .route("/api/items", web::get().to(whoami))
                .route("/api/items", web::delete().to(whoami))
                .route("/api/items", web::post().to(whoami)),
        )
        .await
    };
}

fn get(uri: &str, token: Option<&str>) -> TestRequest {
    let req = TestRequest::get().uri(uri);
    match token {
        Some(token) => req.insert_header(("Authorization", format!("Bearer {token}"))),
        None => req,
    }
}

#[actix_web::test]
async fn test_allowed_route() {
    let app = app!();

    let resp = call_service(&app, get("/health", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body()).await.unwrap();
    assert_eq!(body, "ok 0");

    // Unknown tokens are not consulted on allowed routes.
    let resp = call_service(&app, get("/health", Some("nobody")).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_validated_route() {
    let app = app!();

    let resp = call_service(&app, get("/api/items", Some("reader")).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body()).await.unwrap();
    assert_eq!(body, "alice");

    let resp = call_service(&app, get("/api/items", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = to_bytes(resp.into_body()).await.unwrap();
    let body: CommonResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(body.code, 401);

    let resp = call_service(&app, get("/api/items", Some("nobody")).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = call_service(&app, get("/api/items", Some("guest")).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The default scope is held by every valid token.
    let resp = call_service(&app, get("/profile", Some("guest")).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body()).await.unwrap();
    assert_eq!(body, "bob");
}

#[actix_web::test]
async fn test_provider_failure() {
    let app = app!();

    let resp = call_service(&app, get("/api/items", Some("broken")).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_denied_route() {
    let app = app!();

    let req = TestRequest::delete()
        .uri("/api/items")
        .insert_header(("Authorization", "Bearer reader"))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = TestRequest::delete().uri("/api/items").to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Matches no configured rule, so the catch-all decides.
    let req = TestRequest::post()
        .uri("/api/items")
        .insert_header(("Authorization", "Bearer reader"))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = TestRequest::get().uri("/unknown").to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_authorized_extractor_without_token() {
    let engine = RuleEngine::new(vec![ExplicitlyAllowedRule::new("GET", "/.*")
        .unwrap()
        .into()]);
    let app = init_service(
        App::new()
            .app_data(Data::new(engine))
            .wrap(from_fn(rule_guard))
            .route("/profile", web::get().to(whoami)),
    )
    .await;

    let resp = call_service(&app, get("/profile", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

async fn with_trace(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let ctx = RequestContext::new().with("trace", String::from("t-1"));
    req.extensions_mut().insert(ctx);
    next.call(req).await
}

async fn trace(req: HttpRequest) -> HttpResponse {
    let ctx = request_context(&req).unwrap_or_default();
    let trace = ctx.get::<String>("trace").cloned().unwrap_or_default();
    let uid = match ctx.token_info() {
        Some(info) => info.uid.clone(),
        None => String::from("anonymous"),
    };
    HttpResponse::Ok().body(format!("{trace} {uid}"))
}

#[actix_web::test]
async fn test_preset_context() {
    let app = init_service(
        App::new()
            .app_data(Data::new(build_engine()))
            .wrap(from_fn(rule_guard))
            .wrap(from_fn(with_trace))
            .route("/health", web::get().to(trace))
            .route("/profile", web::get().to(trace)),
    )
    .await;

    // Allowed routes keep the attributes and never see token info.
    let resp = call_service(&app, get("/health", Some("reader")).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body()).await.ok().expect("failed to read response body");
    assert_eq!(body, "t-1 anonymous");

    // Validation adds token info next to the existing attributes.
    let resp = call_service(&app, get("/profile", Some("reader")).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body()).await.ok().expect("failed to read response body");
    assert_eq!(body, "t-1 alice");
}
