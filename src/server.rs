use std::time::Duration;

use actix_web::web::{self, Data};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use log::{debug, error, info};

use crate::request::AuthRequest;
use crate::response::{self, Response};
use crate::rule::engine::RuleEngine;
use crate::rule::Outcome;

pub const HEADER_ORIGINAL_METHOD: &str = "X-Original-Method";
pub const HEADER_ORIGINAL_URI: &str = "X-Original-URI";
pub const HEADER_FORWARDED_METHOD: &str = "X-Forwarded-Method";
pub const HEADER_FORWARDED_URI: &str = "X-Forwarded-Uri";

/// Standalone authorization server for reverse proxy sub-requests (nginx
/// `auth_request`, traefik `forwardAuth`).
///
/// The proxy passes the original method and URI in headers together with the
/// client's `Authorization` header. The answer is 200 when the request may pass,
/// 401 or 403 otherwise.
pub struct AuthServer {
    bind: String,
    engine: Data<RuleEngine>,

    workers: Option<u64>,
}

impl AuthServer {
    const HEALTHZ_PATH: &str = "/healthz";

    pub fn new(bind: String, engine: RuleEngine) -> Self {
        Self {
            bind,
            engine: Data::new(engine),
            workers: None,
        }
    }

    pub fn set_workers(&mut self, workers: u64) {
        self.workers = Some(workers);
    }

    pub async fn run(self) -> Result<()> {
        let engine = self.engine.clone();
        let mut srv = HttpServer::new(move || {
            App::new()
                .app_data(engine.clone())
                .configure(Self::configure)
        })
        .shutdown_timeout(5)
        .client_request_timeout(Duration::from_secs(10));

        info!("Binding to http://{}", self.bind);
        srv = srv.bind(&self.bind).context("bind auth server")?;

        if let Some(workers) = self.workers {
            srv = srv.workers(workers as usize);
        }

        info!("Starting authorization server");
        srv.run().await.context("run server")?;

        info!("Server stopped by user");
        Ok(())
    }

    /// Registers the server routes. Expects `Data<RuleEngine>` as app data.
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.service(web::resource(Self::HEALTHZ_PATH).route(web::get().to(Self::handle_healthz)))
            .default_service(web::route().to(Self::handle_auth));
    }

    async fn handle_healthz() -> HttpResponse {
        Response::ok().into()
    }

    async fn handle_auth(req: HttpRequest, engine: Data<RuleEngine>) -> HttpResponse {
        let auth_req = Self::original_request(&req);
        debug!("Authorize sub-request for {} {}", auth_req.method(), auth_req.uri());

        let outcome = engine
            .process(auth_req, |authorized: AuthRequest| async move {
                Response::authorized(authorized.context().token_info())
            })
            .await;

        match outcome {
            Ok(Outcome::Forwarded(resp)) => resp.into(),
            Ok(Outcome::Rejected(rejection)) => Response::from(rejection).into(),
            Err(e) => {
                error!("Authorize sub-request failed: {e:#}");
                Response::error(response::RULES_ERROR).into()
            }
        }
    }

    /// The request the proxy is asking about. Falls back to the sub-request itself
    /// when no forwarding headers are present.
    fn original_request(req: &HttpRequest) -> AuthRequest {
        let own = AuthRequest::from_http_request(req);

        let method = Self::header(req, HEADER_ORIGINAL_METHOD)
            .or_else(|| Self::header(req, HEADER_FORWARDED_METHOD))
            .unwrap_or(own.method());
        let uri = Self::header(req, HEADER_ORIGINAL_URI)
            .or_else(|| Self::header(req, HEADER_FORWARDED_URI))
            .unwrap_or(own.uri());

        AuthRequest::new(method, uri).with_token(own.token().cloned())
    }

    fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
        let value = req.headers().get(name)?.to_str().ok()?.trim();
        if value.is_empty() {
            return None;
        }
        Some(value)
    }
}
