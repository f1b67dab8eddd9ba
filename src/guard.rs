use std::future::{ready, Ready};
use std::ops::Deref;

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::error::ErrorUnauthorized;
use actix_web::middleware::Next;
use actix_web::web::Data;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, HttpResponse};
use log::{debug, error};

use crate::context::RequestContext;
use crate::request::AuthRequest;
use crate::response::{self, Response};
use crate::rule::engine::RuleEngine;
use crate::rule::Verdict;
use crate::token::TokenInfo;

/// Middleware running every request through the [`RuleEngine`] registered as app
/// data. Use it with [`actix_web::middleware::from_fn`]:
///
/// ```no_run
/// use actix_web::middleware::from_fn;
/// use actix_web::web::Data;
/// use actix_web::App;
/// # fn build(engine: routeguard::rule::engine::RuleEngine) {
/// let app = App::new()
///     .app_data(Data::new(engine))
///     .wrap(from_fn(routeguard::guard::rule_guard));
/// # }
/// ```
///
/// Forwarded requests carry the [`RequestContext`] produced by the rules in their
/// extensions, see [`Authorized`]. A context already present in the extensions is
/// the starting point for the rules.
pub async fn rule_guard<B>(
    engine: Data<RuleEngine>,
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error>
where
    B: MessageBody + 'static,
{
    let mut auth_req = AuthRequest::from_http_request(req.request());
    if let Some(ctx) = req.extensions().get::<RequestContext>() {
        auth_req = auth_req.with_context(ctx.clone());
    }
    let method = auth_req.method().to_string();
    let path = auth_req.path().to_string();

    let resp: HttpResponse = match engine.evaluate(auth_req).await {
        Ok(Verdict::Proceed(authorized)) => {
            req.extensions_mut().insert(authorized.into_context());
            let resp = next.call(req).await?;
            return Ok(resp.map_into_left_body());
        }
        Ok(Verdict::Reject(rejection)) => {
            debug!("Reject {method} {path} with {}", rejection.status());
            Response::from(rejection).into()
        }
        Err(e) => {
            error!("Authorize {method} {path} failed: {e:#}");
            Response::error(response::RULES_ERROR).into()
        }
    };

    Ok(req.into_response(resp).map_into_right_body())
}

/// Context attached by the rules to a forwarded request.
pub fn request_context(req: &HttpRequest) -> Option<RequestContext> {
    req.extensions().get::<RequestContext>().cloned()
}

/// Extractor for the token info of a request authorized by a token validating
/// rule. Fails with 401 on routes that did not validate a token.
#[derive(Debug, Clone)]
pub struct Authorized(pub TokenInfo);

impl Deref for Authorized {
    type Target = TokenInfo;

    fn deref(&self) -> &TokenInfo {
        &self.0
    }
}

impl FromRequest for Authorized {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let info = request_context(req).and_then(|ctx| ctx.token_info().cloned());
        ready(match info {
            Some(info) => Ok(Authorized(info)),
            None => Err(ErrorUnauthorized("request was not authorized with a token")),
        })
    }
}
