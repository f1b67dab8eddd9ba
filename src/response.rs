use actix_web::http::StatusCode;
use actix_web::{HttpResponse, HttpResponseBuilder};
use serde::{Deserialize, Serialize};

use crate::rule::Rejection;
use crate::token::TokenInfo;

pub const RULES_ERROR: &str = "Authorization rules misconfigured";

pub const HEADER_AUTH_UID: &str = "X-Auth-Uid";
pub const HEADER_AUTH_REALM: &str = "X-Auth-Realm";
pub const HEADER_AUTH_SCOPE: &str = "X-Auth-Scope";

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CommonResponse {
    pub code: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A wrapper struct for HTTP responses that provides convenient methods
/// for creating common response types
pub struct Response {
    http_response: HttpResponse,
}

impl Response {
    pub fn unauthenticated(message: impl AsRef<str>) -> Self {
        let message = format!("Unauthenticated: {}", message.as_ref());
        Self::err_response(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl AsRef<str>) -> Self {
        let message = format!("Forbidden: {}", message.as_ref());
        Self::err_response(StatusCode::FORBIDDEN, message)
    }

    pub fn error(message: &str) -> Self {
        let message = format!("Server error: {message}");
        Self::err_response(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn ok() -> Self {
        let resp = CommonResponse {
            code: StatusCode::OK.into(),
            message: None,
        };
        Self {
            http_response: HttpResponse::Ok().json(resp),
        }
    }

    /// 200 response carrying the identity of the caller in headers, used when the
    /// request is authorized.
    pub fn authorized(info: Option<&TokenInfo>) -> Self {
        let mut resp = HttpResponse::Ok();
        if let Some(info) = info {
            resp.insert_header((HEADER_AUTH_UID, info.uid.as_str()));
            if !info.realm.is_empty() {
                resp.insert_header((HEADER_AUTH_REALM, info.realm.as_str()));
            }
            let scope: Vec<&str> = info.scope.iter().map(|s| s.name()).collect();
            if !scope.is_empty() {
                resp.insert_header((HEADER_AUTH_SCOPE, scope.join(" ")));
            }
        }
        let body = CommonResponse {
            code: StatusCode::OK.into(),
            message: None,
        };
        Self {
            http_response: resp.json(body),
        }
    }

    fn err_response(status: StatusCode, message: String) -> Self {
        let resp = CommonResponse {
            code: status.into(),
            message: Some(message),
        };
        Self {
            http_response: HttpResponseBuilder::new(status).json(resp),
        }
    }
}

impl From<Rejection> for Response {
    fn from(rejection: Rejection) -> Self {
        let status = rejection.status();
        if status == StatusCode::UNAUTHORIZED {
            return Self::unauthenticated("missing or invalid token");
        }
        if status == StatusCode::FORBIDDEN {
            return Self::forbidden("access denied");
        }
        Self::err_response(status, String::from("Request rejected"))
    }
}

impl From<Response> for HttpResponse {
    fn from(val: Response) -> Self {
        val.http_response
    }
}
