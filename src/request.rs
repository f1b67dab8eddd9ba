use std::any::Any;

use actix_web::http::header;
use actix_web::HttpRequest;

use crate::context::RequestContext;
use crate::token::Token;

/// The view of an HTTP request that authorization rules work on.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    method: String,
    uri: String,
    token: Option<Token>,
    context: RequestContext,
}

impl AuthRequest {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            token: None,
            context: RequestContext::new(),
        }
    }

    /// Builds the request from an actix request: method, path with query and the
    /// bearer token of the `Authorization` header.
    pub fn from_http_request(req: &HttpRequest) -> Self {
        let uri = match req.uri().path_and_query() {
            Some(pq) => pq.as_str().to_string(),
            None => req.path().to_string(),
        };
        Self::new(req.method().as_str(), uri).with_authorization(authorization_header(req))
    }

    pub fn with_token(mut self, token: Option<Token>) -> Self {
        self.token = token;
        self
    }

    pub fn with_authorization(self, header: Option<&str>) -> Self {
        let token = header.and_then(Token::from_authorization);
        self.with_token(token)
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    /// Returns a request whose context carries the extra attribute. Contexts held
    /// elsewhere are not affected.
    pub fn with_attribute<T>(mut self, key: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.context = self.context.with(key, value);
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The URI without query string and fragment.
    pub fn path(&self) -> &str {
        match self.uri.find(['?', '#']) {
            Some(idx) => &self.uri[..idx],
            None => &self.uri,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub fn into_context(self) -> RequestContext {
        self.context
    }
}

fn authorization_header(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn test_path_strips_query() {
        let cases = [
            ("/api/foo?a=b", "/api/foo"),
            ("/api/foo", "/api/foo"),
            ("/api/foo#top", "/api/foo"),
            ("/api/foo?a=b#top", "/api/foo"),
            ("/?", "/"),
        ];
        for (uri, expect) in cases {
            assert_eq!(AuthRequest::new("GET", uri).path(), expect);
        }
    }

    #[test]
    fn test_from_http_request() {
        let req = TestRequest::post()
            .uri("/api/items?limit=10")
            .insert_header(("Authorization", "Bearer abc"))
            .to_http_request();
        let req = AuthRequest::from_http_request(&req);

        assert_eq!(req.method(), "POST");
        assert_eq!(req.uri(), "/api/items?limit=10");
        assert_eq!(req.path(), "/api/items");
        assert_eq!(req.token().unwrap().as_str(), "abc");
        assert!(req.context().is_empty());

        let req = TestRequest::get()
            .uri("/health")
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_http_request();
        let req = AuthRequest::from_http_request(&req);
        assert!(req.token().is_none());
    }

    #[test]
    fn test_with_attribute_keeps_original_context() {
        let ctx = RequestContext::new().with("trace", 7_u64);
        let req = AuthRequest::new("GET", "/").with_context(ctx.clone());
        let req = req.with_attribute("extra", true);

        assert!(req.context().contains("extra"));
        assert!(!ctx.contains("extra"));
        assert_eq!(*req.context().get::<u64>("trace").unwrap(), 7);
    }
}
