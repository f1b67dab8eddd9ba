//! Request authorization for actix-web services and reverse proxies.
//!
//! Requests are matched against an ordered list of rules; the first rule whose
//! method and path pattern match decides. Depending on the rule the request is
//! passed through, rejected, or its bearer token is validated by an
//! [`provider::AuthProvider`] before going on.

pub mod config;
pub mod context;
pub mod guard;
pub mod logs;
pub mod provider;
pub mod request;
pub mod response;
pub mod rule;
pub mod server;
pub mod token;
