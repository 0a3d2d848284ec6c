//! Caller identity extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::CallerIdentity;
use common::identity::{USER_ID_HEADER, USER_ROLE_HEADER, USERNAME_HEADER};

/// The identity forwarded by the edge gateway, taken from request headers.
///
/// Never rejects: a request without headers yields an anonymous `USER`.
#[derive(Debug, Clone)]
pub struct Caller(pub CallerIdentity);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(CallerIdentity::from_headers(
            header(parts, USER_ID_HEADER),
            header(parts, USERNAME_HEADER),
            header(parts, USER_ROLE_HEADER),
        )))
    }
}

// Non-UTF-8 values are treated as absent.
fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
