use crate::audit::{extract_ip_from_headers, extract_user_agent};
use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

/// Header carrying the authenticated user's id, set by the upstream gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Who is calling and from where.
///
/// Authentication happens before requests reach this service, so a missing or
/// blank header means an anonymous caller rather than a rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestIdentity {
    pub user_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl<S> FromRequestParts<S> for RequestIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;

        let user_id = headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(Self {
            user_id,
            ip_address: extract_ip_from_headers(headers),
            user_agent: extract_user_agent(headers),
        })
    }
}
