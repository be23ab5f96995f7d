use actix_web::{dev::Payload, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::SessionId;

pub const SESSION_HEADER: &str = "X-Session-Id";

/// Extractor yielding the session id carried in the `X-Session-Id` header.
/// Whether the session still exists is checked by the repository.
pub struct SessionKey(pub SessionId);

impl FromRequest for SessionKey {
    type Error = ApiError;
    type Future = Ready<Result<Self, ApiError>>;

    fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
        let Some(raw) = req.headers().get(SESSION_HEADER) else {
            return ready(Err(ApiError::BadRequest(format!("{SESSION_HEADER} header required"))));
        };
        let parsed = raw
            .to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(SessionKey)
            .ok_or_else(|| ApiError::BadRequest(format!("{SESSION_HEADER} must be a UUID")));
        ready(parsed)
    }
}
