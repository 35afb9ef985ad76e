use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use super::request_id::RequestIdValue;

pub const USER_ID_HEADER: &str = "X-User-Id";

/// Per-request caller context handed to handlers
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: Option<String>,
    /// Caller-supplied user id, passed through for audit logging only
    pub user_id: Option<String>,
}

impl FromRequest for RequestContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let request_id = req
            .extensions()
            .get::<RequestIdValue>()
            .map(|id| id.0.clone());

        let user_id = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        ready(Ok(RequestContext {
            request_id,
            user_id,
        }))
    }
}
