use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::AppError;
use crate::gateway::{AuthContext, Principal};

/// Caller identity attached by [`crate::gateway::require_auth`].
///
/// Also carries the raw `Authorization` header so it can be forwarded to the
/// classification service on upload.
pub struct Caller {
    context: AuthContext,
    pub authorization: Option<String>,
}

impl Caller {
    /// Who is acting, for logs: the verified user id, `anonymous` when the verifier named
    /// none, or `internal` for bypass callers.
    pub fn subject(&self) -> &str {
        match self.context.principal() {
            Some(Principal {
                user_id: Some(id), ..
            }) => id.as_str(),
            Some(_) => "anonymous",
            None => "internal",
        }
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only reachable without a context if a route was mounted outside the auth layer.
        let context = parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::TokenMissing)?;

        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(Caller {
            context,
            authorization,
        })
    }
}
