//! Delegated bearer authentication for every `/api` route.
//!
//! The gateway never decodes tokens itself. It forwards the raw `Authorization`
//! header to an external verifier and trusts its answer, failing closed on any
//! transport, status, or decoding problem.

mod verifier;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

pub use verifier::{CredentialVerifier, HttpVerifier, VerifyError, VerifyResponse};

use crate::error::AppError;

/// Identity established by a successful verification. Never persisted.
///
/// The verifier may accept a credential without naming a user; such callers are
/// authenticated but anonymous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Option<String>,
    pub email: Option<String>,
}

/// Authentication outcome attached to request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    User(Principal),
    /// Caller presented the shared bypass token.
    Internal,
}

impl AuthContext {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            AuthContext::User(p) => Some(p),
            AuthContext::Internal => None,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("Authorization header is not a bearer credential")]
    MalformedHeader,
    #[error("credential rejected")]
    InvalidToken,
}

pub struct AuthGateway {
    verifier: Arc<dyn CredentialVerifier>,
    bypass_token: Option<String>,
}

impl AuthGateway {
    /// An empty `bypass_token` disables the bypass.
    pub fn new(verifier: Arc<dyn CredentialVerifier>, bypass_token: &str) -> Self {
        Self {
            verifier,
            bypass_token: (!bypass_token.is_empty()).then(|| bypass_token.to_string()),
        }
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let raw = headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AuthError::MalformedHeader)?;

        if self.bypass_token.as_deref() == Some(raw) {
            return Ok(AuthContext::Internal);
        }

        if !raw.starts_with("Bearer ") {
            return Err(AuthError::MalformedHeader);
        }

        let response = match self.verifier.verify(raw).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Credential verification failed");
                return Err(AuthError::InvalidToken);
            }
        };

        match response {
            VerifyResponse {
                valid: true,
                user_id,
                email,
            } => {
                if user_id.is_none() {
                    debug!("Verifier accepted a credential without a user id");
                }
                Ok(AuthContext::User(Principal { user_id, email }))
            }
            _ => {
                debug!("Verifier rejected credential");
                Err(AuthError::InvalidToken)
            }
        }
    }
}

/// CORS preflight: `OPTIONS` carrying both `Origin` and `Access-Control-Request-Method`.
pub fn is_preflight(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

/// Middleware gating a router behind [`AuthGateway::authenticate`].
pub async fn require_auth(
    State(gateway): State<Arc<AuthGateway>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if is_preflight(req.method(), req.headers()) || req.extensions().get::<AuthContext>().is_some()
    {
        return Ok(next.run(req).await);
    }

    let context = gateway.authenticate(req.headers()).await?;
    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}
