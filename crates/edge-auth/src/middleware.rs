//! Axum middleware for protected and optionally-authenticated routes.
//!
//! Extracts the bearer token from the `Authorization` header, runs it
//! through the verifier, and injects the result into request extensions
//! for downstream handlers. Failures map to HTTP responses here: every
//! token-validity failure becomes 401 Unauthorized, a missing trust root
//! becomes 500 Internal Server Error.

use crate::bearer::extract_bearer;
use crate::claims::Identity;
use crate::config::AuthConfig;
use crate::error::VerifyError;
use crate::verifier::{AuthOutcome, Verifier};
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    /// Shared verifier (owns the key cache).
    pub verifier: Arc<Verifier>,
    /// Configuration holding the trust-root secret.
    pub config: AuthConfig,
}

/// Middleware for endpoints that mandate authentication.
///
/// On success the verified [`Identity`] is stored in request extensions;
/// any failure short-circuits with the mapped error response.
///
/// # Authorization Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// Returns the underlying [`VerifyError`], which maps to 401 (missing or
/// invalid credential) or 500 (verifier unconfigured) via `IntoResponse`.
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, VerifyError> {
    let token = bearer_token(&req);
    let secret = state.config.secret()?;
    let identity = state.verifier.verify_required(token, secret)?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Middleware for endpoints that accept but do not require a credential.
///
/// Stores an [`AuthOutcome`] in request extensions: authenticated
/// requests carry an identity, anonymous ones carry the rejection reason
/// (if a credential was presented) for handlers that want to audit it.
///
/// # Errors
///
/// Only [`VerifyError::Unconfigured`] fails the request; every
/// token-validity failure degrades to an anonymous outcome.
pub async fn optional_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, VerifyError> {
    let token = bearer_token(&req);
    let secret = state.config.secret()?;
    let outcome = state.verifier.verify_optional(token, secret)?;

    req.extensions_mut().insert(outcome);
    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer)
}

/// Extension trait for reading authentication results from a request.
pub trait IdentityExt {
    /// The verified identity, if `require_auth` ran on this request, or
    /// if `optional_auth` ran and the credential verified.
    fn identity(&self) -> Option<&Identity>;

    /// The full optional-auth outcome, if `optional_auth` ran on this
    /// request.
    fn auth_outcome(&self) -> Option<&AuthOutcome>;
}

impl<B> IdentityExt for axum::http::Request<B> {
    fn identity(&self) -> Option<&Identity> {
        self.extensions()
            .get::<Identity>()
            .or_else(|| self.auth_outcome().and_then(AuthOutcome::identity))
    }

    fn auth_outcome(&self) -> Option<&AuthOutcome> {
        self.extensions().get::<AuthOutcome>()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for VerifyError {
    fn into_response(self) -> Response {
        let status = match self {
            VerifyError::Unconfigured => {
                // Deployment fault: log loudly server-side, stay generic
                // toward the client.
                tracing::error!(
                    target: "edge_auth.middleware",
                    "Authentication attempted without a configured trust-root secret"
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        });

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AuthState>();
    }

    #[test]
    fn test_token_failures_render_as_401_with_challenge() {
        let resp = VerifyError::TokenExpired.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers()
                .get(header::WWW_AUTHENTICATE)
                .and_then(|v| v.to_str().ok()),
            Some("Bearer")
        );
    }

    #[test]
    fn test_unconfigured_renders_as_500_without_challenge() {
        let resp = VerifyError::Unconfigured.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(resp.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_identity_ext_empty_request() {
        let req = axum::http::Request::new(());
        assert!(req.identity().is_none());
        assert!(req.auth_outcome().is_none());
    }
}
