//! Current-user extractor.
//!
//! Identity is established upstream by a trusted proxy, which forwards the
//! verified user id in a header. When a proxy secret is configured, requests
//! must also prove they came through that proxy.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, HeaderName, request::Parts};
use dialectic_core::{gateway::Gateway, store::SessionStore};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Header carrying the shared proxy secret.
pub const PROXY_SECRET_HEADER: &str = "x-proxy-secret";

/// How the current user is resolved for this server instance.
#[derive(Clone)]
pub struct IdentityConfig {
  pub user_header:       HeaderName,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub proxy_secret_hash: Option<String>,
}

/// The verified id of the user making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

/// Resolve the current user from request headers.
pub fn verify_identity(headers: &HeaderMap, config: &IdentityConfig) -> Result<Uuid, ApiError> {
  if let Some(hash) = &config.proxy_secret_hash {
    let secret = headers
      .get(PROXY_SECRET_HEADER)
      .and_then(|v| v.to_str().ok())
      .ok_or(ApiError::Unauthorized)?;

    let parsed_hash = PasswordHash::new(hash).map_err(|_| ApiError::Unauthorized)?;

    Argon2::default()
      .verify_password(secret.as_bytes(), &parsed_hash)
      .map_err(|_| ApiError::Unauthorized)?;
  }

  let raw = headers
    .get(&config.user_header)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  Uuid::parse_str(raw.trim()).map_err(|_| ApiError::Unauthorized)
}

impl<S, G> FromRequestParts<AppState<S, G>> for CurrentUser
where
  S: SessionStore + 'static,
  G: Gateway + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, G>,
  ) -> Result<Self, Self::Rejection> {
    let user_id = verify_identity(&parts.headers, &state.identity)?;
    Ok(CurrentUser(user_id))
  }
}
