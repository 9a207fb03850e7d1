//! Caller identity.
//!
//! Authentication itself lives in the upstream auth provider; by the time a
//! request reaches us it carries the provider's stable user id in a trusted
//! header. Every `/api` handler takes a `Caller` and fails with `Unauthorized`
//! when none is present.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::HeaderName;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// Maps an inbound request to a stable caller id, or `None` if unauthenticated.
pub trait IdentityOracle: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Option<String>;
}

/// Reads the caller id from a header set by the auth proxy.
pub struct HeaderIdentity {
    header: HeaderName,
}

impl HeaderIdentity {
    pub fn new(header: &str) -> anyhow::Result<Self> {
        Ok(Self {
            header: HeaderName::from_bytes(header.as_bytes())?,
        })
    }
}

impl IdentityOracle for HeaderIdentity {
    fn resolve(&self, headers: &HeaderMap) -> Option<String> {
        let value = headers.get(&self.header)?.to_str().ok()?.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }
}

/// The authenticated caller's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        state
            .identity
            .resolve(&parts.headers)
            .map(Caller)
            .ok_or(AppError::Unauthorized)
    }
}

/// Resolves the caller to their user row.
pub async fn current_user(state: &AppState, caller: &Caller) -> Result<User, AppError> {
    state
        .users
        .find_by_clerk_id(&caller.0)
        .await?
        .ok_or(AppError::UserNotFound)
}
