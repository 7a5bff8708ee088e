//! 인증 추출기
//!
//! `Authorization: Bearer <token>`을 검증하고 요청 단위 `Principal`을 확정합니다.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};

use salt_core::auth::bearer_token;
use salt_core::permissions::Principal;
use salt_core::Error;

use crate::error::ApiError;
use crate::state::AppState;

/// 인증된 요청 주체
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = bearer_token(header).ok_or_else(|| Error::AuthenticationRequired {
            message: "Not authenticated".to_string(),
        })?;

        let claims = state.tokens.validate(token).map_err(|e| {
            tracing::debug!("Rejected access token: {}", e);
            Error::InvalidCredentials
        })?;

        let principal = state.db.principal(&claims.sub).await?.ok_or_else(|| {
            tracing::debug!("Token subject {:?} no longer exists", claims.sub);
            Error::InvalidCredentials
        })?;

        Ok(CurrentUser(principal))
    }
}
