//! 로그인 및 현재 사용자 핸들러

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, State},
    Form, Json,
};
use serde::Deserialize;

use salt_core::auth::{verify_password, AccessToken};
use salt_core::user::UserDetails;
use salt_core::Error;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// 로그인 정보
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// `POST /token` (OAuth2 password form)
pub async fn token(
    State(state): State<Arc<AppState>>,
    form: std::result::Result<Form<Credentials>, FormRejection>,
) -> Result<Json<AccessToken>> {
    let Form(credentials) = form.map_err(|e| Error::validation(e.body_text()))?;
    issue_token(&state, &credentials).await.map(Json)
}

/// `POST /login` (JSON)
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AccessToken>> {
    let Json(credentials) = body.map_err(|e| Error::validation(e.body_text()))?;
    issue_token(&state, &credentials).await.map(Json)
}

async fn issue_token(state: &AppState, credentials: &Credentials) -> Result<AccessToken> {
    let user = state
        .db
        .get_user_by_username(&credentials.username)
        .await?
        .filter(|user| verify_password(&credentials.password, &user.password_hash));

    let Some(user) = user else {
        tracing::info!(username = %credentials.username, "Login failed");
        return Err(Error::InvalidCredentials.into());
    };

    let token = state.tokens.issue(&user.username)?;
    tracing::info!(username = %user.username, expires_at = %token.expires_at, "Access token issued");
    Ok(token)
}

/// `GET /who-am-i`
pub async fn who_am_i(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<UserDetails>> {
    let user = state
        .db
        .get_user(principal.user_id)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    Ok(Json(UserDetails {
        user,
        roles: principal.user_roles(),
    }))
}
