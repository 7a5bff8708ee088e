//! 사용자 핸들러

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use salt_core::user::User;
use salt_core::Error;

use super::{authorize, parse_id};
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// `GET /users/{user_id}` (본인 또는 Administrator)
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<User>> {
    let user_id = parse_id(&user_id, "user")?;

    let user = state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("No user with id {}", user_id)))?;

    authorize(&principal, state.evaluator.may_view_user(&principal, user_id))?;
    Ok(Json(user))
}
