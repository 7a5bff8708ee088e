//! SALT Astronomer 목록 핸들러

use std::sync::Arc;

use axum::{extract::State, Json};

use salt_core::proposal::Person;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// `GET /salt-astronomers`
pub async fn list_salt_astronomers(
    State(state): State<Arc<AppState>>,
    CurrentUser(_): CurrentUser,
) -> Result<Json<Vec<Person>>> {
    Ok(Json(state.db.list_salt_astronomers().await?))
}
