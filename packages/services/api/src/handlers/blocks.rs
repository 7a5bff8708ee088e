//! 블록 핸들러

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use salt_core::block::{Block, BlockStatusInfo};
use salt_core::permissions::Principal;
use salt_core::Error;

use super::proposals::load_target;
use super::{authorize, parse_id};
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::state::AppState;

async fn load_block(state: &AppState, block_id: i64) -> Result<Block> {
    Ok(state
        .db
        .get_block(block_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("No block with id {}", block_id)))?)
}

/// 블록 조회 후 소속 제안서 열람 권한 확인
async fn viewable_block(state: &AppState, principal: &Principal, block_id: i64) -> Result<Block> {
    let block = load_block(state, block_id).await?;
    let target = load_target(state, &block.proposal_code).await?;
    authorize(principal, state.evaluator.view_proposal(principal, &target))?;
    Ok(block)
}

/// `GET /blocks/{block_id}`
pub async fn get_block(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(block_id): Path<String>,
) -> Result<Json<Block>> {
    let block_id = parse_id(&block_id, "block")?;
    let block = viewable_block(&state, &principal, block_id).await?;
    Ok(Json(block))
}

/// `GET /blocks/{block_id}/status`
pub async fn get_block_status(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(block_id): Path<String>,
) -> Result<Json<BlockStatusInfo>> {
    let block_id = parse_id(&block_id, "block")?;
    let block = viewable_block(&state, &principal, block_id).await?;
    Ok(Json(block.status))
}

/// `PUT /blocks/{block_id}/status`
pub async fn update_block_status(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(block_id): Path<String>,
    body: std::result::Result<Json<BlockStatusInfo>, JsonRejection>,
) -> Result<Json<BlockStatusInfo>> {
    let block_id = parse_id(&block_id, "block")?;
    let Json(status) = body.map_err(|e| Error::validation(e.body_text()))?;

    load_block(&state, block_id).await?;
    authorize(&principal, state.evaluator.may_update_block_status(&principal))?;

    state.db.update_block_status(block_id, &status).await?;
    tracing::info!(
        user = %principal.username,
        block_id,
        status = %status.value,
        "Block status updated"
    );
    Ok(Json(status))
}
