//! 블록 방문 핸들러
//!
//! `/block-visits/{visit_id}`와 `/blocks/{block_id}/visits/{visit_id}` 두 경로를 제공합니다.
//! 후자에서 블록 ID가 방문의 블록과 다르면 404입니다.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use salt_core::block::{BlockVisit, BlockVisitStatusInfo};
use salt_core::permissions::{Principal, ProposalTarget};
use salt_core::Error;

use super::proposals::load_target;
use super::{authorize, parse_id};
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// 블록 방문과 소속 제안서 조회 (404)
async fn find_visit(
    state: &AppState,
    block_id: Option<i64>,
    visit_id: i64,
) -> Result<(BlockVisit, ProposalTarget)> {
    let (visit, proposal_code) = state
        .db
        .get_block_visit(visit_id)
        .await?
        .filter(|(visit, _)| block_id.map_or(true, |id| id == visit.block_id))
        .ok_or_else(|| Error::not_found(format!("No block visit with id {}", visit_id)))?;

    let target = load_target(state, &proposal_code).await?;
    Ok((visit, target))
}

/// 블록 방문 조회 후 열람 권한 확인
async fn viewable_visit(
    state: &AppState,
    principal: &Principal,
    block_id: Option<i64>,
    visit_id: i64,
) -> Result<BlockVisit> {
    let (visit, target) = find_visit(state, block_id, visit_id).await?;
    authorize(principal, state.evaluator.view_block_visit(principal, &target))?;
    Ok(visit)
}

fn parse_ids(block_id: &str, visit_id: &str) -> Result<(i64, i64)> {
    Ok((parse_id(block_id, "block")?, parse_id(visit_id, "block visit")?))
}

/// `GET /block-visits/{visit_id}`
pub async fn get_block_visit(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(visit_id): Path<String>,
) -> Result<Json<BlockVisit>> {
    let visit_id = parse_id(&visit_id, "block visit")?;
    Ok(Json(viewable_visit(&state, &principal, None, visit_id).await?))
}

/// `GET /blocks/{block_id}/visits/{visit_id}`
pub async fn get_block_visit_of_block(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path((block_id, visit_id)): Path<(String, String)>,
) -> Result<Json<BlockVisit>> {
    let (block_id, visit_id) = parse_ids(&block_id, &visit_id)?;
    Ok(Json(viewable_visit(&state, &principal, Some(block_id), visit_id).await?))
}

/// `GET /block-visits/{visit_id}/status`
pub async fn get_block_visit_status(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(visit_id): Path<String>,
) -> Result<Json<BlockVisitStatusInfo>> {
    let visit_id = parse_id(&visit_id, "block visit")?;
    let visit = viewable_visit(&state, &principal, None, visit_id).await?;
    Ok(Json(status_of(&visit)))
}

/// `GET /blocks/{block_id}/visits/{visit_id}/status`
pub async fn get_block_visit_status_of_block(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path((block_id, visit_id)): Path<(String, String)>,
) -> Result<Json<BlockVisitStatusInfo>> {
    let (block_id, visit_id) = parse_ids(&block_id, &visit_id)?;
    let visit = viewable_visit(&state, &principal, Some(block_id), visit_id).await?;
    Ok(Json(status_of(&visit)))
}

/// `PUT /block-visits/{visit_id}/status`
pub async fn update_block_visit_status(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(visit_id): Path<String>,
    body: std::result::Result<Json<BlockVisitStatusInfo>, JsonRejection>,
) -> Result<Json<BlockVisitStatusInfo>> {
    let visit_id = parse_id(&visit_id, "block visit")?;
    let Json(status) = body.map_err(|e| Error::validation(e.body_text()))?;
    apply_status(&state, &principal, None, visit_id, status).await
}

/// `PUT /blocks/{block_id}/visits/{visit_id}/status`
pub async fn update_block_visit_status_of_block(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path((block_id, visit_id)): Path<(String, String)>,
    body: std::result::Result<Json<BlockVisitStatusInfo>, JsonRejection>,
) -> Result<Json<BlockVisitStatusInfo>> {
    let (block_id, visit_id) = parse_ids(&block_id, &visit_id)?;
    let Json(status) = body.map_err(|e| Error::validation(e.body_text()))?;
    apply_status(&state, &principal, Some(block_id), visit_id, status).await
}

async fn apply_status(
    state: &AppState,
    principal: &Principal,
    block_id: Option<i64>,
    visit_id: i64,
    status: BlockVisitStatusInfo,
) -> Result<Json<BlockVisitStatusInfo>> {
    find_visit(state, block_id, visit_id).await?;
    authorize(principal, state.evaluator.may_update_block_visit_status(principal))?;

    state.db.update_block_visit_status(visit_id, &status).await?;
    tracing::info!(
        user = %principal.username,
        visit_id,
        status = %status.status,
        "Block visit status updated"
    );
    Ok(Json(status))
}

fn status_of(visit: &BlockVisit) -> BlockVisitStatusInfo {
    BlockVisitStatusInfo {
        status: visit.status,
        rejection_reason: visit.rejection_reason,
    }
}
