//! 제안서 핸들러

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use salt_core::permissions::{Principal, ProposalTarget};
use salt_core::proposal::{
    NewObservationComment, ObservationComment, Proposal, ProposalCode, ProposalListItem,
    ProposalStatusInfo,
};
use salt_core::query::ProposalListQuery;
use salt_core::Error;

use super::{authorize, parse_proposal_code};
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// `GET /proposals` 쿼리 파라미터
///
/// 값은 문자열로 받아 `ProposalListQuery`에서 검증합니다.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(rename = "from-semester", alias = "from")]
    pub from_semester: Option<String>,

    #[serde(rename = "to-semester", alias = "to")]
    pub to_semester: Option<String>,

    pub limit: Option<String>,
}

/// `GET /proposals`
pub async fn list_proposals(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<ProposalListItem>>> {
    let Query(params) = params.map_err(|e| Error::validation(e.body_text()))?;
    let query = ProposalListQuery::parse(
        params.from_semester.as_deref(),
        params.to_semester.as_deref(),
        params.limit.as_deref(),
    )?;

    let candidates = state.db.list_candidates(&query.range).await?;
    let total = candidates.len();
    let items = state.evaluator.can_list(&principal, &query, candidates);

    tracing::debug!(
        user = %principal.username,
        from = %query.range.from,
        to = %query.range.to,
        limit = query.limit,
        candidates = total,
        returned = items.len(),
        "Listed proposals"
    );
    Ok(Json(items))
}

/// 제안서 조회 후 열람 권한 확인
async fn viewable_proposal(
    state: &AppState,
    principal: &Principal,
    code: &ProposalCode,
) -> Result<ProposalTarget> {
    let target = load_target(state, code).await?;
    authorize(principal, state.evaluator.view_proposal(principal, &target))?;
    Ok(target)
}

pub(crate) async fn load_target(state: &AppState, code: &ProposalCode) -> Result<ProposalTarget> {
    Ok(state
        .db
        .get_proposal_target(code)
        .await?
        .ok_or_else(|| Error::not_found(format!("No proposal with code {}", code)))?)
}

/// `GET /proposals/{proposal_code}`
pub async fn get_proposal(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(proposal_code): Path<String>,
) -> Result<Json<Proposal>> {
    let code = parse_proposal_code(&proposal_code)?;
    viewable_proposal(&state, &principal, &code).await?;

    let proposal = state
        .db
        .get_proposal(&code)
        .await?
        .ok_or_else(|| Error::not_found(format!("No proposal with code {}", code)))?;
    Ok(Json(proposal))
}

/// `GET /proposals/{proposal_code}/status`
pub async fn get_proposal_status(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(proposal_code): Path<String>,
) -> Result<Json<ProposalStatusInfo>> {
    let code = parse_proposal_code(&proposal_code)?;
    viewable_proposal(&state, &principal, &code).await?;

    let status = state
        .db
        .get_proposal_status(&code)
        .await?
        .ok_or_else(|| Error::not_found(format!("No proposal with code {}", code)))?;
    Ok(Json(status))
}

/// `PUT /proposals/{proposal_code}/status`
///
/// 새 상태가 `Active`면 활성화 규칙, `Inactive`면 비활성화 규칙, 그 외는 Staff 전용입니다.
pub async fn update_proposal_status(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(proposal_code): Path<String>,
    body: std::result::Result<Json<ProposalStatusInfo>, JsonRejection>,
) -> Result<Json<ProposalStatusInfo>> {
    let code = parse_proposal_code(&proposal_code)?;
    let Json(status) = body.map_err(|e| Error::validation(e.body_text()))?;

    let target = load_target(&state, &code).await?;
    authorize(
        &principal,
        state
            .evaluator
            .may_change_proposal_status(&principal, &target, status.value),
    )?;

    state.db.update_proposal_status(&code, &status).await?;
    tracing::info!(
        user = %principal.username,
        proposal = %code,
        status = %status.value,
        "Proposal status updated"
    );
    Ok(Json(status))
}

/// `GET /proposals/{proposal_code}/observation-comments`
pub async fn get_observation_comments(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(proposal_code): Path<String>,
) -> Result<Json<Vec<ObservationComment>>> {
    let code = parse_proposal_code(&proposal_code)?;
    let target = load_target(&state, &code).await?;
    authorize(
        &principal,
        state.evaluator.may_view_observation_comments(&principal, &target),
    )?;

    let comments = state.db.get_observation_comments(&code).await?;
    Ok(Json(comments))
}

/// `POST /proposals/{proposal_code}/observation-comments`
///
/// 요청한 사용자가 작성자로 기록됩니다.
pub async fn add_observation_comment(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(proposal_code): Path<String>,
    body: std::result::Result<Json<NewObservationComment>, JsonRejection>,
) -> Result<(StatusCode, Json<ObservationComment>)> {
    let code = parse_proposal_code(&proposal_code)?;
    let Json(body) = body.map_err(|e| Error::validation(e.body_text()))?;
    let text = body.comment.trim();
    if text.is_empty() {
        return Err(Error::validation("The comment must not be empty.").into());
    }

    let target = load_target(&state, &code).await?;
    authorize(
        &principal,
        state.evaluator.may_add_observation_comment(&principal, &target),
    )?;

    let comment = state
        .db
        .add_observation_comment(&code, principal.user_id, text, Utc::now().date_naive())
        .await?;
    tracing::info!(
        user = %principal.username,
        proposal = %code,
        comment_id = comment.id,
        "Observation comment added"
    );
    Ok((StatusCode::CREATED, Json(comment)))
}
