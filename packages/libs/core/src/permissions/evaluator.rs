//! 권한 평가기
//!
//! 주체와 대상(제안서, 블록, 블록 방문)에 대해 열람/변경 허용 여부를 판단합니다.
//! 모든 판단은 인자만으로 결정되는 순수 함수입니다.

use std::collections::BTreeSet;

use super::context::Principal;
use super::policy::{view_audiences, Audience};
use crate::error::{Error, Result};
use crate::proposal::{Partner, ProposalCode, ProposalListItem, ProposalStatus, ProposalType};
use crate::query::ProposalListQuery;

/// 권한 평가 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// 허용 여부
    pub allowed: bool,

    /// 거부 사유 (allowed=false인 경우, 로그용)
    pub reason: Option<String>,
}

impl Decision {
    /// 허용 결과 생성
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    /// 거부 결과 생성
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }

    /// 거부 시 `Error::PermissionDenied`로 변환
    pub fn into_result(self) -> Result<()> {
        if self.allowed {
            Ok(())
        } else {
            Err(Error::permission_denied(
                self.reason.unwrap_or_else(|| "permission denied".to_string()),
            ))
        }
    }
}

/// 권한 판단에 필요한 제안서 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalTarget {
    pub code: ProposalCode,
    pub proposal_type: ProposalType,

    /// 시간을 요청한 파트너 (요청 비율 > 0)
    pub partners: BTreeSet<Partner>,

    /// PI/PC가 직접 활성화할 수 있는지
    pub self_activable: bool,
}

/// 목록 후보 (학기별 제출 하나)
#[derive(Debug, Clone, PartialEq)]
pub struct ListCandidate {
    pub item: ProposalListItem,

    /// 해당 학기에 시간을 요청한 파트너
    pub partners: BTreeSet<Partner>,
}

impl ListCandidate {
    fn target(&self) -> ProposalTarget {
        ProposalTarget {
            code: self.item.proposal_code.clone(),
            proposal_type: self.item.proposal_type,
            partners: self.partners.clone(),
            self_activable: false,
        }
    }
}

/// 권한 평가기
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionEvaluator;

impl PermissionEvaluator {
    /// 새 평가기 생성
    pub fn new() -> Self {
        Self
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // View
    // ─────────────────────────────────────────────────────────────────────────────

    /// 제안서 열람 평가
    ///
    /// 유형별 열람 대상 중 하나라도 해당하면 허용합니다.
    pub fn view_proposal(&self, principal: &Principal, target: &ProposalTarget) -> Decision {
        let allowed = view_audiences(target.proposal_type)
            .iter()
            .any(|audience| self.in_audience(principal, *audience, target));

        if allowed {
            Decision::allow()
        } else {
            Decision::deny(format!(
                "{} may not view {} proposal {}",
                principal.username, target.proposal_type, target.code
            ))
        }
    }

    pub fn can_view_proposal(&self, principal: &Principal, target: &ProposalTarget) -> bool {
        self.view_proposal(principal, target).allowed
    }

    /// 블록 방문 열람 평가 (소속 제안서 열람 규칙과 동일)
    pub fn view_block_visit(&self, principal: &Principal, proposal: &ProposalTarget) -> Decision {
        self.view_proposal(principal, proposal)
    }

    pub fn can_view_block_visit(&self, principal: &Principal, proposal: &ProposalTarget) -> bool {
        self.view_block_visit(principal, proposal).allowed
    }

    fn in_audience(&self, principal: &Principal, audience: Audience, target: &ProposalTarget) -> bool {
        match audience {
            Audience::Staff => principal.is_staff(),
            Audience::Investigators => principal.is_investigator_of(&target.code),
            Audience::PartnerTac => target.partners.iter().any(|p| principal.is_tac_for(*p)),
            Audience::PartnerAffiliated => principal.is_partner_affiliated(),
        }
    }

    /// 목록 필터링
    ///
    /// 범위 안의 제출 중 열람 가능한 것만 최신순(ID 내림차순)으로 `limit`개까지 반환합니다.
    pub fn can_list(
        &self,
        principal: &Principal,
        query: &ProposalListQuery,
        candidates: Vec<ListCandidate>,
    ) -> Vec<ProposalListItem> {
        let mut visible: Vec<ProposalListItem> = candidates
            .into_iter()
            .filter(|c| query.range.contains(&c.item.semester))
            .filter(|c| self.can_view_proposal(principal, &c.target()))
            .map(|c| c.item)
            .collect();

        visible.sort_by(|a, b| b.id.cmp(&a.id));
        visible.truncate(query.limit);
        visible
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Modify
    // ─────────────────────────────────────────────────────────────────────────────

    /// 제안서 상태 변경 (Staff 전용)
    pub fn may_update_proposal_status(&self, principal: &Principal) -> Decision {
        self.staff_only(principal, "update proposal status")
    }

    /// 제안서 활성화
    pub fn may_activate_proposal(&self, principal: &Principal, target: &ProposalTarget) -> Decision {
        if principal.is_staff()
            || (target.self_activable && principal.is_pi_or_pc_of(&target.code))
        {
            return Decision::allow();
        }
        Decision::deny(format!(
            "{} may not activate proposal {}",
            principal.username, target.code
        ))
    }

    /// 제안서 비활성화
    pub fn may_deactivate_proposal(&self, principal: &Principal, target: &ProposalTarget) -> Decision {
        if principal.is_staff() || principal.is_pi_or_pc_of(&target.code) {
            return Decision::allow();
        }
        Decision::deny(format!(
            "{} may not deactivate proposal {}",
            principal.username, target.code
        ))
    }

    /// 새 상태 값에 따라 적용할 규칙 선택
    ///
    /// - `Active` → 활성화 규칙
    /// - `Inactive` → 비활성화 규칙
    /// - 그 외 → Staff 전용
    pub fn may_change_proposal_status(
        &self,
        principal: &Principal,
        target: &ProposalTarget,
        status: ProposalStatus,
    ) -> Decision {
        match status {
            ProposalStatus::Active => self.may_activate_proposal(principal, target),
            ProposalStatus::Inactive => self.may_deactivate_proposal(principal, target),
            _ => self.may_update_proposal_status(principal),
        }
    }

    pub fn may_update_block_status(&self, principal: &Principal) -> Decision {
        self.staff_only(principal, "update block status")
    }

    pub fn may_update_block_visit_status(&self, principal: &Principal) -> Decision {
        self.staff_only(principal, "update block visit status")
    }

    /// 사용자 정보 열람 (본인 또는 Administrator)
    pub fn may_view_user(&self, principal: &Principal, user_id: i64) -> Decision {
        if principal.user_id == user_id || principal.is_administrator() {
            return Decision::allow();
        }
        Decision::deny(format!(
            "{} may not view user {}",
            principal.username, user_id
        ))
    }

    /// 관측 코멘트 열람 (제안서 열람 규칙과 동일)
    pub fn may_view_observation_comments(
        &self,
        principal: &Principal,
        target: &ProposalTarget,
    ) -> Decision {
        self.view_proposal(principal, target)
    }

    /// 관측 코멘트 작성 (Staff 또는 해당 제안서 Investigator)
    pub fn may_add_observation_comment(
        &self,
        principal: &Principal,
        target: &ProposalTarget,
    ) -> Decision {
        if principal.is_staff() || principal.is_investigator_of(&target.code) {
            return Decision::allow();
        }
        Decision::deny(format!(
            "{} may not comment on proposal {}",
            principal.username, target.code
        ))
    }

    fn staff_only(&self, principal: &Principal, action: &str) -> Decision {
        if principal.is_staff() {
            Decision::allow()
        } else {
            Decision::deny(format!("{} may not {}", principal.username, action))
        }
    }
}
