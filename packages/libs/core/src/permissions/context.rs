//! 요청 단위 인증 주체
//!
//! 인증 시점에 DB에서 한 번 조회되고, 요청이 끝날 때까지 변경되지 않습니다.

use std::collections::{BTreeMap, BTreeSet};

use crate::proposal::{Partner, ProposalCode};
use crate::user::{GlobalRole, UserRole};

named_enum! {
    /// 파트너 TAC 내 역할
    pub enum TacRole ("TAC role") {
        Member => "Member",
        Chair => "Chair",
    }
}

named_enum! {
    /// 제안서 단위 역할
    pub enum ProposalRole ("proposal role") {
        PrincipalInvestigator => "Principal Investigator",
        PrincipalContact => "Principal Contact",
        Investigator => "Investigator",
    }
}

/// 인증된 주체
///
/// # 보유 정보
///
/// - 전역 역할 (Administrator, SALT Astronomer, Board Member)
/// - 파트너별 TAC 역할
/// - 소속 파트너
/// - 제안서별 역할 (PI, PC, Investigator)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    global_roles: BTreeSet<GlobalRole>,
    tac_roles: BTreeMap<Partner, TacRole>,
    affiliations: BTreeSet<Partner>,
    proposal_roles: BTreeMap<ProposalCode, BTreeSet<ProposalRole>>,
}

impl Principal {
    /// 역할 없는 주체 생성
    pub fn new(user_id: i64, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            global_roles: BTreeSet::new(),
            tac_roles: BTreeMap::new(),
            affiliations: BTreeSet::new(),
            proposal_roles: BTreeMap::new(),
        }
    }

    /// 전역 역할 추가
    pub fn with_global_role(mut self, role: GlobalRole) -> Self {
        self.global_roles.insert(role);
        self
    }

    /// TAC 역할 추가 (Chair가 Member보다 우선)
    pub fn with_tac_role(mut self, partner: Partner, role: TacRole) -> Self {
        let entry = self.tac_roles.entry(partner).or_insert(role);
        *entry = (*entry).max(role);
        self
    }

    /// 소속 파트너 추가
    pub fn with_affiliation(mut self, partner: Partner) -> Self {
        self.affiliations.insert(partner);
        self
    }

    /// 제안서 역할 추가
    pub fn with_proposal_role(mut self, code: ProposalCode, role: ProposalRole) -> Self {
        self.proposal_roles.entry(code).or_default().insert(role);
        self
    }

    pub fn has_global_role(&self, role: GlobalRole) -> bool {
        self.global_roles.contains(&role)
    }

    pub fn is_administrator(&self) -> bool {
        self.has_global_role(GlobalRole::Administrator)
    }

    /// Administrator 또는 SALT Astronomer
    pub fn is_staff(&self) -> bool {
        self.is_administrator() || self.has_global_role(GlobalRole::SaltAstronomer)
    }

    /// 해당 파트너의 TAC 역할
    pub fn tac_role(&self, partner: Partner) -> Option<TacRole> {
        self.tac_roles.get(&partner).copied()
    }

    /// 해당 파트너의 TAC 멤버 또는 의장인지
    pub fn is_tac_for(&self, partner: Partner) -> bool {
        self.tac_roles.contains_key(&partner)
    }

    /// `OTH` 외의 파트너에 소속되어 있는지
    pub fn is_partner_affiliated(&self) -> bool {
        self.affiliations.iter().any(Partner::is_salt_partner)
    }

    /// 제안서에서의 역할 확인
    pub fn has_proposal_role(&self, code: &ProposalCode, role: ProposalRole) -> bool {
        self.proposal_roles
            .get(code)
            .is_some_and(|roles| roles.contains(&role))
    }

    /// 제안서의 Investigator (PI, PC 포함)인지
    pub fn is_investigator_of(&self, code: &ProposalCode) -> bool {
        self.proposal_roles
            .get(code)
            .is_some_and(|roles| !roles.is_empty())
    }

    /// 제안서의 PI 또는 PC인지
    pub fn is_pi_or_pc_of(&self, code: &ProposalCode) -> bool {
        self.has_proposal_role(code, ProposalRole::PrincipalInvestigator)
            || self.has_proposal_role(code, ProposalRole::PrincipalContact)
    }

    /// `who-am-i`에 노출되는 역할 목록
    pub fn user_roles(&self) -> Vec<UserRole> {
        let mut roles: BTreeSet<UserRole> =
            self.global_roles.iter().map(|r| UserRole::from(*r)).collect();
        for role in self.tac_roles.values() {
            roles.insert(match role {
                TacRole::Member => UserRole::TacMember,
                TacRole::Chair => UserRole::TacChair,
            });
        }
        roles.into_iter().collect()
    }
}
