//! 열람 규칙 테이블
//!
//! 제안서 유형마다 열람할 수 있는 대상(Audience)을 정의합니다.
//! 새 유형이 추가되면 `view_audiences`의 `match`가 컴파일 단계에서 누락을 알려줍니다.

use crate::proposal::ProposalType;

/// 열람 대상
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Audience {
    /// Administrator, SALT Astronomer
    Staff,

    /// 해당 제안서의 PI, PC, Investigator
    Investigators,

    /// 제안서가 시간을 요청한 파트너의 TAC 멤버/의장
    PartnerTac,

    /// `OTH`가 아닌 파트너에 소속된 모든 사용자
    PartnerAffiliated,
}

const OWNERS_ONLY: &[Audience] = &[Audience::Staff, Audience::Investigators];

const WITH_TAC: &[Audience] = &[
    Audience::Staff,
    Audience::Investigators,
    Audience::PartnerTac,
];

const WITH_PARTNERS: &[Audience] = &[
    Audience::Staff,
    Audience::Investigators,
    Audience::PartnerAffiliated,
];

/// 제안서 유형별 열람 대상
pub fn view_audiences(proposal_type: ProposalType) -> &'static [Audience] {
    match proposal_type {
        ProposalType::Commissioning
        | ProposalType::DirectorsDiscretionaryTime
        | ProposalType::ScienceVerification => OWNERS_ONLY,
        ProposalType::GravitationalWaveEvent => WITH_PARTNERS,
        ProposalType::Science
        | ProposalType::ScienceLongTerm
        | ProposalType::KeyScienceProgram
        | ProposalType::LargeScienceProposal
        | ProposalType::OpticonRadionetPilot
        | ProposalType::Engineering => WITH_TAC,
    }
}

/// 민감 유형 (Staff와 제안서 당사자만 열람)
pub fn is_sensitive(proposal_type: ProposalType) -> bool {
    view_audiences(proposal_type) == OWNERS_ONLY
}
