//! 블록(Block)과 블록 방문(Block Visit) 타입

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::proposal::ProposalCode;
use crate::semester::Semester;

named_enum! {
    /// 블록 상태
    pub enum BlockStatus ("block status") {
        Active => "Active",
        Completed => "Completed",
        Deleted => "Deleted",
        Expired => "Expired",
        NotSet => "Not set",
        OnHold => "On hold",
        Superseded => "Superseded",
    }
}

named_enum! {
    /// 블록 방문 상태
    ///
    /// DB에는 `Deleted`도 존재하지만 API에는 노출되지 않습니다.
    pub enum BlockVisitStatus ("block visit status") {
        Accepted => "Accepted",
        InQueue => "In queue",
        Rejected => "Rejected",
    }
}

named_enum! {
    /// 블록 방문 거절 사유
    pub enum RejectionReason ("block rejection reason") {
        InstrumentTechnicalProblems => "Instrument technical problems",
        ObservingConditionsNotMet => "Observing conditions not met",
        Phase2Problems => "Phase 2 problems",
        TelescopeTechnicalProblems => "Telescope technical problems",
        Other => "Other",
    }
}

/// 블록 상태 + 사유
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStatusInfo {
    pub value: BlockStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

/// 제안서 상세에 포함되는 블록 요약
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSummary {
    pub id: i64,
    pub name: String,
    pub semester: Semester,
    pub status: BlockStatusInfo,
}

/// 블록
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub id: i64,
    pub proposal_code: ProposalCode,
    pub name: String,
    pub semester: Semester,
    pub status: BlockStatusInfo,
    pub observation_time: i64,
    pub priority: i64,
    pub visits: Vec<BlockVisit>,
}

/// 블록 방문
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockVisit {
    pub id: i64,
    pub block_id: i64,
    pub night: NaiveDate,
    pub status: BlockVisitStatus,
    pub rejection_reason: Option<RejectionReason>,
}

/// 블록 방문 상태 + 거절 사유 (조회/변경 본문 공용)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockVisitStatusInfo {
    pub status: BlockVisitStatus,
    #[serde(default)]
    pub rejection_reason: Option<RejectionReason>,
}
