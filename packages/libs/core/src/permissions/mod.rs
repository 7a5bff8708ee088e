//! 권한 평가
//!
//! # 개요
//!
//! 요청마다 확정된 주체(`Principal`)와 대상(제안서/블록/블록 방문)을 받아
//! 열람 및 변경 허용 여부를 판단합니다.
//!
//! # 모듈 구조
//!
//! - `context`: 요청 단위 인증 주체
//! - `policy`: 제안서 유형별 열람 대상 테이블
//! - `evaluator`: 권한 평가기

mod context;
mod evaluator;
mod policy;

pub use context::{Principal, ProposalRole, TacRole};
pub use evaluator::{Decision, ListCandidate, PermissionEvaluator, ProposalTarget};
pub use policy::{is_sensitive, view_audiences, Audience};
