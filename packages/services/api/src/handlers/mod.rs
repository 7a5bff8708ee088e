//! HTTP 핸들러
//!
//! 모든 핸들러는 인증 → 입력 검증 → 대상 조회(404) → 권한 평가(403) → 응답 순서를 따릅니다.

pub mod auth;
pub mod block_visits;
pub mod blocks;
pub mod health;
pub mod proposals;
pub mod salt_astronomers;
pub mod users;

use salt_core::permissions::{Decision, Principal};
use salt_core::proposal::ProposalCode;
use salt_core::Error;

use crate::error::Result;

/// 경로의 정수 ID 파싱
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<i64> {
    let id = raw.trim().parse::<i64>().map_err(|_| {
        Error::validation(format!("Invalid {} id: {:?}. Expected an integer.", what, raw))
    })?;
    Ok(id)
}

pub(crate) fn parse_proposal_code(raw: &str) -> Result<ProposalCode> {
    Ok(raw.parse()?)
}

/// 권한 평가 결과 적용 (거부 시 로그 후 403)
pub(crate) fn authorize(principal: &Principal, decision: Decision) -> Result<()> {
    if !decision.allowed {
        tracing::info!(
            user = %principal.username,
            reason = decision.reason.as_deref().unwrap_or_default(),
            "Permission denied"
        );
    }
    Ok(decision.into_result()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42", "block").unwrap(), 42);
        let err = parse_id("forty-two", "block").unwrap_err();
        match err {
            ApiError::Core(e) => {
                assert_eq!(e.status_code(), 422);
                assert!(e.to_string().contains("block"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
