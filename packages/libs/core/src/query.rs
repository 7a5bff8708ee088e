//! 제안서 목록 조회 파라미터
//!
//! 검증 순서:
//!
//! 1. 학기 문자열 형식 (422)
//! 2. `limit` 형식 (422)
//! 3. 학기 순서 (400)

use crate::error::{Error, Result};
use crate::semester::{Semester, SemesterRange};

pub const DEFAULT_LIMIT: usize = 1000;

/// 검증된 목록 조회 파라미터
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposalListQuery {
    pub range: SemesterRange,
    pub limit: usize,
}

impl ProposalListQuery {
    /// 원시 쿼리 문자열에서 생성 (누락 시 기본값)
    pub fn parse(from: Option<&str>, to: Option<&str>, limit: Option<&str>) -> Result<Self> {
        let from = match from {
            Some(raw) => raw.parse::<Semester>()?,
            None => Semester::EARLIEST,
        };
        let to = match to {
            Some(raw) => raw.parse::<Semester>()?,
            None => Semester::LATEST,
        };
        let limit = match limit {
            Some(raw) => parse_limit(raw)?,
            None => DEFAULT_LIMIT,
        };
        let range = SemesterRange::new(from, to)?;
        Ok(Self { range, limit })
    }
}

impl Default for ProposalListQuery {
    fn default() -> Self {
        Self {
            range: SemesterRange {
                from: Semester::EARLIEST,
                to: Semester::LATEST,
            },
            limit: DEFAULT_LIMIT,
        }
    }
}

fn parse_limit(raw: &str) -> Result<usize> {
    let value: i64 = raw.trim().parse().map_err(|_| {
        Error::validation(format!(
            "Invalid limit: {:?}. The limit must be a non-negative integer.",
            raw
        ))
    })?;
    usize::try_from(value).map_err(|_| {
        Error::validation(format!(
            "Invalid limit: {}. The limit must not be negative.",
            value
        ))
    })
}
