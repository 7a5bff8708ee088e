//! salt-core: SALT API 공통 핵심 라이브러리
//!
//! 이 크레이트는 API 서비스가 사용하는 도메인 타입과 권한 판단 로직을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `semester`: 관측 학기와 학기 범위
//! - `proposal`, `block`, `user`: 도메인 타입
//! - `query`: 제안서 목록 조회 파라미터 검증
//! - `permissions`: 주체, 열람 규칙 테이블, 권한 평가기
//! - `auth`: 비밀번호 해시와 PASETO Access Token
//! - `error`: 공통 에러 타입

#[macro_use]
mod macros;

pub mod auth;
pub mod block;
pub mod error;
pub mod permissions;
pub mod proposal;
pub mod query;
pub mod semester;
pub mod user;

pub use error::{Error, Result};
