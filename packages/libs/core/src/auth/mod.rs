//! 인증 관련 타입 및 로직
//!
//! # 개요
//!
//! - **Password**: 사용자 비밀번호는 SHA-256 hex 다이제스트로 저장되고 상수 시간 비교로 검증
//! - **Access Token**: PASETO v4.local (암호화), 기본 수명 7일
//! - **Bearer**: `Authorization: Bearer <token>` 헤더로 전달

mod claims;
mod password;
mod token;

pub use claims::{AccessToken, AccessTokenClaims};
pub use password::{hash_password, verify_password};
pub use token::{bearer_token, parse_key_material, TokenService};
