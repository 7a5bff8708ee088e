//! 토큰 Claims
//!
//! Access Token 페이로드와 발급 응답 구조입니다.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Access Token Claims (PASETO v4.local 페이로드)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (username)
    pub sub: String,

    /// 발급 시각
    pub iat: DateTime<Utc>,

    /// 만료 시각
    pub exp: DateTime<Utc>,

    /// Token ID (감사 로그용)
    pub jti: String,
}

impl AccessTokenClaims {
    /// 새 claims 생성
    pub fn new(sub: impl Into<String>, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: sub.into(),
            iat: now,
            exp: now + lifetime,
            jti: ulid::Ulid::new().to_string(),
        }
    }

    /// 만료 여부 확인
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.exp
    }
}

/// `/token`, `/login` 응답 본문
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn bearer(access_token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_at,
        }
    }
}
