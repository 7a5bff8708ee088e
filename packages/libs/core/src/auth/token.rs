//! 토큰 발급/검증 및 유틸리티

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, SecondsFormat};
use rusty_paseto::prelude::*;

use crate::error::{Error, Result};

use super::claims::{AccessToken, AccessTokenClaims};

/// `Authorization` 헤더 값에서 Bearer 토큰 추출
///
/// 스킴은 대소문자를 구분하지 않습니다.
pub fn bearer_token(auth_header: Option<&str>) -> Option<&str> {
    let value = auth_header?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Access Token 발급/검증기
///
/// 첫 번째 키로 발급하고, 모든 키(현재 + 이전 키들)로 검증합니다.
#[derive(Clone)]
pub struct TokenService {
    keys: Vec<[u8; 32]>,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &self.keys.len())
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl TokenService {
    /// 새 서비스 생성
    ///
    /// 키 문자열은 hex(64자), base64/base64url, 또는 32바이트 원문을 받습니다.
    pub fn new(raw_keys: &[String], lifetime: Duration) -> Result<Self> {
        let mut keys = Vec::with_capacity(raw_keys.len());
        for raw in raw_keys {
            let key = parse_key_material(raw).ok_or_else(|| Error::TokenIssue {
                reason: "secret key must be 32 bytes (hex, base64 or raw)".to_string(),
            })?;
            keys.push(key);
        }
        if keys.is_empty() {
            return Err(Error::TokenIssue {
                reason: "at least one secret key is required".to_string(),
            });
        }
        Ok(Self { keys, lifetime })
    }

    /// 사용자 이름으로 Access Token 발급
    pub fn issue(&self, username: &str) -> Result<AccessToken> {
        let claims = AccessTokenClaims::new(username, self.lifetime);
        let key = PasetoSymmetricKey::<V4, Local>::from(Key::from(self.keys[0]));

        let iat = claims.iat.to_rfc3339_opts(SecondsFormat::Secs, true);
        let exp = claims.exp.to_rfc3339_opts(SecondsFormat::Secs, true);

        let token = PasetoBuilder::<V4, Local>::default()
            .set_claim(SubjectClaim::from(claims.sub.as_str()))
            .set_claim(IssuedAtClaim::try_from(iat.as_str()).map_err(issue_error)?)
            .set_claim(ExpirationClaim::try_from(exp.as_str()).map_err(issue_error)?)
            .set_claim(TokenIdentifierClaim::from(claims.jti.as_str()))
            .build(&key)
            .map_err(issue_error)?;

        Ok(AccessToken::bearer(token, claims.exp))
    }

    /// Access Token 검증 및 Claims 추출
    pub fn validate(&self, token: &str) -> Result<AccessTokenClaims> {
        let token = token.trim();

        for raw in &self.keys {
            let key = PasetoSymmetricKey::<V4, Local>::from(Key::from(*raw));
            let Ok(value) = PasetoParser::<V4, Local>::default().parse(token, &key) else {
                continue;
            };

            let claims: AccessTokenClaims =
                serde_json::from_value(value).map_err(|e| Error::InvalidToken {
                    reason: e.to_string(),
                })?;
            if claims.is_expired() {
                return Err(Error::TokenExpired);
            }
            return Ok(claims);
        }

        Err(Error::InvalidToken {
            reason: "paseto validation failed".to_string(),
        })
    }
}

fn issue_error(err: impl std::fmt::Display) -> Error {
    Error::TokenIssue {
        reason: err.to_string(),
    }
}

/// 키 문자열을 32바이트 키로 변환
pub fn parse_key_material(raw: &str) -> Option<[u8; 32]> {
    let trimmed = raw.trim();

    if trimmed.len() == 64 && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        let bytes = hex::decode(trimmed).ok()?;
        return bytes.as_slice().try_into().ok();
    }

    if let Ok(bytes) = general_purpose::URL_SAFE_NO_PAD.decode(trimmed) {
        if bytes.len() == 32 {
            return bytes.as_slice().try_into().ok();
        }
    }

    if let Ok(bytes) = general_purpose::STANDARD.decode(trimmed) {
        if bytes.len() == 32 {
            return bytes.as_slice().try_into().ok();
        }
    }

    let raw_bytes = trimmed.as_bytes();
    if raw_bytes.len() == 32 {
        return raw_bytes.try_into().ok();
    }

    None
}
