//! 공통 에러 타입
//!
//! SALT API 전체에서 사용되는 에러 타입을 정의합니다.
//! 각 변형은 발생 지점에서 생성되고, 한 단계 위(서비스 계층)에서 HTTP 상태로 변환됩니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// SALT API 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Authentication Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("Could not validate credentials.")]
    InvalidCredentials,

    #[error("authentication required: {message}")]
    AuthenticationRequired { message: String },

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token: {reason}")]
    InvalidToken { reason: String },

    #[error("token could not be issued: {reason}")]
    TokenIssue { reason: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Permission Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("permission denied: {reason}")]
    PermissionDenied { reason: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Lookup Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("not found: {message}")]
    NotFound { message: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Request Errors
    // ─────────────────────────────────────────────────────────────────────────────
    /// 의미상 잘못된 요청 (예: from semester > to semester)
    #[error("{message}")]
    BadRequest { message: String },

    /// 형식상 잘못된 값 (예: semester 형식, 음수 limit)
    #[error("{message}")]
    Validation { message: String },
}

impl Error {
    /// 검증 에러 생성 헬퍼
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    /// 404 에러 생성 헬퍼
    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound {
            message: message.into(),
        }
    }

    /// 403 에러 생성 헬퍼
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Error::PermissionDenied {
            reason: reason.into(),
        }
    }

    /// HTTP 상태 코드로 변환
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Error::BadRequest { .. } => 400,

            // 401 Unauthorized
            Error::InvalidCredentials
            | Error::AuthenticationRequired { .. }
            | Error::TokenExpired
            | Error::InvalidToken { .. } => 401,

            // 403 Forbidden
            Error::PermissionDenied { .. } => 403,

            // 404 Not Found
            Error::NotFound { .. } => 404,

            // 422 Unprocessable Entity
            Error::Validation { .. } => 422,

            // 500 Internal Server Error
            Error::TokenIssue { .. } => 500,
        }
    }

    /// 인증 실패 계열인지 확인 (`WWW-Authenticate` 헤더 부착 용도)
    pub fn is_authentication(&self) -> bool {
        self.status_code() == 401
    }

    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidCredentials => "INVALID_CREDENTIALS",
            Error::AuthenticationRequired { .. } => "AUTHENTICATION_REQUIRED",
            Error::TokenExpired => "TOKEN_EXPIRED",
            Error::InvalidToken { .. } => "INVALID_TOKEN",
            Error::TokenIssue { .. } => "TOKEN_ISSUE_ERROR",
            Error::PermissionDenied { .. } => "PERMISSION_DENIED",
            Error::NotFound { .. } => "NOT_FOUND",
            Error::BadRequest { .. } => "BAD_REQUEST",
            Error::Validation { .. } => "VALIDATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::InvalidCredentials.status_code(), 401);
        assert_eq!(Error::permission_denied("no").status_code(), 403);
        assert_eq!(Error::not_found("gone").status_code(), 404);
        assert_eq!(
            Error::BadRequest {
                message: "order".to_string()
            }
            .status_code(),
            400
        );
        assert_eq!(Error::validation("format").status_code(), 422);
    }

    #[test]
    fn test_credentials_message() {
        assert!(Error::InvalidCredentials.to_string().contains("credentials"));
        assert!(Error::InvalidCredentials.is_authentication());
        assert!(!Error::validation("x").is_authentication());
    }
}
