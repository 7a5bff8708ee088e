//! API 앱 상태

use chrono::Duration;

use salt_core::auth::TokenService;
use salt_core::permissions::PermissionEvaluator;

use crate::config::Config;
use crate::db::SaltDb;

/// 앱 상태
///
/// 모든 핸들러에서 공유하는 불변 상태입니다.
pub struct AppState {
    /// 설정
    pub config: Config,

    /// DB
    pub db: SaltDb,

    /// Access Token 발급/검증
    pub tokens: TokenService,

    /// 권한 평가기
    pub evaluator: PermissionEvaluator,
}

impl AppState {
    /// 새 상태 생성
    pub fn new(config: &Config, db: SaltDb) -> anyhow::Result<Self> {
        let tokens = TokenService::new(
            &config.secret_keys,
            Duration::hours(config.token_lifetime_hours),
        )?;

        Ok(Self {
            config: config.clone(),
            db,
            tokens,
            evaluator: PermissionEvaluator::new(),
        })
    }
}
