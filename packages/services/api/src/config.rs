//! API 서비스 설정

use std::env;

/// API 서비스 설정
#[derive(Clone)]
pub struct Config {
    /// 서버 포트
    pub port: u16,

    /// SQLite 연결 URL
    pub database_url: String,

    /// Connection Pool 크기
    pub db_max_connections: u32,

    /// PASETO 키 (첫 번째로 발급, 전체로 검증)
    pub secret_keys: Vec<String>,

    /// Access Token 수명 (시간)
    pub token_lifetime_hours: i64,

    /// CORS 허용 origin (없으면 permissive)
    pub frontend_uri: Option<String>,

    /// 시작 시 적재할 YAML fixture
    pub seed_file: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("db_max_connections", &self.db_max_connections)
            .field("secret_keys", &format!("<{} keys>", self.secret_keys.len()))
            .field("token_lifetime_hours", &self.token_lifetime_hours)
            .field("frontend_uri", &self.frontend_uri)
            .field("seed_file", &self.seed_file)
            .finish()
    }
}

impl Config {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> anyhow::Result<Self> {
        let secret_keys = env::var("SALT_API_SECRET_KEY")
            .map(|v| split_list(&v))
            .unwrap_or_default();
        if secret_keys.is_empty() {
            anyhow::bail!("SALT_API_SECRET_KEY must be set");
        }

        Ok(Self {
            port: env::var("SALT_API_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,

            database_url: env::var("SALT_API_DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://salt.db".to_string()),

            db_max_connections: env::var("SALT_API_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .unwrap_or(8),

            secret_keys,

            token_lifetime_hours: env::var("SALT_API_TOKEN_LIFETIME_HOURS")
                .unwrap_or_else(|_| "168".to_string())
                .parse()
                .unwrap_or(168),

            frontend_uri: env::var("SALT_API_FRONTEND_URI")
                .ok()
                .filter(|v| !v.trim().is_empty()),

            seed_file: env::var("SALT_API_SEED_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(split_list(" , ").is_empty());
    }
}
