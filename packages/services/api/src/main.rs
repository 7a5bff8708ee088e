//! SALT API
//!
//! 제안서, 블록, 블록 방문 조회/상태 변경과 로그인을 제공하는 HTTP 서비스입니다.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod error;
mod fixture;
mod handlers;
mod middleware;
mod state;

#[cfg(test)]
mod tests;

use config::Config;
use db::SaltDb;
use fixture::Fixture;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "salt_api=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!("Starting SALT API with config: {:?}", config);

    // DB 초기화
    let db = SaltDb::connect(&config.database_url, config.db_max_connections).await?;
    if let Some(path) = &config.seed_file {
        let fixture = Fixture::load(path)?;
        db.seed(&fixture).await?;
        tracing::info!(
            "Seeded {} users and {} proposals from {}",
            fixture.users.len(),
            fixture.proposals.len(),
            path
        );
    }

    // 앱 상태 초기화
    let state = Arc::new(AppState::new(&config, db)?);

    // 라우터 구성
    let app = create_router(state);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("SALT API listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// 라우터 생성
fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config.frontend_uri.as_deref());

    Router::new()
        // Auth
        .route("/token", post(handlers::auth::token))
        .route("/login", post(handlers::auth::login))
        .route("/who-am-i", get(handlers::auth::who_am_i))
        .route("/users/{user_id}", get(handlers::users::get_user))
        // Proposals
        .route("/proposals", get(handlers::proposals::list_proposals))
        .route("/proposals/{proposal_code}", get(handlers::proposals::get_proposal))
        .route(
            "/proposals/{proposal_code}/status",
            get(handlers::proposals::get_proposal_status)
                .put(handlers::proposals::update_proposal_status),
        )
        .route(
            "/proposals/{proposal_code}/observation-comments",
            get(handlers::proposals::get_observation_comments)
                .post(handlers::proposals::add_observation_comment),
        )
        // Blocks
        .route("/blocks/{block_id}", get(handlers::blocks::get_block))
        .route(
            "/blocks/{block_id}/status",
            get(handlers::blocks::get_block_status).put(handlers::blocks::update_block_status),
        )
        .route(
            "/blocks/{block_id}/visits/{visit_id}",
            get(handlers::block_visits::get_block_visit_of_block),
        )
        .route(
            "/blocks/{block_id}/visits/{visit_id}/status",
            get(handlers::block_visits::get_block_visit_status_of_block)
                .put(handlers::block_visits::update_block_visit_status_of_block),
        )
        // Block visits
        .route(
            "/block-visits/{visit_id}",
            get(handlers::block_visits::get_block_visit),
        )
        .route(
            "/block-visits/{visit_id}/status",
            get(handlers::block_visits::get_block_visit_status)
                .put(handlers::block_visits::update_block_visit_status),
        )
        // SALT Astronomers
        .route(
            "/salt-astronomers",
            get(handlers::salt_astronomers::list_salt_astronomers),
        )
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(from_fn(middleware::request_id))
        // State
        .with_state(state)
}

/// 프론트엔드 origin이 설정되어 있으면 그 origin만 허용
fn cors_layer(frontend_uri: Option<&str>) -> CorsLayer {
    let Some(origin) = frontend_uri.and_then(|uri| HeaderValue::from_str(uri).ok()) else {
        return CorsLayer::permissive();
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
