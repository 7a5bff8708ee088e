//! 라우터 통합 테스트
//!
//! 인메모리 SQLite에 `testdata/fixture.yaml`을 적재하고 실제 라우터를 `oneshot`으로 호출합니다.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use chrono::Duration;
use salt_core::auth::TokenService;
use salt_core::proposal::{ProposalStatus, ProposalType};
use salt_core::semester::Semester;

use crate::config::Config;
use crate::create_router;
use crate::db::SaltDb;
use crate::fixture::{Fixture, ProposalFixture, SubmissionFixture, UserFixture};
use crate::state::AppState;

const SECRET_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

fn bundled_fixture() -> Fixture {
    Fixture::load(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/fixture.yaml")).unwrap()
}

async fn app_with(fixture: &Fixture) -> Router {
    let db = SaltDb::connect("sqlite::memory:", 1).await.unwrap();
    db.seed(fixture).await.unwrap();

    let config = Config {
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        db_max_connections: 1,
        secret_keys: vec![SECRET_KEY.to_string()],
        token_lifetime_hours: 1,
        frontend_uri: None,
        seed_file: None,
    };
    let state = Arc::new(AppState::new(&config, db).unwrap());
    create_router(state)
}

async fn app() -> Router {
    app_with(&bundled_fixture()).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

async fn login(app: &Router, username: &str) -> String {
    let request = Request::post("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": username, "password": "secret" }).to_string(),
        ))
        .unwrap();
    let (status, _, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK, "login failed for {username}: {body}");
    body["access_token"].as_str().unwrap().to_string()
}

async fn get_as(app: &Router, username: &str, uri: &str) -> (StatusCode, Value) {
    let token = login(app, username).await;
    let request = Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app, request).await;
    (status, body)
}

async fn put_as(app: &Router, username: &str, uri: &str, payload: Value) -> (StatusCode, Value) {
    send_json_as(app, Request::put(uri), username, payload).await
}

async fn post_as(app: &Router, username: &str, uri: &str, payload: Value) -> (StatusCode, Value) {
    send_json_as(app, Request::post(uri), username, payload).await
}

async fn send_json_as(
    app: &Router,
    builder: axum::http::request::Builder,
    username: &str,
    payload: Value,
) -> (StatusCode, Value) {
    let token = login(app, username).await;
    let request = builder
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, _, body) = send(app, request).await;
    (status, body)
}

fn codes(body: &Value) -> BTreeSet<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|item| item["proposal_code"].as_str().unwrap().to_string())
        .collect()
}

fn message(body: &Value) -> String {
    body["error"]["message"].as_str().unwrap_or_default().to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, headers, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_token_form_login() {
    let app = app().await;
    let request = Request::post("/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=pi&password=secret"))
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].as_str().unwrap().starts_with("v4.local."));
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn test_wrong_password_rejected() {
    let app = app().await;
    for (username, password) in [("pi", "wrong"), ("nobody", "secret")] {
        let request = Request::post("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "username": username, "password": password }).to_string(),
            ))
            .unwrap();
        let (status, headers, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(message(&body).contains("credentials"));
        assert_eq!(headers[header::WWW_AUTHENTICATE], "Bearer");
    }
}

#[tokio::test]
async fn test_requests_without_valid_token_rejected() {
    let app = app().await;

    let (status, _, body) = send(&app, Request::get("/proposals").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTHENTICATION_REQUIRED");
    assert!(body["error"]["requestId"].is_string());

    let request = Request::get("/proposals/2021-1-SCI-001")
        .header(header::AUTHORIZATION, "Bearer v4.local.garbage")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(message(&body).contains("credentials"));
}

#[tokio::test]
async fn test_token_for_unknown_user_rejected() {
    let app = app().await;
    let tokens = TokenService::new(&[SECRET_KEY.to_string()], Duration::hours(1)).unwrap();
    let issued = tokens.issue("ghost").unwrap();

    let request = Request::get("/who-am-i")
        .header(header::AUTHORIZATION, format!("Bearer {}", issued.access_token))
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(message(&body).contains("credentials"));
    assert_eq!(headers[header::WWW_AUTHENTICATE], "Bearer");
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = app().await;
    let tokens = TokenService::new(&[SECRET_KEY.to_string()], Duration::hours(-1)).unwrap();
    let issued = tokens.issue("pi").unwrap();

    let request = Request::get("/who-am-i")
        .header(header::AUTHORIZATION, format!("Bearer {}", issued.access_token))
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(message(&body).contains("credentials"));
    assert_eq!(headers[header::WWW_AUTHENTICATE], "Bearer");
}

#[tokio::test]
async fn test_unauthenticated_before_not_found() {
    let app = app().await;
    let request = Request::get("/block-visits/0").body(Body::empty()).unwrap();
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_who_am_i() {
    let app = app().await;
    let (status, body) = get_as(&app, "ru-chair", "/who-am-i").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ru-chair");
    assert_eq!(body["roles"], json!(["TAC Chair"]));
    assert_eq!(body["affiliations"], json!(["RU"]));
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_user_access() {
    let app = app().await;

    let (status, body) = get_as(&app, "pi", "/users/6").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["family_name"], "Investigator");

    let (status, _) = get_as(&app, "pi", "/users/1").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get_as(&app, "admin", "/users/6").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get_as(&app, "admin", "/users/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_as(&app, "admin", "/users/abc").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ─────────────────────────────────────────────────────────────────────────────
// Proposal list
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_tac_chair_lists_partner_proposals() {
    let app = app().await;
    let (status, body) = get_as(
        &app,
        "ru-chair",
        "/proposals?from-semester=2021-1&to-semester=2021-1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let expected: BTreeSet<String> = [
        "2021-1-SCI-001",
        "2021-1-SCI-002",
        "2021-1-SCI-003",
        "2021-1-LSP-001",
        "2021-1-KSP-001",
        "2021-1-ENG-001",
        "2020-2-MLT-001",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();
    assert_eq!(body.as_array().unwrap().len(), 7);
    assert_eq!(codes(&body), expected);

    let (status, aliased) = get_as(&app, "ru-chair", "/proposals?from=2021-1&to=2021-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(codes(&aliased), expected);
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let app = app().await;
    let (status, body) = get_as(&app, "astronomer", "/proposals?limit=3").await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![30, 25, 24]);
}

#[tokio::test]
async fn test_list_entry_shape() {
    let app = app().await;
    let (_, body) = get_as(&app, "pi", "/proposals?from-semester=2021-1&to-semester=2021-1").await;
    let item = body
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["proposal_code"] == "2021-1-SCI-001")
        .unwrap();
    assert_eq!(item["semester"], "2021-1");
    assert_eq!(item["proposal_type"], "Science");
    assert_eq!(item["status"]["value"], "Active");
    assert_eq!(item["principal_investigator"]["family_name"], "Investigator");
    assert_eq!(item["liaison_astronomer"]["family_name"], "Mokoena");
}

#[tokio::test]
async fn test_malformed_semester_is_validation_error() {
    let app = app().await;
    for username in ["admin", "pi", "board"] {
        for uri in [
            "/proposals?from-semester=2021-3",
            "/proposals?to-semester=21-1",
            "/proposals?from-semester=2021",
        ] {
            let (status, body) = get_as(&app, username, uri).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{username} {uri}");
            assert!(message(&body).contains("semester"), "{username} {uri}");
        }
    }
}

#[tokio::test]
async fn test_reversed_semesters_is_bad_request() {
    let app = app().await;
    for username in ["admin", "astronomer", "ru-chair", "pi", "board", "other"] {
        let (status, body) = get_as(
            &app,
            username,
            "/proposals?from-semester=2021-2&to-semester=2021-1",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{username}");
        assert!(message(&body).contains("semester"), "{username}");
    }
}

#[tokio::test]
async fn test_limit_validation() {
    let app = app().await;

    let (status, body) = get_as(&app, "admin", "/proposals?limit=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);

    for uri in ["/proposals?limit=-1", "/proposals?limit=ten"] {
        let (status, body) = get_as(&app, "admin", uri).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert!(message(&body).contains("limit"), "{uri}");
    }
}

#[tokio::test]
async fn test_default_limit_is_1000() {
    let mut fixture = Fixture {
        users: bundled_fixture()
            .users
            .into_iter()
            .filter(|u| u.username == "admin" || u.username == "pi")
            .collect::<Vec<UserFixture>>(),
        proposals: Vec::new(),
    };

    let mut submission_id = 0;
    for number in 1..=6 {
        let mut submissions = Vec::new();
        for year in 2000..=2099 {
            for half in 1..=2 {
                submission_id += 1;
                submissions.push(SubmissionFixture {
                    id: submission_id,
                    semester: Semester::new(year, half).unwrap(),
                    time_requests: Default::default(),
                });
            }
        }
        fixture.proposals.push(ProposalFixture {
            code: format!("2020-1-SCI-{number:03}").parse().unwrap(),
            proposal_type: ProposalType::Science,
            title: format!("Survey {number}"),
            status: ProposalStatus::Active,
            status_reason: None,
            phase: 2,
            self_activable: false,
            principal_investigator: 6,
            principal_contact: 6,
            liaison_astronomer: None,
            investigators: Vec::new(),
            submissions,
            blocks: Vec::new(),
            observation_comments: Vec::new(),
        });
    }
    assert!(submission_id > 1000);

    let app = app_with(&fixture).await;

    let (status, body) = get_as(&app, "admin", "/proposals").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1000);
    assert_eq!(body[0]["id"], submission_id);

    let (_, body) = get_as(&app, "admin", "/proposals?limit=1100").await;
    assert_eq!(body.as_array().unwrap().len(), 1100);
}

// ─────────────────────────────────────────────────────────────────────────────
// Proposal detail & status
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_proposal_detail() {
    let app = app().await;
    let (status, body) = get_as(&app, "investigator", "/proposals/2021-1-SCI-001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["proposal_type"], "Science");
    assert_eq!(body["semesters"], json!(["2021-1"]));
    assert_eq!(body["investigators"].as_array().unwrap().len(), 2);
    assert_eq!(body["time_requests"].as_array().unwrap().len(), 2);
    assert_eq!(body["blocks"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_sensitive_proposals_hidden() {
    let app = app().await;
    for code in ["2021-1-DDT-001", "2021-1-COM-001", "2021-1-SVP-001"] {
        for username in ["board", "ru-chair", "rsa-member", "uksc", "other"] {
            let (status, body) = get_as(&app, username, &format!("/proposals/{code}")).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{username} {code}");
            assert_eq!(body["error"]["code"], "PERMISSION_DENIED");
        }
        let (status, _) = get_as(&app, "astronomer", &format!("/proposals/{code}")).await;
        assert_eq!(status, StatusCode::OK, "{code}");
    }

    let (status, _) = get_as(&app, "pi", "/proposals/2021-1-DDT-001").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_board_member_denied_science() {
    let app = app().await;
    let (status, _) = get_as(&app, "board", "/proposals/2021-1-SCI-001").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_gravitational_wave_visibility() {
    let app = app().await;
    for username in ["uksc", "board", "ru-chair", "pi"] {
        let (status, _) = get_as(&app, username, "/proposals/2021-2-GWE-001").await;
        assert_eq!(status, StatusCode::OK, "{username}");
    }
    let (status, _) = get_as(&app, "other", "/proposals/2021-2-GWE-001").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = get_as(&app, "uksc", "/proposals?from=2021-2&to=2021-2").await;
    assert_eq!(codes(&body), BTreeSet::from(["2021-2-GWE-001".to_string()]));

    let (_, body) = get_as(&app, "ru-chair", "/proposals?from=2021-2&to=2021-2").await;
    assert_eq!(
        codes(&body),
        BTreeSet::from(["2021-2-GWE-001".to_string(), "2021-2-SCI-001".to_string()])
    );

    let (_, body) = get_as(&app, "other", "/proposals?from=2021-2&to=2021-2").await;
    assert!(codes(&body).is_empty());

    let (status, _) = get_as(&app, "uksc", "/block-visits/7").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get_as(&app, "other", "/block-visits/7").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_proposal_is_not_found_for_everyone() {
    let app = app().await;
    for username in ["astronomer", "board", "other"] {
        let (status, _) = get_as(&app, username, "/proposals/2019-1-SCI-999").await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{username}");
    }

    let (status, _) = get_as(&app, "astronomer", "/proposals/not-a-code").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_deleted_proposal_is_not_found() {
    let app = app().await;
    for uri in [
        "/proposals/2021-1-SCI-006",
        "/proposals/2021-1-SCI-006/status",
        "/proposals/2021-1-SCI-006/observation-comments",
    ] {
        let (status, _) = get_as(&app, "admin", uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn test_observation_comments() {
    let app = app().await;
    let uri = "/proposals/2021-1-SCI-001/observation-comments";

    let (status, body) = get_as(&app, "investigator", uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["author"], "Sipho Mokoena");
    assert_eq!(body[0]["comment_date"], "2021-05-11");

    let (status, _) = get_as(&app, "ru-chair", uri).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get_as(&app, "board", uri).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = post_as(&app, "investigator", uri, json!({ "comment": "Seeing was poor." })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["author"], "Ivan Coi");
    assert_eq!(body["comment"], "Seeing was poor.");

    let (_, body) = get_as(&app, "pi", uri).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = post_as(&app, "ru-chair", uri, json!({ "comment": "Looks fine." })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = post_as(&app, "astronomer", uri, json!({ "comment": "  " })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(message(&body).contains("comment"));

    let (status, _) = post_as(
        &app,
        "astronomer",
        "/proposals/2019-1-SCI-999/observation-comments",
        json!({ "comment": "Hello" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_salt_astronomers() {
    let app = app().await;

    let (status, _, _) = send(&app, Request::get("/salt-astronomers").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = get_as(&app, "other", "/salt-astronomers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["family_name"], "Mokoena");
    assert_eq!(body[0]["email"], "sipho@salt.example.org");
}

#[tokio::test]
async fn test_proposal_status_changes() {
    let app = app().await;

    let (status, body) = get_as(&app, "pi", "/proposals/2021-1-SCI-002/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "Inactive");
    assert_eq!(body["reason"], "Waiting for the PI");

    // SCI-001은 PI가 직접 활성화할 수 없음
    let (status, _) = put_as(&app, "pi", "/proposals/2021-1-SCI-001/status", json!({ "value": "Active" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = put_as(&app, "pi", "/proposals/2021-1-SCI-002/status", json!({ "value": "Active" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "Active");

    let (status, _) = put_as(&app, "pi", "/proposals/2021-1-SCI-001/status", json!({ "value": "Inactive" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = put_as(&app, "pi", "/proposals/2021-1-SCI-001/status", json!({ "value": "Completed" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = put_as(&app, "astronomer", "/proposals/2021-1-SCI-001/status", json!({ "value": "Completed" })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_as(&app, "pi", "/proposals/2021-1-SCI-001/status").await;
    assert_eq!(body["value"], "Completed");

    let (status, _) = put_as(&app, "astronomer", "/proposals/2021-1-SCI-001/status", json!({ "value": "Finished" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ─────────────────────────────────────────────────────────────────────────────
// Blocks & Block visits
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_block_access() {
    let app = app().await;

    let (status, body) = get_as(&app, "investigator", "/blocks/1").await;
    assert_eq!(status, StatusCode::OK);
    let visit_ids: Vec<i64> = body["visits"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_i64().unwrap())
        .collect();
    assert_eq!(visit_ids, vec![1, 2, 3]);

    let (status, _) = get_as(&app, "board", "/blocks/1").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get_as(&app, "board", "/blocks/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get_as(&app, "ru-chair", "/blocks/2/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "Active");
}

#[tokio::test]
async fn test_block_status_update() {
    let app = app().await;
    let payload = json!({ "value": "On hold", "reason": "Instrument maintenance" });

    let (status, _) = put_as(&app, "pi", "/blocks/1/status", payload.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = put_as(&app, "astronomer", "/blocks/1/status", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "On hold");

    let (_, body) = get_as(&app, "pi", "/blocks/1/status").await;
    assert_eq!(body["reason"], "Instrument maintenance");
}

#[tokio::test]
async fn test_missing_block_visit_is_not_found() {
    let app = app().await;
    for username in ["astronomer", "admin", "board", "pi"] {
        for uri in [
            "/blocks/1/visits/0",
            "/blocks/1/visits/0/status",
            "/block-visits/0",
            "/block-visits/0/status",
        ] {
            let (status, _) = get_as(&app, username, uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{username} {uri}");
        }
    }
}

#[tokio::test]
async fn test_deleted_and_mismatched_visits_are_not_found() {
    let app = app().await;

    let (status, _) = get_as(&app, "astronomer", "/block-visits/4").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_as(&app, "astronomer", "/blocks/2/visits/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_as(&app, "astronomer", "/blocks/1/visits/1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_block_visit_views() {
    let app = app().await;

    let (status, body) = get_as(&app, "investigator", "/block-visits/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Rejected");
    assert_eq!(body["rejection_reason"], "Observing conditions not met");
    assert_eq!(body["night"], "2021-05-12");

    let (status, body) = get_as(&app, "ru-chair", "/blocks/1/visits/1/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Accepted");

    let (status, _) = get_as(&app, "board", "/block-visits/6").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get_as(&app, "ru-chair", "/block-visits/6").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_block_visit_status_update() {
    let app = app().await;
    let payload = json!({ "status": "Rejected", "rejection_reason": "Telescope technical problems" });

    let (status, _) = put_as(&app, "pi", "/block-visits/3/status", payload.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = put_as(&app, "astronomer", "/blocks/2/visits/3/status", payload.clone()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = put_as(&app, "astronomer", "/blocks/1/visits/3/status", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Rejected");

    let (_, body) = get_as(&app, "pi", "/block-visits/3/status").await;
    assert_eq!(body["status"], "Rejected");
    assert_eq!(body["rejection_reason"], "Telescope technical problems");

    let (status, _) = put_as(&app, "astronomer", "/block-visits/3/status", json!({ "status": "Deleted" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
