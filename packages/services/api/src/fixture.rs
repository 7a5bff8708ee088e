//! YAML fixture
//!
//! 개발/테스트용 초기 데이터 형식입니다. `SALT_API_SEED_FILE`로 지정하면 시작 시 적재됩니다.
//!
//! ```yaml
//! users:
//!   - id: 1
//!     username: astronomer
//!     password: secret
//!     given_name: Sam
//!     family_name: Nkosi
//!     email: sam@example.org
//!     roles: [SALT Astronomer]
//!     affiliations: [RSA]
//! proposals:
//!   - code: 2021-1-SCI-001
//!     type: Science
//!     title: Dusty winds
//!     status: Active
//!     principal_investigator: 1
//!     principal_contact: 1
//!     submissions:
//!       - id: 1
//!         semester: 2021-1
//!         time_requests: { RSA: 100 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use salt_core::block::{BlockStatus, RejectionReason};
use salt_core::permissions::TacRole;
use salt_core::proposal::{Partner, ProposalCode, ProposalStatus, ProposalType};
use salt_core::semester::Semester;
use salt_core::user::GlobalRole;

/// 전체 fixture
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub users: Vec<UserFixture>,

    #[serde(default)]
    pub proposals: Vec<ProposalFixture>,
}

impl Fixture {
    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserFixture {
    pub id: i64,
    pub username: String,

    /// 평문 (적재 시 해시)
    pub password: String,
    pub given_name: String,
    pub family_name: String,
    pub email: String,

    #[serde(default)]
    pub roles: Vec<GlobalRole>,

    #[serde(default)]
    pub affiliations: Vec<Partner>,

    #[serde(default)]
    pub tac: Vec<TacFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TacFixture {
    pub partner: Partner,
    pub role: TacRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProposalFixture {
    pub code: ProposalCode,

    #[serde(rename = "type")]
    pub proposal_type: ProposalType,
    pub title: String,
    pub status: ProposalStatus,

    #[serde(default)]
    pub status_reason: Option<String>,

    #[serde(default = "default_phase")]
    pub phase: i64,

    #[serde(default)]
    pub self_activable: bool,

    /// 사용자 ID
    pub principal_investigator: i64,
    pub principal_contact: i64,

    #[serde(default)]
    pub liaison_astronomer: Option<i64>,

    /// PI/PC 외 추가 Investigator
    #[serde(default)]
    pub investigators: Vec<i64>,

    pub submissions: Vec<SubmissionFixture>,

    #[serde(default)]
    pub blocks: Vec<BlockFixture>,

    #[serde(default)]
    pub observation_comments: Vec<CommentFixture>,
}

fn default_phase() -> i64 {
    2
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionFixture {
    pub id: i64,
    pub semester: Semester,

    /// 파트너별 요청 비율 (%)
    #[serde(default)]
    pub time_requests: BTreeMap<Partner, f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockFixture {
    pub id: i64,
    pub name: String,
    pub semester: Semester,

    #[serde(default = "default_block_status")]
    pub status: BlockStatus,

    #[serde(default)]
    pub status_reason: Option<String>,

    #[serde(default)]
    pub observation_time: i64,

    #[serde(default = "default_priority")]
    pub priority: i64,

    #[serde(default)]
    pub visits: Vec<VisitFixture>,
}

fn default_block_status() -> BlockStatus {
    BlockStatus::Active
}

fn default_priority() -> i64 {
    2
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisitFixture {
    pub id: i64,
    pub night: NaiveDate,

    /// `Accepted`, `In queue`, `Rejected` 또는 `Deleted`
    pub status: String,

    #[serde(default)]
    pub rejection_reason: Option<RejectionReason>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentFixture {
    pub id: i64,

    /// 작성자 사용자 ID
    pub author: i64,
    pub comment: String,
    pub date: NaiveDate,
}
