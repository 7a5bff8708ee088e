//! SALT DB (SQLite)
//!
//! 스키마 생성, 주체(Principal) 조회, 제안서/블록/블록 방문 조회 및 상태 변경을 담당합니다.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use salt_core::auth::hash_password;
use salt_core::block::{
    Block, BlockStatusInfo, BlockSummary, BlockVisit, BlockVisitStatus, BlockVisitStatusInfo,
};
use salt_core::permissions::{ListCandidate, Principal, ProposalRole, ProposalTarget, TacRole};
use salt_core::proposal::{
    ObservationComment, Partner, Person, Proposal, ProposalCode, ProposalListItem,
    ProposalStatusInfo, TimeRequest,
};
use salt_core::semester::SemesterRange;
use salt_core::user::{GlobalRole, User};

use crate::error::{ApiError, Result};
use crate::fixture::Fixture;

/// 삭제된 블록 방문의 상태 값 (API에는 노출되지 않음)
pub const DELETED_VISIT_STATUS: &str = "Deleted";

#[derive(Clone)]
pub struct SaltDb {
    pool: SqlitePool,
}

impl SaltDb {
    /// 연결 후 스키마 생성
    ///
    /// 인메모리 DB는 연결마다 별도 DB가 되므로 연결 하나를 계속 유지합니다.
    pub async fn connect(db_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);

        let pool = if db_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect_with(options)
                .await?
        };

        let db = Self { pool };
        db.init().await?;
        Ok(db)
    }

    async fn init(&self) -> anyhow::Result<()> {
        let queries = [
            r#"CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                given_name TEXT NOT NULL,
                family_name TEXT NOT NULL,
                email TEXT NOT NULL
            );"#,
            r#"CREATE TABLE IF NOT EXISTS user_roles (
                user_id INTEGER NOT NULL,
                role TEXT NOT NULL,
                PRIMARY KEY (user_id, role)
            );"#,
            r#"CREATE TABLE IF NOT EXISTS user_affiliations (
                user_id INTEGER NOT NULL,
                partner TEXT NOT NULL,
                PRIMARY KEY (user_id, partner)
            );"#,
            r#"CREATE TABLE IF NOT EXISTS tac_members (
                user_id INTEGER NOT NULL,
                partner TEXT NOT NULL,
                is_chair INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (user_id, partner)
            );"#,
            r#"CREATE TABLE IF NOT EXISTS proposals (
                code TEXT PRIMARY KEY,
                proposal_type TEXT NOT NULL,
                title TEXT NOT NULL,
                status TEXT NOT NULL,
                status_reason TEXT,
                phase INTEGER NOT NULL,
                self_activable INTEGER NOT NULL DEFAULT 0,
                pi_id INTEGER NOT NULL,
                pc_id INTEGER NOT NULL,
                liaison_id INTEGER
            );"#,
            r#"CREATE TABLE IF NOT EXISTS proposal_investigators (
                proposal_code TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                PRIMARY KEY (proposal_code, user_id)
            );"#,
            r#"CREATE TABLE IF NOT EXISTS submissions (
                id INTEGER PRIMARY KEY,
                proposal_code TEXT NOT NULL,
                semester TEXT NOT NULL,
                UNIQUE(proposal_code, semester)
            );"#,
            r#"CREATE TABLE IF NOT EXISTS time_requests (
                proposal_code TEXT NOT NULL,
                semester TEXT NOT NULL,
                partner TEXT NOT NULL,
                percentage REAL NOT NULL,
                PRIMARY KEY (proposal_code, semester, partner)
            );"#,
            r#"CREATE TABLE IF NOT EXISTS blocks (
                id INTEGER PRIMARY KEY,
                proposal_code TEXT NOT NULL,
                name TEXT NOT NULL,
                semester TEXT NOT NULL,
                status TEXT NOT NULL,
                status_reason TEXT,
                observation_time INTEGER NOT NULL DEFAULT 0,
                priority INTEGER NOT NULL DEFAULT 2
            );"#,
            r#"CREATE TABLE IF NOT EXISTS observation_comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                proposal_code TEXT NOT NULL,
                author_id INTEGER NOT NULL,
                comment TEXT NOT NULL,
                comment_date TEXT NOT NULL
            );"#,
            r#"CREATE TABLE IF NOT EXISTS block_visits (
                id INTEGER PRIMARY KEY,
                block_id INTEGER NOT NULL,
                night TEXT NOT NULL,
                status TEXT NOT NULL,
                rejection_reason TEXT
            );"#,
        ];

        for q in queries {
            sqlx::query(q).execute(&self.pool).await?;
        }

        Ok(())
    }

    /// 연결 확인
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Seeding
    // ─────────────────────────────────────────────────────────────────────────────

    /// fixture 적재 (단일 트랜잭션)
    pub async fn seed(&self, fixture: &Fixture) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        for user in &fixture.users {
            sqlx::query(
                r#"INSERT OR REPLACE INTO users (id, username, password_hash, given_name, family_name, email)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            )
            .bind(user.id)
            .bind(&user.username)
            .bind(hash_password(&user.password))
            .bind(&user.given_name)
            .bind(&user.family_name)
            .bind(&user.email)
            .execute(&mut *tx)
            .await?;

            for role in &user.roles {
                sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?1, ?2)")
                    .bind(user.id)
                    .bind(role.as_str())
                    .execute(&mut *tx)
                    .await?;
            }
            for partner in &user.affiliations {
                sqlx::query("INSERT OR IGNORE INTO user_affiliations (user_id, partner) VALUES (?1, ?2)")
                    .bind(user.id)
                    .bind(partner.as_str())
                    .execute(&mut *tx)
                    .await?;
            }
            for tac in &user.tac {
                sqlx::query(
                    "INSERT OR REPLACE INTO tac_members (user_id, partner, is_chair) VALUES (?1, ?2, ?3)",
                )
                .bind(user.id)
                .bind(tac.partner.as_str())
                .bind(tac.role == TacRole::Chair)
                .execute(&mut *tx)
                .await?;
            }
        }

        for proposal in &fixture.proposals {
            let code = proposal.code.as_str();
            sqlx::query(
                r#"INSERT OR REPLACE INTO proposals
                   (code, proposal_type, title, status, status_reason, phase, self_activable, pi_id, pc_id, liaison_id)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
            )
            .bind(code)
            .bind(proposal.proposal_type.as_str())
            .bind(&proposal.title)
            .bind(proposal.status.as_str())
            .bind(&proposal.status_reason)
            .bind(proposal.phase)
            .bind(proposal.self_activable)
            .bind(proposal.principal_investigator)
            .bind(proposal.principal_contact)
            .bind(proposal.liaison_astronomer)
            .execute(&mut *tx)
            .await?;

            for user_id in &proposal.investigators {
                sqlx::query(
                    "INSERT OR IGNORE INTO proposal_investigators (proposal_code, user_id) VALUES (?1, ?2)",
                )
                .bind(code)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            }

            for submission in &proposal.submissions {
                let semester = submission.semester.to_string();
                sqlx::query(
                    "INSERT OR REPLACE INTO submissions (id, proposal_code, semester) VALUES (?1, ?2, ?3)",
                )
                .bind(submission.id)
                .bind(code)
                .bind(&semester)
                .execute(&mut *tx)
                .await?;

                for (partner, percentage) in &submission.time_requests {
                    sqlx::query(
                        r#"INSERT OR REPLACE INTO time_requests (proposal_code, semester, partner, percentage)
                           VALUES (?1, ?2, ?3, ?4)"#,
                    )
                    .bind(code)
                    .bind(&semester)
                    .bind(partner.as_str())
                    .bind(percentage)
                    .execute(&mut *tx)
                    .await?;
                }
            }

            for comment in &proposal.observation_comments {
                sqlx::query(
                    r#"INSERT OR REPLACE INTO observation_comments (id, proposal_code, author_id, comment, comment_date)
                       VALUES (?1, ?2, ?3, ?4, ?5)"#,
                )
                .bind(comment.id)
                .bind(code)
                .bind(comment.author)
                .bind(&comment.comment)
                .bind(comment.date.to_string())
                .execute(&mut *tx)
                .await?;
            }

            for block in &proposal.blocks {
                sqlx::query(
                    r#"INSERT OR REPLACE INTO blocks
                       (id, proposal_code, name, semester, status, status_reason, observation_time, priority)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
                )
                .bind(block.id)
                .bind(code)
                .bind(&block.name)
                .bind(block.semester.to_string())
                .bind(block.status.as_str())
                .bind(&block.status_reason)
                .bind(block.observation_time)
                .bind(block.priority)
                .execute(&mut *tx)
                .await?;

                for visit in &block.visits {
                    if visit.status != DELETED_VISIT_STATUS {
                        visit.status.parse::<BlockVisitStatus>()?;
                    }
                    sqlx::query(
                        r#"INSERT OR REPLACE INTO block_visits (id, block_id, night, status, rejection_reason)
                           VALUES (?1, ?2, ?3, ?4, ?5)"#,
                    )
                    .bind(visit.id)
                    .bind(block.id)
                    .bind(visit.night.to_string())
                    .bind(&visit.status)
                    .bind(visit.rejection_reason.map(|r| r.as_str()))
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Users & Principals
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT id, username, password_hash, given_name, family_name, email
               FROM users WHERE username = ?1"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// 사용자 공개 정보
    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT id, username, password_hash, given_name, family_name, email
               FROM users WHERE id = ?1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let affiliations = self.affiliations(row.id).await?;
        Ok(Some(User {
            id: row.id,
            username: row.username,
            given_name: row.given_name,
            family_name: row.family_name,
            email: row.email,
            affiliations,
        }))
    }

    async fn affiliations(&self, user_id: i64) -> Result<Vec<Partner>> {
        let partners: Vec<String> = sqlx::query_scalar(
            "SELECT partner FROM user_affiliations WHERE user_id = ?1 ORDER BY partner",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        partners.iter().map(|p| decode(p, "partner")).collect()
    }

    /// 사용자 이름으로 요청 주체 조회 (역할, 소속, 제안서 역할 포함)
    pub async fn principal(&self, username: &str) -> Result<Option<Principal>> {
        let Some(user) = self.get_user_by_username(username).await? else {
            return Ok(None);
        };

        let mut principal = Principal::new(user.id, &user.username);

        let roles: Vec<String> = sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = ?1")
            .bind(user.id)
            .fetch_all(&self.pool)
            .await?;
        for role in &roles {
            principal = principal.with_global_role(decode(role, "user role")?);
        }

        for partner in self.affiliations(user.id).await? {
            principal = principal.with_affiliation(partner);
        }

        let tac: Vec<(String, bool)> =
            sqlx::query_as("SELECT partner, is_chair FROM tac_members WHERE user_id = ?1")
                .bind(user.id)
                .fetch_all(&self.pool)
                .await?;
        for (partner, is_chair) in &tac {
            let role = if *is_chair { TacRole::Chair } else { TacRole::Member };
            principal = principal.with_tac_role(decode(partner, "partner")?, role);
        }

        let owned: Vec<(String, i64, i64)> =
            sqlx::query_as("SELECT code, pi_id, pc_id FROM proposals WHERE pi_id = ?1 OR pc_id = ?1")
                .bind(user.id)
                .fetch_all(&self.pool)
                .await?;
        for (code, pi_id, pc_id) in &owned {
            let code: ProposalCode = decode(code, "proposal code")?;
            if *pi_id == user.id {
                principal = principal.with_proposal_role(code.clone(), ProposalRole::PrincipalInvestigator);
            }
            if *pc_id == user.id {
                principal = principal.with_proposal_role(code, ProposalRole::PrincipalContact);
            }
        }

        let investigated: Vec<String> = sqlx::query_scalar(
            "SELECT proposal_code FROM proposal_investigators WHERE user_id = ?1",
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;
        for code in &investigated {
            principal = principal.with_proposal_role(decode(code, "proposal code")?, ProposalRole::Investigator);
        }

        Ok(Some(principal))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Proposals
    // ─────────────────────────────────────────────────────────────────────────────

    /// 권한 판단용 제안서 정보 (모든 학기의 요청 파트너 합집합)
    pub async fn get_proposal_target(&self, code: &ProposalCode) -> Result<Option<ProposalTarget>> {
        let row: Option<(String, bool)> = sqlx::query_as(
            "SELECT proposal_type, self_activable FROM proposals WHERE code = ?1 AND status != 'Deleted'",
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some((proposal_type, self_activable)) = row else {
            return Ok(None);
        };

        let partners: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT partner FROM time_requests WHERE proposal_code = ?1 AND percentage > 0",
        )
        .bind(code.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(ProposalTarget {
            code: code.clone(),
            proposal_type: decode(&proposal_type, "proposal type")?,
            partners: partners
                .iter()
                .map(|p| decode(p, "partner"))
                .collect::<Result<BTreeSet<Partner>>>()?,
            self_activable,
        }))
    }

    /// 학기 범위 안의 목록 후보 (최신 제출순)
    pub async fn list_candidates(&self, range: &SemesterRange) -> Result<Vec<ListCandidate>> {
        let from = range.from.to_string();
        let to = range.to.to_string();

        let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
            r#"SELECT s.id AS submission_id, s.semester AS submission_semester, {PROPOSAL_COLUMNS}
               FROM submissions s
               JOIN proposals p ON p.code = s.proposal_code
               {PERSON_JOINS}
               WHERE s.semester BETWEEN ?1 AND ?2 AND p.status != 'Deleted'
               ORDER BY s.id DESC"#
        ))
        .bind(&from)
        .bind(&to)
        .fetch_all(&self.pool)
        .await?;

        let requests: Vec<(String, String, String)> = sqlx::query_as(
            r#"SELECT proposal_code, semester, partner FROM time_requests
               WHERE percentage > 0 AND semester BETWEEN ?1 AND ?2"#,
        )
        .bind(&from)
        .bind(&to)
        .fetch_all(&self.pool)
        .await?;

        let mut partners: BTreeMap<(String, String), BTreeSet<Partner>> = BTreeMap::new();
        for (code, semester, partner) in &requests {
            partners
                .entry((code.clone(), semester.clone()))
                .or_default()
                .insert(decode(partner, "partner")?);
        }

        rows.into_iter()
            .map(|row| {
                let key = (row.proposal.code.clone(), row.submission_semester.clone());
                let item = row.into_list_item()?;
                Ok(ListCandidate {
                    item,
                    partners: partners.get(&key).cloned().unwrap_or_default(),
                })
            })
            .collect()
    }

    /// 제안서 상세
    pub async fn get_proposal(&self, code: &ProposalCode) -> Result<Option<Proposal>> {
        let row = sqlx::query_as::<_, ProposalRow>(&format!(
            r#"SELECT {PROPOSAL_COLUMNS}
               FROM proposals p
               {PERSON_JOINS}
               WHERE p.code = ?1 AND p.status != 'Deleted'"#
        ))
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let semesters: Vec<String> = sqlx::query_scalar(
            "SELECT semester FROM submissions WHERE proposal_code = ?1 ORDER BY semester",
        )
        .bind(code.as_str())
        .fetch_all(&self.pool)
        .await?;

        let investigators = sqlx::query_as::<_, PersonRow>(
            r#"SELECT u.given_name, u.family_name, u.email
               FROM users u
               WHERE u.id IN (
                   SELECT user_id FROM proposal_investigators WHERE proposal_code = ?1
                   UNION SELECT pi_id FROM proposals WHERE code = ?1
                   UNION SELECT pc_id FROM proposals WHERE code = ?1
               )
               ORDER BY u.family_name, u.given_name"#,
        )
        .bind(code.as_str())
        .fetch_all(&self.pool)
        .await?;

        let time_requests: Vec<(String, String, f64)> = sqlx::query_as(
            r#"SELECT semester, partner, percentage FROM time_requests
               WHERE proposal_code = ?1 ORDER BY semester, partner"#,
        )
        .bind(code.as_str())
        .fetch_all(&self.pool)
        .await?;

        let blocks = sqlx::query_as::<_, BlockRow>(
            r#"SELECT id, proposal_code, name, semester, status, status_reason, observation_time, priority
               FROM blocks WHERE proposal_code = ?1 AND status != 'Deleted' ORDER BY id"#,
        )
        .bind(code.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Proposal {
            proposal_code: decode(&row.code, "proposal code")?,
            proposal_type: decode(&row.proposal_type, "proposal type")?,
            title: row.title.clone(),
            semesters: semesters
                .iter()
                .map(|s| decode(s, "semester"))
                .collect::<Result<_>>()?,
            status: row.status()?,
            principal_investigator: row.principal_investigator(),
            principal_contact: row.principal_contact(),
            liaison_astronomer: row.liaison_astronomer(),
            investigators: investigators.into_iter().map(PersonRow::into_person).collect(),
            time_requests: time_requests
                .iter()
                .map(|(semester, partner, percentage)| {
                    Ok(TimeRequest {
                        semester: decode(semester, "semester")?,
                        partner: decode(partner, "partner")?,
                        percentage: *percentage,
                    })
                })
                .collect::<Result<_>>()?,
            self_activable: row.self_activable,
            blocks: blocks
                .into_iter()
                .map(BlockRow::into_summary)
                .collect::<Result<_>>()?,
        }))
    }

    pub async fn get_proposal_status(&self, code: &ProposalCode) -> Result<Option<ProposalStatusInfo>> {
        let row: Option<(String, Option<String>)> =
            sqlx::query_as(
                "SELECT status, status_reason FROM proposals WHERE code = ?1 AND status != 'Deleted'",
            )
                .bind(code.as_str())
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(status, reason)| {
            Ok(ProposalStatusInfo {
                value: decode(&status, "proposal status")?,
                reason,
            })
        })
        .transpose()
    }

    pub async fn update_proposal_status(
        &self,
        code: &ProposalCode,
        status: &ProposalStatusInfo,
    ) -> Result<()> {
        sqlx::query("UPDATE proposals SET status = ?1, status_reason = ?2 WHERE code = ?3")
            .bind(status.value.as_str())
            .bind(&status.reason)
            .bind(code.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// 관측 코멘트 (작성일, ID 순)
    pub async fn get_observation_comments(
        &self,
        code: &ProposalCode,
    ) -> Result<Vec<ObservationComment>> {
        let rows = sqlx::query_as::<_, ObservationCommentRow>(
            r#"SELECT c.id, u.given_name, u.family_name, c.comment, c.comment_date
               FROM observation_comments c
               JOIN users u ON u.id = c.author_id
               WHERE c.proposal_code = ?1
               ORDER BY c.comment_date, c.id"#,
        )
        .bind(code.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ObservationCommentRow::into_comment).collect()
    }

    /// 관측 코멘트 추가 후 저장된 코멘트 반환
    pub async fn add_observation_comment(
        &self,
        code: &ProposalCode,
        author_id: i64,
        comment: &str,
        comment_date: NaiveDate,
    ) -> Result<ObservationComment> {
        let id = sqlx::query(
            r#"INSERT INTO observation_comments (proposal_code, author_id, comment, comment_date)
               VALUES (?1, ?2, ?3, ?4)"#,
        )
        .bind(code.as_str())
        .bind(author_id)
        .bind(comment)
        .bind(comment_date.to_string())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        let row = sqlx::query_as::<_, ObservationCommentRow>(
            r#"SELECT c.id, u.given_name, u.family_name, c.comment, c.comment_date
               FROM observation_comments c
               JOIN users u ON u.id = c.author_id
               WHERE c.id = ?1"#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        row.into_comment()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // SALT Astronomers
    // ─────────────────────────────────────────────────────────────────────────────

    /// SALT Astronomer 역할을 가진 사용자 연락처
    pub async fn list_salt_astronomers(&self) -> Result<Vec<Person>> {
        let rows = sqlx::query_as::<_, PersonRow>(
            r#"SELECT u.given_name, u.family_name, u.email
               FROM users u
               JOIN user_roles r ON r.user_id = u.id
               WHERE r.role = ?1
               ORDER BY u.family_name, u.given_name"#,
        )
        .bind(GlobalRole::SaltAstronomer.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PersonRow::into_person).collect())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Blocks & Block Visits
    // ─────────────────────────────────────────────────────────────────────────────

    /// 블록 (삭제되지 않은 방문 포함)
    pub async fn get_block(&self, block_id: i64) -> Result<Option<Block>> {
        let row = sqlx::query_as::<_, BlockRow>(
            r#"SELECT id, proposal_code, name, semester, status, status_reason, observation_time, priority
               FROM blocks WHERE id = ?1"#,
        )
        .bind(block_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let visits = sqlx::query_as::<_, BlockVisitRow>(
            r#"SELECT v.id, v.block_id, v.night, v.status, v.rejection_reason, b.proposal_code
               FROM block_visits v JOIN blocks b ON b.id = v.block_id
               WHERE v.block_id = ?1 AND v.status != ?2
               ORDER BY v.night, v.id"#,
        )
        .bind(block_id)
        .bind(DELETED_VISIT_STATUS)
        .fetch_all(&self.pool)
        .await?;

        let visits = visits
            .into_iter()
            .map(|v| v.into_visit())
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(row.into_block(visits)?))
    }

    pub async fn update_block_status(&self, block_id: i64, status: &BlockStatusInfo) -> Result<()> {
        sqlx::query("UPDATE blocks SET status = ?1, status_reason = ?2 WHERE id = ?3")
            .bind(status.value.as_str())
            .bind(&status.reason)
            .bind(block_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// 블록 방문과 소속 제안서 코드 (삭제된 방문은 없는 것으로 취급)
    pub async fn get_block_visit(&self, visit_id: i64) -> Result<Option<(BlockVisit, ProposalCode)>> {
        let row = sqlx::query_as::<_, BlockVisitRow>(
            r#"SELECT v.id, v.block_id, v.night, v.status, v.rejection_reason, b.proposal_code
               FROM block_visits v JOIN blocks b ON b.id = v.block_id
               WHERE v.id = ?1 AND v.status != ?2"#,
        )
        .bind(visit_id)
        .bind(DELETED_VISIT_STATUS)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let code = decode(&row.proposal_code, "proposal code")?;
        Ok(Some((row.into_visit()?, code)))
    }

    pub async fn update_block_visit_status(
        &self,
        visit_id: i64,
        status: &BlockVisitStatusInfo,
    ) -> Result<()> {
        sqlx::query("UPDATE block_visits SET status = ?1, rejection_reason = ?2 WHERE id = ?3")
            .bind(status.status.as_str())
            .bind(status.rejection_reason.map(|r| r.as_str()))
            .bind(visit_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// DB 문자열을 도메인 타입으로 변환
fn decode<T: FromStr>(value: &str, what: &str) -> Result<T> {
    value.parse().map_err(|_| ApiError::corrupt(what, value))
}

const PROPOSAL_COLUMNS: &str = r#"p.code, p.proposal_type, p.title, p.status, p.status_reason, p.phase, p.self_activable,
       pi.given_name AS pi_given_name, pi.family_name AS pi_family_name, pi.email AS pi_email,
       pc.given_name AS pc_given_name, pc.family_name AS pc_family_name, pc.email AS pc_email,
       la.given_name AS la_given_name, la.family_name AS la_family_name, la.email AS la_email"#;

const PERSON_JOINS: &str = r#"JOIN users pi ON pi.id = p.pi_id
               JOIN users pc ON pc.id = p.pc_id
               LEFT JOIN users la ON la.id = p.liaison_id"#;

// ─────────────────────────────────────────────────────────────────────────────
// Rows
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub given_name: String,
    pub family_name: String,
    pub email: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct PersonRow {
    given_name: String,
    family_name: String,
    email: String,
}

impl PersonRow {
    fn into_person(self) -> Person {
        Person {
            given_name: self.given_name,
            family_name: self.family_name,
            email: Some(self.email),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ProposalRow {
    code: String,
    proposal_type: String,
    title: String,
    status: String,
    status_reason: Option<String>,
    phase: i64,
    self_activable: bool,
    pi_given_name: String,
    pi_family_name: String,
    pi_email: String,
    pc_given_name: String,
    pc_family_name: String,
    pc_email: String,
    la_given_name: Option<String>,
    la_family_name: Option<String>,
    la_email: Option<String>,
}

impl ProposalRow {
    fn status(&self) -> Result<ProposalStatusInfo> {
        Ok(ProposalStatusInfo {
            value: decode(&self.status, "proposal status")?,
            reason: self.status_reason.clone(),
        })
    }

    fn principal_investigator(&self) -> Person {
        Person {
            given_name: self.pi_given_name.clone(),
            family_name: self.pi_family_name.clone(),
            email: Some(self.pi_email.clone()),
        }
    }

    fn principal_contact(&self) -> Person {
        Person {
            given_name: self.pc_given_name.clone(),
            family_name: self.pc_family_name.clone(),
            email: Some(self.pc_email.clone()),
        }
    }

    fn liaison_astronomer(&self) -> Option<Person> {
        Some(Person {
            given_name: self.la_given_name.clone()?,
            family_name: self.la_family_name.clone()?,
            email: self.la_email.clone(),
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SubmissionRow {
    submission_id: i64,
    submission_semester: String,
    #[sqlx(flatten)]
    proposal: ProposalRow,
}

impl SubmissionRow {
    fn into_list_item(self) -> Result<ProposalListItem> {
        Ok(ProposalListItem {
            id: self.submission_id,
            proposal_code: decode(&self.proposal.code, "proposal code")?,
            semester: decode(&self.submission_semester, "semester")?,
            title: self.proposal.title.clone(),
            phase: self.proposal.phase,
            status: self.proposal.status()?,
            proposal_type: decode(&self.proposal.proposal_type, "proposal type")?,
            principal_investigator: self.proposal.principal_investigator(),
            principal_contact: self.proposal.principal_contact(),
            liaison_astronomer: self.proposal.liaison_astronomer(),
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct BlockRow {
    id: i64,
    proposal_code: String,
    name: String,
    semester: String,
    status: String,
    status_reason: Option<String>,
    observation_time: i64,
    priority: i64,
}

impl BlockRow {
    fn status(&self) -> Result<BlockStatusInfo> {
        Ok(BlockStatusInfo {
            value: decode(&self.status, "block status")?,
            reason: self.status_reason.clone(),
        })
    }

    fn into_summary(self) -> Result<BlockSummary> {
        Ok(BlockSummary {
            id: self.id,
            status: self.status()?,
            semester: decode(&self.semester, "semester")?,
            name: self.name,
        })
    }

    fn into_block(self, visits: Vec<BlockVisit>) -> Result<Block> {
        Ok(Block {
            id: self.id,
            proposal_code: decode(&self.proposal_code, "proposal code")?,
            status: self.status()?,
            semester: decode(&self.semester, "semester")?,
            name: self.name,
            observation_time: self.observation_time,
            priority: self.priority,
            visits,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ObservationCommentRow {
    id: i64,
    given_name: String,
    family_name: String,
    comment: String,
    comment_date: String,
}

impl ObservationCommentRow {
    fn into_comment(self) -> Result<ObservationComment> {
        let comment_date = NaiveDate::parse_from_str(&self.comment_date, "%Y-%m-%d")
            .map_err(|_| ApiError::corrupt("comment date", &self.comment_date))?;
        Ok(ObservationComment {
            id: self.id,
            author: format!("{} {}", self.given_name, self.family_name),
            comment: self.comment,
            comment_date,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct BlockVisitRow {
    id: i64,
    block_id: i64,
    night: String,
    status: String,
    rejection_reason: Option<String>,
    proposal_code: String,
}

impl BlockVisitRow {
    fn into_visit(self) -> Result<BlockVisit> {
        let night = NaiveDate::parse_from_str(&self.night, "%Y-%m-%d")
            .map_err(|_| ApiError::corrupt("block visit night", &self.night))?;
        Ok(BlockVisit {
            id: self.id,
            block_id: self.block_id,
            night,
            status: decode(&self.status, "block visit status")?,
            rejection_reason: self
                .rejection_reason
                .as_deref()
                .map(|r| decode(r, "rejection reason"))
                .transpose()?,
        })
    }
}
