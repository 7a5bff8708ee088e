//! 제안서(Proposal) 도메인 타입
//!
//! 제안서 코드, 유형, 상태, 파트너와 API 응답 구조를 정의합니다.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::block::BlockSummary;
use crate::error::{Error, Result};
use crate::semester::Semester;

static PROPOSAL_CODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^20\d{2}-[12]-[A-Z][A-Z_]*[A-Z]-\d{3}$").expect("valid proposal code regex")
});

/// 제안서 코드 (예: `2021-2-SCI-017`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ProposalCode(String);

impl ProposalCode {
    /// 내부 값 참조
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProposalCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if PROPOSAL_CODE_PATTERN.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(Error::validation(format!(
                "Invalid proposal code: {:?}. Expected a code such as 2021-2-SCI-017.",
                s
            )))
        }
    }
}

impl<'de> Deserialize<'de> for ProposalCode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for ProposalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

named_enum! {
    /// 제안서 유형
    pub enum ProposalType ("proposal type") {
        Science => "Science",
        ScienceLongTerm => "Science - Long Term",
        KeyScienceProgram => "Key Science Program",
        LargeScienceProposal => "Large Science Proposal",
        OpticonRadionetPilot => "OPTICON-Radionet Pilot",
        Commissioning => "Commissioning",
        /// DB에는 `Director Discretionary Time (DDT)`로 저장되어 있음
        DirectorsDiscretionaryTime => "Director's Discretionary Time" | "Director Discretionary Time (DDT)" | "DDT",
        ScienceVerification => "Science Verification" | "SVP",
        GravitationalWaveEvent => "Gravitational Wave Event",
        Engineering => "Engineering",
    }
}

named_enum! {
    /// 제안서 상태
    pub enum ProposalStatus ("proposal status") {
        Accepted => "Accepted",
        Active => "Active",
        Completed => "Completed",
        Deleted => "Deleted",
        Expired => "Expired",
        InPreparation => "In preparation",
        Inactive => "Inactive",
        Rejected => "Rejected",
        Superseded => "Superseded",
        UnderScientificReview => "Under scientific review",
        UnderTechnicalReview => "Under technical review",
    }
}

named_enum! {
    /// SALT 파트너
    pub enum Partner ("partner code") {
        Amnh => "AMNH",
        Cmu => "CMU",
        Dc => "DC",
        Dur => "DUR",
        Gu => "GU",
        Het => "HET",
        Iucaa => "IUCAA",
        Orp => "ORP",
        /// 파트너 소속으로 인정되지 않음
        Other => "OTH",
        Pol => "POL",
        Rsa => "RSA",
        Ru => "RU",
        Uc => "UC",
        Uksc => "UKSC",
        Unc => "UNC",
        Uw => "UW",
    }
}

impl Partner {
    /// 파트너 전체 이름
    pub fn name(&self) -> &'static str {
        match self {
            Partner::Amnh => "American Museum of Natural History",
            Partner::Cmu => "Carnegie Mellon University",
            Partner::Dc => "Dartmouth College",
            Partner::Dur => "Durham University",
            Partner::Gu => "Georg-August-Universität Göttingen",
            Partner::Het => "Hobby Eberly Telescope Board",
            Partner::Iucaa => "Inter-University Centre for Astronomy & Astrophysics",
            Partner::Orp => "OPTICON-Radionet Pilot",
            Partner::Other => "Other",
            Partner::Pol => "Poland",
            Partner::Rsa => "South Africa",
            Partner::Ru => "Rutgers University",
            Partner::Uc => "University of Canterbury",
            Partner::Uksc => "UK SALT Consortium",
            Partner::Unc => "University of North Carolina - Chapel Hill",
            Partner::Uw => "University of Wisconsin-Madison",
        }
    }

    /// 실제 SALT 파트너인지 (`OTH` 제외)
    pub fn is_salt_partner(&self) -> bool {
        !matches!(self, Partner::Other)
    }
}

/// 연락처 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub given_name: String,
    pub family_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// 상태 값 + 사유
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalStatusInfo {
    pub value: ProposalStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

/// 파트너별 시간 요청 (학기 단위)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRequest {
    pub semester: Semester,
    pub partner: Partner,
    /// 요청 비율 (%)
    pub percentage: f64,
}

/// 제안서 목록 항목
///
/// 한 제안서가 여러 학기에 제출되었으면 학기마다 하나의 항목이 생깁니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposalListItem {
    /// 제출(학기) 단위 ID
    pub id: i64,
    pub proposal_code: ProposalCode,
    pub semester: Semester,
    pub title: String,
    pub phase: i64,
    pub status: ProposalStatusInfo,
    pub proposal_type: ProposalType,
    pub principal_investigator: Person,
    pub principal_contact: Person,
    pub liaison_astronomer: Option<Person>,
}

/// 관측 코멘트
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObservationComment {
    pub id: i64,
    /// 작성자 전체 이름
    pub author: String,
    pub comment: String,
    pub comment_date: NaiveDate,
}

/// `POST /proposals/{code}/observation-comments` 본문
#[derive(Debug, Clone, Deserialize)]
pub struct NewObservationComment {
    pub comment: String,
}

/// 제안서 상세
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Proposal {
    pub proposal_code: ProposalCode,
    pub proposal_type: ProposalType,
    pub title: String,
    pub semesters: Vec<Semester>,
    pub status: ProposalStatusInfo,
    pub principal_investigator: Person,
    pub principal_contact: Person,
    pub liaison_astronomer: Option<Person>,
    pub investigators: Vec<Person>,
    pub time_requests: Vec<TimeRequest>,
    pub self_activable: bool,
    pub blocks: Vec<BlockSummary>,
}
