//! 사용자 타입

use serde::Serialize;

use crate::proposal::Partner;

named_enum! {
    /// 파트너와 무관한 전역 역할
    pub enum GlobalRole ("global role") {
        Administrator => "Administrator",
        SaltAstronomer => "SALT Astronomer",
        BoardMember => "Board Member",
    }
}

named_enum! {
    /// `who-am-i` 응답에 노출되는 역할
    pub enum UserRole ("user role") {
        SaltAstronomer => "SALT Astronomer",
        Administrator => "Administrator",
        TacMember => "TAC Member",
        TacChair => "TAC Chair",
        BoardMember => "Board Member",
    }
}

impl From<GlobalRole> for UserRole {
    fn from(role: GlobalRole) -> Self {
        match role {
            GlobalRole::Administrator => UserRole::Administrator,
            GlobalRole::SaltAstronomer => UserRole::SaltAstronomer,
            GlobalRole::BoardMember => UserRole::BoardMember,
        }
    }
}

/// 사용자 공개 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    /// 소속 파트너 (`OTH` 포함 가능)
    pub affiliations: Vec<Partner>,
}

/// 로그인한 사용자 정보 (역할 포함)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDetails {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<UserRole>,
}
