//! Team - チームとメンバー

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::codes::TeamCode;
use crate::domain::errors::WikiError;

/// チームの公開範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamStatus {
    OnlyMemberAvailable,
    AllAvailable,
}

impl TeamStatus {
    pub fn to_u8(self) -> u8 {
        match self {
            TeamStatus::OnlyMemberAvailable => 1,
            TeamStatus::AllAvailable => 2,
        }
    }
}

impl TryFrom<u8> for TeamStatus {
    type Error = WikiError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TeamStatus::OnlyMemberAvailable),
            2 => Ok(TeamStatus::AllAvailable),
            other => Err(WikiError::InvalidInput(format!("team status {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub desc: String,
    pub unique_code: TeamCode,
    pub status: TeamStatus,
    pub avatar_md5: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub is_leader: bool,
    pub created_at: DateTime<Utc>,
}

/// チーム作成の入力（code は作成処理の中で毎回発行する）
#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub desc: String,
    pub status: TeamStatus,
    pub avatar_md5: String,
}
