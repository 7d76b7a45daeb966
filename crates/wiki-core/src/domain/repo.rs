//! Repo - 知識庫（記事のまとまり）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::article::Category;
use crate::domain::codes::RepoCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepoStatus {
    Public,
    Private,
}

impl RepoStatus {
    pub fn is_private(self) -> bool {
        self == RepoStatus::Private
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    pub id: i64,
    pub name: String,
    pub desc: String,
    pub unique_code: RepoCode,
    pub status: RepoStatus,
    pub category: Category,
    /// true なら文書庫、false ならその他（書籍など）
    pub is_doc: bool,
    /// 0 ならチームに属さない個人の知識庫
    pub team_id: i64,
    pub creator_id: i64,
    pub like_cnt: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRepo {
    pub name: String,
    pub desc: String,
    pub status: RepoStatus,
    pub category: Category,
    pub is_doc: bool,
    pub team_id: i64,
    pub creator_id: i64,
}
