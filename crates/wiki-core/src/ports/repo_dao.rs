//! RepoDao port - 知識庫の正本（RDB）

use async_trait::async_trait;

use crate::domain::{Category, Repo, RepoCode, RepoStatus};
use crate::ports::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRow {
    pub unique_code: RepoCode,
    pub name: String,
    pub desc: String,
    pub status: RepoStatus,
    pub category: Category,
    pub is_doc: bool,
    pub team_id: i64,
    pub creator_id: i64,
}

#[async_trait]
pub trait RepoDao: Send + Sync {
    /// unique_code の重複は `StoreError::Duplicate`
    async fn insert(&self, row: RepoRow) -> Result<Repo, StoreError>;

    async fn get_by_code(&self, code: &RepoCode) -> Result<Repo, StoreError>;

    async fn get_by_user(&self, uid: i64, is_doc: bool) -> Result<Vec<Repo>, StoreError>;

    async fn get_by_team(&self, team_id: i64) -> Result<Vec<Repo>, StoreError>;

    /// 公開されている知識庫を like 数の降順で最大 `limit` 件
    async fn get_hot(&self, is_doc: bool, limit: usize) -> Result<Vec<Repo>, StoreError>;
}
