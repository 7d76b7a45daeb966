//! TeamDao port - チームとメンバーの正本（RDB）

use async_trait::async_trait;

use crate::domain::{Team, TeamCode, TeamMember, TeamStatus};
use crate::ports::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRow {
    pub unique_code: TeamCode,
    pub name: String,
    pub desc: String,
    pub status: TeamStatus,
    pub avatar_md5: String,
}

/// TeamDao はチームを管理
///
/// # 設計原則
/// - チーム行とリーダーのメンバー行は同一トランザクションで作る
/// - unique_code の重複は `StoreError::Duplicate`（このときメンバー行も作られない）
#[async_trait]
pub trait TeamDao: Send + Sync {
    async fn insert_team_and_member(&self, team: TeamRow, leader_uid: i64)
    -> Result<i64, StoreError>;

    async fn get_teams(&self, uid: i64) -> Result<Vec<Team>, StoreError>;

    async fn get_by_code(&self, code: &TeamCode) -> Result<Team, StoreError>;

    async fn get_members(&self, code: &TeamCode) -> Result<Vec<TeamMember>, StoreError>;

    /// リーダー以外のメンバーを削除し、削除した行数を返す
    async fn delete_member(&self, code: &TeamCode, uid: i64) -> Result<u64, StoreError>;
}
