//! TeamService - チーム作成と、code 衝突時のリトライ decorator
//!
//! # 構成
//! - **TeamService**: チーム操作の trait
//! - **BasicTeamService**: 作成のたびに新しい code を発行して 1 回だけ試す
//! - **RetryableTeamService**: 任意の TeamService を包み、code の一意性違反のときだけ
//!   `create` をやり直す。それ以外の呼び出しはそのまま転送する
//!
//! 記事と知識庫の作成はこの decorator を通らない（衝突はそのまま返る）。

use std::sync::Arc;

use async_trait::async_trait;

use crate::app::{RequestContext, TeamRepository};
use crate::domain::{NewTeam, Team, TeamCode, TeamMember, WikiError};
use crate::ports::{CodeGenerator, TeamRow};

#[async_trait]
pub trait TeamService: Send + Sync {
    /// チームを作り、作成者をリーダーとして登録する
    async fn create(
        &self,
        ctx: &RequestContext,
        team: &NewTeam,
        leader_uid: i64,
    ) -> Result<TeamCode, WikiError>;

    async fn get_teams(&self, ctx: &RequestContext, uid: i64) -> Result<Vec<Team>, WikiError>;

    async fn get_team(&self, ctx: &RequestContext, code: &TeamCode) -> Result<Team, WikiError>;

    async fn get_members(
        &self,
        ctx: &RequestContext,
        code: &TeamCode,
    ) -> Result<Vec<TeamMember>, WikiError>;

    async fn remove_member(
        &self,
        ctx: &RequestContext,
        code: &TeamCode,
        uid: i64,
    ) -> Result<(), WikiError>;
}

pub struct BasicTeamService {
    teams: Arc<TeamRepository>,
    codes: Arc<dyn CodeGenerator>,
}

impl BasicTeamService {
    pub fn new(teams: Arc<TeamRepository>, codes: Arc<dyn CodeGenerator>) -> Self {
        Self { teams, codes }
    }
}

#[async_trait]
impl TeamService for BasicTeamService {
    async fn create(
        &self,
        ctx: &RequestContext,
        team: &NewTeam,
        leader_uid: i64,
    ) -> Result<TeamCode, WikiError> {
        let code = TeamCode::generate(self.codes.as_ref())?;
        let row = TeamRow {
            unique_code: code.clone(),
            name: team.name.clone(),
            desc: team.desc.clone(),
            status: team.status,
            avatar_md5: team.avatar_md5.clone(),
        };
        self.teams
            .insert_team_and_member(ctx, row, leader_uid)
            .await?;
        tracing::info!(code = %code, leader_uid, "Created team");
        Ok(code)
    }

    async fn get_teams(&self, ctx: &RequestContext, uid: i64) -> Result<Vec<Team>, WikiError> {
        self.teams.get_teams(ctx, uid).await
    }

    async fn get_team(&self, ctx: &RequestContext, code: &TeamCode) -> Result<Team, WikiError> {
        self.teams.get_team_by_code(ctx, code).await
    }

    async fn get_members(
        &self,
        ctx: &RequestContext,
        code: &TeamCode,
    ) -> Result<Vec<TeamMember>, WikiError> {
        self.teams.get_team_members(ctx, code).await
    }

    async fn remove_member(
        &self,
        ctx: &RequestContext,
        code: &TeamCode,
        uid: i64,
    ) -> Result<(), WikiError> {
        self.teams.delete_team_member(ctx, code, uid).await
    }
}

/// code の一意性違反のときだけ `create` をやり直す decorator
///
/// 最初の 1 回に加えて最大 `retry_max` 回。
/// 使い切ったら最後の違反エラーをそのまま返す。
pub struct RetryableTeamService<S> {
    inner: S,
    retry_max: u32,
}

impl<S: TeamService> RetryableTeamService<S> {
    pub fn new(inner: S, retry_max: u32) -> Self {
        Self { inner, retry_max }
    }
}

#[async_trait]
impl<S: TeamService> TeamService for RetryableTeamService<S> {
    async fn create(
        &self,
        ctx: &RequestContext,
        team: &NewTeam,
        leader_uid: i64,
    ) -> Result<TeamCode, WikiError> {
        let mut retries = 0;
        loop {
            match self.inner.create(ctx, team, leader_uid).await {
                Err(e) if e.is_constraint_violation() && retries < self.retry_max => {
                    retries += 1;
                    tracing::warn!(
                        attempt = retries,
                        retry_max = self.retry_max,
                        error = %e,
                        "Team code collided, retrying with a fresh code"
                    );
                }
                other => return other,
            }
        }
    }

    async fn get_teams(&self, ctx: &RequestContext, uid: i64) -> Result<Vec<Team>, WikiError> {
        self.inner.get_teams(ctx, uid).await
    }

    async fn get_team(&self, ctx: &RequestContext, code: &TeamCode) -> Result<Team, WikiError> {
        self.inner.get_team(ctx, code).await
    }

    async fn get_members(
        &self,
        ctx: &RequestContext,
        code: &TeamCode,
    ) -> Result<Vec<TeamMember>, WikiError> {
        self.inner.get_members(ctx, code).await
    }

    async fn remove_member(
        &self,
        ctx: &RequestContext,
        code: &TeamCode,
        uid: i64,
    ) -> Result<(), WikiError> {
        self.inner.remove_member(ctx, code, uid).await
    }
}
