//! RepoService - 知識庫の作成と一覧
//!
//! 作成時の code は 1 つだけ発行する。衝突すれば `ConstraintViolation` がそのまま返る。

use std::sync::Arc;

use crate::app::{RepoRepository, RequestContext};
use crate::domain::{NewRepo, Repo, RepoCode, RepoStatus, WikiError};
use crate::ports::{CodeGenerator, RepoRow};

pub struct RepoService {
    repos: Arc<RepoRepository>,
    codes: Arc<dyn CodeGenerator>,
}

impl RepoService {
    pub fn new(repos: Arc<RepoRepository>, codes: Arc<dyn CodeGenerator>) -> Self {
        Self { repos, codes }
    }

    pub async fn create(&self, ctx: &RequestContext, repo: NewRepo) -> Result<Repo, WikiError> {
        let code = RepoCode::generate(self.codes.as_ref())?;
        let row = RepoRow {
            unique_code: code,
            name: repo.name,
            desc: repo.desc,
            status: repo.status,
            category: repo.category,
            is_doc: repo.is_doc,
            team_id: repo.team_id,
            creator_id: repo.creator_id,
        };
        let created = self.repos.insert_repo(ctx, row).await?;
        tracing::info!(code = %created.unique_code, creator_id = created.creator_id, "Created repo");
        Ok(created)
    }

    /// 非公開の知識庫は作成者以外には NotFound に見せる
    pub async fn get(
        &self,
        ctx: &RequestContext,
        code: &RepoCode,
        viewer_uid: i64,
    ) -> Result<Repo, WikiError> {
        let repo = self.repos.get_by_code(ctx, code).await?;
        if repo.status == RepoStatus::Private && repo.creator_id != viewer_uid {
            return Err(WikiError::NotFound(format!("repo {code}")));
        }
        Ok(repo)
    }

    pub async fn list_by_user(
        &self,
        ctx: &RequestContext,
        uid: i64,
        is_doc: bool,
    ) -> Result<Vec<Repo>, WikiError> {
        self.repos.get_by_user(ctx, uid, is_doc).await
    }

    pub async fn list_by_team(&self, ctx: &RequestContext, team_id: i64) -> Result<Vec<Repo>, WikiError> {
        self.repos.get_by_team(ctx, team_id).await
    }

    pub async fn hot(&self, ctx: &RequestContext, is_doc: bool) -> Result<Vec<Repo>, WikiError> {
        self.repos.get_hot(ctx, is_doc).await
    }
}
