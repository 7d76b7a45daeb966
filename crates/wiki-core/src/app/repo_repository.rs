//! RepoRepository - 知識庫の cache-aside
//!
//! `repo:info:<code>` に 1 件ずつ置く。作成直後は非同期に投入しておく。
//! 一覧系はキャッシュしない。

use std::sync::Arc;

use crate::app::{CacheAside, RequestContext};
use crate::domain::{Repo, RepoCode, WikiError};
use crate::ports::{RepoDao, RepoRow};

/// ホット一覧の件数
pub const HOT_REPO_LIMIT: usize = 10;

fn repo_key(code: &RepoCode) -> String {
    format!("repo:info:{code}")
}

pub struct RepoRepository {
    dao: Arc<dyn RepoDao>,
    cache: CacheAside,
}

impl RepoRepository {
    pub fn new(dao: Arc<dyn RepoDao>, cache: CacheAside) -> Self {
        Self { dao, cache }
    }

    /// 行を作り、キャッシュを温めておく
    pub async fn insert_repo(&self, ctx: &RequestContext, row: RepoRow) -> Result<Repo, WikiError> {
        let repo = ctx.run(self.dao.insert(row)).await?;
        self.cache.populate(repo_key(&repo.unique_code), &repo);
        Ok(repo)
    }

    pub async fn get_by_code(&self, ctx: &RequestContext, code: &RepoCode) -> Result<Repo, WikiError> {
        self.cache
            .get_or_load(repo_key(code), || ctx.run(self.dao.get_by_code(code)))
            .await
    }

    pub async fn get_by_user(
        &self,
        ctx: &RequestContext,
        uid: i64,
        is_doc: bool,
    ) -> Result<Vec<Repo>, WikiError> {
        ctx.run(self.dao.get_by_user(uid, is_doc)).await
    }

    pub async fn get_by_team(&self, ctx: &RequestContext, team_id: i64) -> Result<Vec<Repo>, WikiError> {
        ctx.run(self.dao.get_by_team(team_id)).await
    }

    pub async fn get_hot(&self, ctx: &RequestContext, is_doc: bool) -> Result<Vec<Repo>, WikiError> {
        ctx.run(self.dao.get_hot(is_doc, HOT_REPO_LIMIT)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::BackgroundTasks;
    use crate::domain::{Category, RepoStatus};
    use crate::impls::{DEFAULT_CATEGORY_ID, InMemoryCache, InMemoryRelationalStore};
    use std::time::Duration;

    fn row(code: &str) -> RepoRow {
        RepoRow {
            unique_code: RepoCode::parse(code).unwrap(),
            name: "notes".into(),
            desc: String::new(),
            status: RepoStatus::Public,
            category: Category {
                id: DEFAULT_CATEGORY_ID,
                name: "default".into(),
            },
            is_doc: true,
            team_id: 0,
            creator_id: 7,
        }
    }

    #[tokio::test]
    async fn created_repo_is_prewarmed() {
        let store = Arc::new(InMemoryRelationalStore::new());
        let cache = Arc::new(InMemoryCache::new());
        let tasks = BackgroundTasks::new();
        let aside = CacheAside::new(
            cache.clone(),
            tasks.clone(),
            Duration::from_secs(60),
            Duration::from_secs(1),
        );
        let repos = RepoRepository::new(store.clone(), aside);
        let ctx = RequestContext::background();

        let created = repos.insert_repo(&ctx, row("r1")).await.unwrap();
        tasks.wait_idle().await;
        assert!(cache.contains("repo:info:r1").await);

        let fetched = repos.get_by_code(&ctx, &created.unique_code).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(store.faults().calls("repo.get"), 0);
    }

    #[tokio::test]
    async fn duplicate_code_is_a_constraint_violation() {
        let store = Arc::new(InMemoryRelationalStore::new());
        let tasks = BackgroundTasks::new();
        let aside = CacheAside::new(
            Arc::new(InMemoryCache::new()),
            tasks,
            Duration::from_secs(60),
            Duration::from_secs(1),
        );
        let repos = RepoRepository::new(store, aside);
        let ctx = RequestContext::background();

        repos.insert_repo(&ctx, row("r1")).await.unwrap();
        let err = repos.insert_repo(&ctx, row("r1")).await.unwrap_err();
        assert!(err.is_constraint_violation());
    }
}
