//! TeamRepository - チームとメンバー集合の cache-aside
//!
//! - `team:info:<code>`: チーム 1 件
//! - `team:members:<code>`: メンバー集合（hash、フィールドは user id）
//!
//! メンバー集合は 1 人単位で足し引きする。全体を書き直すことはしない。

use std::sync::Arc;

use crate::app::{CacheAside, RequestContext};
use crate::domain::{Team, TeamCode, TeamMember, WikiError};
use crate::ports::{TeamDao, TeamRow};

fn team_key(code: &TeamCode) -> String {
    format!("team:info:{code}")
}

fn members_key(code: &TeamCode) -> String {
    format!("team:members:{code}")
}

fn member_field(member: &TeamMember) -> String {
    member.user_id.to_string()
}

pub struct TeamRepository {
    dao: Arc<dyn TeamDao>,
    cache: CacheAside,
}

impl TeamRepository {
    pub fn new(dao: Arc<dyn TeamDao>, cache: CacheAside) -> Self {
        Self { dao, cache }
    }

    /// チーム行とリーダーのメンバー行を 1 トランザクションで作る
    ///
    /// code の重複は `ConstraintViolation` としてそのまま返す。
    pub async fn insert_team_and_member(
        &self,
        ctx: &RequestContext,
        team: TeamRow,
        leader_uid: i64,
    ) -> Result<i64, WikiError> {
        ctx.run(self.dao.insert_team_and_member(team, leader_uid))
            .await
    }

    pub async fn get_teams(&self, ctx: &RequestContext, uid: i64) -> Result<Vec<Team>, WikiError> {
        ctx.run(self.dao.get_teams(uid)).await
    }

    pub async fn get_team_by_code(
        &self,
        ctx: &RequestContext,
        code: &TeamCode,
    ) -> Result<Team, WikiError> {
        self.cache
            .get_or_load(team_key(code), || ctx.run(self.dao.get_by_code(code)))
            .await
    }

    /// メンバー一覧（参加順）
    pub async fn get_team_members(
        &self,
        ctx: &RequestContext,
        code: &TeamCode,
    ) -> Result<Vec<TeamMember>, WikiError> {
        let mut members = self
            .cache
            .get_set_or_load(members_key(code), member_field, || {
                ctx.run(self.dao.get_members(code))
            })
            .await?;
        members.sort_by_key(|m| m.id);
        Ok(members)
    }

    /// リーダー以外のメンバーを外す
    ///
    /// 1 行も消えなければ `TeamLeaderCannotBeDeleted`。
    pub async fn delete_team_member(
        &self,
        ctx: &RequestContext,
        code: &TeamCode,
        uid: i64,
    ) -> Result<(), WikiError> {
        let affected = ctx.run(self.dao.delete_member(code, uid)).await?;
        if affected == 0 {
            return Err(WikiError::TeamLeaderCannotBeDeleted);
        }
        self.cache.remove_from_set(members_key(code), uid.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::BackgroundTasks;
    use crate::domain::TeamStatus;
    use crate::impls::{InMemoryCache, InMemoryRelationalStore};
    use crate::ports::UserDao;
    use std::time::Duration;

    fn setup() -> (Arc<InMemoryRelationalStore>, BackgroundTasks, TeamRepository) {
        let store = Arc::new(InMemoryRelationalStore::new());
        let tasks = BackgroundTasks::new();
        let aside = CacheAside::new(
            Arc::new(InMemoryCache::new()),
            tasks.clone(),
            Duration::from_secs(60),
            Duration::from_secs(1),
        );
        (store.clone(), tasks, TeamRepository::new(store, aside))
    }

    fn row(code: &str) -> TeamRow {
        TeamRow {
            unique_code: TeamCode::parse(code).unwrap(),
            name: "core".into(),
            desc: String::new(),
            status: TeamStatus::AllAvailable,
            avatar_md5: String::new(),
        }
    }

    #[tokio::test]
    async fn leader_cannot_be_removed() {
        let (store, _tasks, repo) = setup();
        let ctx = RequestContext::background();
        let leader = UserDao::insert(store.as_ref(), "lead", "h").await.unwrap();
        repo.insert_team_and_member(&ctx, row("t1"), leader).await.unwrap();

        let err = repo
            .delete_team_member(&ctx, &TeamCode::parse("t1").unwrap(), leader)
            .await
            .unwrap_err();
        assert_eq!(err, WikiError::TeamLeaderCannotBeDeleted);
    }

    #[tokio::test]
    async fn team_lookup_is_served_from_cache_when_warm() {
        let (store, tasks, repo) = setup();
        let ctx = RequestContext::background();
        let leader = UserDao::insert(store.as_ref(), "lead", "h").await.unwrap();
        repo.insert_team_and_member(&ctx, row("t1"), leader).await.unwrap();
        let code = TeamCode::parse("t1").unwrap();

        repo.get_team_by_code(&ctx, &code).await.unwrap();
        tasks.wait_idle().await;
        store
            .faults()
            .fail_always("team.get", crate::ports::StoreError::Unavailable("down".into()));

        let team = repo.get_team_by_code(&ctx, &code).await.unwrap();
        assert_eq!(team.unique_code, code);
    }

    #[tokio::test]
    async fn members_come_back_in_join_order() {
        let (store, tasks, repo) = setup();
        let ctx = RequestContext::background();
        let leader = UserDao::insert(store.as_ref(), "lead", "h").await.unwrap();
        repo.insert_team_and_member(&ctx, row("t1"), leader).await.unwrap();
        let code = TeamCode::parse("t1").unwrap();

        let cold = repo.get_team_members(&ctx, &code).await.unwrap();
        tasks.wait_idle().await;
        let warm = repo.get_team_members(&ctx, &code).await.unwrap();

        assert_eq!(cold.len(), 1);
        assert!(cold[0].is_leader);
        assert_eq!(cold, warm);
        assert_eq!(store.faults().calls("team.members"), 1);
    }
}
