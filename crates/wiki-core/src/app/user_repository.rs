//! UserRepository - 利用者情報の cache-aside
//!
//! `user:info:<id>` に利用者 1 人分を JSON で置く。
//! プロフィール更新は double-delete、パスワード更新は 1 回の削除で無効化する。

use std::sync::Arc;
use std::time::Duration;

use crate::app::{CacheAside, RequestContext};
use crate::domain::{ProfileUpdate, User, WikiError};
use crate::ports::UserDao;

fn user_key(id: i64) -> String {
    format!("user:info:{id}")
}

pub struct UserRepository {
    dao: Arc<dyn UserDao>,
    cache: CacheAside,
    invalidation_delay: Duration,
}

impl UserRepository {
    pub fn new(dao: Arc<dyn UserDao>, cache: CacheAside, invalidation_delay: Duration) -> Self {
        Self {
            dao,
            cache,
            invalidation_delay,
        }
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        username: &str,
        password_hash: &str,
    ) -> Result<i64, WikiError> {
        ctx.run(self.dao.insert(username, password_hash)).await
    }

    pub async fn find_by_id(&self, ctx: &RequestContext, id: i64) -> Result<User, WikiError> {
        self.cache
            .get_or_load(user_key(id), || ctx.run(self.dao.find_by_id(id)))
            .await
    }

    /// ログイン経路。キャッシュは使わない
    pub async fn find_by_username(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> Result<User, WikiError> {
        ctx.run(self.dao.find_by_username(username)).await
    }

    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        id: i64,
        update: &ProfileUpdate,
    ) -> Result<(), WikiError> {
        ctx.run(self.dao.update_profile(id, update)).await?;
        self.cache
            .invalidate_twice(user_key(id), self.invalidation_delay)
            .await;
        Ok(())
    }

    /// 旧パスワードのハッシュが一致しなければ `InvalidInput`
    pub async fn update_password(
        &self,
        ctx: &RequestContext,
        id: i64,
        old_hash: &str,
        new_hash: &str,
    ) -> Result<(), WikiError> {
        let affected = ctx
            .run(self.dao.update_password(id, old_hash, new_hash))
            .await?;
        if affected == 0 {
            return Err(WikiError::InvalidInput(
                "old password does not match".to_string(),
            ));
        }
        self.cache.invalidate(&user_key(id)).await;
        Ok(())
    }
}
