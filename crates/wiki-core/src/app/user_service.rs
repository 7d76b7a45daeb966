//! UserService - 利用者の登録とプロフィール
//!
//! パスワードはハッシュ済みの文字列として受け取る。

use std::sync::Arc;

use crate::app::{RequestContext, UserRepository};
use crate::domain::{ProfileUpdate, User, WikiError};

pub struct UserService {
    users: Arc<UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<UserRepository>) -> Self {
        Self { users }
    }

    /// 登録して id を返す。username が使われていれば `ConstraintViolation`
    pub async fn register(
        &self,
        ctx: &RequestContext,
        username: &str,
        password_hash: &str,
    ) -> Result<i64, WikiError> {
        if username.trim().is_empty() {
            return Err(WikiError::InvalidInput("username is empty".to_string()));
        }
        let id = self.users.create(ctx, username, password_hash).await?;
        tracing::info!(uid = id, username, "Registered user");
        Ok(id)
    }

    pub async fn profile(&self, ctx: &RequestContext, uid: i64) -> Result<User, WikiError> {
        self.users.find_by_id(ctx, uid).await
    }

    pub async fn by_username(&self, ctx: &RequestContext, username: &str) -> Result<User, WikiError> {
        self.users.find_by_username(ctx, username).await
    }

    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        uid: i64,
        update: &ProfileUpdate,
    ) -> Result<(), WikiError> {
        self.users.update_profile(ctx, uid, update).await
    }

    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        uid: i64,
        old_hash: &str,
        new_hash: &str,
    ) -> Result<(), WikiError> {
        self.users.update_password(ctx, uid, old_hash, new_hash).await
    }
}
