//! UserDao port - 利用者の正本（RDB）

use async_trait::async_trait;

use crate::domain::{ProfileUpdate, User};
use crate::ports::StoreError;

#[async_trait]
pub trait UserDao: Send + Sync {
    /// username の重複は `StoreError::Duplicate`
    async fn insert(&self, username: &str, password_hash: &str) -> Result<i64, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<User, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<User, StoreError>;

    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<(), StoreError>;

    /// 旧パスワードが一致した場合のみ更新し、更新した行数を返す
    async fn update_password(&self, id: i64, old_hash: &str, new_hash: &str)
    -> Result<u64, StoreError>;
}
