//! User - 利用者プロフィール
//!
//! パスワードはハッシュ済みの不透明な文字列として扱う（ハッシュ化は範囲外）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub avatar_md5: String,
    pub profile: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// プロフィール更新の入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub avatar_md5: String,
    pub profile: String,
}
