//! Good - 記事への「いいね」履歴
//!
//! 1 利用者は 1 記事に 1 回だけ。記事側の like 数はホット一覧の並び順に使われる。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::codes::ArticleCode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodHistory {
    pub id: i64,
    pub user_id: i64,
    pub article_code: ArticleCode,
    pub created_at: DateTime<Utc>,
}
