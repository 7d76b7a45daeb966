//! GoodDao port - いいね履歴と記事の like 数
//!
//! 履歴の追加と like 数の加算は 1 トランザクション。
//! (user_id, article_code) に unique 制約があり、2 回目は `StoreError::Duplicate`。

use async_trait::async_trait;

use crate::domain::{ArticleCode, GoodHistory};
use crate::ports::StoreError;

#[async_trait]
pub trait GoodDao: Send + Sync {
    /// 記事がなければ `NotFound`、いいね済みなら `Duplicate`（どちらも like 数は変わらない）
    async fn insert_good(&self, code: &ArticleCode, uid: i64) -> Result<(), StoreError>;

    /// `codes` のうち `uid` がいいねした分の履歴
    async fn get_by_user_and_codes(
        &self,
        uid: i64,
        codes: &[ArticleCode],
    ) -> Result<Vec<GoodHistory>, StoreError>;
}
