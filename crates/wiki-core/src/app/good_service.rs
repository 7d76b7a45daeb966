//! GoodService - 記事へのいいね
//!
//! like 数の加算と履歴の追加は GoodDao の 1 トランザクションに任せる。
//! ホット一覧のキャッシュは無効化しない（TTL の範囲で古くてよい）。

use std::collections::HashMap;
use std::sync::Arc;

use crate::app::RequestContext;
use crate::domain::{ArticleCode, WikiError};
use crate::ports::GoodDao;

pub struct GoodService {
    dao: Arc<dyn GoodDao>,
}

impl GoodService {
    pub fn new(dao: Arc<dyn GoodDao>) -> Self {
        Self { dao }
    }

    /// いいね済みなら `ConstraintViolation`、記事がなければ `NotFound`
    pub async fn like(&self, ctx: &RequestContext, code: &ArticleCode, uid: i64) -> Result<(), WikiError> {
        ctx.run(self.dao.insert_good(code, uid)).await?;
        tracing::debug!(code = %code, uid, "Article liked");
        Ok(())
    }

    /// 渡した code ごとに、`uid` がいいね済みかどうか
    pub async fn is_liked(
        &self,
        ctx: &RequestContext,
        uid: i64,
        codes: &[ArticleCode],
    ) -> Result<HashMap<ArticleCode, bool>, WikiError> {
        let histories = ctx.run(self.dao.get_by_user_and_codes(uid, codes)).await?;
        Ok(codes
            .iter()
            .map(|code| {
                let liked = histories.iter().any(|h| &h.article_code == code);
                (code.clone(), liked)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RepoCode;
    use crate::impls::{DEFAULT_CATEGORY_ID, InMemoryRelationalStore};
    use crate::ports::{ArticleDao, ArticleRow, StoreError};

    async fn store_with_article(code: &str) -> Arc<InMemoryRelationalStore> {
        let store = Arc::new(InMemoryRelationalStore::new());
        ArticleDao::insert(
            store.as_ref(),
            ArticleRow {
                unique_code: ArticleCode::parse(code).unwrap(),
                title: "t".into(),
                private: false,
                state: 0,
                repo_code: RepoCode::parse("r1").unwrap(),
                author_id: 1,
                category_id: DEFAULT_CATEGORY_ID,
            },
        )
        .await
        .unwrap();
        store
    }

    #[tokio::test]
    async fn repeat_like_is_a_constraint_violation() {
        let store = store_with_article("a1").await;
        let service = GoodService::new(store.clone());
        let ctx = RequestContext::background();
        let code = ArticleCode::parse("a1").unwrap();

        service.like(&ctx, &code, 7).await.unwrap();
        let err = service.like(&ctx, &code, 7).await.unwrap_err();

        assert!(err.is_constraint_violation());
        assert_eq!(ArticleDao::get_by_code(store.as_ref(), &code).await.unwrap().like_cnt, 1);
    }

    #[tokio::test]
    async fn liked_flags_follow_the_requested_codes() {
        let store = store_with_article("a1").await;
        let service = GoodService::new(store);
        let ctx = RequestContext::background();
        let a1 = ArticleCode::parse("a1").unwrap();
        let a2 = ArticleCode::parse("a2").unwrap();
        service.like(&ctx, &a1, 7).await.unwrap();

        let liked = service.is_liked(&ctx, 7, &[a1.clone(), a2.clone()]).await.unwrap();
        assert_eq!(liked.len(), 2);
        assert!(liked[&a1]);
        assert!(!liked[&a2]);

        let other = service.is_liked(&ctx, 8, &[a1.clone()]).await.unwrap();
        assert!(!other[&a1]);
    }

    #[tokio::test]
    async fn store_outage_is_propagated() {
        let store = store_with_article("a1").await;
        store
            .faults()
            .fail_next("good.insert", StoreError::Unavailable("mysql".into()));
        let service = GoodService::new(store);

        let err = service
            .like(&RequestContext::background(), &ArticleCode::parse("a1").unwrap(), 7)
            .await
            .unwrap_err();
        assert_eq!(err, WikiError::StoreUnavailable("mysql".into()));
    }
}
