//! ArticleService - 記事の編集と閲覧の入り口
//!
//! 編集（edit）は code の有無で新規作成と更新を振り分ける。
//! 新規作成では code を 1 つだけ発行する。衝突してもリトライしない。

use std::sync::Arc;

use crate::app::{ArticleRepository, RepoRepository, RequestContext};
use crate::domain::{Article, ArticleCode, ArticleDraft, Page, WikiError};
use crate::ports::{ArticleRow, CodeGenerator};

pub struct ArticleService {
    articles: Arc<ArticleRepository>,
    repos: Arc<RepoRepository>,
    codes: Arc<dyn CodeGenerator>,
}

impl ArticleService {
    pub fn new(
        articles: Arc<ArticleRepository>,
        repos: Arc<RepoRepository>,
        codes: Arc<dyn CodeGenerator>,
    ) -> Self {
        Self {
            articles,
            repos,
            codes,
        }
    }

    /// 記事を作成または更新し、その code を返す
    ///
    /// 非公開の知識庫に属する記事は常に非公開になる。
    pub async fn edit(&self, ctx: &RequestContext, draft: ArticleDraft) -> Result<ArticleCode, WikiError> {
        let repo = self.repos.get_by_code(ctx, &draft.repo_code).await?;
        let private = draft.private || repo.status.is_private();

        match ArticleCode::parse(&draft.unique_code) {
            None => {
                let code = ArticleCode::generate(self.codes.as_ref())?;
                let row = ArticleRow {
                    unique_code: code.clone(),
                    title: draft.title,
                    private,
                    state: draft.state,
                    repo_code: draft.repo_code,
                    author_id: draft.author.id,
                    category_id: draft.category.id,
                };
                let id = self.articles.insert(ctx, row, draft.content).await?;
                tracing::info!(code = %code, id, "Created article");
                Ok(code)
            }
            Some(code) => {
                // 補償で書き戻す旧本文。所有者でなければ NotFound
                let current = self
                    .articles
                    .get_by_code_and_user(ctx, &code, draft.author.id)
                    .await?;
                let row = ArticleRow {
                    unique_code: code.clone(),
                    title: draft.title,
                    private,
                    state: draft.state,
                    repo_code: draft.repo_code,
                    author_id: draft.author.id,
                    category_id: draft.category.id,
                };
                self.articles
                    .update(ctx, row, draft.content, current.content)
                    .await?;
                tracing::info!(code = %code, "Updated article");
                Ok(code)
            }
        }
    }

    /// 自分の記事一覧（非公開も含む）
    pub async fn list_self(
        &self,
        ctx: &RequestContext,
        uid: i64,
        offset: usize,
        size: usize,
    ) -> Result<Page<Article>, WikiError> {
        self.articles.page_by_user(ctx, uid, offset, size).await
    }

    pub async fn detail(&self, ctx: &RequestContext, code: &ArticleCode) -> Result<Article, WikiError> {
        self.articles.get_by_code(ctx, code).await
    }

    /// 公開記事の一覧。`is_hot` なら like 数の降順
    pub async fn list_all(
        &self,
        ctx: &RequestContext,
        is_hot: bool,
        offset: usize,
        size: usize,
    ) -> Result<Page<Article>, WikiError> {
        if is_hot {
            self.articles.pages_by_hot(ctx, offset, size).await
        } else {
            self.articles.pages(ctx, offset, size).await
        }
    }

    /// 所有者だけが削除できる
    pub async fn delete(&self, ctx: &RequestContext, uid: i64, code: &ArticleCode) -> Result<(), WikiError> {
        self.articles.get_by_code_and_user(ctx, code, uid).await?;
        self.articles.soft_delete(ctx, code).await?;
        tracing::info!(code = %code, uid, "Deleted article");
        Ok(())
    }
}
