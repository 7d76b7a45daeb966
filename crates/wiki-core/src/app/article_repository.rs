//! ArticleRepository - 記事の 2 ストア書き込み調整役
//!
//! 記事は RDB の行と、Blob 上の 2 つのオブジェクト（描画済み本文とプレーンテキスト）から成る。
//! 2 つのストアをまたぐトランザクションはないので、途中で失敗したら後ろ向きに補償する。
//!
//! # 書き込み順序（insert）
//! 0. code が使われていれば `ConstraintViolation`（既存記事の Blob に触れない）
//! 1. `content/<code>` を put → 失敗: そのまま返す（何も作られていない）
//! 2. `puretext/<code>` を put → 失敗: 1 の Blob を非同期に削除して返す
//! 3. 行を insert → 失敗: 両方の Blob を削除（締め切り付き、待ってから返す）
//!
//! # 書き込み順序（update）
//! 1. `content/<code>` を上書き → 失敗: そのまま返す
//! 2. `puretext/<code>` を上書き → 失敗: 描画済み Blob を旧値に非同期で戻す
//! 3. 行を update → 失敗: 両方の Blob を旧値に非同期で戻す
//!
//! # 不変条件
//! - 行は 2 つの Blob が書けた後にしか書かない
//! - 行の書き込み失敗は必ず 2 つの Blob の補償を起こす
//! - insert でのプレーンテキスト失敗は 1 つの Blob の削除だけ（行は存在しない）
//! - 呼び出し元へ返すエラーは常に補償のきっかけになった元のエラー
//!
//! 読み出しは行を取ってから Blob を 2 つ取る。Blob の読み出し失敗はログに残して
//! 本文を空にする（読み出しは縮退してよいが、書き込みは縮退しない）。

use std::sync::Arc;
use std::time::Duration;

use crate::app::{BackgroundTasks, CacheAside, RequestContext};
use crate::config::BlobConfig;
use crate::domain::{Article, ArticleCode, ArticleContent, ArticleRecord, Page, WikiError};
use crate::ports::{ArticleDao, ArticleRow, BlobStore, StoreError};

/// Blob キーと content type の組み立て
#[derive(Debug, Clone)]
pub struct BlobKeys {
    config: BlobConfig,
}

impl BlobKeys {
    pub fn new(config: BlobConfig) -> Self {
        Self { config }
    }

    pub fn content(&self, code: &ArticleCode) -> String {
        format!("{}/{}", self.config.content_prefix, code)
    }

    pub fn puretext(&self, code: &ArticleCode) -> String {
        format!("{}/{}", self.config.puretext_prefix, code)
    }

    pub fn html_type(&self) -> &str {
        &self.config.html_content_type
    }

    pub fn text_type(&self) -> &str {
        &self.config.text_content_type
    }
}

pub struct ArticleRepository {
    dao: Arc<dyn ArticleDao>,
    blobs: Arc<dyn BlobStore>,
    keys: BlobKeys,
    tasks: BackgroundTasks,
    compensation_timeout: Duration,
    hot_pages: CacheAside,
}

impl ArticleRepository {
    pub fn new(
        dao: Arc<dyn ArticleDao>,
        blobs: Arc<dyn BlobStore>,
        keys: BlobKeys,
        tasks: BackgroundTasks,
        compensation_timeout: Duration,
        hot_pages: CacheAside,
    ) -> Self {
        Self {
            dao,
            blobs,
            keys,
            tasks,
            compensation_timeout,
            hot_pages,
        }
    }

    /// 新しい記事を書き込み、行の id を返す
    ///
    /// code の重複で行の insert が失敗しても、ここではリトライしない。
    ///
    /// 事前の存在確認は逐次の衝突から既存記事の本文を守る。同じ code の insert が
    /// 同時に走った場合は両方が確認を通り抜けうるので、その窓では負けた側の補償が
    /// 勝った側の Blob を消すことがある。
    pub async fn insert(
        &self,
        ctx: &RequestContext,
        row: ArticleRow,
        content: ArticleContent,
    ) -> Result<i64, WikiError> {
        let code = row.unique_code.clone();
        let content_key = self.keys.content(&code);
        let puretext_key = self.keys.puretext(&code);

        if ctx.run(self.dao.exists_code(&code)).await? {
            tracing::warn!(code = %code, "Article code already taken, leaving its blobs alone");
            return Err(WikiError::ConstraintViolation("article.unique_code".to_string()));
        }

        ctx.run(self.blobs.put(
            &content_key,
            content.rendered.into_bytes(),
            self.keys.html_type(),
        ))
        .await?;

        if let Err(err) = ctx
            .run(self.blobs.put(
                &puretext_key,
                content.plain.into_bytes(),
                self.keys.text_type(),
            ))
            .await
        {
            tracing::warn!(code = %code, error = %err, "Plain text write failed, removing rendered blob");
            let blobs = self.blobs.clone();
            drop(self.tasks.spawn(
                "article.insert.remove_rendered",
                self.compensation_timeout,
                async move { blobs.delete(&content_key).await },
            ));
            return Err(err);
        }

        match ctx.run(self.dao.insert(row)).await {
            Ok(id) => Ok(id),
            Err(err) => {
                tracing::warn!(code = %code, error = %err, "Article row insert failed, removing both blobs");
                let handle = self.tasks.spawn(
                    "article.insert.remove_both",
                    self.compensation_timeout,
                    remove_blobs(self.blobs.clone(), vec![content_key, puretext_key]),
                );
                // 呼び出し元が drop されても補償タスク自体は走り切る
                if let Err(join_err) = handle.await {
                    tracing::error!(code = %code, error = %join_err, "Compensation task panicked");
                }
                Err(err)
            }
        }
    }

    /// 既存記事を更新する
    ///
    /// `previous` は更新前の本文。補償で Blob を戻すときに使う。
    pub async fn update(
        &self,
        ctx: &RequestContext,
        row: ArticleRow,
        content: ArticleContent,
        previous: ArticleContent,
    ) -> Result<(), WikiError> {
        let code = row.unique_code.clone();
        let content_key = self.keys.content(&code);
        let puretext_key = self.keys.puretext(&code);

        ctx.run(self.blobs.put(
            &content_key,
            content.rendered.into_bytes(),
            self.keys.html_type(),
        ))
        .await?;

        if let Err(err) = ctx
            .run(self.blobs.put(
                &puretext_key,
                content.plain.into_bytes(),
                self.keys.text_type(),
            ))
            .await
        {
            tracing::warn!(code = %code, error = %err, "Plain text overwrite failed, restoring rendered blob");
            drop(self.tasks.spawn(
                "article.update.restore_rendered",
                self.compensation_timeout,
                restore_blobs(
                    self.blobs.clone(),
                    vec![(content_key, previous.rendered, self.keys.html_type().to_string())],
                ),
            ));
            return Err(err);
        }

        if let Err(err) = ctx.run(self.dao.update_by_code(row)).await {
            tracing::warn!(code = %code, error = %err, "Article row update failed, restoring both blobs");
            drop(self.tasks.spawn(
                "article.update.restore_both",
                self.compensation_timeout,
                restore_blobs(
                    self.blobs.clone(),
                    vec![
                        (content_key, previous.rendered, self.keys.html_type().to_string()),
                        (puretext_key, previous.plain, self.keys.text_type().to_string()),
                    ],
                ),
            ));
            return Err(err);
        }

        Ok(())
    }

    /// 論理削除。Blob は残す（孤児は許容されたコスト）
    pub async fn soft_delete(&self, ctx: &RequestContext, code: &ArticleCode) -> Result<(), WikiError> {
        ctx.run(self.dao.soft_delete(code)).await
    }

    pub async fn get_by_code(
        &self,
        ctx: &RequestContext,
        code: &ArticleCode,
    ) -> Result<Article, WikiError> {
        let record = ctx.run(self.dao.get_by_code(code)).await?;
        Ok(self.with_content(record).await)
    }

    pub async fn get_by_code_and_user(
        &self,
        ctx: &RequestContext,
        code: &ArticleCode,
        uid: i64,
    ) -> Result<Article, WikiError> {
        let record = ctx.run(self.dao.get_by_code_and_user(code, uid)).await?;
        Ok(self.with_content(record).await)
    }

    pub async fn page_by_user(
        &self,
        ctx: &RequestContext,
        uid: i64,
        offset: usize,
        size: usize,
    ) -> Result<Page<Article>, WikiError> {
        let page = ctx.run(self.dao.page_by_user(uid, offset, size)).await?;
        Ok(self.with_contents(page).await)
    }

    pub async fn pages(
        &self,
        ctx: &RequestContext,
        offset: usize,
        size: usize,
    ) -> Result<Page<Article>, WikiError> {
        let page = ctx.run(self.dao.pages(offset, size)).await?;
        Ok(self.with_contents(page).await)
    }

    /// ホット一覧。行のページだけをキャッシュする（TTL の範囲で古くてよい）
    pub async fn pages_by_hot(
        &self,
        ctx: &RequestContext,
        offset: usize,
        size: usize,
    ) -> Result<Page<Article>, WikiError> {
        let key = format!("article:hot:{offset}:{size}");
        let page = self
            .hot_pages
            .get_or_load(key, || async {
                ctx.run(self.dao.pages_by_hot(offset, size)).await
            })
            .await?;
        Ok(self.with_contents(page).await)
    }

    async fn with_contents(&self, page: Page<ArticleRecord>) -> Page<Article> {
        let mut items = Vec::with_capacity(page.items.len());
        for record in page.items {
            items.push(self.with_content(record).await);
        }
        Page {
            items,
            total: page.total,
        }
    }

    async fn with_content(&self, record: ArticleRecord) -> Article {
        let content_key = self.keys.content(&record.unique_code);
        let puretext_key = self.keys.puretext(&record.unique_code);
        let (rendered, plain) = tokio::join!(
            self.read_text(&content_key),
            self.read_text(&puretext_key)
        );
        Article::assemble(record, ArticleContent { rendered, plain })
    }

    async fn read_text(&self, key: &str) -> String {
        match self.blobs.get(key).await {
            Ok(bytes) => String::from_utf8(bytes).unwrap_or_else(|e| {
                tracing::warn!(key = %key, "Blob is not valid UTF-8, decoding lossily");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }),
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Failed to read article blob");
                String::new()
            }
        }
    }
}

/// すべてのキーの削除を試み、失敗があればまとめて返す
async fn remove_blobs(blobs: Arc<dyn BlobStore>, keys: Vec<String>) -> Result<(), StoreError> {
    let mut failed = Vec::new();
    for key in keys {
        if let Err(e) = blobs.delete(&key).await {
            tracing::warn!(key = %key, error = %e, "Compensating delete failed");
            failed.push(key);
        }
    }
    if failed.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Unavailable(format!("could not remove {}", failed.join(", "))))
    }
}

/// 各 Blob を旧値へ書き戻す（キー, 旧値, content type）
async fn restore_blobs(
    blobs: Arc<dyn BlobStore>,
    previous: Vec<(String, String, String)>,
) -> Result<(), StoreError> {
    let mut failed = Vec::new();
    for (key, value, content_type) in previous {
        if let Err(e) = blobs.put(&key, value.into_bytes(), &content_type).await {
            tracing::warn!(key = %key, error = %e, "Compensating restore failed");
            failed.push(key);
        }
    }
    if failed.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Unavailable(format!("could not restore {}", failed.join(", "))))
    }
}
