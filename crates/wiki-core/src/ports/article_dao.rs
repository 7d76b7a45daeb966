//! ArticleDao port - 記事メタデータの正本（RDB）
//!
//! 本文は保持しない。本文は BlobStore 側に `unique_code` をキーとして置かれる。

use async_trait::async_trait;

use crate::domain::{ArticleCode, ArticleRecord, Page, RepoCode};
use crate::ports::StoreError;

/// 書き込み用の行（id とタイムスタンプは DAO 側で採番する）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRow {
    pub unique_code: ArticleCode,
    pub title: String,
    pub private: bool,
    pub state: u8,
    pub repo_code: RepoCode,
    pub author_id: i64,
    pub category_id: i64,
}

/// ArticleDao は記事行を管理
///
/// # 設計原則
/// - unique_code の重複は `StoreError::Duplicate`
/// - 論理削除済みの行も code を占有し続ける（`exists_code` も true を返す）
/// - 論理削除済みの行はすべての読み出しから除外される
/// - 公開一覧（pages, pages_by_hot）は private な記事を含まない
#[async_trait]
pub trait ArticleDao: Send + Sync {
    async fn insert(&self, row: ArticleRow) -> Result<i64, StoreError>;

    /// code がすでに使われているか（論理削除済みの行を含む）
    async fn exists_code(&self, code: &ArticleCode) -> Result<bool, StoreError>;

    /// title / state / private / category のみ更新する
    async fn update_by_code(&self, row: ArticleRow) -> Result<(), StoreError>;

    async fn get_by_code(&self, code: &ArticleCode) -> Result<ArticleRecord, StoreError>;

    async fn get_by_code_and_user(
        &self,
        code: &ArticleCode,
        uid: i64,
    ) -> Result<ArticleRecord, StoreError>;

    async fn page_by_user(
        &self,
        uid: i64,
        offset: usize,
        size: usize,
    ) -> Result<Page<ArticleRecord>, StoreError>;

    async fn pages(&self, offset: usize, size: usize) -> Result<Page<ArticleRecord>, StoreError>;

    /// like 数の降順
    async fn pages_by_hot(
        &self,
        offset: usize,
        size: usize,
    ) -> Result<Page<ArticleRecord>, StoreError>;

    async fn soft_delete(&self, code: &ArticleCode) -> Result<(), StoreError>;
}
