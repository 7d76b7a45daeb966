//! BlobStore port - オブジェクトストレージ（MinIO/S3 など）
//!
//! キーは `<purpose>/<unique-code>` 形式の文字列。
//! 検索機能はなく、キー指定の get/put/delete のみ。

use async_trait::async_trait;

use crate::ports::StoreError;

/// BlobStore は記事本文などの大きなデータを保存
///
/// # 設計原則
/// - RDB とのトランザクションは存在しない（整合性は呼び出し側の補償で保つ）
/// - put は同じキーへの上書き
/// - 存在しないキーの get は `StoreError::NotFound`
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// 存在しないキーの削除は成功扱い
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
