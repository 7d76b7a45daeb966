//! InMemoryBlobStore - 開発用のオブジェクトストレージ
//!
//! # 学習ポイント
//! - tokio::sync::Mutex による排他制御（ロックを await 跨ぎで保持しない）
//! - FaultInjector による障害注入（補償処理のテスト用）

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::impls::FaultInjector;
use crate::ports::{BlobStore, StoreError};

/// 保存されたオブジェクト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// InMemoryBlobStore は開発用の BlobStore
///
/// 操作名: `put`, `get`, `delete`（FaultInjector のキー）
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    objects: Mutex<HashMap<String, StoredBlob>>,
    faults: FaultInjector,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.lock().await.contains_key(key)
    }

    /// 障害注入を経由せずに中身を覗く（テスト・検証用）
    pub async fn peek(&self, key: &str) -> Option<StoredBlob> {
        self.objects.lock().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.lock().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        self.faults.enter("put", key).await?;
        self.objects.lock().await.insert(
            key.to_string(),
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.faults.enter("get", key).await?;
        self.objects
            .lock()
            .await
            .get(key)
            .map(|blob| blob.bytes.clone())
            .ok_or_else(|| StoreError::NotFound(format!("blob {key}")))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.faults.enter("delete", key).await?;
        self.objects.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete() {
        let store = InMemoryBlobStore::new();
        store.put("content/a", b"<p>hi</p>".to_vec(), "text/html").await.unwrap();

        assert_eq!(store.get("content/a").await.unwrap(), b"<p>hi</p>".to_vec());
        assert_eq!(store.peek("content/a").await.unwrap().content_type, "text/html");

        store.delete("content/a").await.unwrap();
        assert!(store.get("content/a").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn deleting_a_missing_key_succeeds() {
        let store = InMemoryBlobStore::new();
        assert!(store.delete("content/none").await.is_ok());
    }

    #[tokio::test]
    async fn injected_put_failure_leaves_nothing_behind() {
        let store = InMemoryBlobStore::new();
        store
            .faults()
            .fail_next("put", StoreError::Unavailable("disk".into()));

        assert!(store.put("k", vec![1], "text/plain").await.is_err());
        assert!(!store.contains("k").await);
    }
}
