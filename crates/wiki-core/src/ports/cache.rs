//! Cache port - 揮発性のキャッシュ（Redis または InMemory）
//!
//! キャッシュは副経路に過ぎない。正本は常に RDB。

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// CacheError は呼び出し側に決して伝播しない
///
/// 利用側はすべての呼び出しでこのエラーを明示的に捨てる（ログのみ）。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache miss")]
    Miss,

    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("cache payload codec error: {0}")]
    Codec(String),
}

/// Cache は TTL 付きの key/value と、hash 形式のコレクションを提供
///
/// # 設計原則
/// - set は必ず TTL を伴う
/// - hash はフィールド単位で追加・削除できる（全体の書き直し不要）
/// - exists で「空だが存在する」と「存在しない」を区別できる
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Vec<u8>, CacheError>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// hash にフィールドを追加（既存フィールドは上書き）。TTL は hash 全体に掛かる。
    async fn hset_many(
        &self,
        key: &str,
        fields: Vec<(String, Vec<u8>)>,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    async fn hget_all(&self, key: &str) -> Result<HashMap<String, Vec<u8>>, CacheError>;

    async fn hdel(&self, key: &str, field: &str) -> Result<(), CacheError>;
}
