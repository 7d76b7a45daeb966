//! InMemoryCache - 開発用のキャッシュ（Redis の代替）
//!
//! # 実装詳細
//! - 文字列値と hash の 2 種類のエントリ
//! - 期限切れは読み出し時に判定して捨てる（lazy expiration）
//! - `set_available(false)` で Redis 停止を模擬できる

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::ports::{Cache, CacheError};

#[derive(Debug, Clone)]
enum Value {
    Bytes(Vec<u8>),
    Hash(HashMap<String, Vec<u8>>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    available: AtomicBool,
    deletes: AtomicUsize,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            deletes: AtomicUsize::new(0),
        }
    }

    /// false にすると以降のすべての操作が `CacheError::Unavailable` を返す
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// 有効期限内のエントリがあるか（障害状態に関係なく覗く）
    pub async fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .get(key)
            .is_some_and(|entry| entry.is_live(now))
    }

    /// 成功した delete の累計回数（double-delete の検証用）
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), CacheError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        self.check_available()?;
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get(key) else {
            return Err(CacheError::Miss);
        };
        if !entry.is_live(now) {
            entries.remove(key);
            return Err(CacheError::Miss);
        }
        match &entry.value {
            Value::Bytes(bytes) => Ok(bytes.clone()),
            Value::Hash(_) => Err(CacheError::Codec(format!("{key} holds a hash"))),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.check_available()?;
        let entry = Entry {
            value: Value::Bytes(value),
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.check_available()?;
        self.entries.lock().await.remove(key);
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.check_available()?;
        Ok(self.contains(key).await)
    }

    async fn hset_many(
        &self,
        key: &str,
        fields: Vec<(String, Vec<u8>)>,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.check_available()?;
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let entry = entries
            .entry(key.to_string())
            .and_modify(|entry| {
                if !entry.is_live(now) {
                    entry.value = Value::Hash(HashMap::new());
                }
            })
            .or_insert_with(|| Entry {
                value: Value::Hash(HashMap::new()),
                expires_at: now,
            });

        let Value::Hash(hash) = &mut entry.value else {
            return Err(CacheError::Codec(format!("{key} is not a hash")));
        };
        hash.extend(fields);
        entry.expires_at = now + ttl;
        Ok(())
    }

    async fn hget_all(&self, key: &str) -> Result<HashMap<String, Vec<u8>>, CacheError> {
        self.check_available()?;
        let now = Instant::now();
        match self.entries.lock().await.get(key) {
            Some(entry) if entry.is_live(now) => match &entry.value {
                Value::Hash(hash) => Ok(hash.clone()),
                Value::Bytes(_) => Err(CacheError::Codec(format!("{key} is not a hash"))),
            },
            _ => Ok(HashMap::new()),
        }
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<(), CacheError> {
        self.check_available()?;
        if let Some(Entry {
            value: Value::Hash(hash),
            ..
        }) = self.entries.lock().await.get_mut(key)
        {
            hash.remove(field);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn set_then_get() {
        let cache = InMemoryCache::new();
        cache.set("user:info:1", b"{}".to_vec(), TTL).await.unwrap();
        assert_eq!(cache.get("user:info:1").await.unwrap(), b"{}".to_vec());
    }

    #[tokio::test]
    async fn entries_expire() {
        let cache = InMemoryCache::new();
        cache
            .set("k", vec![1], Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get("k").await, Err(CacheError::Miss));
        assert!(!cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn emptied_hash_still_exists() {
        let cache = InMemoryCache::new();
        cache
            .hset_many("team:members:t", vec![("1".into(), vec![1])], TTL)
            .await
            .unwrap();
        cache.hdel("team:members:t", "1").await.unwrap();

        assert!(cache.exists("team:members:t").await.unwrap());
        assert!(cache.hget_all("team:members:t").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn hdel_on_missing_key_does_not_create_it() {
        let cache = InMemoryCache::new();
        cache.hdel("team:members:none", "1").await.unwrap();
        assert!(!cache.exists("team:members:none").await.unwrap());
    }

    #[tokio::test]
    async fn unavailable_cache_rejects_everything() {
        let cache = InMemoryCache::new();
        cache.set_available(false);
        assert!(matches!(
            cache.get("k").await,
            Err(CacheError::Unavailable(_))
        ));
        assert!(cache.set("k", vec![], TTL).await.is_err());
        assert!(cache.delete("k").await.is_err());
    }
}
