//! CacheAside - 読み出しスルー + ベストエフォートの無効化
//!
//! # プロトコル
//! - 読み出し: キャッシュ → (miss / 障害) → 正本 → 非同期に投入
//! - 書き込み: 正本を更新した後にエントリを削除する（上書きはしない）
//! - double-delete: 即時削除に加えて、遅延させた 2 回目の削除を予約する
//! - コレクション: hash のフィールド単位で追加・削除。exists で「空だが存在」を区別
//!
//! キャッシュのエラーは一切呼び出し元へ返さない。すべての呼び出し箇所で
//! 明示的にログへ落として捨てる。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::app::BackgroundTasks;
use crate::domain::WikiError;
use crate::ports::{Cache, CacheError};

#[derive(Clone)]
pub struct CacheAside {
    cache: Arc<dyn Cache>,
    tasks: BackgroundTasks,
    ttl: Duration,
    task_deadline: Duration,
}

impl CacheAside {
    pub fn new(
        cache: Arc<dyn Cache>,
        tasks: BackgroundTasks,
        ttl: Duration,
        task_deadline: Duration,
    ) -> Self {
        Self {
            cache,
            tasks,
            ttl,
            task_deadline,
        }
    }

    /// キャッシュにあればそれを、なければ `load` で正本から読み、非同期に投入する
    ///
    /// キャッシュ上の値の鮮度は TTL 以外では確認しない。
    pub async fn get_or_load<V, F, Fut>(&self, key: String, load: F) -> Result<V, WikiError>
    where
        V: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, WikiError>>,
    {
        if let Some(value) = self.lookup(&key).await {
            return Ok(value);
        }
        let value = load().await?;
        self.populate(key, &value);
        Ok(value)
    }

    /// 投げっぱなしの投入
    pub fn populate<V: Serialize>(&self, key: String, value: &V) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to encode cache entry, skipping");
                return;
            }
        };
        let cache = self.cache.clone();
        let ttl = self.ttl;
        drop(self.tasks.spawn("cache.populate", self.task_deadline, async move {
            cache.set(&key, bytes, ttl).await
        }));
    }

    /// 正本への書き込み成功後に呼ぶ
    pub async fn invalidate(&self, key: &str) {
        if let Err(e) = self.cache.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Failed to invalidate cache entry");
        }
    }

    /// `delay` 後にもう一度削除する
    pub fn invalidate_later(&self, key: String, delay: Duration) {
        let cache = self.cache.clone();
        drop(self.tasks.spawn_after(
            "cache.invalidate_delayed",
            delay,
            self.task_deadline,
            async move { cache.delete(&key).await },
        ));
    }

    /// double-delete: 即時の削除と、遅延させた 2 回目の削除
    ///
    /// 正本の更新と 1 回目の削除の間に、並行する読み手が古い値を投入する競合を塞ぐ。
    pub async fn invalidate_twice(&self, key: String, delay: Duration) {
        self.invalidate_later(key.clone(), delay);
        self.invalidate(&key).await;
    }

    /// hash コレクション版の get_or_load
    ///
    /// キーが存在すれば（空でも）キャッシュの内容を返す。
    pub async fn get_set_or_load<V, F, Fut, K>(
        &self,
        key: String,
        field_of: K,
        load: F,
    ) -> Result<Vec<V>, WikiError>
    where
        V: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<V>, WikiError>>,
        K: Fn(&V) -> String,
    {
        if let Some(values) = self.lookup_set(&key).await {
            return Ok(values);
        }
        let values = load().await?;
        self.add_to_set(key, &values, field_of);
        Ok(values)
    }

    /// コレクションに要素を追加する（全体は書き直さない）
    pub fn add_to_set<V, K>(&self, key: String, values: &[V], field_of: K)
    where
        V: Serialize,
        K: Fn(&V) -> String,
    {
        let mut fields = Vec::with_capacity(values.len());
        for value in values {
            match serde_json::to_vec(value) {
                Ok(bytes) => fields.push((field_of(value), bytes)),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Failed to encode cache set member, skipping")
                }
            }
        }
        let cache = self.cache.clone();
        let ttl = self.ttl;
        drop(self.tasks.spawn("cache.set_add", self.task_deadline, async move {
            cache.hset_many(&key, fields, ttl).await
        }));
    }

    /// コレクションから 1 要素だけ取り除く
    pub fn remove_from_set(&self, key: String, field: String) {
        let cache = self.cache.clone();
        drop(self.tasks.spawn("cache.set_remove", self.task_deadline, async move {
            cache.hdel(&key, &field).await
        }));
    }

    async fn lookup<V: DeserializeOwned>(&self, key: &str) -> Option<V> {
        match self.cache.get(key).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Undecodable cache entry, treating as miss");
                    None
                }
            },
            Err(CacheError::Miss) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, falling back to store");
                None
            }
        }
    }

    async fn lookup_set<V: DeserializeOwned>(&self, key: &str) -> Option<Vec<V>> {
        match self.cache.exists(key).await {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache exists check failed, falling back to store");
                return None;
            }
        }

        let raw = match self.cache.hget_all(key).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, falling back to store");
                return None;
            }
        };

        let mut fields: Vec<(String, Vec<u8>)> = raw.into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        let mut values = Vec::with_capacity(fields.len());
        for (field, bytes) in fields {
            match serde_json::from_slice(&bytes) {
                Ok(value) => values.push(value),
                Err(e) => {
                    tracing::warn!(key = %key, field = %field, error = %e, "Undecodable cache set member, skipping")
                }
            }
        }
        Some(values)
    }
}
