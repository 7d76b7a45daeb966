//! BookDao port - ダウンロードカウンタを持つ行
//!
//! 読んでから書き換える（read-modify-write）カウンタ更新は、
//! 行ロックを 1 トランザクションの間だけ保持して行う。
//! 悲観ロックが必要なのはこの箇所だけで、RDB の内部に閉じている。

use async_trait::async_trait;

use crate::domain::Book;
use crate::ports::StoreError;

#[async_trait]
pub trait BookDao: Send + Sync {
    async fn insert(&self, name: &str, url: &str) -> Result<i64, StoreError>;

    async fn get(&self, id: i64) -> Result<Book, StoreError>;

    /// 行ロックを取ってダウンロード数を 1 増やし、更新後の行を返す
    async fn increment_download(&self, id: i64) -> Result<Book, StoreError>;
}
