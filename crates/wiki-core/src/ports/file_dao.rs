//! FileDao port - ファイルのメタデータと所有者

use async_trait::async_trait;

use crate::domain::{File, NewFile};
use crate::ports::StoreError;

#[async_trait]
pub trait FileDao: Send + Sync {
    /// md5 の重複は `StoreError::Duplicate`
    async fn insert_file(&self, file: NewFile) -> Result<File, StoreError>;

    /// md5 のファイルを `uid` の所有にする
    ///
    /// ファイルがなければ `NotFound`。すでに所有していれば何もせずファイルを返す。
    async fn insert_owner(&self, uid: i64, md5: &str) -> Result<File, StoreError>;

    async fn get_by_md5(&self, md5: &str) -> Result<File, StoreError>;
}
