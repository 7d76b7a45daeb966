//! FileRepository - ファイル情報の cache-aside
//!
//! `file:md5:<md5>` に 1 件ずつ置く。記録した直後に非同期で温めておく。
//! ファイル情報は書き換えないので、無効化の経路はない。

use std::sync::Arc;

use crate::app::{CacheAside, RequestContext};
use crate::domain::{File, NewFile, WikiError};
use crate::ports::FileDao;

fn file_key(md5: &str) -> String {
    format!("file:md5:{md5}")
}

pub struct FileRepository {
    dao: Arc<dyn FileDao>,
    cache: CacheAside,
}

impl FileRepository {
    pub fn new(dao: Arc<dyn FileDao>, cache: CacheAside) -> Self {
        Self { dao, cache }
    }

    pub async fn insert_file(&self, ctx: &RequestContext, file: NewFile) -> Result<File, WikiError> {
        let file = ctx.run(self.dao.insert_file(file)).await?;
        self.cache.populate(file_key(&file.md5), &file);
        Ok(file)
    }

    pub async fn insert_owner(&self, ctx: &RequestContext, uid: i64, md5: &str) -> Result<File, WikiError> {
        ctx.run(self.dao.insert_owner(uid, md5)).await
    }

    pub async fn get_by_md5(&self, ctx: &RequestContext, md5: &str) -> Result<File, WikiError> {
        self.cache
            .get_or_load(file_key(md5), || ctx.run(self.dao.get_by_md5(md5)))
            .await
    }
}
