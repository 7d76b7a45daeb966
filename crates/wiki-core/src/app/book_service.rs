//! BookService - 書籍のダウンロード数
//!
//! カウンタ更新は BookDao の行ロックに任せる。キャッシュは使わない。

use std::sync::Arc;

use crate::app::RequestContext;
use crate::domain::{Book, WikiError};
use crate::ports::BookDao;

pub struct BookService {
    dao: Arc<dyn BookDao>,
}

impl BookService {
    pub fn new(dao: Arc<dyn BookDao>) -> Self {
        Self { dao }
    }

    pub async fn add(&self, ctx: &RequestContext, name: &str, url: &str) -> Result<i64, WikiError> {
        ctx.run(self.dao.insert(name, url)).await
    }

    pub async fn get(&self, ctx: &RequestContext, id: i64) -> Result<Book, WikiError> {
        ctx.run(self.dao.get(id)).await
    }

    /// ダウンロード数を 1 増やし、ダウンロード先の行を返す
    pub async fn download(&self, ctx: &RequestContext, id: i64) -> Result<Book, WikiError> {
        let book = ctx.run(self.dao.increment_download(id)).await?;
        tracing::debug!(book_id = id, download = book.download, "Counted download");
        Ok(book)
    }
}
