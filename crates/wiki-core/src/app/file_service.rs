//! FileService - アップロードの記録と画像の参照
//!
//! 同じ中身（md5）のファイルは 1 行だけ。2 人目以降は所有者の関連だけを足す。
//! ファイル本体の保存は呼び出し側の責務で、ここはメタデータだけを扱う。

use std::sync::Arc;

use crate::app::{FileRepository, RequestContext};
use crate::domain::{File, NewFile, WikiError};

pub struct FileService {
    files: Arc<FileRepository>,
}

impl FileService {
    pub fn new(files: Arc<FileRepository>) -> Self {
        Self { files }
    }

    /// アップロードを記録し、アップロードした利用者の所有にする
    pub async fn record_upload(&self, ctx: &RequestContext, file: NewFile) -> Result<File, WikiError> {
        let uid = file.uploader_id;
        let md5 = file.md5.clone();
        match self.files.get_by_md5(ctx, &md5).await {
            Ok(_) => {}
            Err(WikiError::NotFound(_)) => match self.files.insert_file(ctx, file).await {
                Ok(_) => {}
                // 同じ中身が同時に上がった。先に記録された行を使う
                Err(e) if e.is_constraint_violation() => {
                    tracing::debug!(md5 = %md5, "File recorded concurrently");
                }
                Err(e) => return Err(e),
            },
            Err(e) => return Err(e),
        }
        self.files.insert_owner(ctx, uid, &md5).await
    }

    /// 画像として配信できるファイル。画像でなければ `NotFound`
    pub async fn image(&self, ctx: &RequestContext, md5: &str) -> Result<File, WikiError> {
        let file = self.files.get_by_md5(ctx, md5).await?;
        if !file.is_image() {
            return Err(WikiError::NotFound(format!("image {md5}")));
        }
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{BackgroundTasks, CacheAside};
    use crate::domain::RepoCode;
    use crate::impls::{InMemoryCache, InMemoryRelationalStore};
    use std::time::Duration;

    fn service(store: Arc<InMemoryRelationalStore>) -> FileService {
        let aside = CacheAside::new(
            Arc::new(InMemoryCache::new()),
            BackgroundTasks::new(),
            Duration::from_secs(60),
            Duration::from_secs(1),
        );
        FileService::new(Arc::new(FileRepository::new(store, aside)))
    }

    fn upload(name: &str, typ: &str, md5: &str, uid: i64) -> NewFile {
        NewFile {
            name: name.into(),
            typ: typ.into(),
            md5: md5.into(),
            url: format!("files/{md5}.{typ}"),
            size: 100,
            dir_level: 0,
            repo_code: RepoCode::parse("r1").unwrap(),
            uploader_id: uid,
        }
    }

    #[tokio::test]
    async fn same_content_is_stored_once_and_shared() {
        let store = Arc::new(InMemoryRelationalStore::new());
        let files = service(store.clone());
        let ctx = RequestContext::background();

        let first = files.record_upload(&ctx, upload("a.png", "png", "m1", 1)).await.unwrap();
        let second = files.record_upload(&ctx, upload("b.png", "png", "m1", 2)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "a.png");
        assert_eq!(store.faults().calls("file.insert"), 1);
        assert_eq!(store.owned_file_count(1).await, 1);
        assert_eq!(store.owned_file_count(2).await, 1);
    }

    #[tokio::test]
    async fn only_images_are_served_as_images() {
        let store = Arc::new(InMemoryRelationalStore::new());
        let files = service(store);
        let ctx = RequestContext::background();
        files.record_upload(&ctx, upload("a.png", "png", "m1", 1)).await.unwrap();
        files.record_upload(&ctx, upload("b.pdf", "pdf", "m2", 1)).await.unwrap();

        assert_eq!(files.image(&ctx, "m1").await.unwrap().md5, "m1");
        assert!(matches!(files.image(&ctx, "m2").await, Err(WikiError::NotFound(_))));
        assert!(matches!(files.image(&ctx, "m3").await, Err(WikiError::NotFound(_))));
    }
}
