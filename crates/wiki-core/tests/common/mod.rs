//! 統合テスト共通: インメモリのストアで App を組み立てる

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use wiki_core::app::{App, AppBuilder, RequestContext};
use wiki_core::config::WikiConfig;
use wiki_core::domain::{
    ArticleContent, ArticleDraft, Author, Category, RepoCode, RepoStatus,
};
use wiki_core::impls::{
    DEFAULT_CATEGORY_ID, FixedCodes, InMemoryBlobStore, InMemoryCache, InMemoryRelationalStore,
};
use wiki_core::ports::RepoRow;

pub struct Harness {
    pub app: App,
    pub store: Arc<InMemoryRelationalStore>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub cache: Arc<InMemoryCache>,
}

/// テスト向けに短くした締め切りと遅延
pub fn fast_config() -> WikiConfig {
    let mut config = WikiConfig::default();
    config.consistency.compensation_timeout_ms = 200;
    config.consistency.invalidation_delay_ms = 30;
    config
}

pub fn harness(config: WikiConfig, codes: Option<FixedCodes>) -> Harness {
    let store = Arc::new(InMemoryRelationalStore::new());
    let blobs = Arc::new(InMemoryBlobStore::new());
    let cache = Arc::new(InMemoryCache::new());
    let mut builder = AppBuilder::new()
        .config(config)
        .blob_store(blobs.clone())
        .cache(cache.clone())
        .relational(store.clone());
    if let Some(codes) = codes {
        builder = builder.code_generator(Arc::new(codes));
    }
    Harness {
        app: builder.build().unwrap(),
        store,
        blobs,
        cache,
    }
}

impl Harness {
    /// 利用者と、その利用者の知識庫を 1 つ作る（code は `code` 固定）
    pub async fn seed_repo(&self, code: &str, status: RepoStatus) -> (i64, RepoCode) {
        let ctx = RequestContext::background();
        let uid = self
            .app
            .users
            .register(&ctx, &format!("owner-{code}"), "hash")
            .await
            .unwrap();
        let repo = self
            .app
            .repo_repository
            .insert_repo(
                &ctx,
                RepoRow {
                    unique_code: RepoCode::parse(code).unwrap(),
                    name: "notes".into(),
                    desc: String::new(),
                    status,
                    category: default_category(),
                    is_doc: true,
                    team_id: 0,
                    creator_id: uid,
                },
            )
            .await
            .unwrap();
        self.app.tasks.wait_idle().await;
        (uid, repo.unique_code)
    }
}

pub fn default_category() -> Category {
    Category {
        id: DEFAULT_CATEGORY_ID,
        name: "default".into(),
    }
}

/// `code` が空なら新規作成の下書き
pub fn draft(code: &str, repo: &RepoCode, uid: i64, rendered: &str, plain: &str) -> ArticleDraft {
    ArticleDraft {
        unique_code: code.to_string(),
        title: "title".into(),
        content: ArticleContent::new(rendered, plain),
        repo_code: repo.clone(),
        author: Author {
            id: uid,
            ..Author::default()
        },
        category: default_category(),
        state: 0,
        private: false,
    }
}

pub const HTML: &str = "text/html;charset=utf-8";
pub const TEXT: &str = "text/plain;charset=utf-8";

pub const SHORT: Duration = Duration::from_millis(20);
