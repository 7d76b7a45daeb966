//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）: 必要な port が欠けていれば build() が失敗する
//! - decorator の合成: チーム作成のリトライは設定で有効なときだけ包む

use std::sync::Arc;

use crate::app::{
    ArticleRepository, ArticleService, BackgroundTasks, BasicTeamService, BlobKeys, BookService,
    CacheAside, FileRepository, FileService, GoodService, RepoRepository, RepoService,
    RetryableTeamService, TeamRepository, TeamService, UserRepository, UserService,
};
use crate::config::WikiConfig;
use crate::ports::{
    ArticleDao, BlobStore, BookDao, Cache, CodeGenerator, FileDao, GoodDao, RandomHexGenerator,
    RepoDao, TeamDao, UserDao,
};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let store = Arc::new(InMemoryRelationalStore::new());
/// let app = AppBuilder::new()
///     .config(config)
///     .blob_store(Arc::new(InMemoryBlobStore::new()))
///     .cache(Arc::new(InMemoryCache::new()))
///     .relational(store)
///     .build()?;
/// ```
#[derive(Default)]
pub struct AppBuilder {
    config: WikiConfig,
    blobs: Option<Arc<dyn BlobStore>>,
    cache: Option<Arc<dyn Cache>>,
    article_dao: Option<Arc<dyn ArticleDao>>,
    team_dao: Option<Arc<dyn TeamDao>>,
    user_dao: Option<Arc<dyn UserDao>>,
    repo_dao: Option<Arc<dyn RepoDao>>,
    book_dao: Option<Arc<dyn BookDao>>,
    good_dao: Option<Arc<dyn GoodDao>>,
    file_dao: Option<Arc<dyn FileDao>>,
    codes: Option<Arc<dyn CodeGenerator>>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing ports: {0:?}. These must be supplied before build().")]
    MissingPorts(Vec<&'static str>),
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: WikiConfig) -> Self {
        self.config = config;
        self
    }

    pub fn blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// すべての DAO をまとめて実装したストアを登録する
    pub fn relational<S>(mut self, store: Arc<S>) -> Self
    where
        S: ArticleDao + TeamDao + UserDao + RepoDao + BookDao + GoodDao + FileDao + 'static,
    {
        self.article_dao = Some(store.clone());
        self.team_dao = Some(store.clone());
        self.user_dao = Some(store.clone());
        self.repo_dao = Some(store.clone());
        self.book_dao = Some(store.clone());
        self.good_dao = Some(store.clone());
        self.file_dao = Some(store);
        self
    }

    /// 省略時は OS 乱数の RandomHexGenerator（`codes.byte_len` バイト）
    pub fn code_generator(mut self, codes: Arc<dyn CodeGenerator>) -> Self {
        self.codes = Some(codes);
        self
    }

    /// AppBuilder を検証して App を生成
    ///
    /// # 検証
    /// - BlobStore / Cache / 各 DAO がすべて登録されているかチェック
    /// - 不足があれば BuildError::MissingPorts を返す
    pub fn build(self) -> Result<App, BuildError> {
        let mut missing = Vec::new();
        if self.blobs.is_none() {
            missing.push("blob_store");
        }
        if self.cache.is_none() {
            missing.push("cache");
        }
        if self.article_dao.is_none()
            || self.team_dao.is_none()
            || self.user_dao.is_none()
            || self.repo_dao.is_none()
            || self.book_dao.is_none()
            || self.good_dao.is_none()
            || self.file_dao.is_none()
        {
            missing.push("relational");
        }

        let (
            Some(blobs),
            Some(cache),
            Some(article_dao),
            Some(team_dao),
            Some(user_dao),
            Some(repo_dao),
            Some(book_dao),
            Some(good_dao),
            Some(file_dao),
        ) = (
            self.blobs,
            self.cache,
            self.article_dao,
            self.team_dao,
            self.user_dao,
            self.repo_dao,
            self.book_dao,
            self.good_dao,
            self.file_dao,
        )
        else {
            return Err(BuildError::MissingPorts(missing));
        };

        let config = self.config;
        let codes = self
            .codes
            .unwrap_or_else(|| Arc::new(RandomHexGenerator::new(config.codes.byte_len)));
        let tasks = BackgroundTasks::new();
        let cache = CacheAside::new(
            cache,
            tasks.clone(),
            config.cache_ttl(),
            config.compensation_timeout(),
        );

        let article_repository = Arc::new(ArticleRepository::new(
            article_dao,
            blobs,
            BlobKeys::new(config.blob.clone()),
            tasks.clone(),
            config.compensation_timeout(),
            cache.clone(),
        ));
        let user_repository = Arc::new(UserRepository::new(
            user_dao,
            cache.clone(),
            config.invalidation_delay(),
        ));
        let team_repository = Arc::new(TeamRepository::new(team_dao, cache.clone()));
        let repo_repository = Arc::new(RepoRepository::new(repo_dao, cache.clone()));
        let file_repository = Arc::new(FileRepository::new(file_dao, cache));

        let basic_teams = BasicTeamService::new(team_repository.clone(), codes.clone());
        let teams: Arc<dyn TeamService> = if config.codes.team_retry_max > 0 {
            Arc::new(RetryableTeamService::new(
                basic_teams,
                config.codes.team_retry_max,
            ))
        } else {
            Arc::new(basic_teams)
        };

        tracing::debug!(
            team_retry_max = config.codes.team_retry_max,
            compensation_timeout_ms = config.consistency.compensation_timeout_ms,
            "Built application"
        );

        Ok(App {
            articles: ArticleService::new(
                article_repository.clone(),
                repo_repository.clone(),
                codes.clone(),
            ),
            teams,
            repos: RepoService::new(repo_repository.clone(), codes),
            users: UserService::new(user_repository.clone()),
            books: BookService::new(book_dao),
            goods: GoodService::new(good_dao),
            files: FileService::new(file_repository.clone()),
            article_repository,
            user_repository,
            team_repository,
            repo_repository,
            file_repository,
            tasks,
            config,
        })
    }
}

/// App は構築済みのサービス群
///
/// リクエストハンドラはサービスを使う。リポジトリは内部の読み書きを直接確かめたい
/// 呼び出し側（テストやバッチ）向けに公開している。
pub struct App {
    pub articles: ArticleService,
    pub teams: Arc<dyn TeamService>,
    pub repos: RepoService,
    pub users: UserService,
    pub books: BookService,
    pub goods: GoodService,
    pub files: FileService,
    pub article_repository: Arc<ArticleRepository>,
    pub user_repository: Arc<UserRepository>,
    pub team_repository: Arc<TeamRepository>,
    pub repo_repository: Arc<RepoRepository>,
    pub file_repository: Arc<FileRepository>,
    pub tasks: BackgroundTasks,
    pub config: WikiConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::RequestContext;
    use crate::domain::{NewTeam, TeamStatus, WikiError};
    use crate::impls::{FixedCodes, InMemoryBlobStore, InMemoryCache, InMemoryRelationalStore};
    use crate::ports::UserDao;

    fn builder_with(config: WikiConfig, codes: FixedCodes) -> (Arc<InMemoryRelationalStore>, AppBuilder) {
        let store = Arc::new(InMemoryRelationalStore::new());
        let builder = AppBuilder::new()
            .config(config)
            .blob_store(Arc::new(InMemoryBlobStore::new()))
            .cache(Arc::new(InMemoryCache::new()))
            .relational(store.clone())
            .code_generator(Arc::new(codes));
        (store, builder)
    }

    fn new_team() -> NewTeam {
        NewTeam {
            name: "core".into(),
            desc: String::new(),
            status: TeamStatus::AllAvailable,
            avatar_md5: String::new(),
        }
    }

    #[test]
    fn test_build_missing_ports() {
        let result = AppBuilder::new()
            .cache(Arc::new(InMemoryCache::new()))
            .build();
        assert!(matches!(
            result,
            Err(BuildError::MissingPorts(missing)) if missing == vec!["blob_store", "relational"]
        ));
    }

    #[tokio::test]
    async fn test_build_success() {
        let (_store, builder) = builder_with(WikiConfig::default(), FixedCodes::new(["a"]));
        assert!(builder.build().is_ok());
    }

    #[tokio::test]
    async fn test_team_retry_enabled_by_config() {
        let (store, builder) = builder_with(WikiConfig::default(), FixedCodes::new(["t1", "t1", "t2"]));
        let app = builder.build().unwrap();
        let ctx = RequestContext::background();
        let leader = UserDao::insert(store.as_ref(), "lead", "h").await.unwrap();

        app.teams.create(&ctx, &new_team(), leader).await.unwrap();
        let code = app.teams.create(&ctx, &new_team(), leader).await.unwrap();
        assert_eq!(code.as_str(), "t2");
    }

    #[tokio::test]
    async fn test_team_retry_disabled_with_zero_budget() {
        let mut config = WikiConfig::default();
        config.codes.team_retry_max = 0;
        let (store, builder) = builder_with(config, FixedCodes::new(["t1", "t1", "t2"]));
        let app = builder.build().unwrap();
        let ctx = RequestContext::background();
        let leader = UserDao::insert(store.as_ref(), "lead", "h").await.unwrap();

        app.teams.create(&ctx, &new_team(), leader).await.unwrap();
        let err = app.teams.create(&ctx, &new_team(), leader).await.unwrap_err();
        assert!(matches!(err, WikiError::ConstraintViolation(_)));
    }
}
