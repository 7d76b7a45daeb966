//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **ArticleRepository**: 記事の Blob + RDB 書き込み調整（補償付き）
//! - **CacheAside**: 読み出しスルーと無効化のプロトコル
//! - **UserRepository / TeamRepository / RepoRepository / FileRepository**: CacheAside を使う各エンティティ
//! - **BackgroundTasks**: 補償とキャッシュ副作用の切り離しタスク
//! - **各 Service**: code の発行と、リクエストハンドラが呼ぶ入り口

pub mod article_repository;
pub mod article_service;
pub mod background;
pub mod book_service;
pub mod builder;
pub mod cache_aside;
pub mod context;
pub mod file_repository;
pub mod file_service;
pub mod good_service;
pub mod repo_repository;
pub mod repo_service;
pub mod team_repository;
pub mod team_service;
pub mod user_repository;
pub mod user_service;

// 主要な型を再エクスポート
pub use self::article_repository::{ArticleRepository, BlobKeys};
pub use self::article_service::ArticleService;
pub use self::background::{BackgroundTasks, TaskOutcome};
pub use self::book_service::BookService;
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::cache_aside::CacheAside;
pub use self::context::RequestContext;
pub use self::file_repository::FileRepository;
pub use self::file_service::FileService;
pub use self::good_service::GoodService;
pub use self::repo_repository::{HOT_REPO_LIMIT, RepoRepository};
pub use self::repo_service::RepoService;
pub use self::team_repository::TeamRepository;
pub use self::team_service::{BasicTeamService, RetryableTeamService, TeamService};
pub use self::user_repository::UserRepository;
pub use self::user_service::UserService;
