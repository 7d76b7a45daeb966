//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（RDB, Redis, Blob storage など）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - RDB が source of truth（正本）
//! - Blob storage は記事本文の保存先（RDB とのトランザクションはない）
//! - Cache は副経路（失敗しても正本の読み書きは失敗させない）

pub mod store_error;
pub mod blob_store;
pub mod cache;
pub mod article_dao;
pub mod team_dao;
pub mod user_dao;
pub mod repo_dao;
pub mod book_dao;
pub mod good_dao;
pub mod file_dao;
pub mod clock;
pub mod code_generator;

// 主要な trait を再エクスポート
pub use self::store_error::StoreError;
pub use self::blob_store::BlobStore;
pub use self::cache::{Cache, CacheError};
pub use self::article_dao::{ArticleDao, ArticleRow};
pub use self::team_dao::{TeamDao, TeamRow};
pub use self::user_dao::UserDao;
pub use self::repo_dao::{RepoDao, RepoRow};
pub use self::book_dao::BookDao;
pub use self::good_dao::GoodDao;
pub use self::file_dao::FileDao;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::code_generator::{CodeGenerator, DEFAULT_CODE_BYTES, RandomHexGenerator};
