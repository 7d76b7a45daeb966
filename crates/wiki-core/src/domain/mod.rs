//! Domain model (codes, articles, teams, users, repos, errors).
//!
//! - codes: 外部公開される unique code（エンティティ種別ごとに型が分かれる）
//! - article: 記事の行・本文・一覧
//! - team / user / repo / book / file: キャッシュされる各エンティティ
//! - good: 記事へのいいね履歴
//! - errors: 呼び出し側へ返るエラーと分類

pub mod article;
pub mod book;
pub mod codes;
pub mod errors;
pub mod file;
pub mod good;
pub mod repo;
pub mod team;
pub mod user;

pub use self::article::{
    Article, ArticleContent, ArticleDraft, ArticleRecord, Author, Category,
    EMPTY_DESC_PLACEHOLDER, Page,
};
pub use self::book::Book;
pub use self::codes::{ArticleCode, CodeMarker, RepoCode, TeamCode, UniqueCode};
pub use self::errors::{ErrorKind, WikiError};
pub use self::file::{File, IMAGE_EXTENSIONS, NewFile};
pub use self::good::GoodHistory;
pub use self::repo::{NewRepo, Repo, RepoStatus};
pub use self::team::{NewTeam, Team, TeamMember, TeamStatus};
pub use self::user::{ProfileUpdate, User};
