//! InMemoryRelationalStore - 開発用の RDB
//!
//! ArticleDao / TeamDao / UserDao / RepoDao / BookDao / GoodDao / FileDao をまとめて実装します。
//!
//! # 実装詳細
//! - テーブル全体を 1 つの tokio::sync::Mutex で守る（1 操作 = 1 トランザクション）
//! - unique 制約: article / repo / team の unique_code、user の username、
//!   file の md5、いいね履歴の (user_id, article_code)、所有者の (user_id, file_id)
//! - Book の行だけは行単位の Mutex を持ち、カウンタ更新で行ロックを取る
//!
//! 操作名（FaultInjector のキー）は `<table>.<op>` 形式。
//! 例: `article.insert`, `article.get`, `team.insert`, `user.get`, `book.increment`,
//! `good.insert`, `file.get`

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{
    ArticleCode, ArticleRecord, Author, Book, Category, File, GoodHistory, NewFile, Page,
    ProfileUpdate, Repo, RepoCode, Team, TeamCode, TeamMember, User,
};
use crate::impls::FaultInjector;
use crate::ports::{
    ArticleDao, ArticleRow, BookDao, Clock, FileDao, GoodDao, RepoDao, RepoRow, StoreError,
    SystemClock, TeamDao, TeamRow, UserDao,
};

/// 既定で存在するカテゴリ
pub const DEFAULT_CATEGORY_ID: i64 = 1;

#[derive(Debug, Clone)]
struct StoredArticle {
    id: i64,
    row: ArticleRow,
    like_cnt: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct StoredMember {
    id: i64,
    team_code: TeamCode,
    user_id: i64,
    is_leader: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    articles: Vec<StoredArticle>,
    users: HashMap<i64, User>,
    teams: Vec<Team>,
    members: Vec<StoredMember>,
    repos: Vec<Repo>,
    books: HashMap<i64, Arc<Mutex<Book>>>,
    goods: Vec<GoodHistory>,
    files: Vec<File>,
    /// (user_id, file_id)
    owners: HashSet<(i64, i64)>,
    categories: HashMap<i64, String>,
    next_id: i64,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn author(&self, uid: i64) -> Author {
        match self.users.get(&uid) {
            Some(user) => Author {
                id: user.id,
                name: user.username.clone(),
                avatar_md5: user.avatar_md5.clone(),
                profile: user.profile.clone(),
            },
            None => Author {
                id: uid,
                ..Author::default()
            },
        }
    }

    fn category(&self, id: i64) -> Category {
        Category {
            id,
            name: self.categories.get(&id).cloned().unwrap_or_default(),
        }
    }

    fn to_record(&self, stored: &StoredArticle) -> ArticleRecord {
        ArticleRecord {
            id: stored.id,
            unique_code: stored.row.unique_code.clone(),
            title: stored.row.title.clone(),
            like_cnt: stored.like_cnt,
            private: stored.row.private,
            state: stored.row.state,
            repo_code: stored.row.repo_code.clone(),
            author: self.author(stored.row.author_id),
            category: self.category(stored.row.category_id),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            deleted_at: stored.deleted_at,
        }
    }

    fn live_article(&self, code: &ArticleCode) -> Option<&StoredArticle> {
        self.articles
            .iter()
            .find(|a| &a.row.unique_code == code && a.deleted_at.is_none())
    }

    fn page<'a>(
        &self,
        rows: impl Iterator<Item = &'a StoredArticle>,
        offset: usize,
        size: usize,
    ) -> Page<ArticleRecord> {
        let rows: Vec<&StoredArticle> = rows.collect();
        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(offset)
            .take(size)
            .map(|a| self.to_record(a))
            .collect();
        Page { items, total }
    }
}

/// InMemoryRelationalStore は開発・テスト用の正本
pub struct InMemoryRelationalStore {
    tables: Mutex<Tables>,
    clock: Arc<dyn Clock>,
    faults: FaultInjector,
}

impl InMemoryRelationalStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let mut tables = Tables::default();
        tables
            .categories
            .insert(DEFAULT_CATEGORY_ID, "default".to_string());
        Self {
            tables: Mutex::new(tables),
            clock,
            faults: FaultInjector::new(),
        }
    }

    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    /// 記事行の件数（論理削除済みを含む）
    pub async fn article_row_count(&self) -> usize {
        self.tables.lock().await.articles.len()
    }

    /// `uid` が所有するファイルの件数
    pub async fn owned_file_count(&self, uid: i64) -> usize {
        self.tables
            .lock()
            .await
            .owners
            .iter()
            .filter(|(owner, _)| *owner == uid)
            .count()
    }
}

impl Default for InMemoryRelationalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleDao for InMemoryRelationalStore {
    async fn insert(&self, row: ArticleRow) -> Result<i64, StoreError> {
        self.faults
            .enter("article.insert", row.unique_code.as_str())
            .await?;
        let now = self.clock.now();
        let mut tables = self.tables.lock().await;
        // 論理削除済みの code も再利用しない
        if tables
            .articles
            .iter()
            .any(|a| a.row.unique_code == row.unique_code)
        {
            return Err(StoreError::Duplicate("article.unique_code".to_string()));
        }
        let id = tables.allocate_id();
        tables.articles.push(StoredArticle {
            id,
            row,
            like_cnt: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        });
        Ok(id)
    }

    async fn exists_code(&self, code: &ArticleCode) -> Result<bool, StoreError> {
        self.faults.enter("article.exists", code.as_str()).await?;
        let tables = self.tables.lock().await;
        Ok(tables.articles.iter().any(|a| &a.row.unique_code == code))
    }

    async fn update_by_code(&self, row: ArticleRow) -> Result<(), StoreError> {
        self.faults
            .enter("article.update", row.unique_code.as_str())
            .await?;
        let now = self.clock.now();
        let mut tables = self.tables.lock().await;
        let article = tables
            .articles
            .iter_mut()
            .find(|a| a.row.unique_code == row.unique_code && a.deleted_at.is_none())
            .ok_or_else(|| StoreError::NotFound(format!("article {}", row.unique_code)))?;

        article.row.title = row.title;
        article.row.state = row.state;
        article.row.private = row.private;
        article.row.category_id = row.category_id;
        article.updated_at = now;
        Ok(())
    }

    async fn get_by_code(&self, code: &ArticleCode) -> Result<ArticleRecord, StoreError> {
        self.faults.enter("article.get", code.as_str()).await?;
        let tables = self.tables.lock().await;
        tables
            .live_article(code)
            .map(|a| tables.to_record(a))
            .ok_or_else(|| StoreError::NotFound(format!("article {code}")))
    }

    async fn get_by_code_and_user(
        &self,
        code: &ArticleCode,
        uid: i64,
    ) -> Result<ArticleRecord, StoreError> {
        self.faults.enter("article.get", code.as_str()).await?;
        let tables = self.tables.lock().await;
        tables
            .live_article(code)
            .filter(|a| a.row.author_id == uid)
            .map(|a| tables.to_record(a))
            .ok_or_else(|| StoreError::NotFound(format!("article {code} of user {uid}")))
    }

    async fn page_by_user(
        &self,
        uid: i64,
        offset: usize,
        size: usize,
    ) -> Result<Page<ArticleRecord>, StoreError> {
        self.faults.enter("article.page", "").await?;
        let tables = self.tables.lock().await;
        let rows = tables
            .articles
            .iter()
            .rev()
            .filter(|a| a.deleted_at.is_none() && a.row.author_id == uid);
        Ok(tables.page(rows, offset, size))
    }

    async fn pages(&self, offset: usize, size: usize) -> Result<Page<ArticleRecord>, StoreError> {
        self.faults.enter("article.page", "").await?;
        let tables = self.tables.lock().await;
        let rows = tables
            .articles
            .iter()
            .rev()
            .filter(|a| a.deleted_at.is_none() && !a.row.private);
        Ok(tables.page(rows, offset, size))
    }

    async fn pages_by_hot(
        &self,
        offset: usize,
        size: usize,
    ) -> Result<Page<ArticleRecord>, StoreError> {
        self.faults.enter("article.page", "").await?;
        let tables = self.tables.lock().await;
        let mut rows: Vec<&StoredArticle> = tables
            .articles
            .iter()
            .filter(|a| a.deleted_at.is_none() && !a.row.private)
            .collect();
        // 同数なら新しい順
        rows.sort_by(|a, b| b.like_cnt.cmp(&a.like_cnt).then(b.id.cmp(&a.id)));
        Ok(tables.page(rows.into_iter(), offset, size))
    }

    async fn soft_delete(&self, code: &ArticleCode) -> Result<(), StoreError> {
        self.faults.enter("article.delete", code.as_str()).await?;
        let now = self.clock.now();
        let mut tables = self.tables.lock().await;
        let article = tables
            .articles
            .iter_mut()
            .find(|a| &a.row.unique_code == code && a.deleted_at.is_none())
            .ok_or_else(|| StoreError::NotFound(format!("article {code}")))?;
        article.deleted_at = Some(now);
        Ok(())
    }
}

#[async_trait]
impl TeamDao for InMemoryRelationalStore {
    async fn insert_team_and_member(
        &self,
        team: TeamRow,
        leader_uid: i64,
    ) -> Result<i64, StoreError> {
        self.faults
            .enter("team.insert", team.unique_code.as_str())
            .await?;
        let now = self.clock.now();
        let mut tables = self.tables.lock().await;
        if tables.teams.iter().any(|t| t.unique_code == team.unique_code) {
            return Err(StoreError::Duplicate("team.unique_code".to_string()));
        }

        // 両方の行をここで作るので、途中で失敗して片方だけ残ることはない
        let team_id = tables.allocate_id();
        let member_id = tables.allocate_id();
        tables.members.push(StoredMember {
            id: member_id,
            team_code: team.unique_code.clone(),
            user_id: leader_uid,
            is_leader: true,
            created_at: now,
        });
        tables.teams.push(Team {
            id: team_id,
            name: team.name,
            desc: team.desc,
            unique_code: team.unique_code,
            status: team.status,
            avatar_md5: team.avatar_md5,
            created_at: now,
            updated_at: now,
        });
        Ok(team_id)
    }

    async fn get_teams(&self, uid: i64) -> Result<Vec<Team>, StoreError> {
        self.faults.enter("team.list", "").await?;
        let tables = self.tables.lock().await;
        let teams = tables
            .teams
            .iter()
            .filter(|t| {
                tables
                    .members
                    .iter()
                    .any(|m| m.team_code == t.unique_code && m.user_id == uid)
            })
            .cloned()
            .collect();
        Ok(teams)
    }

    async fn get_by_code(&self, code: &TeamCode) -> Result<Team, StoreError> {
        self.faults.enter("team.get", code.as_str()).await?;
        self.tables
            .lock()
            .await
            .teams
            .iter()
            .find(|t| &t.unique_code == code)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("team {code}")))
    }

    async fn get_members(&self, code: &TeamCode) -> Result<Vec<TeamMember>, StoreError> {
        self.faults.enter("team.members", code.as_str()).await?;
        let tables = self.tables.lock().await;
        let members = tables
            .members
            .iter()
            .filter(|m| &m.team_code == code)
            .map(|m| TeamMember {
                id: m.id,
                user_id: m.user_id,
                name: tables.author(m.user_id).name,
                is_leader: m.is_leader,
                created_at: m.created_at,
            })
            .collect();
        Ok(members)
    }

    async fn delete_member(&self, code: &TeamCode, uid: i64) -> Result<u64, StoreError> {
        self.faults.enter("team.delete_member", code.as_str()).await?;
        let mut tables = self.tables.lock().await;
        let before = tables.members.len();
        tables
            .members
            .retain(|m| !(&m.team_code == code && m.user_id == uid && !m.is_leader));
        Ok((before - tables.members.len()) as u64)
    }
}

#[async_trait]
impl UserDao for InMemoryRelationalStore {
    async fn insert(&self, username: &str, password_hash: &str) -> Result<i64, StoreError> {
        self.faults.enter("user.insert", username).await?;
        let now = self.clock.now();
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(StoreError::Duplicate("user.username".to_string()));
        }
        let id = tables.allocate_id();
        tables.users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                avatar_md5: String::new(),
                profile: String::new(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<User, StoreError> {
        self.faults.enter("user.get", "").await?;
        self.tables
            .lock()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    async fn find_by_username(&self, username: &str) -> Result<User, StoreError> {
        self.faults.enter("user.get", username).await?;
        self.tables
            .lock()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {username}")))
    }

    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<(), StoreError> {
        self.faults.enter("user.update", "").await?;
        let now = self.clock.now();
        let mut tables = self.tables.lock().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))?;
        user.avatar_md5 = update.avatar_md5.clone();
        user.profile = update.profile.clone();
        user.updated_at = now;
        Ok(())
    }

    async fn update_password(
        &self,
        id: i64,
        old_hash: &str,
        new_hash: &str,
    ) -> Result<u64, StoreError> {
        self.faults.enter("user.update", "").await?;
        let now = self.clock.now();
        let mut tables = self.tables.lock().await;
        match tables.users.get_mut(&id) {
            Some(user) if user.password_hash == old_hash => {
                user.password_hash = new_hash.to_string();
                user.updated_at = now;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

#[async_trait]
impl RepoDao for InMemoryRelationalStore {
    async fn insert(&self, row: RepoRow) -> Result<Repo, StoreError> {
        self.faults
            .enter("repo.insert", row.unique_code.as_str())
            .await?;
        let now = self.clock.now();
        let mut tables = self.tables.lock().await;
        if tables.repos.iter().any(|r| r.unique_code == row.unique_code) {
            return Err(StoreError::Duplicate("repo.unique_code".to_string()));
        }
        let id = tables.allocate_id();
        let repo = Repo {
            id,
            name: row.name,
            desc: row.desc,
            unique_code: row.unique_code,
            status: row.status,
            category: row.category,
            is_doc: row.is_doc,
            team_id: row.team_id,
            creator_id: row.creator_id,
            like_cnt: 0,
            created_at: now,
            updated_at: now,
        };
        tables.repos.push(repo.clone());
        Ok(repo)
    }

    async fn get_by_code(&self, code: &RepoCode) -> Result<Repo, StoreError> {
        self.faults.enter("repo.get", code.as_str()).await?;
        self.tables
            .lock()
            .await
            .repos
            .iter()
            .find(|r| &r.unique_code == code)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("repo {code}")))
    }

    async fn get_by_user(&self, uid: i64, is_doc: bool) -> Result<Vec<Repo>, StoreError> {
        self.faults.enter("repo.list", "").await?;
        let tables = self.tables.lock().await;
        Ok(tables
            .repos
            .iter()
            .filter(|r| r.creator_id == uid && r.is_doc == is_doc)
            .cloned()
            .collect())
    }

    async fn get_by_team(&self, team_id: i64) -> Result<Vec<Repo>, StoreError> {
        self.faults.enter("repo.list", "").await?;
        let tables = self.tables.lock().await;
        Ok(tables
            .repos
            .iter()
            .filter(|r| r.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn get_hot(&self, is_doc: bool, limit: usize) -> Result<Vec<Repo>, StoreError> {
        self.faults.enter("repo.list", "").await?;
        let tables = self.tables.lock().await;
        let mut repos: Vec<Repo> = tables
            .repos
            .iter()
            .filter(|r| r.is_doc == is_doc && !r.status.is_private())
            .cloned()
            .collect();
        repos.sort_by(|a, b| b.like_cnt.cmp(&a.like_cnt).then(b.id.cmp(&a.id)));
        repos.truncate(limit);
        Ok(repos)
    }
}

#[async_trait]
impl BookDao for InMemoryRelationalStore {
    async fn insert(&self, name: &str, url: &str) -> Result<i64, StoreError> {
        self.faults.enter("book.insert", name).await?;
        let mut tables = self.tables.lock().await;
        let id = tables.allocate_id();
        let book = Book {
            id,
            name: name.to_string(),
            url: url.to_string(),
            download: 0,
        };
        tables.books.insert(id, Arc::new(Mutex::new(book)));
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Book, StoreError> {
        self.faults.enter("book.get", "").await?;
        let row = self.book_row(id).await?;
        let book = row.lock().await.clone();
        Ok(book)
    }

    async fn increment_download(&self, id: i64) -> Result<Book, StoreError> {
        self.faults.enter("book.increment", "").await?;
        let row = self.book_row(id).await?;

        // SELECT ... FOR UPDATE 相当: 行ロックはこのブロックの間だけ
        let mut locked = row.lock().await;
        let observed = locked.download;
        tokio::task::yield_now().await;
        locked.download = observed + 1;
        Ok(locked.clone())
    }
}

#[async_trait]
impl GoodDao for InMemoryRelationalStore {
    async fn insert_good(&self, code: &ArticleCode, uid: i64) -> Result<(), StoreError> {
        self.faults.enter("good.insert", code.as_str()).await?;
        let now = self.clock.now();
        let mut tables = self.tables.lock().await;
        let index = tables
            .articles
            .iter()
            .position(|a| &a.row.unique_code == code && a.deleted_at.is_none())
            .ok_or_else(|| StoreError::NotFound(format!("article {code}")))?;
        if tables
            .goods
            .iter()
            .any(|g| g.user_id == uid && &g.article_code == code)
        {
            return Err(StoreError::Duplicate("good_history.uid_article".to_string()));
        }

        let id = tables.allocate_id();
        tables.goods.push(GoodHistory {
            id,
            user_id: uid,
            article_code: code.clone(),
            created_at: now,
        });
        tables.articles[index].like_cnt += 1;
        Ok(())
    }

    async fn get_by_user_and_codes(
        &self,
        uid: i64,
        codes: &[ArticleCode],
    ) -> Result<Vec<GoodHistory>, StoreError> {
        self.faults.enter("good.list", "").await?;
        let tables = self.tables.lock().await;
        Ok(tables
            .goods
            .iter()
            .filter(|g| g.user_id == uid && codes.contains(&g.article_code))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FileDao for InMemoryRelationalStore {
    async fn insert_file(&self, file: NewFile) -> Result<File, StoreError> {
        self.faults.enter("file.insert", &file.md5).await?;
        let now = self.clock.now();
        let mut tables = self.tables.lock().await;
        if tables.files.iter().any(|f| f.md5 == file.md5) {
            return Err(StoreError::Duplicate("file.md5".to_string()));
        }
        let id = tables.allocate_id();
        let stored = File {
            id,
            name: file.name,
            typ: file.typ,
            md5: file.md5,
            url: file.url,
            size: file.size,
            dir_level: file.dir_level,
            repo_code: file.repo_code,
            uploader_id: file.uploader_id,
            created_at: now,
            updated_at: now,
        };
        tables.files.push(stored.clone());
        Ok(stored)
    }

    async fn insert_owner(&self, uid: i64, md5: &str) -> Result<File, StoreError> {
        self.faults.enter("file.owner", md5).await?;
        let mut tables = self.tables.lock().await;
        let file = tables
            .files
            .iter()
            .find(|f| f.md5 == md5)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("file {md5}")))?;
        // 所有済みなら unique 制約に当たるだけで、エラーにはしない
        tables.owners.insert((uid, file.id));
        Ok(file)
    }

    async fn get_by_md5(&self, md5: &str) -> Result<File, StoreError> {
        self.faults.enter("file.get", md5).await?;
        self.tables
            .lock()
            .await
            .files
            .iter()
            .find(|f| f.md5 == md5)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("file {md5}")))
    }
}

impl InMemoryRelationalStore {
    /// テーブルロックは行の取得だけに使い、行ロックの前に手放す
    async fn book_row(&self, id: i64) -> Result<Arc<Mutex<Book>>, StoreError> {
        self.tables
            .lock()
            .await
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("book {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RepoStatus, TeamStatus};
    use crate::ports::FixedClock;
    use chrono::TimeZone;

    fn article_row(code: &str, author_id: i64) -> ArticleRow {
        ArticleRow {
            unique_code: ArticleCode::parse(code).unwrap(),
            title: format!("title-{code}"),
            private: false,
            state: 0,
            repo_code: RepoCode::parse("repo1").unwrap(),
            author_id,
            category_id: DEFAULT_CATEGORY_ID,
        }
    }

    fn team_row(code: &str) -> TeamRow {
        TeamRow {
            unique_code: TeamCode::parse(code).unwrap(),
            name: "team".into(),
            desc: String::new(),
            status: TeamStatus::AllAvailable,
            avatar_md5: String::new(),
        }
    }

    #[tokio::test]
    async fn article_codes_are_unique_even_after_soft_delete() {
        let store = InMemoryRelationalStore::new();
        ArticleDao::insert(&store, article_row("a1", 1)).await.unwrap();
        store
            .soft_delete(&ArticleCode::parse("a1").unwrap())
            .await
            .unwrap();

        let err = ArticleDao::insert(&store, article_row("a1", 1))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Duplicate("article.unique_code".into()));
    }

    #[tokio::test]
    async fn soft_deleted_articles_are_invisible() {
        let store = InMemoryRelationalStore::new();
        let code = ArticleCode::parse("a1").unwrap();
        ArticleDao::insert(&store, article_row("a1", 1)).await.unwrap();
        store.soft_delete(&code).await.unwrap();

        assert!(ArticleDao::get_by_code(&store, &code).await.unwrap_err().is_not_found());
        assert_eq!(store.pages(0, 10).await.unwrap().total, 0);
        assert_eq!(store.article_row_count().await, 1);
    }

    #[tokio::test]
    async fn article_rows_join_author_and_category() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let store = InMemoryRelationalStore::with_clock(Arc::new(FixedClock::new(at)));
        let uid = UserDao::insert(&store, "alice", "h").await.unwrap();
        ArticleDao::insert(&store, article_row("a1", uid)).await.unwrap();

        let record = store
            .get_by_code_and_user(&ArticleCode::parse("a1").unwrap(), uid)
            .await
            .unwrap();
        assert_eq!(record.author.name, "alice");
        assert_eq!(record.category.name, "default");
        assert_eq!(record.created_at, at);
    }

    #[tokio::test]
    async fn hot_pages_are_ordered_by_likes() {
        let store = InMemoryRelationalStore::new();
        for code in ["a1", "a2", "a3"] {
            ArticleDao::insert(&store, article_row(code, 1)).await.unwrap();
        }
        let a1 = ArticleCode::parse("a1").unwrap();
        let a3 = ArticleCode::parse("a3").unwrap();
        for uid in 10..13 {
            store.insert_good(&a1, uid).await.unwrap();
        }
        store.insert_good(&a3, 10).await.unwrap();

        let page = store.pages_by_hot(0, 2).await.unwrap();
        let codes: Vec<&str> = page.items.iter().map(|r| r.unique_code.as_str()).collect();
        assert_eq!(codes, vec!["a1", "a3"]);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn second_like_by_the_same_user_changes_nothing() {
        let store = InMemoryRelationalStore::new();
        let code = ArticleCode::parse("a1").unwrap();
        ArticleDao::insert(&store, article_row("a1", 1)).await.unwrap();

        store.insert_good(&code, 7).await.unwrap();
        let err = store.insert_good(&code, 7).await.unwrap_err();
        assert_eq!(err, StoreError::Duplicate("good_history.uid_article".into()));

        store.insert_good(&code, 8).await.unwrap();
        assert_eq!(ArticleDao::get_by_code(&store, &code).await.unwrap().like_cnt, 2);
        let liked = store
            .get_by_user_and_codes(7, &[code.clone(), ArticleCode::parse("zz").unwrap()])
            .await
            .unwrap();
        assert_eq!(liked.len(), 1);
        assert_eq!(liked[0].article_code, code);
    }

    #[tokio::test]
    async fn liking_a_missing_article_records_nothing() {
        let store = InMemoryRelationalStore::new();
        let code = ArticleCode::parse("ghost").unwrap();
        assert!(store.insert_good(&code, 7).await.unwrap_err().is_not_found());
        assert!(store.get_by_user_and_codes(7, &[code]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_owners_are_recorded_once_per_user() {
        let store = InMemoryRelationalStore::new();
        let new_file = NewFile {
            name: "cat.png".into(),
            typ: "png".into(),
            md5: "m1".into(),
            url: "img/2024-05-01/m1.png".into(),
            size: 10,
            dir_level: 0,
            repo_code: RepoCode::parse("repo1").unwrap(),
            uploader_id: 1,
        };
        let stored = store.insert_file(new_file.clone()).await.unwrap();
        assert_eq!(
            store.insert_file(new_file).await.unwrap_err(),
            StoreError::Duplicate("file.md5".into())
        );

        assert_eq!(store.insert_owner(2, "m1").await.unwrap(), stored);
        store.insert_owner(2, "m1").await.unwrap();
        assert_eq!(store.owned_file_count(2).await, 1);
        assert!(store.insert_owner(2, "m2").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn duplicate_team_code_creates_no_member_row() {
        let store = InMemoryRelationalStore::new();
        store.insert_team_and_member(team_row("t1"), 1).await.unwrap();
        let err = store
            .insert_team_and_member(team_row("t1"), 2)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Duplicate("team.unique_code".into()));

        let members = store
            .get_members(&TeamCode::parse("t1").unwrap())
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
        assert!(members[0].is_leader);
    }

    #[tokio::test]
    async fn leader_row_is_never_deleted() {
        let store = InMemoryRelationalStore::new();
        let code = TeamCode::parse("t1").unwrap();
        store.insert_team_and_member(team_row("t1"), 1).await.unwrap();
        assert_eq!(store.delete_member(&code, 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn password_update_requires_old_hash() {
        let store = InMemoryRelationalStore::new();
        let uid = UserDao::insert(&store, "bob", "old").await.unwrap();
        assert_eq!(store.update_password(uid, "wrong", "new").await.unwrap(), 0);
        assert_eq!(store.update_password(uid, "old", "new").await.unwrap(), 1);
        assert_eq!(store.find_by_id(uid).await.unwrap().password_hash, "new");
    }

    #[tokio::test]
    async fn hot_repos_skip_private_ones() {
        let store = InMemoryRelationalStore::new();
        for (code, status) in [("r1", RepoStatus::Public), ("r2", RepoStatus::Private)] {
            RepoDao::insert(
                &store,
                RepoRow {
                    unique_code: RepoCode::parse(code).unwrap(),
                    name: code.into(),
                    desc: String::new(),
                    status,
                    category: Category::default(),
                    is_doc: true,
                    team_id: 0,
                    creator_id: 1,
                },
            )
            .await
            .unwrap();
        }
        let hot = store.get_hot(true, 10).await.unwrap();
        assert_eq!(hot.len(), 1);
        assert_eq!(hot[0].unique_code.as_str(), "r1");
    }

    #[tokio::test]
    async fn concurrent_increments_are_serialized_by_the_row_lock() {
        let store = Arc::new(InMemoryRelationalStore::new());
        let id = BookDao::insert(store.as_ref(), "rust", "books/rust.pdf")
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.increment_download(id).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(BookDao::get(store.as_ref(), id).await.unwrap().download, 32);
    }
}
