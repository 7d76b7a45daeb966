//! Article - 記事のメタデータ行と本文

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::codes::{ArticleCode, RepoCode};

/// 本文が空の記事に付ける説明文
pub const EMPTY_DESC_PLACEHOLDER: &str = "No description for this article yet";

/// 説明文として切り出す最大文字数
const DESC_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub avatar_md5: String,
    pub profile: String,
}

impl Author {
    pub fn avatar_url(&self) -> String {
        format!("files/img/{}", self.avatar_md5)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// ArticleRecord は RDB の行
///
/// # 不変条件
/// - 行は 2 つの Blob が書き込まれた後にのみ作られる
/// - unique_code は Blob のキー（`content/<code>`, `puretext/<code>`）でもある
/// - deleted_at が Some なら論理削除済み（読み出しには現れない）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: i64,
    pub unique_code: ArticleCode,
    pub title: String,
    pub like_cnt: i64,
    pub private: bool,
    pub state: u8,
    pub repo_code: RepoCode,
    pub author: Author,
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// 記事本文（Blob 側に保存される 2 つの表現）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleContent {
    /// 描画済み表現（HTML）
    pub rendered: String,
    /// プレーンテキスト抽出
    pub plain: String,
}

impl ArticleContent {
    pub fn new(rendered: impl Into<String>, plain: impl Into<String>) -> Self {
        Self {
            rendered: rendered.into(),
            plain: plain.into(),
        }
    }
}

/// Article は行と本文を組み立てたもの
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub record: ArticleRecord,
    pub content: ArticleContent,
    pub desc: String,
}

impl Article {
    pub fn assemble(record: ArticleRecord, content: ArticleContent) -> Self {
        let desc = describe(&content.plain);
        Self {
            record,
            content,
            desc,
        }
    }

    pub fn code(&self) -> &ArticleCode {
        &self.record.unique_code
    }

    pub fn formatted_created_at(&self) -> String {
        self.record.created_at.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// リクエストハンドラから渡される編集内容
///
/// unique_code が空なら新規作成、そうでなければ既存記事の更新。
#[derive(Debug, Clone)]
pub struct ArticleDraft {
    pub unique_code: String,
    pub title: String,
    pub content: ArticleContent,
    pub repo_code: RepoCode,
    pub author: Author,
    pub category: Category,
    pub state: u8,
    pub private: bool,
}

/// ページングされた一覧
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

fn describe(plain: &str) -> String {
    if plain.is_empty() {
        return EMPTY_DESC_PLACEHOLDER.to_string();
    }
    plain.chars().take(DESC_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desc_is_a_prefix_of_the_plain_text() {
        let plain = "あ".repeat(80);
        assert_eq!(describe(&plain).chars().count(), 50);
        assert_eq!(describe("short"), "short");
    }

    #[test]
    fn empty_plain_text_gets_a_placeholder() {
        assert_eq!(describe(""), EMPTY_DESC_PLACEHOLDER);
    }
}
