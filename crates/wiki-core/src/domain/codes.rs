//! Unique codes - 外部公開される識別子
//!
//! 記事・知識庫（repo）・チームはそれぞれランダムな hex 文字列を持ち、
//! これが RDB の unique key であると同時に Blob の namespace key になります。
//!
//! ## Phantom Type パターン
//! `UniqueCode<T>` で共通実装を提供し、`T` はマーカー型として
//! エンティティ種別ごとの型安全性を与えます（ArticleCode と TeamCode は混同できない）。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

use crate::domain::errors::WikiError;
use crate::ports::CodeGenerator;

/// CodeMarker は各エンティティ種別のマーカー trait
pub trait CodeMarker: Send + Sync + 'static {
    /// ログやエラーメッセージで使うエンティティ名（例: "article"）
    fn entity() -> &'static str;
}

/// ジェネリックな unique code
///
/// 生成後は不変。再利用もしない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueCode<T: CodeMarker> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: CodeMarker> UniqueCode<T> {
    /// 既存の code を受け取る（リクエストや行から復元する場合）
    ///
    /// 空白のみの文字列は「まだ code を持たない」を意味するので None を返す。
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self::from_string(trimmed.to_string()))
    }

    /// CodeGenerator で新しい候補 code を作る
    ///
    /// 衝突の判定はここでは行わない（RDB の unique 制約に任せる）。
    pub fn generate(generator: &dyn CodeGenerator) -> Result<Self, WikiError> {
        let value = generator.generate().map_err(|e| match e {
            WikiError::RandomSource(reason) => {
                WikiError::RandomSource(format!("{} code: {reason}", T::entity()))
            }
            other => other,
        })?;
        Ok(Self::from_string(value))
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    fn from_string(value: String) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }
}

impl<T: CodeMarker> fmt::Display for UniqueCode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T: CodeMarker> AsRef<str> for UniqueCode<T> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// 記事のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArticleEntity {}

impl CodeMarker for ArticleEntity {
    fn entity() -> &'static str {
        "article"
    }
}

/// 知識庫のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RepoEntity {}

impl CodeMarker for RepoEntity {
    fn entity() -> &'static str {
        "repo"
    }
}

/// チームのマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TeamEntity {}

impl CodeMarker for TeamEntity {
    fn entity() -> &'static str {
        "team"
    }
}

// ========================================
// Type Alias
// ========================================

pub type ArticleCode = UniqueCode<ArticleEntity>;
pub type RepoCode = UniqueCode<RepoEntity>;
pub type TeamCode = UniqueCode<TeamEntity>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::FixedCodes;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn blank_input_has_no_code(#[case] raw: &str) {
        assert!(ArticleCode::parse(raw).is_none());
    }

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let code = TeamCode::parse("  abc123 ").unwrap();
        assert_eq!(code.as_str(), "abc123");
        assert_eq!(code.to_string(), "abc123");
    }

    #[test]
    fn generate_uses_the_generator_output() {
        let codes = FixedCodes::new(["deadbeef"]);
        let code = RepoCode::generate(&codes).unwrap();
        assert_eq!(code.as_str(), "deadbeef");
    }

    #[test]
    fn generator_failure_names_the_entity() {
        let codes = FixedCodes::new(Vec::<String>::new());
        let err = TeamCode::generate(&codes).unwrap_err();
        assert!(matches!(err, WikiError::RandomSource(reason) if reason.starts_with("team code")));
    }

    #[test]
    fn codes_serialize_as_plain_strings() {
        let code = ArticleCode::parse("0a1b").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"0a1b\"");

        let back: ArticleCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
    }
}
