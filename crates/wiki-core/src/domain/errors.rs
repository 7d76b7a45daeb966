//! Errors - エラー型と分類
//!
//! 呼び出し側（リクエストハンドラ）に返るのは常に WikiError。
//! 補償処理やキャッシュの失敗はログに残すだけで、ここには現れない。

use thiserror::Error;

use crate::ports::StoreError;

/// ErrorKind は運用上の分類
///
/// - NotFound: 行または Blob が存在しない
/// - ConstraintViolation: unique code の重複（decorator がリトライする場合あり）
/// - StoreUnavailable: どちらかのストアの一時的な I/O 障害
/// - Rejected: 入力や業務ルールによる拒否
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    ConstraintViolation,
    StoreUnavailable,
    Rejected,
}

/// WikiError はドメインエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WikiError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("duplicated unique value on {0}")]
    ConstraintViolation(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    #[error("team leader cannot be deleted")]
    TeamLeaderCannotBeDeleted,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("random source failed: {0}")]
    RandomSource(String),
}

impl WikiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WikiError::NotFound(_) => ErrorKind::NotFound,
            WikiError::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            WikiError::StoreUnavailable(_)
            | WikiError::DeadlineExceeded
            | WikiError::RandomSource(_) => ErrorKind::StoreUnavailable,
            WikiError::TeamLeaderCannotBeDeleted | WikiError::InvalidInput(_) => {
                ErrorKind::Rejected
            }
        }
    }

    /// 利用者に見せる数値エラーコード
    ///
    /// 上 3 桁が対応する HTTP ステータス、下 3 桁がその中の連番（例: 404_001）。
    pub fn code(&self) -> u32 {
        match self {
            WikiError::NotFound(_) => 404_001,
            WikiError::ConstraintViolation(_) => 409_001,
            WikiError::InvalidInput(_) => 400_001,
            WikiError::TeamLeaderCannotBeDeleted => 503_001,
            WikiError::DeadlineExceeded => 504_001,
            WikiError::StoreUnavailable(_) | WikiError::RandomSource(_) => 500_001,
        }
    }

    /// unique code の衝突かどうか（リトライ decorator の判定に使う）
    pub fn is_constraint_violation(&self) -> bool {
        self.kind() == ErrorKind::ConstraintViolation
    }
}

impl From<StoreError> for WikiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => WikiError::NotFound(what),
            StoreError::Duplicate(what) => WikiError::ConstraintViolation(what),
            StoreError::Unavailable(reason) => WikiError::StoreUnavailable(reason),
        }
    }
}
