//! StoreError - RDB / Blob ストア共通のエラー
//!
//! unique 制約違反（Duplicate）は他のエラーと区別できなければならない。
//! チーム作成のリトライ decorator がこれを見て判断する。

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("unique constraint violated on {0}")]
    Duplicate(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
