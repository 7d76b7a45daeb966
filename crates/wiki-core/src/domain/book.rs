//! Book - ダウンロード数を持つ書籍の行

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub download: u64,
}
