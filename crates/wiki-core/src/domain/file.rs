//! File - アップロード済みファイルのメタデータ
//!
//! 中身の md5 で一意になる。同じ中身を別の利用者が上げた場合は行を増やさず、
//! 所有者の関連だけを足す。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::codes::RepoCode;

/// 画像として配信する拡張子
pub const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "png", "gif", "webp", "svg", "apng", "jpeg"];

const SIZE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub id: i64,
    pub name: String,
    /// 拡張子（ドットなし）
    pub typ: String,
    pub md5: String,
    /// 保存先のパス
    pub url: String,
    pub size: u64,
    pub dir_level: u32,
    pub repo_code: RepoCode,
    /// 最初にアップロードした利用者
    pub uploader_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl File {
    pub fn is_image(&self) -> bool {
        IMAGE_EXTENSIONS
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(&self.typ))
    }

    /// 1024 単位で丸めた表示用サイズ（例: `1.50KB`）
    pub fn formatted_size(&self) -> String {
        let mut value = self.size as f64;
        let mut unit = 0;
        while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }
        format!("{value:.2}{}", SIZE_UNITS[unit])
    }
}

/// アップロード記録の入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub name: String,
    pub typ: String,
    pub md5: String,
    pub url: String,
    pub size: u64,
    pub dir_level: u32,
    pub repo_code: RepoCode,
    pub uploader_id: i64,
}
