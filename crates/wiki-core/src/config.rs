//! Config - TOML 設定ファイル
//!
//! ファイルは任意。存在しない・空なら `WikiConfig::default()`。
//! すべてのセクションとキーは省略可能で、省略分は既定値になる。
//!
//! ```toml
//! [cache]
//! ttl_secs = 900
//!
//! [consistency]
//! compensation_timeout_ms = 1000
//! invalidation_delay_ms = 1000
//!
//! [codes]
//! byte_len = 16
//! team_retry_max = 3
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    pub cache: CacheConfig,
    pub consistency: ConsistencyConfig,
    pub codes: CodeConfig,
    pub blob: BlobConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// エントリの有効期限（秒）
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 15 * 60 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConsistencyConfig {
    /// 補償タスク・キャッシュ副作用タスクの締め切り
    pub compensation_timeout_ms: u64,
    /// double-delete の 2 回目までの遅延
    pub invalidation_delay_ms: u64,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            compensation_timeout_ms: 1_000,
            invalidation_delay_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodeConfig {
    /// 乱数のバイト数（hex にすると 2 倍の文字数）
    pub byte_len: usize,
    /// チーム作成の追加リトライ回数。0 ならリトライ decorator を付けない
    pub team_retry_max: u32,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            byte_len: crate::ports::DEFAULT_CODE_BYTES,
            team_retry_max: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BlobConfig {
    pub content_prefix: String,
    pub puretext_prefix: String,
    pub html_content_type: String,
    pub text_content_type: String,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            content_prefix: "content".to_string(),
            puretext_prefix: "puretext".to_string(),
            html_content_type: "text/html;charset=utf-8".to_string(),
            text_content_type: "text/plain;charset=utf-8".to_string(),
        }
    }
}

impl WikiConfig {
    /// TOML ファイルから読み込む
    ///
    /// - Missing file → `Ok(WikiConfig::default())`
    /// - Empty file → `Ok(WikiConfig::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };
        let config = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.codes.byte_len == 0 {
            return Err(ConfigError::Invalid("codes.byte_len must be > 0".to_string()));
        }
        if self.blob.content_prefix == self.blob.puretext_prefix {
            return Err(ConfigError::Invalid(
                "blob.content_prefix and blob.puretext_prefix must differ".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn compensation_timeout(&self) -> Duration {
        Duration::from_millis(self.consistency.compensation_timeout_ms)
    }

    pub fn invalidation_delay(&self) -> Duration {
        Duration::from_millis(self.consistency.invalidation_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_deployment() {
        let config = WikiConfig::default();
        assert_eq!(config.cache_ttl(), Duration::from_secs(900));
        assert_eq!(config.compensation_timeout(), Duration::from_secs(1));
        assert_eq!(config.invalidation_delay(), Duration::from_secs(1));
        assert_eq!(config.codes.byte_len, 16);
        assert_eq!(config.codes.team_retry_max, 3);
        assert_eq!(config.blob.content_prefix, "content");
        assert_eq!(config.blob.puretext_prefix, "puretext");
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = WikiConfig::from_toml(
            r#"
            [consistency]
            compensation_timeout_ms = 250

            [codes]
            team_retry_max = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.compensation_timeout(), Duration::from_millis(250));
        assert_eq!(config.invalidation_delay(), Duration::from_secs(1));
        assert_eq!(config.codes.team_retry_max, 5);
        assert_eq!(config.codes.byte_len, 16);
    }

    #[test]
    fn empty_content_is_default() {
        assert_eq!(WikiConfig::from_toml("  \n").unwrap(), WikiConfig::default());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(matches!(
            WikiConfig::from_toml("[cache\nttl_secs = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn identical_blob_prefixes_are_rejected() {
        let err = WikiConfig::from_toml(
            r#"
            [blob]
            content_prefix = "x"
            puretext_prefix = "x"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_is_default() {
        let path = std::env::temp_dir().join("wiki-core-config-does-not-exist.toml");
        assert_eq!(WikiConfig::load(&path).unwrap(), WikiConfig::default());
    }
}
