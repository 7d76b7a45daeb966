//! CodeGenerator port - unique code 生成の抽象化
//!
//! 外部公開する code はランダムなバイト列を hex にしたもの。
//! テスト容易性のために trait として抽象化しています（衝突を意図的に起こせる）。
//!
//! # 実装
//! - **RandomHexGenerator**: OS の乱数源を使う（本番用）
//! - **FixedCodes**: 決められた順に code を返す（impls、テスト・デモ用）

use rand::RngCore;
use rand::rngs::OsRng;

use crate::domain::errors::WikiError;

/// 16 バイト = 32 文字の hex
pub const DEFAULT_CODE_BYTES: usize = 16;

/// CodeGenerator は候補 code を生成
///
/// 一意性は保証しない。衝突は RDB の unique 制約が検出する。
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> Result<String, WikiError>;
}

/// RandomHexGenerator は暗号論的乱数から code を生成
#[derive(Debug, Clone, Copy)]
pub struct RandomHexGenerator {
    byte_len: usize,
}

impl RandomHexGenerator {
    pub fn new(byte_len: usize) -> Self {
        Self { byte_len }
    }
}

impl Default for RandomHexGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_BYTES)
    }
}

impl CodeGenerator for RandomHexGenerator {
    fn generate(&self) -> Result<String, WikiError> {
        let mut bytes = vec![0u8; self.byte_len];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| WikiError::RandomSource(e.to_string()))?;
        Ok(to_hex(&bytes))
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
