//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryBlobStore**: 開発用のオブジェクトストレージ
//! - **InMemoryCache**: 開発用のキャッシュ（TTL・hash 対応）
//! - **InMemoryRelationalStore**: 開発用の正本（すべての DAO を実装）
//! - **FixedCodes**: 衝突を再現するための CodeGenerator
//! - **FaultInjector**: 上記インメモリ実装への障害・遅延注入
//!
//! # 本番用実装
//! 本番用の実装は別クレートに配置する想定です（MySQL, Redis, MinIO）。

pub mod faults;
pub mod fixed_codes;
pub mod inmem_blob;
pub mod inmem_cache;
pub mod inmem_relational;

// 主要な型を再エクスポート
pub use self::faults::FaultInjector;
pub use self::fixed_codes::FixedCodes;
pub use self::inmem_blob::{InMemoryBlobStore, StoredBlob};
pub use self::inmem_cache::InMemoryCache;
pub use self::inmem_relational::{DEFAULT_CATEGORY_ID, InMemoryRelationalStore};
