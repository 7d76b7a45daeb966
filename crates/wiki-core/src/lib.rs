//! wiki-core
//!
//! Storage core for the hi-wiki knowledge base.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（codes, article, team, user, repo, book, errors）
//! - **ports**: 抽象化レイヤー（BlobStore, Cache, 各 DAO, CodeGenerator, Clock）
//! - **app**: アプリケーションロジック（書き込み調整、cache-aside、サービス、builder）
//! - **impls**: 実装（インメモリのストアと障害注入。開発・テスト用）
//! - **config**: TOML 設定

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
