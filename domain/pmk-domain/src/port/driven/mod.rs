//! 駆動ポート（出力インターフェース）。
//!
//! インフラ層のアダプタが実装する。

mod config_repository;
mod config_store;

pub use config_repository::*;
pub use config_store::*;
