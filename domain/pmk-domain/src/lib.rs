//! ProtectedModeKeeper ドメイン層
//!
//! ゾーン/スコープのカタログ、状態テーブル、ポート定義を持つ。
//! ヘキサゴナルアーキテクチャの最内層で、OS APIには触れない。

pub mod error; // ドメインエラー定義
pub mod model; // ゾーン、スコープ、状態テーブル、設定
pub mod port; // ポート（driving/driven）

pub use error::DomainError; // エラー型を再エクスポート
