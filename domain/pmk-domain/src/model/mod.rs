//! ドメインモデル
//!
//! 値オブジェクトと設定型を定義

mod config; // キーパー設定（終了時復元、既定スコープ）
mod scope; // スコープ（ユーザー/システム）とストアルート
mod state_table; // ゾーン×スコープの状態テーブル
mod toggle; // 保護モードの三値
mod zone; // セキュリティゾーン

pub use config::*;
pub use scope::*;
pub use state_table::*;
pub use toggle::*;
pub use zone::*;
