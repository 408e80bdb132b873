//! 駆動ポート（外部から呼び出されるユースケースの入口）
//!
//! アプリケーション層のサービスが実装する。

mod protected_mode_use_case;

pub use protected_mode_use_case::*;
