//! pmk-app: アプリケーション層。
//! 共有コンテキスト（ロック + 起動時スナップショット）と、その上に載る
//! 保護モードマネージャー、終了時復元ガードを提供する。

mod context;
mod exit_guard;
mod manager;

pub use context::KeeperContext;
pub use exit_guard::{ExitRestoreGuard, ShutdownTask};
pub use manager::ProtectedModeManager;

#[cfg(test)]
mod test_support;
