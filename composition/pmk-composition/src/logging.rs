//! ロガー初期化

use env_logger::{Builder, Env};

/// env_logger を初期化する。`RUST_LOG` があればそちらを優先。
/// 2 回目以降の呼び出しは無視される。
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let _ = Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init();
}
