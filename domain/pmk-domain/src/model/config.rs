use super::Scope;
use crate::DomainError;

const DEFAULT_EXIT_LOCK_TIMEOUT_MS: u32 = 2_000;
const MAX_EXIT_LOCK_TIMEOUT_MS: u32 = 60_000;

/// キーパーの動作設定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeeperConfig {
    /// プロセス終了時に元の状態へ戻すか
    pub restore_on_exit: bool,
    /// スコープ未指定時にユーザースコープを対象にするか
    pub default_user: bool,
    /// スコープ未指定時にシステムスコープを対象にするか（要管理者権限）
    pub default_system: bool,
    /// 終了時復元でロック取得を待つ上限（ミリ秒）
    pub exit_lock_timeout_ms: u32,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            restore_on_exit: true,
            default_user: true,
            default_system: false,
            exit_lock_timeout_ms: DEFAULT_EXIT_LOCK_TIMEOUT_MS,
        }
    }
}

impl KeeperConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.default_user && !self.default_system {
            return Err(DomainError::InvalidConfig(
                "at least one of default_user/default_system must be true".into(),
            ));
        }
        if self.exit_lock_timeout_ms == 0 || self.exit_lock_timeout_ms > MAX_EXIT_LOCK_TIMEOUT_MS {
            return Err(DomainError::InvalidConfig(format!(
                "exit_lock_timeout_ms must be in 1-{} (got {})",
                MAX_EXIT_LOCK_TIMEOUT_MS, self.exit_lock_timeout_ms
            )));
        }
        Ok(())
    }

    /// 範囲外の値を既定値に戻す。
    pub fn normalize(&mut self) {
        if self.exit_lock_timeout_ms == 0 {
            self.exit_lock_timeout_ms = DEFAULT_EXIT_LOCK_TIMEOUT_MS;
        }
        self.exit_lock_timeout_ms = self.exit_lock_timeout_ms.min(MAX_EXIT_LOCK_TIMEOUT_MS);
        if !self.default_user && !self.default_system {
            self.default_user = true;
        }
    }

    /// CLIフラグが両方 false の場合は既定スコープを使う
    pub fn resolve_scopes(&self, user: bool, system: bool) -> (bool, bool) {
        if user || system {
            (user, system)
        } else {
            (self.default_user, self.default_system)
        }
    }

    pub fn default_scopes(&self) -> Vec<Scope> {
        Scope::selected(self.default_user, self.default_system)
    }
}
