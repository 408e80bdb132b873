//! 終了時復元ガード
//!
//! 1 回だけ実行される。`restore_on_exit` が false なら何もしない。
//! 終了経路ではロックを期限付きで試み、取れなければ諦めてプロセス終了を妨げない。

use crate::context::KeeperContext;
use pmk_domain::model::StateTable;
use pmk_domain::port::driven::ConfigStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// シャットダウン時に呼ばれる処理（シグナルハンドラ等から型消去して保持する）
pub trait ShutdownTask: Send + Sync {
    fn run_on_shutdown(&self);
}

pub struct ExitRestoreGuard<S: ConfigStore> {
    ctx: Arc<KeeperContext<S>>,
    fired: AtomicBool,
}

impl<S: ConfigStore> ExitRestoreGuard<S> {
    pub(crate) fn new(ctx: Arc<KeeperContext<S>>) -> Self {
        Self {
            ctx,
            fired: AtomicBool::new(false),
        }
    }

    /// 復元を実行する。2 回目以降、または無効化されている場合は None。
    pub fn run(&self) -> Option<StateTable> {
        if self.fired.swap(true, Ordering::SeqCst) {
            return None;
        }
        if !self.ctx.restore_on_exit() {
            log::debug!("restore on exit disabled, leaving zone settings as they are");
            return None;
        }
        let locked = self.ctx.lock_within(self.ctx.exit_lock_timeout())?;
        let restored = locked.restore();
        if restored.is_some() {
            log::info!("restored original protected mode settings on exit");
        }
        restored
    }

    /// 実行済みにして、以後の run/drop で何もしないようにする
    pub fn disarm(&self) {
        self.fired.store(true, Ordering::SeqCst);
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl<S: ConfigStore> ShutdownTask for ExitRestoreGuard<S> {
    fn run_on_shutdown(&self) {
        let _ = self.run();
    }
}

impl<S: ConfigStore> Drop for ExitRestoreGuard<S> {
    fn drop(&mut self) {
        let _ = self.run();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProtectedModeManager;
    use crate::test_support::MockStore;
    use pmk_domain::model::{KeeperConfig, Scope, ToggleValue, Zone};
    use pmk_domain::port::driving::ProtectedModeUseCase;

    fn seeded_user_disabled() -> MockStore {
        let store = MockStore::default();
        for zone in Zone::all() {
            store.seed(*zone, Scope::User, 3);
        }
        store
    }

    #[test]
    fn drop_restores_original_state() {
        let store = seeded_user_disabled();
        let ctx = KeeperContext::new(store.clone(), &KeeperConfig::default());
        let manager = ProtectedModeManager::new(Arc::clone(&ctx));
        let guard = ctx.exit_guard().unwrap();

        assert!(manager.enable_all_default());
        drop(guard);

        for zone in Zone::all() {
            assert_eq!(store.raw(*zone, Scope::User), Some(3));
        }
    }

    #[test]
    fn run_is_one_shot() {
        let store = seeded_user_disabled();
        let ctx = KeeperContext::new(store.clone(), &KeeperConfig::default());
        let manager = ProtectedModeManager::new(Arc::clone(&ctx));
        let guard = ctx.exit_guard().unwrap();

        manager.enable_all_default();
        assert!(guard.run().is_some());
        assert!(guard.has_fired());

        manager.enable_all_default();
        let writes_before = store.write_count();
        assert!(guard.run().is_none());
        drop(guard);
        assert_eq!(store.write_count(), writes_before);
        assert_eq!(manager.get_zone_value(Zone::Trusted, Scope::User), ToggleValue::Enabled);
    }

    #[test]
    fn disabled_restore_on_exit_leaves_changes() {
        let store = seeded_user_disabled();
        let ctx = KeeperContext::new(store.clone(), &KeeperConfig::default());
        let manager = ProtectedModeManager::new(Arc::clone(&ctx));
        let guard = ctx.exit_guard().unwrap();

        manager.enable_all_default();
        manager.set_restore_on_exit(false);
        assert!(guard.run().is_none());

        for zone in Zone::all() {
            assert_eq!(store.raw(*zone, Scope::User), Some(0));
        }
    }

    #[test]
    fn config_can_disable_restore_from_the_start() {
        let store = seeded_user_disabled();
        let config = KeeperConfig {
            restore_on_exit: false,
            ..KeeperConfig::default()
        };
        let ctx = KeeperContext::new(store.clone(), &config);
        let manager = ProtectedModeManager::new(Arc::clone(&ctx));
        let guard = ctx.exit_guard().unwrap();

        manager.enable_all_default();
        drop(guard);
        assert_eq!(store.raw(Zone::Internet, Scope::User), Some(0));
    }

    #[test]
    fn gives_up_when_lock_is_held() {
        let store = seeded_user_disabled();
        let config = KeeperConfig {
            exit_lock_timeout_ms: 20,
            ..KeeperConfig::default()
        };
        let ctx = KeeperContext::new(store.clone(), &config);
        let manager = ProtectedModeManager::new(Arc::clone(&ctx));
        let guard = ctx.exit_guard().unwrap();
        manager.enable_all_default();

        let held = ctx.lock();
        assert!(guard.run().is_none());
        drop(held);

        assert_eq!(store.raw(Zone::Internet, Scope::User), Some(0));
    }
}
