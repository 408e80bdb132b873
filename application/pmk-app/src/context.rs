//! 共有コンテキスト
//!
//! ストアへの読み書きと起動時スナップショットを 1 つの Mutex で直列化する。
//! 同じ `Arc<KeeperContext>` から作ったマネージャーはスナップショットを共有する。

use crate::exit_guard::ExitRestoreGuard;
use parking_lot::{Mutex, MutexGuard};
use pmk_domain::model::{KeeperConfig, Scope, StateTable, ToggleValue, Zone};
use pmk_domain::port::driven::ConfigStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// ロック下で保護される状態
#[derive(Debug, Default)]
pub(crate) struct ManagerState {
    pub(crate) initialized: bool,
    /// 初回初期化時に取得した状態。以後は上書きしない。
    pub(crate) original: StateTable,
}

pub struct KeeperContext<S: ConfigStore> {
    store: S,
    state: Mutex<ManagerState>,
    restore_on_exit: AtomicBool,
    exit_lock_timeout: Duration,
    exit_guard_issued: AtomicBool,
}

impl<S: ConfigStore> KeeperContext<S> {
    pub fn new(store: S, config: &KeeperConfig) -> Arc<Self> {
        Arc::new(Self {
            store,
            state: Mutex::new(ManagerState::default()),
            restore_on_exit: AtomicBool::new(config.restore_on_exit),
            exit_lock_timeout: Duration::from_millis(u64::from(config.exit_lock_timeout_ms)),
            exit_guard_issued: AtomicBool::new(false),
        })
    }

    pub fn restore_on_exit(&self) -> bool {
        self.restore_on_exit.load(Ordering::SeqCst)
    }

    pub fn set_restore_on_exit(&self, restore: bool) {
        self.restore_on_exit.store(restore, Ordering::SeqCst);
    }

    pub fn exit_lock_timeout(&self) -> Duration {
        self.exit_lock_timeout
    }

    /// 終了時復元ガードを払い出す。コンテキストごとに 1 回だけ。
    pub fn exit_guard(self: &Arc<Self>) -> Option<ExitRestoreGuard<S>> {
        if self.exit_guard_issued.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(ExitRestoreGuard::new(Arc::clone(self)))
    }

    pub(crate) fn lock(&self) -> Locked<'_, S> {
        Locked {
            store: &self.store,
            state: self.state.lock(),
        }
    }

    /// 終了経路用。期限までにロックが取れなければ諦める。
    pub(crate) fn lock_within(&self, timeout: Duration) -> Option<Locked<'_, S>> {
        match self.state.try_lock_for(timeout) {
            Some(state) => Some(Locked {
                store: &self.store,
                state,
            }),
            None => {
                log::warn!(
                    "state lock still held after {:?}, skipping exit restore",
                    timeout
                );
                None
            }
        }
    }
}

/// ロック取得済みであることを型で表すハンドル。
/// 内部操作はすべてこれを経由し、公開操作から公開操作を呼ばない。
pub(crate) struct Locked<'a, S: ConfigStore> {
    store: &'a S,
    state: MutexGuard<'a, ManagerState>,
}

impl<S: ConfigStore> Locked<'_, S> {
    /// 初回のみスナップショットを取得する。取得した場合 true。
    pub(crate) fn initialize(&mut self) -> bool {
        if self.state.initialized {
            return false;
        }
        let original = self.refresh();
        self.state.original = original;
        self.state.initialized = true;
        true
    }

    pub(crate) fn original(&self) -> Option<StateTable> {
        self.state.initialized.then_some(self.state.original)
    }

    pub(crate) fn get(&self, zone: Zone, scope: Scope) -> ToggleValue {
        match self.store.get_int(scope.root(), zone.code()) {
            Ok(raw) => {
                let value = ToggleValue::from_store_code(raw);
                if !value.is_known() {
                    log::info!(
                        "get_zone_value: unrecognized value {} for zone={} scope={}",
                        raw,
                        zone,
                        scope
                    );
                }
                value
            }
            Err(e) => {
                log::info!(
                    "get_zone_value failed: zone={} scope={}: {}",
                    zone,
                    scope,
                    e
                );
                ToggleValue::Unknown
            }
        }
    }

    pub(crate) fn set(&self, zone: Zone, scope: Scope, enabled: bool) -> bool {
        match self
            .store
            .set_int(scope.root(), zone.code(), ToggleValue::store_code(enabled))
        {
            Ok(()) => true,
            Err(e) => {
                log::info!(
                    "set_zone_value failed: zone={} scope={} enabled={}: {}",
                    zone,
                    scope,
                    enabled,
                    e
                );
                false
            }
        }
    }

    /// 全書き込みを試行し、すべて成功したかを返す（途中で打ち切らない）
    pub(crate) fn apply(&self, writes: impl IntoIterator<Item = (Zone, Scope, bool)>) -> bool {
        writes
            .into_iter()
            .fold(true, |all_ok, (zone, scope, enabled)| {
                self.set(zone, scope, enabled) && all_ok
            })
    }

    pub(crate) fn refresh(&self) -> StateTable {
        StateTable::from_fn(|zone, scope| self.get(zone, scope))
    }

    /// 判明しているセルだけを書き戻し、読み直した状態を返す。
    pub(crate) fn restore(&self) -> Option<StateTable> {
        let Some(original) = self.original() else {
            log::error!("restore requested before the original state was captured");
            return None;
        };
        for (zone, scope, enabled) in original.known() {
            if !self.set(zone, scope, enabled) {
                log::warn!("could not restore zone={} scope={}", zone, scope);
            }
        }
        Some(self.refresh())
    }
}
