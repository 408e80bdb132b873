//! 保護モードマネージャー
//!
//! 公開操作はそれぞれ 1 回だけロックを取り、内部では `Locked` 経由で操作する。
//! ストア障害はログに残して Unknown/false に縮退させ、呼び出し側へは伝播しない。

use crate::context::KeeperContext;
use pmk_domain::model::{Scope, StateTable, ToggleValue, Zone};
use pmk_domain::port::driven::ConfigStore;
use pmk_domain::port::driving::ProtectedModeUseCase;
use std::sync::Arc;

pub struct ProtectedModeManager<S: ConfigStore> {
    ctx: Arc<KeeperContext<S>>,
}

impl<S: ConfigStore> Clone for ProtectedModeManager<S> {
    fn clone(&self) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
        }
    }
}

impl<S: ConfigStore> ProtectedModeManager<S> {
    /// コンテキストを初期化（初回のみスナップショット取得）してマネージャーを作る
    pub fn new(ctx: Arc<KeeperContext<S>>) -> Self {
        if ctx.lock().initialize() {
            log::info!("captured original protected mode settings");
        }
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<KeeperContext<S>> {
        &self.ctx
    }

    pub fn restore_on_exit(&self) -> bool {
        self.ctx.restore_on_exit()
    }

    /// 起動時に取得した状態
    pub fn original_state(&self) -> Option<StateTable> {
        self.ctx.lock().original()
    }

    fn set_each_zone(&self, user: bool, system: bool, enabled: bool) -> bool {
        let writes = Zone::all().iter().flat_map(|zone| {
            Scope::selected(user, system)
                .into_iter()
                .map(move |scope| (*zone, scope, enabled))
        });
        self.ctx.lock().apply(writes)
    }
}

/// 危険ゾーンのみ有効にする固定ポリシー。危険ゾーンを先に書き込む。
fn risky_only_policy() -> impl Iterator<Item = (Zone, bool)> {
    let (risky, safe): (Vec<Zone>, Vec<Zone>) =
        Zone::all().iter().copied().partition(|zone| zone.is_risky());
    risky
        .into_iter()
        .map(|zone| (zone, true))
        .chain(safe.into_iter().map(|zone| (zone, false)))
}

impl<S: ConfigStore> ProtectedModeUseCase for ProtectedModeManager<S> {
    fn enable_all(&self, user: bool, system: bool) -> bool {
        self.set_each_zone(user, system, true)
    }

    fn disable_all(&self, user: bool, system: bool) -> bool {
        self.set_each_zone(user, system, false)
    }

    fn enable_for_risky_only(&self, user: bool, system: bool) -> bool {
        let writes = Scope::selected(user, system).into_iter().flat_map(|scope| {
            risky_only_policy().map(move |(zone, enabled)| (zone, scope, enabled))
        });
        self.ctx.lock().apply(writes)
    }

    fn restore_orig_state(&self) -> Option<StateTable> {
        self.ctx.lock().restore()
    }

    fn set_restore_on_exit(&self, restore: bool) {
        self.ctx.set_restore_on_exit(restore);
    }

    fn get_zone_value(&self, zone: Zone, scope: Scope) -> ToggleValue {
        self.ctx.lock().get(zone, scope)
    }

    fn set_zone_value(&self, zone: Zone, scope: Scope, enabled: bool) -> bool {
        self.ctx.lock().set(zone, scope, enabled)
    }

    fn current_state(&self) -> StateTable {
        self.ctx.lock().refresh()
    }
}
