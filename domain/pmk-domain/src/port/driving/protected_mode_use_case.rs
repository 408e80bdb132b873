//! 保護モード管理ユースケースポート

use crate::model::{Scope, StateTable, ToggleValue, Zone};

/// 保護モードの一括/個別操作。
/// 一括操作は全書き込みを試行し、すべて成功した場合のみ true を返す。
pub trait ProtectedModeUseCase {
    fn enable_all(&self, user: bool, system: bool) -> bool;

    fn disable_all(&self, user: bool, system: bool) -> bool;

    /// インターネット/制限付きのみ有効、イントラネット/信頼済みは無効
    fn enable_for_risky_only(&self, user: bool, system: bool) -> bool;

    /// 起動時の状態に戻し、戻した後の状態を返す。失敗時は None。
    fn restore_orig_state(&self) -> Option<StateTable>;

    fn set_restore_on_exit(&self, restore: bool);

    fn get_zone_value(&self, zone: Zone, scope: Scope) -> ToggleValue;

    fn set_zone_value(&self, zone: Zone, scope: Scope, enabled: bool) -> bool;

    /// 全セルを読み直す
    fn current_state(&self) -> StateTable;

    fn enable_all_default(&self) -> bool {
        self.enable_all(true, false)
    }

    fn disable_all_default(&self) -> bool {
        self.disable_all(true, false)
    }

    fn enable_for_risky_only_default(&self) -> bool {
        self.enable_for_risky_only(true, false)
    }
}
