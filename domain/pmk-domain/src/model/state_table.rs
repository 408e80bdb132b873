use super::{Scope, ToggleValue, Zone};
use serde::ser::{Serialize, SerializeMap, Serializer};

const ZONE_COUNT: usize = 4;
const SCOPE_COUNT: usize = 2;

/// ゾーン×スコープ（4×2）の状態テーブル。
/// 全セルが常に存在し、読めなかったセルは Unknown を持つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateTable {
    cells: [[ToggleValue; SCOPE_COUNT]; ZONE_COUNT],
}

impl StateTable {
    /// 全セル Unknown のテーブル
    pub fn new() -> Self {
        Self::default()
    }

    /// 各セルを関数で埋めて構築する（スコープ→ゾーンの順で呼び出す）
    pub fn from_fn(mut f: impl FnMut(Zone, Scope) -> ToggleValue) -> Self {
        let mut table = Self::new();
        for scope in Scope::all() {
            for zone in Zone::all() {
                table.set(*zone, *scope, f(*zone, *scope));
            }
        }
        table
    }

    pub fn get(&self, zone: Zone, scope: Scope) -> ToggleValue {
        self.cells[zone.index()][scope.index()]
    }

    pub fn set(&mut self, zone: Zone, scope: Scope, value: ToggleValue) {
        self.cells[zone.index()][scope.index()] = value;
    }

    /// 全セルを (zone, scope, value) で列挙（スコープ→ゾーンの順）
    pub fn iter(&self) -> impl Iterator<Item = (Zone, Scope, ToggleValue)> + '_ {
        Scope::all().iter().flat_map(move |scope| {
            Zone::all()
                .iter()
                .map(move |zone| (*zone, *scope, self.get(*zone, *scope)))
        })
    }

    /// 値が判明しているセルのみ
    pub fn known(&self) -> impl Iterator<Item = (Zone, Scope, bool)> + '_ {
        self.iter()
            .filter_map(|(zone, scope, value)| value.as_bool().map(|b| (zone, scope, b)))
    }
}

/// `{"user": {"intranet": "enabled", ...}, "system": {...}}` 形式で出力する
impl Serialize for StateTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct ScopeRow<'a>(&'a StateTable, Scope);

        impl Serialize for ScopeRow<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(ZONE_COUNT))?;
                for zone in Zone::all() {
                    map.serialize_entry(zone.name(), &self.0.get(*zone, self.1))?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(SCOPE_COUNT))?;
        for scope in Scope::all() {
            map.serialize_entry(scope.name(), &ScopeRow(self, *scope))?;
        }
        map.end()
    }
}
