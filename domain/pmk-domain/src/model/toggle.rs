use serde::Serialize;
use std::fmt;

/// ストア上で「保護モード有効」を表す値
pub const STORE_CODE_ENABLED: u32 = 0;
/// ストア上で「保護モード無効」を表す値
pub const STORE_CODE_DISABLED: u32 = 3;

/// 保護モードの状態。読めなかった場合は Unknown。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleValue {
    Enabled,
    Disabled,
    #[default]
    Unknown,
}

impl ToggleValue {
    /// ストアの生値から変換する。0/3 以外は Unknown。
    pub fn from_store_code(code: u32) -> Self {
        match code {
            STORE_CODE_ENABLED => ToggleValue::Enabled,
            STORE_CODE_DISABLED => ToggleValue::Disabled,
            _ => ToggleValue::Unknown,
        }
    }

    pub fn store_code(enabled: bool) -> u32 {
        if enabled {
            STORE_CODE_ENABLED
        } else {
            STORE_CODE_DISABLED
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            ToggleValue::Enabled => Some(true),
            ToggleValue::Disabled => Some(false),
            ToggleValue::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        self != ToggleValue::Unknown
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToggleValue::Enabled => "enabled",
            ToggleValue::Disabled => "disabled",
            ToggleValue::Unknown => "unknown",
        }
    }
}

impl From<bool> for ToggleValue {
    fn from(enabled: bool) -> Self {
        if enabled {
            ToggleValue::Enabled
        } else {
            ToggleValue::Disabled
        }
    }
}

impl fmt::Display for ToggleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
