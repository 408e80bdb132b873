//! Windows ゾーン設定レジストリアダプター
//!
//! `Software\Microsoft\Windows\CurrentVersion\Internet Settings\Zones\{code}` の
//! DWORD 値 `2500`（保護モード）を HKCU/HKLM で読み書きする。

use pmk_domain::DomainError;
use pmk_domain::model::{StoreRoot, ZoneCode};
use pmk_domain::port::driven::ConfigStore;

pub const ZONES_BASE_PATH: &str = r"Software\Microsoft\Windows\CurrentVersion\Internet Settings\Zones";
/// 保護モードを表すURLアクション値名
pub const PROTECTED_MODE_VALUE_NAME: &str = "2500";

/// ゾーンコードからサブキーのパスを組み立てる
pub fn zone_key_path(zone: ZoneCode) -> String {
    format!("{}\\{}", ZONES_BASE_PATH, zone)
}

/// プラットフォーム中立のハンドル
#[cfg(windows)]
pub type RegistryAdapter = WindowsRegistryAdapter;
#[cfg(not(windows))]
pub type RegistryAdapter = NonWindowsRegistryAdapter;

#[cfg(windows)]
#[derive(Debug, Default, Clone)]
pub struct WindowsRegistryAdapter;

#[cfg(windows)]
impl WindowsRegistryAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(windows)]
impl ConfigStore for WindowsRegistryAdapter {
    fn get_int(&self, root: StoreRoot, zone: ZoneCode) -> Result<u32, DomainError> {
        windows_impl::read_dword(root, &zone_key_path(zone), PROTECTED_MODE_VALUE_NAME)
    }

    fn set_int(&self, root: StoreRoot, zone: ZoneCode, value: u32) -> Result<(), DomainError> {
        windows_impl::write_dword(root, &zone_key_path(zone), PROTECTED_MODE_VALUE_NAME, value)
    }
}

#[cfg(not(windows))]
#[derive(Debug, Default, Clone)]
pub struct NonWindowsRegistryAdapter;

#[cfg(not(windows))]
impl NonWindowsRegistryAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(windows))]
impl ConfigStore for NonWindowsRegistryAdapter {
    fn get_int(&self, root: StoreRoot, zone: ZoneCode) -> Result<u32, DomainError> {
        Err(DomainError::Unsupported(format!(
            "zone registry is not available on this platform ({}\\{})",
            root,
            zone_key_path(zone)
        )))
    }

    fn set_int(&self, root: StoreRoot, zone: ZoneCode, _value: u32) -> Result<(), DomainError> {
        Err(DomainError::Unsupported(format!(
            "zone registry is not available on this platform ({}\\{})",
            root,
            zone_key_path(zone)
        )))
    }
}

#[cfg(windows)]
mod windows_impl {
    use super::*;
    use windows::Win32::Foundation::{
        ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_PATH_NOT_FOUND, ERROR_SUCCESS,
        WIN32_ERROR,
    };
    use windows::Win32::System::Registry::{
        HKEY, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_QUERY_VALUE, KEY_SET_VALUE, REG_DWORD,
        REG_OPTION_NON_VOLATILE, RRF_RT_REG_DWORD, RegCloseKey, RegCreateKeyExW, RegGetValueW,
        RegOpenKeyExW, RegSetValueExW,
    };
    use windows::core::PCWSTR;

    /// スコープを抜けると RegCloseKey する
    struct RegKeyGuard(HKEY);

    impl Drop for RegKeyGuard {
        fn drop(&mut self) {
            unsafe {
                let _ = RegCloseKey(self.0);
            }
        }
    }

    fn hive(root: StoreRoot) -> HKEY {
        match root {
            StoreRoot::CurrentUser => HKEY_CURRENT_USER,
            StoreRoot::LocalMachine => HKEY_LOCAL_MACHINE,
        }
    }

    pub(super) fn read_dword(root: StoreRoot, path: &str, name: &str) -> Result<u32, DomainError> {
        let wide_path = to_wide(path); // API呼び出し中にVecを生存させる
        let mut key: HKEY = HKEY::default();
        let status = unsafe {
            RegOpenKeyExW(
                hive(root),
                PCWSTR(wide_path.as_ptr()),
                Some(0),
                KEY_QUERY_VALUE,
                &mut key,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(map_win32_error(status, root, path));
        }
        let key = RegKeyGuard(key);

        let wide_name = to_wide(name);
        let mut data: u32 = 0;
        let mut size = std::mem::size_of::<u32>() as u32;
        let status = unsafe {
            RegGetValueW(
                key.0,
                PCWSTR::null(),
                PCWSTR(wide_name.as_ptr()),
                RRF_RT_REG_DWORD,
                None,
                Some(&mut data as *mut _ as *mut _),
                Some(&mut size),
            )
        };
        if status != ERROR_SUCCESS {
            return Err(map_win32_error(status, root, &format!("{}\\{}", path, name)));
        }
        Ok(data)
    }

    pub(super) fn write_dword(
        root: StoreRoot,
        path: &str,
        name: &str,
        value: u32,
    ) -> Result<(), DomainError> {
        let wide_path = to_wide(path);
        let mut key: HKEY = HKEY::default();
        let status = unsafe {
            RegCreateKeyExW(
                hive(root),
                PCWSTR(wide_path.as_ptr()),
                Some(0),
                None,
                REG_OPTION_NON_VOLATILE,
                KEY_SET_VALUE | KEY_QUERY_VALUE,
                None,
                &mut key,
                None,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(map_win32_error(status, root, path));
        }
        let key = RegKeyGuard(key);

        let wide_name = to_wide(name);
        let bytes = value.to_le_bytes();
        let status = unsafe {
            RegSetValueExW(
                key.0,
                PCWSTR(wide_name.as_ptr()),
                Some(0),
                REG_DWORD,
                Some(&bytes),
            )
        };
        if status != ERROR_SUCCESS {
            return Err(map_win32_error(status, root, &format!("{}\\{}", path, name)));
        }
        log::debug!("wrote {}\\{}\\{} = {}", root, path, name, value);
        Ok(())
    }

    fn to_wide(s: &str) -> Vec<u16> {
        let mut wide: Vec<u16> = s.encode_utf16().collect();
        wide.push(0);
        wide
    }

    fn map_win32_error(status: WIN32_ERROR, root: StoreRoot, path: &str) -> DomainError {
        if status == ERROR_ACCESS_DENIED {
            return DomainError::RegistryAccessDenied(format!("{}\\{}", root, path));
        }
        if status == ERROR_FILE_NOT_FOUND || status == ERROR_PATH_NOT_FOUND {
            return DomainError::ValueNotFound(format!("{}\\{}", root, path));
        }
        DomainError::Registry(format!("{}\\{}: status={}", root, path, status.0))
    }
}
