//! ファイルシステムアダプター（設定の永続化）
//! JSONファイルで実装。読み込み時は欠損フィールドを既定値で補う。

use pmk_domain::error::DomainError;
use pmk_domain::model::KeeperConfig;
use pmk_domain::port::driven::ConfigRepository;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const PRODUCT_DIR_NAME: &str = "ProtectedModeKeeper";
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone)]
pub struct FsConfigRepository {
    config_path: PathBuf,
}

impl FsConfigRepository {
    /// 設定ファイルのパスを指定して作成。ファイルは保存時に作成する。
    pub fn new(config_path: impl AsRef<Path>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// 既定の場所を使う
    pub fn with_default_path() -> Self {
        Self::new(default_config_path())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// 設定読込（ファイルが無ければ既定値）
    pub fn load_or_default(&self) -> Result<KeeperConfig, DomainError> {
        if !self.exists() {
            log::debug!(
                "config file {} not found, using defaults",
                self.config_path.display()
            );
            return Ok(KeeperConfig::default());
        }
        self.load()
    }

    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), DomainError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| DomainError::Io(format!("create_dir_all: {e}")))?;
        }
        let tmp_path = path.with_extension(format!("tmp.{}", unique_suffix()));
        {
            let mut f = fs::File::create(&tmp_path)
                .map_err(|e| DomainError::Io(format!("create temp file: {e}")))?;
            f.write_all(data)
                .map_err(|e| DomainError::Io(format!("write temp file: {e}")))?;
            let _ = f.sync_all();
        }
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(DomainError::Io(format!("rename temp file: {e}")));
        }
        Ok(())
    }
}

impl ConfigRepository for FsConfigRepository {
    fn load(&self) -> Result<KeeperConfig, DomainError> {
        let buf = fs::read_to_string(&self.config_path)
            .map_err(|e| DomainError::ConfigLoadFailed(format!("read config: {e}")))?;
        let dto: ConfigDto =
            serde_json::from_str(&buf).map_err(|e| DomainError::ConfigLoadFailed(e.to_string()))?;
        let mut config = KeeperConfig::from(dto);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    fn save(&self, config: &KeeperConfig) -> Result<(), DomainError> {
        config.validate()?;
        let dto = ConfigDto::from(config);
        let data = serde_json::to_string_pretty(&dto)
            .map_err(|e| DomainError::Io(format!("serialize config: {e}")))?;
        self.write_atomic(&self.config_path, data.as_bytes())
    }

    fn exists(&self) -> bool {
        self.config_path.exists()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct ConfigDto {
    restore_on_exit: bool,
    default_user: bool,
    default_system: bool,
    exit_lock_timeout_ms: u32,
}

impl Default for ConfigDto {
    fn default() -> Self {
        ConfigDto::from(&KeeperConfig::default())
    }
}

impl From<&KeeperConfig> for ConfigDto {
    fn from(config: &KeeperConfig) -> Self {
        Self {
            restore_on_exit: config.restore_on_exit,
            default_user: config.default_user,
            default_system: config.default_system,
            exit_lock_timeout_ms: config.exit_lock_timeout_ms,
        }
    }
}

impl From<ConfigDto> for KeeperConfig {
    fn from(dto: ConfigDto) -> Self {
        Self {
            restore_on_exit: dto.restore_on_exit,
            default_user: dto.default_user,
            default_system: dto.default_system,
            exit_lock_timeout_ms: dto.exit_lock_timeout_ms,
        }
    }
}

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{}.{}", std::process::id(), nanos)
}

// ============================================================================
// 既定パス
// ============================================================================

/// 既定の設定ディレクトリ
///
/// - Windows: `%APPDATA%\ProtectedModeKeeper`（既知フォルダ）
/// - その他: `./var`（開発/テスト用）
pub fn default_config_dir() -> PathBuf {
    #[cfg(windows)]
    {
        use windows::Win32::UI::Shell::FOLDERID_RoamingAppData;

        known_folder_path(&FOLDERID_RoamingAppData)
            .or_else(|| std::env::var_os("APPDATA").map(PathBuf::from))
            .unwrap_or_else(std::env::temp_dir)
            .join(PRODUCT_DIR_NAME)
    }
    #[cfg(not(windows))]
    {
        PathBuf::from("./var")
    }
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join(CONFIG_FILE_NAME)
}

#[cfg(windows)]
fn known_folder_path(id: &windows::core::GUID) -> Option<PathBuf> {
    use windows::Win32::System::Com::CoTaskMemFree;
    use windows::Win32::UI::Shell::{KF_FLAG_DEFAULT, SHGetKnownFolderPath};
    use windows::core::PWSTR;

    unsafe {
        let raw: PWSTR = SHGetKnownFolderPath(id, KF_FLAG_DEFAULT, None).ok()?;
        let s = raw.to_string().unwrap_or_default();
        CoTaskMemFree(Some(raw.0 as _));
        if s.is_empty() {
            None
        } else {
            Some(PathBuf::from(s))
        }
    }
}
