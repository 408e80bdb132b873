//! CLI 用ランタイム配線。
//! 設定読込 → コンテキスト作成 → マネージャー初期化（スナップショット取得）
//! → 終了時復元ガードをシャットダウンフックへ登録、の順で組み立てる。

use crate::shutdown::{ShutdownHook, install_shutdown_hook};
use anyhow::{Context, Result, anyhow};
use pmk_adapter_fs::FsConfigRepository;
use pmk_adapter_registry::RegistryAdapter;
use pmk_app::{KeeperContext, ProtectedModeManager, ShutdownTask};
use pmk_domain::model::KeeperConfig;
use pmk_domain::port::driven::ConfigStore;
use pmk_domain::port::driving::ProtectedModeUseCase;
use std::path::Path;
use std::sync::Arc;

pub struct KeeperRuntime<S: ConfigStore + 'static = RegistryAdapter> {
    config: KeeperConfig,
    manager: ProtectedModeManager<S>,
    // マネージャーより後に破棄され、終了時復元を実行する
    shutdown: ShutdownHook,
}

impl KeeperRuntime<RegistryAdapter> {
    /// 既定の設定ファイルとレジストリで作成
    pub fn new() -> Result<Self> {
        Self::from_config_repository(&FsConfigRepository::with_default_path())
    }

    /// 設定ファイルを指定して作成
    pub fn with_config_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_config_repository(&FsConfigRepository::new(path))
    }

    fn from_config_repository(repo: &FsConfigRepository) -> Result<Self> {
        let config = repo
            .load_or_default()
            .with_context(|| format!("loading {}", repo.config_path().display()))?;
        Self::with_store(RegistryAdapter::new(), config)
    }
}

impl<S: ConfigStore + 'static> KeeperRuntime<S> {
    pub fn with_store(store: S, config: KeeperConfig) -> Result<Self> {
        config.validate()?;
        let ctx = KeeperContext::new(store, &config);
        let manager = ProtectedModeManager::new(Arc::clone(&ctx));
        let guard = ctx
            .exit_guard()
            .ok_or_else(|| anyhow!("exit restore guard already issued"))?;
        let task: Arc<dyn ShutdownTask> = Arc::new(guard);
        let shutdown = install_shutdown_hook(task)?;
        log::debug!(
            "runtime ready (restore_on_exit={}, default scopes={:?})",
            config.restore_on_exit,
            config.default_scopes()
        );
        Ok(Self {
            config,
            manager,
            shutdown,
        })
    }

    pub fn config(&self) -> &KeeperConfig {
        &self.config
    }

    pub fn manager(&self) -> &ProtectedModeManager<S> {
        &self.manager
    }

    pub fn use_case(&self) -> &dyn ProtectedModeUseCase {
        &self.manager
    }

    /// 変更を終了後も残す
    pub fn keep_changes(&self) {
        self.manager.set_restore_on_exit(false);
    }

    /// 終了時復元を今すぐ実行する（以後のフックは何もしない）
    pub fn finish(self) {
        self.shutdown.run_now();
    }
}
