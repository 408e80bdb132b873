//! pmk: IE 保護モードのゾーン別切り替え CLI。
//! 単発のコマンドは変更をそのまま残す。`hold` だけが子プロセス終了後に
//! 起動時の状態へ戻す（--keep 指定時を除く）。

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pmk_composition::KeeperRuntime;
use pmk_composition::domain::model::{Scope, StateTable, ToggleValue, Zone};
use pmk_composition::domain::port::driven::ConfigStore;
use pmk_composition::domain::port::driving::ProtectedModeUseCase;
use pmk_composition::logging::init_logging;
use serde::Serialize;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pmk", about = "Protected Mode keeper CLI")]
struct Cli {
    /// 設定ファイルのパス（未指定なら既定）
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// JSON形式で出力
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    /// デバッグログを出力
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct ScopeArgs {
    /// 現在のユーザー（HKCU）を対象にする
    #[arg(long)]
    user: bool,
    /// マシン全体（HKLM）を対象にする
    #[arg(long)]
    system: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 全ゾーンの現在の状態を表示
    Status,
    /// 全ゾーンの保護モードを有効化
    EnableAll {
        #[command(flatten)]
        scopes: ScopeArgs,
    },
    /// 全ゾーンの保護モードを無効化
    DisableAll {
        #[command(flatten)]
        scopes: ScopeArgs,
    },
    /// インターネット/制限付きのみ有効化し、イントラネット/信頼済みは無効化
    RiskyOnly {
        #[command(flatten)]
        scopes: ScopeArgs,
    },
    /// 1 セルの値を表示（enabled|disabled|unknown）
    Get {
        /// ゾーン名またはコード（intranet|trusted|internet|restricted|1-4）
        zone: Zone,
        /// スコープ（user|system）
        scope: Scope,
    },
    /// 1 セルの値を設定
    Set {
        zone: Zone,
        scope: Scope,
        value: Switch,
    },
    /// 設定を適用してコマンドを実行し、終了後に元へ戻す
    Hold {
        /// 適用する操作
        #[arg(long, value_enum, default_value_t = Mode::DisableAll)]
        mode: Mode,
        #[command(flatten)]
        scopes: ScopeArgs,
        /// コマンド終了後も変更を残す
        #[arg(long, default_value_t = false)]
        keep: bool,
        /// 実行するコマンドと引数
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        command: Vec<OsString>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Switch {
    On,
    Off,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Mode {
    EnableAll,
    DisableAll,
    RiskyOnly,
}

#[derive(Serialize)]
struct JsonBulkResult<'a> {
    operation: &'a str,
    ok: bool,
    state: StateTable,
}

#[derive(Serialize)]
struct JsonCell {
    zone: &'static str,
    scope: &'static str,
    value: ToggleValue,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    // runtime は run() 内で破棄され、exit より前に復元が走る
    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("pmk failed: {err:#}");
            1
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let runtime = match &cli.config {
        Some(path) => KeeperRuntime::with_config_path(path)?,
        None => KeeperRuntime::new()?,
    };
    execute(runtime, cli)
}

fn execute<S: ConfigStore + 'static>(runtime: KeeperRuntime<S>, cli: Cli) -> Result<i32> {
    let restore_after = matches!(cli.command, Command::Hold { keep: false, .. });
    if !restore_after {
        runtime.keep_changes();
    }
    let keeper = runtime.use_case();

    let code = match cli.command {
        Command::Status => {
            print_state(&keeper.current_state(), cli.json)?;
            0
        }
        Command::EnableAll { scopes } => {
            let (user, system) = resolve(&runtime, scopes);
            report_bulk("enable-all", keeper.enable_all(user, system), keeper, cli.json)?
        }
        Command::DisableAll { scopes } => {
            let (user, system) = resolve(&runtime, scopes);
            report_bulk("disable-all", keeper.disable_all(user, system), keeper, cli.json)?
        }
        Command::RiskyOnly { scopes } => {
            let (user, system) = resolve(&runtime, scopes);
            let ok = keeper.enable_for_risky_only(user, system);
            report_bulk("risky-only", ok, keeper, cli.json)?
        }
        Command::Get { zone, scope } => {
            let value = keeper.get_zone_value(zone, scope);
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonCell {
                        zone: zone.name(),
                        scope: scope.name(),
                        value,
                    })?
                );
            } else {
                println!("{}", value);
            }
            0
        }
        Command::Set { zone, scope, value } => {
            let enabled = matches!(value, Switch::On);
            if keeper.set_zone_value(zone, scope, enabled) {
                if !cli.json {
                    println!("{} {} -> {}", zone, scope, ToggleValue::from(enabled));
                }
                0
            } else {
                eprintln!("failed to set {} {}", zone, scope);
                1
            }
        }
        Command::Hold {
            mode,
            scopes,
            command,
            ..
        } => {
            let (user, system) = resolve(&runtime, scopes);
            let applied = match mode {
                Mode::EnableAll => keeper.enable_all(user, system),
                Mode::DisableAll => keeper.disable_all(user, system),
                Mode::RiskyOnly => keeper.enable_for_risky_only(user, system),
            };
            if !applied {
                log::warn!("{:?} was only partially applied", mode);
            }
            run_child(&command)?
        }
    };

    runtime.finish();
    Ok(code)
}

fn resolve<S: ConfigStore + 'static>(
    runtime: &KeeperRuntime<S>,
    scopes: ScopeArgs,
) -> (bool, bool) {
    runtime.config().resolve_scopes(scopes.user, scopes.system)
}

fn report_bulk(
    operation: &str,
    ok: bool,
    keeper: &dyn ProtectedModeUseCase,
    json: bool,
) -> Result<i32> {
    let state = keeper.current_state();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonBulkResult {
                operation,
                ok,
                state,
            })?
        );
    } else {
        print_state(&state, false)?;
        if !ok {
            eprintln!("{}: some values could not be written", operation);
        }
    }
    Ok(if ok { 0 } else { 1 })
}

fn print_state(state: &StateTable, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
        return Ok(());
    }
    println!("{:<12} {:<10} {:<10}", "zone", "user", "system");
    for zone in Zone::all() {
        println!(
            "{:<12} {:<10} {:<10}",
            zone.name(),
            state.get(*zone, Scope::User).as_str(),
            state.get(*zone, Scope::System).as_str()
        );
    }
    Ok(())
}

fn run_child(command: &[OsString]) -> Result<i32> {
    let Some((program, args)) = command.split_first() else {
        anyhow::bail!("no command given");
    };
    log::info!("running {}", program.to_string_lossy());
    let status = std::process::Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("failed to start {}", program.to_string_lossy()))?;
    Ok(status.code().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmk_composition::domain::DomainError;
    use pmk_composition::domain::model::{KeeperConfig, StoreRoot, ZoneCode};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[test]
    fn parses_scope_flags() {
        let cli = Cli::try_parse_from(["pmk", "enable-all", "--system"]).unwrap();
        match cli.command {
            Command::EnableAll { scopes } => {
                assert!(!scopes.user);
                assert!(scopes.system);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_zone_and_scope_names() {
        let cli = Cli::try_parse_from(["pmk", "set", "internet", "hkcu", "off"]).unwrap();
        match cli.command {
            Command::Set { zone, scope, value } => {
                assert_eq!(zone, Zone::Internet);
                assert_eq!(scope, Scope::User);
                assert!(matches!(value, Switch::Off));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_zone() {
        assert!(Cli::try_parse_from(["pmk", "get", "local", "user"]).is_err());
    }

    #[test]
    fn hold_passes_trailing_arguments_through() {
        let cli = Cli::try_parse_from([
            "pmk", "hold", "--keep", "--mode", "risky-only", "iexplore.exe", "--flag",
        ])
        .unwrap();
        match cli.command {
            Command::Hold {
                mode,
                keep,
                command,
                ..
            } => {
                assert!(matches!(mode, Mode::RiskyOnly));
                assert!(keep);
                assert_eq!(command, vec![OsString::from("iexplore.exe"), OsString::from("--flag")]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn rejects_restore_subcommand() {
        assert!(Cli::try_parse_from(["pmk", "restore"]).is_err());
    }

    #[derive(Clone, Default)]
    struct MemoryStore {
        values: Arc<Mutex<HashMap<(StoreRoot, u32), u32>>>,
    }

    impl MemoryStore {
        fn user_disabled() -> Self {
            let store = Self::default();
            for zone in Zone::all() {
                store
                    .values
                    .lock()
                    .unwrap()
                    .insert((StoreRoot::CurrentUser, zone.code().get()), 3);
            }
            store
        }

        fn user(&self, zone: Zone) -> Option<u32> {
            self.values
                .lock()
                .unwrap()
                .get(&(StoreRoot::CurrentUser, zone.code().get()))
                .copied()
        }
    }

    impl ConfigStore for MemoryStore {
        fn get_int(&self, root: StoreRoot, zone: ZoneCode) -> Result<u32, DomainError> {
            self.values
                .lock()
                .unwrap()
                .get(&(root, zone.get()))
                .copied()
                .ok_or_else(|| DomainError::ValueNotFound(zone.to_string()))
        }

        fn set_int(&self, root: StoreRoot, zone: ZoneCode, value: u32) -> Result<(), DomainError> {
            self.values.lock().unwrap().insert((root, zone.get()), value);
            Ok(())
        }
    }

    fn execute_args(store: &MemoryStore, args: &[&str]) -> i32 {
        let runtime = KeeperRuntime::with_store(store.clone(), KeeperConfig::default()).unwrap();
        let cli = Cli::try_parse_from(std::iter::once("pmk").chain(args.iter().copied())).unwrap();
        execute(runtime, cli).unwrap()
    }

    #[test]
    fn one_shot_commands_keep_their_changes() {
        let store = MemoryStore::user_disabled();

        assert_eq!(execute_args(&store, &["enable-all"]), 0);
        for zone in Zone::all() {
            assert_eq!(store.user(*zone), Some(0));
        }

        assert_eq!(execute_args(&store, &["set", "trusted", "user", "off"]), 0);
        assert_eq!(store.user(Zone::Trusted), Some(3));
        assert_eq!(store.user(Zone::Internet), Some(0));
    }

    #[cfg(unix)]
    #[test]
    fn hold_restores_after_child_and_passes_exit_code() {
        let store = MemoryStore::user_disabled();

        assert_eq!(execute_args(&store, &["hold", "--mode", "enable-all", "true"]), 0);
        for zone in Zone::all() {
            assert_eq!(store.user(*zone), Some(3));
        }

        assert_eq!(execute_args(&store, &["hold", "--mode", "enable-all", "false"]), 1);
        assert_eq!(store.user(Zone::Internet), Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn hold_with_keep_leaves_changes() {
        let store = MemoryStore::user_disabled();

        assert_eq!(
            execute_args(&store, &["hold", "--keep", "--mode", "risky-only", "true"]),
            0
        );
        assert_eq!(store.user(Zone::Internet), Some(0));
        assert_eq!(store.user(Zone::Intranet), Some(3));
    }

    #[test]
    fn hold_fails_when_child_cannot_start() {
        let store = MemoryStore::user_disabled();
        let runtime = KeeperRuntime::with_store(store.clone(), KeeperConfig::default()).unwrap();
        let cli = Cli::try_parse_from([
            "pmk",
            "hold",
            "--mode",
            "enable-all",
            "pmk-no-such-program-for-hold",
        ])
        .unwrap();

        assert!(execute(runtime, cli).is_err());
        assert_eq!(store.user(Zone::Restricted), Some(3));
    }
}
