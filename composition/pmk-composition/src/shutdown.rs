//! シャットダウンフック
//!
//! 正常終了（ハンドルの Drop）と Ctrl+C / コンソールクローズ（Windows）、
//! SIGINT / SIGTERM（Unix）で登録済みタスクを 1 回実行する。

use anyhow::Result;
use pmk_app::ShutdownTask;
use std::sync::Arc;

/// 破棄時にタスクを実行し、シグナルハンドラを解除する
pub struct ShutdownHook {
    task: Arc<dyn ShutdownTask>,
    #[cfg(unix)]
    handle: signal_hook::iterator::Handle,
    #[cfg(unix)]
    thread: Option<std::thread::JoinHandle<()>>,
}

impl ShutdownHook {
    /// タスクを今すぐ実行する（一度だけ実行されるかはタスク側が保証する）
    pub fn run_now(&self) {
        self.task.run_on_shutdown();
    }
}

#[cfg(unix)]
pub fn install_shutdown_hook(task: Arc<dyn ShutdownTask>) -> Result<ShutdownHook> {
    use anyhow::Context;
    use signal_hook::consts::signal::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("failed to register signal handlers")?;
    let handle = signals.handle();
    let signal_task = Arc::clone(&task);
    let thread = std::thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            log::info!("received signal {}, running shutdown hook", signal);
            signal_task.run_on_shutdown();
            std::process::exit(128 + signal);
        }
    });

    Ok(ShutdownHook {
        task,
        handle,
        thread: Some(thread),
    })
}

#[cfg(windows)]
pub fn install_shutdown_hook(task: Arc<dyn ShutdownTask>) -> Result<ShutdownHook> {
    windows_impl::register(Arc::clone(&task))?;
    Ok(ShutdownHook { task })
}

#[cfg(not(any(unix, windows)))]
pub fn install_shutdown_hook(task: Arc<dyn ShutdownTask>) -> Result<ShutdownHook> {
    Ok(ShutdownHook { task })
}

impl Drop for ShutdownHook {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            self.handle.close();
            if let Some(thread) = self.thread.take() {
                let _ = thread.join();
            }
        }
        #[cfg(windows)]
        windows_impl::unregister();

        self.task.run_on_shutdown();
    }
}

#[cfg(windows)]
mod windows_impl {
    use super::*;
    use std::sync::Mutex;
    use windows::Win32::System::Console::SetConsoleCtrlHandler;
    use windows::core::BOOL;

    // コンソール制御ハンドラはプロセス全体で 1 つの関数なので、タスクは静的に保持する
    static TASK: Mutex<Option<Arc<dyn ShutdownTask>>> = Mutex::new(None);

    unsafe extern "system" fn console_ctrl_handler(ctrl_type: u32) -> BOOL {
        let task = TASK.lock().ok().and_then(|slot| slot.clone());
        if let Some(task) = task {
            log::info!("console control event {}, running shutdown hook", ctrl_type);
            task.run_on_shutdown();
        }
        // 既定のハンドラにも処理させてプロセスを終了させる
        BOOL(0)
    }

    pub(super) fn register(task: Arc<dyn ShutdownTask>) -> Result<()> {
        if let Ok(mut slot) = TASK.lock() {
            *slot = Some(task);
        }
        unsafe { SetConsoleCtrlHandler(Some(console_ctrl_handler), true) }
            .map_err(|e| anyhow::anyhow!("SetConsoleCtrlHandler failed: {}", e.message()))
    }

    pub(super) fn unregister() {
        let _ = unsafe { SetConsoleCtrlHandler(Some(console_ctrl_handler), false) };
        if let Ok(mut slot) = TASK.lock() {
            slot.take();
        }
    }
}
