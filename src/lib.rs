//! BLE 配对桥
//!
//! Tauri 插件，把 Windows 自定义 BLE 配对仪式暴露给前端：
//! `pair_device` / `is_device_paired` / `unpair_device` 三个命令，
//! 以及配对中途的 PIN 通道（`pin-requested` 事件 + `submit_pin` 命令）。

pub mod commands;
pub mod device;
pub mod error;
pub mod events;
pub mod pairing;
pub mod platform;
pub use error::{AppError, AppResult};

use std::sync::Arc;

use tauri::plugin::{Builder, TauriPlugin};
use tauri::{Manager, Runtime};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::CoordinatorState;
use crate::pairing::{EventPinPrompt, PairingConfig, PairingCoordinator};

/// 宿主应用可能已经安装了全局 subscriber，此时沿用宿主的
fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("blepair=debug")),
        )
        .try_init();
}

/// 使用默认配置初始化插件
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    init_with_config(PairingConfig::default())
}

pub fn init_with_config<R: Runtime>(config: PairingConfig) -> TauriPlugin<R> {
    Builder::new("ble-pairing")
        .invoke_handler(tauri::generate_handler![
            commands::pair_device,
            commands::is_device_paired,
            commands::unpair_device,
            commands::submit_pin,
        ])
        .setup(move |app, _api| {
            init_tracing();

            let prompt = Arc::new(EventPinPrompt::new(app.clone()));
            let coordinator =
                PairingCoordinator::with_config(platform::default_platform(), prompt, config);
            tracing::info!(
                pin_timeout = ?coordinator.config().pin_timeout(),
                settle_delay = ?coordinator.config().settle_delay(),
                "BLE pairing plugin initialized"
            );
            app.manage::<CoordinatorState>(Arc::new(coordinator));
            Ok(())
        })
        .build()
}
