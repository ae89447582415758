//! Tauri IPC 命令入口
//!
//! 薄层命令入口，仅负责参数解析和等待工作线程结果，
//! 所有业务逻辑委托给 [`PairingCoordinator`](crate::pairing::PairingCoordinator)。

mod args;
mod pairing;
mod pin;

// glob re-export：Tauri 的 #[tauri::command] 宏会生成 __cmd__* 隐藏符号，
// generate_handler! 需要通过模块路径访问这些符号，显式导出无法覆盖。
pub use pairing::*;
pub use pin::*;

use std::sync::Arc;

use crate::pairing::PairingCoordinator;

/// 插件托管的协调器状态
pub type CoordinatorState = Arc<PairingCoordinator>;
