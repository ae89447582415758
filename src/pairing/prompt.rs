use serde::Serialize;
use tauri::{AppHandle, Emitter, Runtime};
use tracing::{debug, warn};

use crate::events;

/// 向前端索取 PIN 的出站通道
///
/// 只负责通知，不等待回应；PIN 通过 `submit_pin` 命令另行送回。
pub trait PinPrompt: Send + Sync {
    fn request_pin(&self);
}

/// PIN 请求事件 payload（空对象）
#[derive(Debug, Clone, Serialize)]
struct PinRequestPayload {}

/// 通过 Tauri 事件通知前端弹出 PIN 输入框
pub struct EventPinPrompt<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> EventPinPrompt<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: Runtime> PinPrompt for EventPinPrompt<R> {
    fn request_pin(&self) {
        match self.app.emit(events::PIN_REQUESTED, PinRequestPayload {}) {
            Ok(()) => debug!("PIN request sent to frontend"),
            Err(e) => warn!("Failed to emit PIN request: {}", e),
        }
    }
}
