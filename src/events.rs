//! Tauri 事件名常量
//!
//! 所有后端 → 前端的事件名集中定义，避免硬编码字符串散落各模块。

// === PIN 通道 ===
/// 配对需要用户输入 PIN，前端收到后弹出输入框并调用 `submit_pin`
pub const PIN_REQUESTED: &str = "pin-requested";
