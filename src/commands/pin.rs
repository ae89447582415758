use serde_json::Value;
use tauri::ipc::Request;
use tauri::State;

use super::args::{json_body, Arguments};
use super::CoordinatorState;
use crate::pairing::PairingCoordinator;
use crate::{AppError, AppResult};

/// 前端提交 PIN
///
/// 不要求当前有 PIN 请求在等待；没有 `pin` 字符串时返回 `INVALID_ARGUMENT`。
#[tauri::command]
pub async fn submit_pin(
    coordinator: State<'_, CoordinatorState>,
    request: Request<'_>,
) -> AppResult<bool> {
    let args = json_body(request.body()).map_err(|_| AppError::PinNotProvided)?;
    submit(coordinator.inner(), args)
}

pub(crate) fn submit(coordinator: &PairingCoordinator, args: &Value) -> AppResult<bool> {
    let pin = Arguments::from_value(args)
        .and_then(|args| args.string("pin"))
        .map_err(|_| AppError::PinNotProvided)?;

    coordinator.submit_pin(pin);
    Ok(true)
}
