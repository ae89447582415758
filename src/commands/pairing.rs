use serde_json::Value;
use tauri::ipc::Request;
use tauri::State;
use tracing::debug;

use super::args::{json_body, Arguments};
use super::CoordinatorState;
use crate::pairing::coordinator::Reply;
use crate::{AppError, AppResult};

const DEVICE_ADDRESS: &str = "deviceAddress";
const REQUIRE_AUTHENTICATION: &str = "requireAuthentication";

/// 配对设备
///
/// 成功（含已配对）返回 `true`；失败以 `PAIRING_FAILED` 返回，带平台状态码。
#[tauri::command]
pub async fn pair_device(
    coordinator: State<'_, CoordinatorState>,
    request: Request<'_>,
) -> AppResult<bool> {
    pair(coordinator.inner(), json_body(request.body())?).await
}

/// 查询设备是否已配对，设备不可达时返回 `false`
#[tauri::command]
pub async fn is_device_paired(
    coordinator: State<'_, CoordinatorState>,
    request: Request<'_>,
) -> AppResult<bool> {
    is_paired(coordinator.inner(), json_body(request.body())?).await
}

/// 取消配对
///
/// 设备本就未配对时返回 `true`；设备不可达返回 `false`。
#[tauri::command]
pub async fn unpair_device(
    coordinator: State<'_, CoordinatorState>,
    request: Request<'_>,
) -> AppResult<bool> {
    unpair(coordinator.inner(), json_body(request.body())?).await
}

pub(crate) async fn pair(coordinator: &CoordinatorState, args: &Value) -> AppResult<bool> {
    let args = Arguments::from_value(args)?;
    let address = args.string(DEVICE_ADDRESS)?;
    let require_authentication = args.bool_or(REQUIRE_AUTHENTICATION, true)?;
    debug!(address, require_authentication, "pair_device invoked");

    let reply = coordinator.pair(address, require_authentication)?;
    receive(reply, pair_lost).await?;
    Ok(true)
}

pub(crate) async fn is_paired(coordinator: &CoordinatorState, args: &Value) -> AppResult<bool> {
    let address = Arguments::from_value(args)?.string(DEVICE_ADDRESS)?;
    receive(coordinator.is_paired(address)?, check_lost).await
}

pub(crate) async fn unpair(coordinator: &CoordinatorState, args: &Value) -> AppResult<bool> {
    let address = Arguments::from_value(args)?.string(DEVICE_ADDRESS)?;
    debug!(address, "unpair_device invoked");

    receive(coordinator.unpair(address)?, unpair_lost).await
}

/// 等待工作线程结果，发送端在送回前被丢弃时以 `lost` 给出错误
async fn receive<T>(reply: Reply<T>, lost: fn() -> AppError) -> AppResult<T> {
    reply.await.map_err(|_| lost())?
}

fn pair_lost() -> AppError {
    AppError::PairingFailed {
        status: None,
        message: "Pairing worker exited without a result".into(),
    }
}

fn check_lost() -> AppError {
    AppError::CheckFailed("Query worker exited without a result".into())
}

fn unpair_lost() -> AppError {
    AppError::UnpairFailed("Unpair worker exited without a result".into())
}
