//! 应用错误处理模块
//!
//! Tauri 命令的错误必须实现 Serialize 才能传递给前端。
//! 前端按 `kind` 字段区分错误码，与原生配对桥约定的错误码保持一致。

use serde::Serialize;
use thiserror::Error;

use crate::device::BluetoothAddress;
use crate::pairing::OperationKind;
use crate::platform::PlatformError;

/// 应用统一错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 参数不是对象，或字段类型不符
    #[error("Arguments must be a map")]
    InvalidArguments,

    /// 缺少必填参数
    #[error("{0} is required")]
    MissingArgument(&'static str),

    /// MAC 地址格式错误
    #[error("Invalid Bluetooth address format: {0}")]
    InvalidAddress(String),

    /// 平台无法根据地址创建设备对象
    #[error("Could not create device object from address {0}")]
    DeviceNotFound(BluetoothAddress),

    /// 同一设备已有配对/取消配对操作在执行
    #[error("{}", .0.in_progress_message())]
    OperationInProgress(OperationKind),

    /// 配对失败
    ///
    /// `status` 为平台返回的状态码；平台调用本身抛错时为 `None`。
    #[error("{message}")]
    PairingFailed { status: Option<i32>, message: String },

    /// 取消配对失败
    #[error("{0}")]
    UnpairFailed(String),

    /// 查询配对状态失败
    #[error("{0}")]
    CheckFailed(String),

    /// PIN 通道未收到 pin 参数
    #[error("PIN not provided")]
    PinNotProvided,
}

impl AppError {
    /// 平台异常 → `PAIRING_FAILED`，保留平台原始消息
    pub fn pairing_failed(err: PlatformError) -> Self {
        AppError::PairingFailed {
            status: None,
            message: err.message,
        }
    }

    pub fn unpair_failed(err: PlatformError) -> Self {
        AppError::UnpairFailed(err.message)
    }

    pub fn check_failed(err: PlatformError) -> Self {
        AppError::CheckFailed(err.message)
    }

    /// 前端使用的错误码
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidArguments => "INVALID_ARGUMENTS",
            AppError::MissingArgument(_) => "MISSING_ARGUMENT",
            AppError::InvalidAddress(_) => "INVALID_ADDRESS",
            AppError::DeviceNotFound(_) => "DEVICE_NOT_FOUND",
            AppError::OperationInProgress(_) => "OPERATION_IN_PROGRESS",
            AppError::PairingFailed { .. } => "PAIRING_FAILED",
            AppError::UnpairFailed(_) => "UNPAIR_FAILED",
            AppError::CheckFailed(_) => "CHECK_FAILED",
            AppError::PinNotProvided => "INVALID_ARGUMENT",
        }
    }
}

/// 传递给前端的序列化错误格式：`{ kind, message }`，
/// 配对失败且已知平台状态码时额外带 `status`。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let status = match self {
            AppError::PairingFailed { status, .. } => *status,
            _ => None,
        };

        let mut state =
            serializer.serialize_struct("AppError", if status.is_some() { 3 } else { 2 })?;
        state.serialize_field("kind", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        if let Some(status) = status {
            state.serialize_field("status", &status)?;
        }
        state.end()
    }
}

// ============ 便捷类型别名 ============

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
