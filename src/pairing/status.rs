//! 平台配对结果分类
//!
//! 把 WinRT `DevicePairingResultStatus` / `DeviceUnpairingResultStatus` 的数值
//! 映射为稳定的枚举和给前端看的消息。

use crate::{AppError, AppResult};

/// 配对结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingStatus {
    Paired,
    NotReadyToPair,
    NotPaired,
    AlreadyPaired,
    ConnectionRejected,
    TooManyConnections,
    HardwareFailure,
    AuthenticationTimeout,
    AuthenticationNotAllowed,
    AuthenticationFailure,
    NoSupportedProfiles,
    ProtectionLevelCouldNotBeMet,
    AccessDenied,
    InvalidCeremonyData,
    PairingCanceled,
    OperationAlreadyInProgress,
    RequiredHandlerNotRegistered,
    RejectedByHandler,
    RemoteDeviceHasAssociation,
    /// 数值 19，文档没有说明，通常是上一次配对尚未清理干净
    Failed,
    Unknown(i32),
}

impl PairingStatus {
    pub fn from_code(code: i32) -> Self {
        use PairingStatus::*;
        match code {
            0 => Paired,
            1 => NotReadyToPair,
            2 => NotPaired,
            3 => AlreadyPaired,
            4 => ConnectionRejected,
            5 => TooManyConnections,
            6 => HardwareFailure,
            7 => AuthenticationTimeout,
            8 => AuthenticationNotAllowed,
            9 => AuthenticationFailure,
            10 => NoSupportedProfiles,
            11 => ProtectionLevelCouldNotBeMet,
            12 => AccessDenied,
            13 => InvalidCeremonyData,
            14 => PairingCanceled,
            15 => OperationAlreadyInProgress,
            16 => RequiredHandlerNotRegistered,
            17 => RejectedByHandler,
            18 => RemoteDeviceHasAssociation,
            19 => Failed,
            other => Unknown(other),
        }
    }

    pub fn code(self) -> i32 {
        use PairingStatus::*;
        match self {
            Paired => 0,
            NotReadyToPair => 1,
            NotPaired => 2,
            AlreadyPaired => 3,
            ConnectionRejected => 4,
            TooManyConnections => 5,
            HardwareFailure => 6,
            AuthenticationTimeout => 7,
            AuthenticationNotAllowed => 8,
            AuthenticationFailure => 9,
            NoSupportedProfiles => 10,
            ProtectionLevelCouldNotBeMet => 11,
            AccessDenied => 12,
            InvalidCeremonyData => 13,
            PairingCanceled => 14,
            OperationAlreadyInProgress => 15,
            RequiredHandlerNotRegistered => 16,
            RejectedByHandler => 17,
            RemoteDeviceHasAssociation => 18,
            Failed => 19,
            Unknown(code) => code,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, PairingStatus::Paired | PairingStatus::AlreadyPaired)
    }

    pub fn message(self) -> String {
        use PairingStatus::*;
        let text = match self {
            Paired => "Paired successfully",
            AlreadyPaired => "Already paired",
            NotReadyToPair => "Device not ready to pair",
            NotPaired => "Pairing rejected or failed",
            ConnectionRejected => "Connection rejected",
            TooManyConnections => "Too many connections",
            HardwareFailure => "Hardware failure",
            AuthenticationTimeout => "Authentication timeout",
            AuthenticationNotAllowed => "Authentication not allowed",
            AuthenticationFailure => "Authentication failure - incorrect PIN?",
            NoSupportedProfiles => "No supported profiles",
            ProtectionLevelCouldNotBeMet => "Protection level could not be met",
            AccessDenied => "Access denied",
            InvalidCeremonyData => "Invalid ceremony data - PIN required but not provided",
            PairingCanceled => "Pairing canceled by user",
            OperationAlreadyInProgress => "Operation already in progress",
            RequiredHandlerNotRegistered => "Required handler not registered",
            RejectedByHandler => "Rejected by handler",
            RemoteDeviceHasAssociation => "Remote device has association",
            Failed | Unknown(_) => {
                return format!("Failed with unknown status (code={})", self.code())
            }
        };
        text.to_string()
    }

    /// 额外的排障提示，写入日志
    pub fn diagnostic(self) -> Option<&'static str> {
        match self {
            PairingStatus::OperationAlreadyInProgress => Some(
                "A previous pairing operation is still running on the platform; \
                 wait for it to finish before retrying",
            ),
            PairingStatus::Failed => Some(
                "Undocumented status 19: usually too many attempts in a short time or a \
                 previous pairing that was not cleaned up. Wait 30-60 seconds before retrying, \
                 or remove the device from the system Bluetooth settings",
            ),
            _ => None,
        }
    }

    /// 成功返回自身，失败转为 `PAIRING_FAILED`
    pub fn into_result(self) -> AppResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(AppError::PairingFailed {
                status: Some(self.code()),
                message: self.message(),
            })
        }
    }
}

/// 取消配对结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnpairStatus {
    Unpaired,
    AlreadyUnpaired,
    OperationAlreadyInProgress,
    AccessDenied,
    Failed,
    Unknown(i32),
}

impl UnpairStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => UnpairStatus::Unpaired,
            1 => UnpairStatus::AlreadyUnpaired,
            2 => UnpairStatus::OperationAlreadyInProgress,
            3 => UnpairStatus::AccessDenied,
            4 => UnpairStatus::Failed,
            other => UnpairStatus::Unknown(other),
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, UnpairStatus::Unpaired | UnpairStatus::AlreadyUnpaired)
    }
}
