//! 平台蓝牙配对接口
//!
//! 把操作系统的 BLE 配对 API 抽象为几个同步 trait，
//! [`PairingCoordinator`](crate::pairing::PairingCoordinator) 只依赖这些 trait：
//!
//! - Windows：[`winrt::WinRtPlatform`]，基于 `Windows.Devices.Enumeration` 的自定义配对
//! - 其他平台：[`unsupported::UnsupportedPlatform`]，所有设备查询都返回错误
//!
//! 所有调用都发生在协调器的工作线程上，并且是阻塞的（等价于对平台异步操作调用 `.get()`）。

#[cfg(test)]
pub(crate) mod mock;
#[cfg(not(windows))]
pub mod unsupported;
#[cfg(windows)]
pub mod winrt;

use std::sync::Arc;

use thiserror::Error;

use crate::device::BluetoothAddress;

/// 平台调用错误
///
/// `code` 为平台错误码（Windows 上是 HRESULT），`message` 原样透传给前端。
#[derive(Debug, Clone, Error)]
#[error("{message} (code=0x{code:08X})")]
pub struct PlatformError {
    pub code: i32,
    pub message: String,
}

impl PlatformError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub type PlatformResult<T> = Result<T, PlatformError>;

/// 单次配对请求的类型（平台回调时给出）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingKind {
    ConfirmOnly,
    DisplayPin,
    ProvidePin,
    ConfirmPinMatch,
    /// 未识别的原始位值
    Other(u32),
}

impl PairingKind {
    pub fn from_bits(bits: u32) -> Self {
        match bits {
            1 => PairingKind::ConfirmOnly,
            2 => PairingKind::DisplayPin,
            4 => PairingKind::ProvidePin,
            8 => PairingKind::ConfirmPinMatch,
            other => PairingKind::Other(other),
        }
    }
}

/// 支持的配对方式位集
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PairingKinds(u32);

impl PairingKinds {
    pub const CONFIRM_ONLY: Self = Self(1);
    pub const DISPLAY_PIN: Self = Self(2);
    pub const PROVIDE_PIN: Self = Self(4);
    pub const CONFIRM_PIN_MATCH: Self = Self(8);

    /// 协调器每次配对都提供的完整集合
    pub const ALL: Self = Self(
        Self::PROVIDE_PIN.0
            | Self::CONFIRM_PIN_MATCH.0
            | Self::DISPLAY_PIN.0
            | Self::CONFIRM_ONLY.0,
    );

    pub fn bits(self) -> u32 {
        self.0
    }
}

/// 最低保护级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionLevel {
    Encryption = 2,
    EncryptionAndAuthentication = 3,
}

impl ProtectionLevel {
    pub fn from_require_authentication(require_authentication: bool) -> Self {
        if require_authentication {
            ProtectionLevel::EncryptionAndAuthentication
        } else {
            ProtectionLevel::Encryption
        }
    }
}

/// 配对请求事件的注册凭据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerToken(pub i64);

/// 平台触发配对请求时调用的处理器
///
/// 运行在平台自己的线程上，可能在一次配对中被调用多次。
pub type PairingRequestHandler = Arc<dyn Fn(&dyn PairingRequest) + Send + Sync>;

/// 平台入口
pub trait BlePlatform: Send + Sync {
    /// 在当前线程进入多线程套间（MTA）
    fn enter_apartment(&self) -> PlatformResult<()>;

    /// 退出 [`enter_apartment`](Self::enter_apartment) 进入的套间
    fn leave_apartment(&self);

    /// 根据地址获取 BLE 设备，平台返回空对象时为 `Ok(None)`
    fn device_from_address(
        &self,
        address: BluetoothAddress,
    ) -> PlatformResult<Option<Box<dyn BleDevice>>>;
}

pub trait BleDevice {
    /// 设备信息上的配对子对象
    fn pairing(&self) -> PlatformResult<Box<dyn DevicePairing>>;
}

pub trait DevicePairing {
    fn is_paired(&self) -> PlatformResult<bool>;

    /// 取消配对，返回平台的取消配对状态码
    fn unpair(&self) -> PlatformResult<i32>;

    fn custom(&self) -> PlatformResult<Box<dyn CustomPairing>>;
}

pub trait CustomPairing {
    fn add_pairing_requested(&self, handler: PairingRequestHandler) -> PlatformResult<HandlerToken>;

    fn remove_pairing_requested(&self, token: HandlerToken) -> PlatformResult<()>;

    /// 发起自定义配对并阻塞到完成，返回平台的配对结果状态码
    fn pair(&self, kinds: PairingKinds, level: ProtectionLevel) -> PlatformResult<i32>;
}

/// 配对请求事件参数
pub trait PairingRequest {
    fn kind(&self) -> PlatformResult<PairingKind>;

    /// 平台展示/要求确认的 PIN（仅 DisplayPin / ConfirmPinMatch 有值）
    fn pin(&self) -> Option<String>;

    /// 获取延迟令牌，在完成前配对仪式保持打开
    fn deferral(&self) -> PlatformResult<Box<dyn Deferral>>;

    fn accept(&self) -> PlatformResult<()>;

    fn accept_with_pin(&self, pin: &str) -> PlatformResult<()>;
}

pub trait Deferral {
    fn complete(self: Box<Self>) -> PlatformResult<()>;
}

/// 当前编译目标对应的平台实现
pub fn default_platform() -> Arc<dyn BlePlatform> {
    #[cfg(windows)]
    {
        Arc::new(winrt::WinRtPlatform)
    }

    #[cfg(not(windows))]
    {
        Arc::new(unsupported::UnsupportedPlatform)
    }
}
