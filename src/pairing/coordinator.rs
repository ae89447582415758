//! 配对协调器
//!
//! 准入在调用方线程上同步完成：解析地址、按设备互斥。之后每个操作在独立的
//! 命名工作线程上执行，线程内依次进入 MTA 套间、调用平台、送回结果。
//! 配对仪式固定为：强制取消配对并等待 [`SETTLE_DELAY`](super::config::SETTLE_DELAY)，
//! 注册配对请求处理器，以全部配对方式发起配对，注销处理器，分类结果。

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use super::apartment::ApartmentGuard;
use super::config::PairingConfig;
use super::gate::{OperationGate, OperationKind};
use super::handler::{HandlerRegistration, PinRequestHandler};
use super::prompt::PinPrompt;
use super::rendezvous::PinRendezvous;
use super::status::{PairingStatus, UnpairStatus};
use crate::device::BluetoothAddress;
use crate::platform::{BlePlatform, DevicePairing, PairingKinds, PlatformError, ProtectionLevel};
use crate::{AppError, AppResult};

/// 工作线程送回的结果
pub type Reply<T> = oneshot::Receiver<AppResult<T>>;

/// 配对协调器
///
/// 持有平台实现、前端 PIN 通道、按设备的操作互斥和 PIN 信箱，
/// 生命周期与插件相同。三个操作都在独立的工作线程上执行：
/// 调用方在准入后立刻拿到 [`Reply`]，结果由工作线程送回。
pub struct PairingCoordinator {
    platform: Arc<dyn BlePlatform>,
    prompt: Arc<dyn PinPrompt>,
    gate: OperationGate,
    rendezvous: Arc<PinRendezvous>,
    config: PairingConfig,
}

impl PairingCoordinator {
    pub fn with_config(
        platform: Arc<dyn BlePlatform>,
        prompt: Arc<dyn PinPrompt>,
        config: PairingConfig,
    ) -> Self {
        Self {
            platform,
            prompt,
            gate: OperationGate::new(),
            rendezvous: Arc::new(PinRendezvous::new()),
            config,
        }
    }

    /// 发起配对
    ///
    /// 地址格式错误或该设备已有操作进行中时同步返回错误，不会启动工作线程。
    pub fn pair(
        self: &Arc<Self>,
        address: &str,
        require_authentication: bool,
    ) -> AppResult<Reply<PairingStatus>> {
        let address = BluetoothAddress::parse(address)?;
        let permit = self.gate.admit(address, OperationKind::Pair)?;
        let this = Arc::clone(self);

        self.spawn_worker(
            "pair",
            address,
            AppError::pairing_failed,
            || {
                Err(AppError::PairingFailed {
                    status: None,
                    message: "Unknown error occurred during pairing".into(),
                })
            },
            move || {
                let _permit = permit;
                this.run_pair(address, require_authentication)
            },
        )
    }

    /// 查询配对状态
    ///
    /// 只读操作，不经过操作互斥，可与同一设备上的配对并发。
    pub fn is_paired(self: &Arc<Self>, address: &str) -> AppResult<Reply<bool>> {
        let address = BluetoothAddress::parse(address)?;
        let this = Arc::clone(self);

        self.spawn_worker(
            "query",
            address,
            AppError::check_failed,
            || Ok(false),
            move || this.run_is_paired(address),
        )
    }

    /// 取消配对
    pub fn unpair(self: &Arc<Self>, address: &str) -> AppResult<Reply<bool>> {
        let address = BluetoothAddress::parse(address)?;
        let permit = self.gate.admit(address, OperationKind::Unpair)?;
        let this = Arc::clone(self);

        self.spawn_worker(
            "unpair",
            address,
            AppError::unpair_failed,
            || {
                Err(AppError::UnpairFailed(
                    "Unknown error occurred during unpairing".into(),
                ))
            },
            move || {
                let _permit = permit;
                this.run_unpair(address)
            },
        )
    }

    /// 前端提交 PIN
    ///
    /// 不检查是否有 PIN 请求在等待，没有等待者时该值会在下一次请求前被清空。
    pub fn submit_pin(&self, pin: impl Into<String>) {
        let pin = pin.into();
        info!(len = pin.len(), "PIN submitted by frontend");
        self.rendezvous.submit(pin);
    }

    pub fn config(&self) -> &PairingConfig {
        &self.config
    }

    /// 启动工作线程
    ///
    /// 线程体在 MTA 套间内执行；平台错误经 `on_error` 映射，
    /// panic 由 `on_panic` 给出结果。套间和操作许可都在结果送回之前释放。
    fn spawn_worker<T, B, P>(
        &self,
        name: &str,
        address: BluetoothAddress,
        on_error: fn(PlatformError) -> AppError,
        on_panic: P,
        body: B,
    ) -> AppResult<Reply<T>>
    where
        T: Send + 'static,
        B: FnOnce() -> AppResult<T> + Send + 'static,
        P: FnOnce() -> AppResult<T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let platform = Arc::clone(&self.platform);
        let op = name.to_string();

        thread::Builder::new()
            .name(format!("ble-{name}-{address}"))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    let _apartment = ApartmentGuard::enter(platform.as_ref()).map_err(on_error)?;
                    body()
                }))
                .unwrap_or_else(|_| {
                    error!(%address, op = %op, "Worker panicked");
                    on_panic()
                });

                if tx.send(result).is_err() {
                    debug!(%address, op = %op, "Caller went away before the result was delivered");
                }
            })
            .map_err(|e| on_error(PlatformError::new(-1, e.to_string())))?;

        Ok(rx)
    }

    fn run_pair(
        &self,
        address: BluetoothAddress,
        require_authentication: bool,
    ) -> AppResult<PairingStatus> {
        info!(%address, require_authentication, "Pairing started");

        let device = self
            .platform
            .device_from_address(address)
            .map_err(AppError::pairing_failed)?
            .ok_or(AppError::DeviceNotFound(address))?;
        let pairing = device.pairing().map_err(AppError::pairing_failed)?;

        self.settle(address, pairing.as_ref());

        let custom = pairing.custom().map_err(AppError::pairing_failed)?;
        let handler = PinRequestHandler::new(
            Arc::clone(&self.rendezvous),
            Arc::clone(&self.prompt),
            self.config.pin_timeout,
        );
        let registration =
            HandlerRegistration::register(custom.as_ref(), handler.into_platform_handler())
                .map_err(AppError::pairing_failed)?;

        let kinds = PairingKinds::ALL;
        let level = ProtectionLevel::from_require_authentication(require_authentication);
        debug!(%address, kinds = kinds.bits(), ?level, "Starting custom pairing");
        let result = custom.pair(kinds, level);
        drop(registration);

        let status = PairingStatus::from_code(result.map_err(AppError::pairing_failed)?);
        if status.is_success() {
            info!(%address, ?status, "Pairing completed");
        } else {
            warn!(%address, code = status.code(), "Pairing failed: {}", status.message());
            if let Some(hint) = status.diagnostic() {
                warn!(%address, "{}", hint);
            }
        }

        status.into_result()
    }

    /// 强制取消配对并等待平台清理绑定状态，任何失败只记录日志
    fn settle(&self, address: BluetoothAddress, pairing: &dyn DevicePairing) {
        match pairing.unpair() {
            Ok(code) => match UnpairStatus::from_code(code) {
                UnpairStatus::Unpaired => debug!(%address, "Force unpair cleared previous bond"),
                UnpairStatus::AlreadyUnpaired => debug!(%address, "Device was already unpaired"),
                status => debug!(%address, ?status, "Force unpair returned"),
            },
            Err(e) => warn!(%address, "Force unpair failed, continuing: {}", e),
        }

        debug!(%address, delay = ?self.config.settle_delay, "Waiting for pairing state to settle");
        thread::sleep(self.config.settle_delay);
    }

    fn run_is_paired(&self, address: BluetoothAddress) -> AppResult<bool> {
        let Some(device) = self
            .platform
            .device_from_address(address)
            .map_err(AppError::check_failed)?
        else {
            return Ok(false);
        };

        device
            .pairing()
            .and_then(|pairing| pairing.is_paired())
            .map_err(AppError::check_failed)
    }

    fn run_unpair(&self, address: BluetoothAddress) -> AppResult<bool> {
        let Some(device) = self
            .platform
            .device_from_address(address)
            .map_err(AppError::unpair_failed)?
        else {
            return Ok(false);
        };
        let pairing = device.pairing().map_err(AppError::unpair_failed)?;

        if !pairing.is_paired().map_err(AppError::unpair_failed)? {
            return Ok(true);
        }

        let status = UnpairStatus::from_code(pairing.unpair().map_err(AppError::unpair_failed)?);
        info!(%address, ?status, "Unpair completed");
        Ok(status.is_success())
    }
}
