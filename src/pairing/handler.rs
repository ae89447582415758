//! 配对请求处理器
//!
//! 平台在配对过程中回调 [`PinRequestHandler::handle`]，可能回调多次。
//! 除 ProvidePin 外一律直接接受；ProvidePin 需要把同步回调桥接到前端的异步输入：
//!
//! 1. 取得 deferral，让平台保持配对仪式打开
//! 2. 重置 PIN 信箱，通知前端
//! 3. 在信箱上最多等待 `pin_timeout`
//! 4. 拿到非空 PIN 则带 PIN 接受；超时或空 PIN 则不接受，交由平台判定失败
//! 5. 无论哪条路径都完成 deferral

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::prompt::PinPrompt;
use super::rendezvous::PinRendezvous;
use crate::platform::{
    CustomPairing, Deferral, HandlerToken, PairingKind, PairingRequest, PairingRequestHandler,
    PlatformResult,
};

pub(crate) struct PinRequestHandler {
    rendezvous: Arc<PinRendezvous>,
    prompt: Arc<dyn PinPrompt>,
    pin_timeout: Duration,
}

impl PinRequestHandler {
    pub fn new(
        rendezvous: Arc<PinRendezvous>,
        prompt: Arc<dyn PinPrompt>,
        pin_timeout: Duration,
    ) -> Self {
        Self {
            rendezvous,
            prompt,
            pin_timeout,
        }
    }

    /// 包装为平台事件处理器
    pub fn into_platform_handler(self) -> PairingRequestHandler {
        Arc::new(move |request: &dyn PairingRequest| self.handle(request))
    }

    pub fn handle(&self, request: &dyn PairingRequest) {
        let kind = match request.kind() {
            Ok(kind) => kind,
            Err(e) => {
                error!("Failed to read pairing kind: {}", e);
                return;
            }
        };
        info!(?kind, "Pairing request received");

        let result = match kind {
            PairingKind::ProvidePin => self.provide_pin(request),
            PairingKind::ConfirmPinMatch | PairingKind::DisplayPin => {
                let pin_len = request.pin().map(|pin| pin.len());
                debug!(?kind, ?pin_len, "Auto-accepting PIN confirmation");
                request.accept()
            }
            PairingKind::ConfirmOnly => request.accept(),
            PairingKind::Other(bits) => {
                warn!(bits, "Unknown pairing kind, accepting");
                request.accept()
            }
        };

        if let Err(e) = result {
            error!(?kind, "Pairing request handling failed: {}", e);
        }
    }

    fn provide_pin(&self, request: &dyn PairingRequest) -> PlatformResult<()> {
        let _deferral = DeferralGuard(Some(request.deferral()?));

        self.rendezvous.reset();
        self.prompt.request_pin();
        info!(timeout = ?self.pin_timeout, "Waiting for PIN from frontend");

        match self.rendezvous.wait(self.pin_timeout) {
            Some(pin) if !pin.is_empty() => {
                info!(len = pin.len(), "PIN received, submitting to platform");
                request.accept_with_pin(&pin)
            }
            Some(_) => {
                warn!("Empty PIN submitted, rejecting pairing");
                Ok(())
            }
            None => {
                warn!("Timed out waiting for PIN, rejecting pairing");
                Ok(())
            }
        }
    }
}

/// Drop 时完成 deferral
struct DeferralGuard(Option<Box<dyn Deferral>>);

impl Drop for DeferralGuard {
    fn drop(&mut self) {
        if let Some(deferral) = self.0.take() {
            match deferral.complete() {
                Ok(()) => debug!("Deferral completed"),
                Err(e) => error!("Failed to complete deferral: {}", e),
            }
        }
    }
}

/// 配对请求事件注册
///
/// Drop 时注销，保证每次注册恰好对应一次注销，即使配对调用出错或 panic。
pub(crate) struct HandlerRegistration<'a> {
    custom: &'a dyn CustomPairing,
    token: HandlerToken,
}

impl<'a> HandlerRegistration<'a> {
    pub fn register(
        custom: &'a dyn CustomPairing,
        handler: PairingRequestHandler,
    ) -> PlatformResult<Self> {
        let token = custom.add_pairing_requested(handler)?;
        debug!(token = token.0, "Pairing request handler registered");
        Ok(Self { custom, token })
    }
}

impl Drop for HandlerRegistration<'_> {
    fn drop(&mut self) {
        match self.custom.remove_pairing_requested(self.token) {
            Ok(()) => debug!(token = self.token.0, "Pairing request handler unregistered"),
            Err(e) => warn!("Failed to unregister pairing request handler: {}", e),
        }
    }
}
