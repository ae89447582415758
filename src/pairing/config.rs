//! 配对协调器配置与平台常量

use std::time::Duration;

/// 等待前端提交 PIN 的上限，超时即放弃本次 PIN 仪式
pub const PIN_TIMEOUT: Duration = Duration::from_secs(60);

/// 强制取消配对后的等待时间
///
/// 上一次配对刚结束就再次调用时，Windows 会返回未公开的状态码 19；
/// 先取消配对再等 5 秒可以清掉这个卡住的状态。这是平台规避常量，不是调优参数。
pub const SETTLE_DELAY: Duration = Duration::from_secs(5);

/// 配对协调器配置
///
/// 宿主只能调整 PIN 等待时间；强制取消配对后的等待固定为 [`SETTLE_DELAY`]。
#[derive(Debug, Clone)]
pub struct PairingConfig {
    pub(crate) pin_timeout: Duration,
    pub(crate) settle_delay: Duration,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            pin_timeout: PIN_TIMEOUT,
            settle_delay: SETTLE_DELAY,
        }
    }
}

impl PairingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pin_timeout(mut self, timeout: Duration) -> Self {
        self.pin_timeout = timeout;
        self
    }

    /// 平台规避常量，只在测试中缩短
    #[cfg(test)]
    pub(crate) fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn pin_timeout(&self) -> Duration {
        self.pin_timeout
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }
}
