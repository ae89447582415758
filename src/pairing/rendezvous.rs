//! PIN 单槽信箱
//!
//! 平台回调线程在这里阻塞等待，前端通过 `submit_pin` 命令投递 PIN。
//! 同一时刻最多一个等待者：PIN 请求只来自配对，而同一设备的配对已被串行化。

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct Slot {
    pending: String,
    ready: bool,
}

#[derive(Debug, Default)]
pub struct PinRendezvous {
    slot: Mutex<Slot>,
    signal: Condvar,
}

impl PinRendezvous {
    pub fn new() -> Self {
        Self::default()
    }

    /// 清空槽位，必须在向前端发出 PIN 请求之前调用
    pub fn reset(&self) {
        let mut slot = self.lock();
        slot.pending.clear();
        slot.ready = false;
    }

    /// 投递 PIN 并唤醒等待者
    ///
    /// 不检查是否有请求在等待；重复投递会覆盖尚未被取走的值。
    pub fn submit(&self, pin: impl Into<String>) {
        {
            let mut slot = self.lock();
            slot.pending = pin.into();
            slot.ready = true;
        }
        self.signal.notify_one();
    }

    /// 等待 PIN，超时返回 `None`
    ///
    /// 取走后槽位回到未就绪状态，同一次投递只会被消费一次。
    pub fn wait(&self, timeout: Duration) -> Option<String> {
        let (mut slot, result) = self
            .signal
            .wait_timeout_while(self.lock(), timeout, |slot| !slot.ready)
            .unwrap_or_else(PoisonError::into_inner);

        if result.timed_out() {
            return None;
        }

        slot.ready = false;
        Some(std::mem::take(&mut slot.pending))
    }

    // 槽位只有纯数据，中毒后继续使用
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
