//! 按设备地址的操作互斥
//!
//! 同一地址同一时刻最多一个配对/取消配对操作；查询不经过这里。

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::device::BluetoothAddress;
use crate::{AppError, AppResult};

/// 受互斥保护的操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Pair,
    Unpair,
}

impl OperationKind {
    pub(crate) fn in_progress_message(self) -> &'static str {
        match self {
            OperationKind::Pair => "A pairing operation is already in progress for this device",
            OperationKind::Unpair => "An operation is already in progress for this device",
        }
    }
}

/// 进行中操作表
#[derive(Default)]
pub struct OperationGate {
    active: Arc<DashMap<BluetoothAddress, OperationKind>>,
}

impl OperationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 准入检查
    ///
    /// 地址已有进行中操作时立即返回 `OperationInProgress`，否则登记并返回许可。
    pub fn admit(
        &self,
        address: BluetoothAddress,
        kind: OperationKind,
    ) -> AppResult<OperationPermit> {
        match self.active.entry(address) {
            Entry::Occupied(entry) => {
                debug!(%address, running = ?entry.get(), requested = ?kind, "Operation rejected");
                Err(AppError::OperationInProgress(kind))
            }
            Entry::Vacant(entry) => {
                entry.insert(kind);
                Ok(OperationPermit {
                    address,
                    active: self.active.clone(),
                })
            }
        }
    }

    #[cfg(test)]
    fn active(&self, address: BluetoothAddress) -> Option<OperationKind> {
        self.active.get(&address).map(|entry| *entry)
    }
}

/// 操作许可
///
/// 随工作线程一起移动，Drop 时清除登记；panic 展开同样会清除。
#[derive(Debug)]
pub struct OperationPermit {
    address: BluetoothAddress,
    active: Arc<DashMap<BluetoothAddress, OperationKind>>,
}

impl Drop for OperationPermit {
    fn drop(&mut self) {
        self.active.remove(&self.address);
    }
}
