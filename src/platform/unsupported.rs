//! 非 Windows 平台的占位实现
//!
//! 套间操作为空操作；设备查询直接报错，错误经协调器映射为对应的 `*_FAILED`。

use super::{BleDevice, BlePlatform, PlatformError, PlatformResult};
use crate::device::BluetoothAddress;

/// 平台不支持时的错误码（E_NOTIMPL）
const E_NOTIMPL: i32 = 0x8000_4001_u32 as i32;

pub struct UnsupportedPlatform;

impl BlePlatform for UnsupportedPlatform {
    fn enter_apartment(&self) -> PlatformResult<()> {
        Ok(())
    }

    fn leave_apartment(&self) {}

    fn device_from_address(
        &self,
        _address: BluetoothAddress,
    ) -> PlatformResult<Option<Box<dyn BleDevice>>> {
        Err(PlatformError::new(
            E_NOTIMPL,
            "Bluetooth LE pairing is only supported on Windows",
        ))
    }
}
