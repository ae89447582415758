use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::{AppError, AppResult};

/// 去掉分隔符后的十六进制位数（6 个八位组）
const HEX_DIGITS: usize = 12;

/// 48 位蓝牙设备地址
///
/// 高位八位组在前，与 WinRT `FromBluetoothAddressAsync` 接受的 `u64` 布局一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BluetoothAddress(u64);

impl BluetoothAddress {
    /// 解析 MAC 字符串
    ///
    /// - `:` 与 `-` 可任意混用，大小写不敏感
    /// - 去掉分隔符后必须恰好是 12 位十六进制数字
    /// - 全零地址视为无效
    pub fn parse(input: &str) -> AppResult<Self> {
        let digits: String = input.chars().filter(|c| !matches!(c, ':' | '-')).collect();

        if digits.len() != HEX_DIGITS || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AppError::InvalidAddress(input.to_string()));
        }

        let value = u64::from_str_radix(&digits, 16)
            .map_err(|_| AppError::InvalidAddress(input.to_string()))?;
        if value == 0 {
            return Err(AppError::InvalidAddress(input.to_string()));
        }

        Ok(Self(value))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// 六个八位组，高位在前
    pub fn octets(self) -> [u8; 6] {
        let bytes = self.0.to_be_bytes();
        [bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7]]
    }
}

impl FromStr for BluetoothAddress {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BluetoothAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.octets();
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl Serialize for BluetoothAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
