//! 设备模块
//!
//! 目前只负责把前端传入的 MAC 字符串规范化为平台使用的 48 位地址。
//! 设备句柄本身不在调用之间缓存，每次操作都重新向平台查询。

mod address;

pub use address::BluetoothAddress;
