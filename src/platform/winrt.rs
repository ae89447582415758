//! WinRT 实现
//!
//! 对 `Windows.Devices.Bluetooth` / `Windows.Devices.Enumeration` 的薄封装。
//! 所有异步操作都用 `.get()` 阻塞等待，调用方必须已处于 MTA：
//! `DevicePairingRequestedEventArgs` 在 STA 线程上会断言失败。

use windows::core::{Ref, HSTRING};
use windows::Devices::Bluetooth::BluetoothLEDevice;
use windows::Devices::Enumeration::{
    DeviceInformationCustomPairing, DeviceInformationPairing, DevicePairingKinds,
    DevicePairingProtectionLevel, DevicePairingRequestedEventArgs,
};
use windows::Foundation::{Deferral as WinDeferral, TypedEventHandler};
use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_MULTITHREADED};

use super::{
    BleDevice, BlePlatform, CustomPairing, Deferral, DevicePairing, HandlerToken, PairingKind,
    PairingKinds, PairingRequest, PairingRequestHandler, PlatformError, PlatformResult,
    ProtectionLevel,
};
use crate::device::BluetoothAddress;

impl From<windows::core::Error> for PlatformError {
    fn from(err: windows::core::Error) -> Self {
        PlatformError::new(err.code().0, err.message())
    }
}

pub struct WinRtPlatform;

impl BlePlatform for WinRtPlatform {
    fn enter_apartment(&self) -> PlatformResult<()> {
        // S_FALSE（已初始化）同样需要配对的 CoUninitialize
        unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) }.ok()?;
        Ok(())
    }

    fn leave_apartment(&self) {
        unsafe { CoUninitialize() };
    }

    fn device_from_address(
        &self,
        address: BluetoothAddress,
    ) -> PlatformResult<Option<Box<dyn BleDevice>>> {
        match BluetoothLEDevice::FromBluetoothAddressAsync(address.as_u64())?.get() {
            Ok(device) => Ok(Some(Box::new(WinRtDevice(device)))),
            // 平台返回 null 设备时错误码为成功值
            Err(err) if err.code().is_ok() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

struct WinRtDevice(BluetoothLEDevice);

impl BleDevice for WinRtDevice {
    fn pairing(&self) -> PlatformResult<Box<dyn DevicePairing>> {
        let pairing = self.0.DeviceInformation()?.Pairing()?;
        Ok(Box::new(WinRtPairing(pairing)))
    }
}

struct WinRtPairing(DeviceInformationPairing);

impl DevicePairing for WinRtPairing {
    fn is_paired(&self) -> PlatformResult<bool> {
        Ok(self.0.IsPaired()?)
    }

    fn unpair(&self) -> PlatformResult<i32> {
        Ok(self.0.UnpairAsync()?.get()?.Status()?.0)
    }

    fn custom(&self) -> PlatformResult<Box<dyn CustomPairing>> {
        Ok(Box::new(WinRtCustomPairing(self.0.Custom()?)))
    }
}

struct WinRtCustomPairing(DeviceInformationCustomPairing);

impl CustomPairing for WinRtCustomPairing {
    fn add_pairing_requested(
        &self,
        handler: PairingRequestHandler,
    ) -> PlatformResult<HandlerToken> {
        let token = self.0.PairingRequested(&TypedEventHandler::new(
            move |_sender: Ref<'_, DeviceInformationCustomPairing>,
                  args: Ref<'_, DevicePairingRequestedEventArgs>| {
                if let Some(args) = args.as_ref() {
                    handler(&WinRtPairingRequest(args) as &dyn PairingRequest);
                }
                Ok(())
            },
        ))?;
        Ok(HandlerToken(token))
    }

    fn remove_pairing_requested(&self, token: HandlerToken) -> PlatformResult<()> {
        Ok(self.0.RemovePairingRequested(token.0)?)
    }

    fn pair(&self, kinds: PairingKinds, level: ProtectionLevel) -> PlatformResult<i32> {
        let result = self
            .0
            .PairWithProtectionLevelAsync(
                DevicePairingKinds(kinds.bits()),
                DevicePairingProtectionLevel(level as i32),
            )?
            .get()?;
        Ok(result.Status()?.0)
    }
}

struct WinRtPairingRequest<'a>(&'a DevicePairingRequestedEventArgs);

impl PairingRequest for WinRtPairingRequest<'_> {
    fn kind(&self) -> PlatformResult<PairingKind> {
        Ok(PairingKind::from_bits(self.0.PairingKind()?.0))
    }

    fn pin(&self) -> Option<String> {
        self.0.Pin().ok().map(|pin| pin.to_string_lossy())
    }

    fn deferral(&self) -> PlatformResult<Box<dyn Deferral>> {
        Ok(Box::new(WinRtDeferral(self.0.GetDeferral()?)))
    }

    fn accept(&self) -> PlatformResult<()> {
        Ok(self.0.Accept()?)
    }

    fn accept_with_pin(&self, pin: &str) -> PlatformResult<()> {
        Ok(self.0.AcceptWithPin(&HSTRING::from(pin))?)
    }
}

struct WinRtDeferral(WinDeferral);

impl Deferral for WinRtDeferral {
    fn complete(self: Box<Self>) -> PlatformResult<()> {
        Ok(self.0.Complete()?)
    }
}
