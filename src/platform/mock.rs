//! 测试用平台实现
//!
//! 记录套间进出、事件注册/注销和平台调用顺序，配对结果由 [`PairResponse`] 脚本化。

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use super::{
    BleDevice, BlePlatform, CustomPairing, Deferral, DevicePairing, HandlerToken, PairingKind,
    PairingKinds, PairingRequest, PairingRequestHandler, PlatformError, PlatformResult,
    ProtectionLevel,
};
use crate::device::BluetoothAddress;
use crate::pairing::PinPrompt;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// `pair` 调用的脚本化结果
#[derive(Debug, Clone)]
pub enum PairResponse {
    /// 直接返回状态码
    Status(i32),
    /// 先以该类型回调已注册的处理器，再按处理结果给出状态码
    Request(PairingKind),
    Error(PlatformError),
    Panic,
}

#[derive(Debug, Clone)]
pub struct MockDevice {
    paired: bool,
    unpair_result: Result<i32, PlatformError>,
    response: PairResponse,
    pair_delay: Duration,
    expected_pin: Option<String>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            paired: false,
            unpair_result: Ok(0),
            response: PairResponse::Status(0),
            pair_delay: Duration::ZERO,
            expected_pin: None,
        }
    }

    pub fn paired(mut self) -> Self {
        self.paired = true;
        self
    }

    pub fn unpair_result(mut self, result: Result<i32, PlatformError>) -> Self {
        self.unpair_result = result;
        self
    }

    pub fn respond(mut self, response: PairResponse) -> Self {
        self.response = response;
        self
    }

    pub fn pair_delay(mut self, delay: Duration) -> Self {
        self.pair_delay = delay;
        self
    }

    pub fn expect_pin(mut self, pin: &str) -> Self {
        self.expected_pin = Some(pin.to_string());
        self
    }
}

#[derive(Default)]
struct MockState {
    devices: HashMap<BluetoothAddress, MockDevice>,
    apartment_error: Option<PlatformError>,
    entered: usize,
    left: usize,
    registered: usize,
    unregistered: usize,
    next_token: i64,
    handlers: HashMap<i64, (BluetoothAddress, PairingRequestHandler)>,
    calls: Vec<String>,
    pair_parameters: Option<(PairingKinds, ProtectionLevel)>,
    last_request: Option<MockRequest>,
}

#[derive(Clone, Default)]
pub struct MockPlatform {
    state: Arc<Mutex<MockState>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(self, address: &str, device: MockDevice) -> Self {
        let address = BluetoothAddress::parse(address).expect("test address");
        lock(&self.state).devices.insert(address, device);
        self
    }

    pub fn with_apartment_error(self, error: PlatformError) -> Self {
        lock(&self.state).apartment_error = Some(error);
        self
    }

    /// (进入次数, 退出次数)
    pub fn apartments(&self) -> (usize, usize) {
        let state = lock(&self.state);
        (state.entered, state.left)
    }

    /// (注册次数, 注销次数)
    pub fn handlers(&self) -> (usize, usize) {
        let state = lock(&self.state);
        (state.registered, state.unregistered)
    }

    /// 有副作用的平台调用顺序：unpair / register / pair / unregister
    pub fn calls(&self) -> Vec<String> {
        lock(&self.state).calls.clone()
    }

    pub fn pair_parameters(&self) -> Option<(PairingKinds, ProtectionLevel)> {
        lock(&self.state).pair_parameters
    }

    pub fn is_paired(&self, address: &str) -> bool {
        let address = BluetoothAddress::parse(address).expect("test address");
        lock(&self.state)
            .devices
            .get(&address)
            .is_some_and(|device| device.paired)
    }

    /// 最近一次配对请求接受时带的 PIN
    pub fn accepted_pin(&self) -> Option<String> {
        lock(&self.state)
            .last_request
            .as_ref()
            .and_then(MockRequest::accepted_pin)
    }

    pub fn deferral_completed(&self) -> bool {
        lock(&self.state)
            .last_request
            .as_ref()
            .is_some_and(MockRequest::deferral_completed)
    }

    fn device(&self, address: BluetoothAddress) -> PlatformResult<MockDevice> {
        lock(&self.state)
            .devices
            .get(&address)
            .cloned()
            .ok_or_else(|| PlatformError::new(-1, "device vanished"))
    }

    fn set_paired(&self, address: BluetoothAddress, paired: bool) {
        if let Some(device) = lock(&self.state).devices.get_mut(&address) {
            device.paired = paired;
        }
    }
}

impl BlePlatform for MockPlatform {
    fn enter_apartment(&self) -> PlatformResult<()> {
        let mut state = lock(&self.state);
        if let Some(error) = state.apartment_error.clone() {
            return Err(error);
        }
        state.entered += 1;
        Ok(())
    }

    fn leave_apartment(&self) {
        lock(&self.state).left += 1;
    }

    fn device_from_address(
        &self,
        address: BluetoothAddress,
    ) -> PlatformResult<Option<Box<dyn BleDevice>>> {
        if !lock(&self.state).devices.contains_key(&address) {
            return Ok(None);
        }
        Ok(Some(Box::new(MockHandle {
            platform: self.clone(),
            address,
        })))
    }
}

/// 设备、配对对象和自定义配对对象共用的句柄
struct MockHandle {
    platform: MockPlatform,
    address: BluetoothAddress,
}

impl MockHandle {
    fn handle(&self) -> Box<MockHandle> {
        Box::new(MockHandle {
            platform: self.platform.clone(),
            address: self.address,
        })
    }

    fn record(&self, call: &str) {
        lock(&self.platform.state).calls.push(call.to_string());
    }

    /// 回调本设备上已注册的处理器，锁不跨回调持有
    fn raise(&self, kind: PairingKind) -> MockRequest {
        let request = MockRequest::new(kind);
        let handlers: Vec<PairingRequestHandler> = {
            let mut state = lock(&self.platform.state);
            state.last_request = Some(request.clone());
            state
                .handlers
                .values()
                .filter(|(address, _)| *address == self.address)
                .map(|(_, handler)| handler.clone())
                .collect()
        };
        for handler in handlers {
            handler(&request as &dyn PairingRequest);
        }
        request
    }
}

impl BleDevice for MockHandle {
    fn pairing(&self) -> PlatformResult<Box<dyn DevicePairing>> {
        Ok(self.handle())
    }
}

impl DevicePairing for MockHandle {
    fn is_paired(&self) -> PlatformResult<bool> {
        Ok(self.platform.device(self.address)?.paired)
    }

    fn unpair(&self) -> PlatformResult<i32> {
        self.record("unpair");
        let code = self.platform.device(self.address)?.unpair_result?;
        if code == 0 {
            self.platform.set_paired(self.address, false);
        }
        Ok(code)
    }

    fn custom(&self) -> PlatformResult<Box<dyn CustomPairing>> {
        Ok(self.handle())
    }
}

impl CustomPairing for MockHandle {
    fn add_pairing_requested(
        &self,
        handler: PairingRequestHandler,
    ) -> PlatformResult<HandlerToken> {
        let mut state = lock(&self.platform.state);
        state.calls.push("register".to_string());
        state.registered += 1;
        state.next_token += 1;
        let token = state.next_token;
        state.handlers.insert(token, (self.address, handler));
        Ok(HandlerToken(token))
    }

    fn remove_pairing_requested(&self, token: HandlerToken) -> PlatformResult<()> {
        let mut state = lock(&self.platform.state);
        state.calls.push("unregister".to_string());
        state.unregistered += 1;
        state.handlers.remove(&token.0);
        Ok(())
    }

    fn pair(&self, kinds: PairingKinds, level: ProtectionLevel) -> PlatformResult<i32> {
        {
            let mut state = lock(&self.platform.state);
            state.calls.push("pair".to_string());
            state.pair_parameters = Some((kinds, level));
        }
        let device = self.platform.device(self.address)?;
        thread::sleep(device.pair_delay);

        let code = match device.response {
            PairResponse::Status(code) => code,
            PairResponse::Error(error) => return Err(error),
            PairResponse::Panic => panic!("platform pairing call blew up"),
            PairResponse::Request(PairingKind::ProvidePin) => {
                let request = self.raise(PairingKind::ProvidePin);
                match (request.accepted_pin(), device.expected_pin) {
                    (Some(pin), Some(expected)) if pin == expected => 0,
                    (Some(_), None) => 0,
                    _ => 9,
                }
            }
            PairResponse::Request(kind) => {
                if self.raise(kind).accepted() {
                    0
                } else {
                    17
                }
            }
        };

        if code == 0 || code == 3 {
            self.platform.set_paired(self.address, true);
        }
        Ok(code)
    }
}

#[derive(Debug, Default)]
struct RequestState {
    accepted: bool,
    pin: Option<String>,
    deferral_taken: bool,
    deferral_completed: bool,
}

/// 配对请求事件参数
#[derive(Clone)]
pub struct MockRequest {
    kind: PairingKind,
    state: Arc<Mutex<RequestState>>,
}

impl MockRequest {
    pub fn new(kind: PairingKind) -> Self {
        Self {
            kind,
            state: Arc::default(),
        }
    }

    pub fn accepted(&self) -> bool {
        lock(&self.state).accepted
    }

    pub fn accepted_pin(&self) -> Option<String> {
        lock(&self.state).pin.clone()
    }

    pub fn deferral_taken(&self) -> bool {
        lock(&self.state).deferral_taken
    }

    pub fn deferral_completed(&self) -> bool {
        lock(&self.state).deferral_completed
    }
}

impl PairingRequest for MockRequest {
    fn kind(&self) -> PlatformResult<PairingKind> {
        Ok(self.kind)
    }

    fn pin(&self) -> Option<String> {
        match self.kind {
            PairingKind::DisplayPin | PairingKind::ConfirmPinMatch => Some("482913".to_string()),
            _ => None,
        }
    }

    fn deferral(&self) -> PlatformResult<Box<dyn Deferral>> {
        lock(&self.state).deferral_taken = true;
        Ok(Box::new(MockDeferral(self.state.clone())))
    }

    fn accept(&self) -> PlatformResult<()> {
        lock(&self.state).accepted = true;
        Ok(())
    }

    fn accept_with_pin(&self, pin: &str) -> PlatformResult<()> {
        let mut state = lock(&self.state);
        state.accepted = true;
        state.pin = Some(pin.to_string());
        Ok(())
    }
}

struct MockDeferral(Arc<Mutex<RequestState>>);

impl Deferral for MockDeferral {
    fn complete(self: Box<Self>) -> PlatformResult<()> {
        lock(&self.0).deferral_completed = true;
        Ok(())
    }
}

/// 记录 PIN 请求次数的前端通道
#[derive(Default)]
pub struct RecordingPrompt {
    count: Mutex<usize>,
    signal: Condvar,
}

impl RecordingPrompt {
    pub fn count(&self) -> usize {
        *lock(&self.count)
    }

    /// 阻塞到至少收到一次请求，超时返回 false
    pub fn wait_for_request(&self, timeout: Duration) -> bool {
        let count = lock(&self.count);
        let (count, _) = self
            .signal
            .wait_timeout_while(count, timeout, |count| *count == 0)
            .unwrap_or_else(|e| e.into_inner());
        *count > 0
    }
}

impl PinPrompt for RecordingPrompt {
    fn request_pin(&self) {
        *lock(&self.count) += 1;
        self.signal.notify_all();
    }
}
