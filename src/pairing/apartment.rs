use crate::platform::{BlePlatform, PlatformResult};

/// MTA 套间作用域
///
/// 进入成功后返回守卫，Drop 时退出套间，覆盖正常返回、错误返回和 panic 展开。
pub(crate) struct ApartmentGuard<'a> {
    platform: &'a dyn BlePlatform,
}

impl<'a> ApartmentGuard<'a> {
    pub fn enter(platform: &'a dyn BlePlatform) -> PlatformResult<Self> {
        platform.enter_apartment()?;
        Ok(Self { platform })
    }
}

impl Drop for ApartmentGuard<'_> {
    fn drop(&mut self) {
        self.platform.leave_apartment();
    }
}
