//! 配对模块
//!
//! 把阻塞的平台配对仪式桥接到前端的异步调用：按设备互斥、独立工作线程、
//! 以及配对过程中向前端索取 PIN 的双向通道。入口是 [`PairingCoordinator`]。

mod apartment;
pub mod config;
pub mod coordinator;
pub mod gate;
mod handler;
pub mod prompt;
pub mod rendezvous;
pub mod status;

pub use config::PairingConfig;
pub use coordinator::PairingCoordinator;
pub use gate::OperationKind;
pub use prompt::{EventPinPrompt, PinPrompt};
pub use status::{PairingStatus, UnpairStatus};
