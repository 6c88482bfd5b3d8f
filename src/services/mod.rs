pub mod input_listener;
pub mod process_host;
pub mod virtual_device;

pub use input_listener::{create_input_listeners, InputListenerTrait};
pub use process_host::{LifecycleRequest, ProcessHost};
pub use virtual_device::VirtualDevice;

use crate::dispatcher::Dispatcher;
use parking_lot::Mutex;
use std::sync::Arc;

/// Диспетчер, общий для всех слушателей. Блокировка не держится через `await`
pub type SharedDispatcher = Arc<Mutex<Dispatcher<ProcessHost>>>;
