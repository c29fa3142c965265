pub mod config_loader;
pub mod device_info;
pub mod notification_bus;
pub mod process_worker;

pub use crate::config_loader::{default_config_path, load_config, load_config_or_default};
pub use crate::device_info::StaticDeviceInfo;
pub use crate::notification_bus::InMemoryNotificationBus;
pub use crate::process_worker::ProcessProbeWorker;
