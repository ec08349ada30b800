//! Infrastructure layer: backend ports and adapters, background workers,
//! configuration.

pub mod backend;
pub mod ban_check;
pub mod config;
pub mod navigation;
pub mod workers;

pub use ban_check::{BanCheckOutcome, check_ban_status, check_ban_status_within};
pub use config::{ConfigError, GateConfig};
pub use navigation::{Navigation, Navigator, RecordingNavigator};
