//! Background workers.

pub mod ban_monitor;

pub use ban_monitor::{BanMonitor, BanMonitorConfig, BanMonitorDeps, BanMonitorHandle};
