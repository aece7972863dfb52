pub mod sync_service;
pub mod flag_service;
pub mod collect_service;
pub mod connectivity_monitor;

pub use sync_service::{SyncResult, SyncService};
pub use flag_service::FlagService;
pub use collect_service::CollectService;
pub use connectivity_monitor::{ConnectivityMonitor, Transition};
