pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod sync;
pub mod watch;
pub mod zone;

pub use api::{ApiResponse, HttpTransport, Transport};
pub use config::SyncConfig;
pub use error::{ConfigError, Result, SyncError};
pub use sync::{Outcome, ReconciliationEngine, Stage};
