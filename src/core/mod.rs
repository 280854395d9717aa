//! Process-level machinery: scan runtime, schedule, HTTP API

pub mod bootstrap;
pub mod http;
pub mod runtime;
pub mod scheduler;

pub use bootstrap::{build_scanner, Bootstrapped};
pub use http::{create_router, start_server, AppState};
pub use runtime::{RuntimeConfig, Scanner};
pub use scheduler::{cron_expression, ScanSchedule};
