mod computation;
mod context;
mod monitor;
mod registry;
mod session;
mod watchdog;

pub use computation::Computation;
pub use context::RunContext;
pub use monitor::ResourceMonitor;
pub use registry::{UnsafeRegionGuard, UnsafeRegions};
pub use session::{InterruptHandle, Session};
pub use watchdog::Watchdog;
