pub mod config;
mod errors;
mod interrupt;
mod limits;
mod outcome;

pub use config::Config;
pub use errors::*;
pub use interrupt::{InterruptFlag, InterruptReason};
pub use limits::{Limits, ResourceKind, ResourceLimit};
pub use outcome::Outcome;
