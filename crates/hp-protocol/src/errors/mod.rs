mod config_error;
mod internal_error;
mod interrupted;
mod solver_error;
mod unwind;

pub use config_error::ConfigError;
pub use internal_error::InternalError;
pub use interrupted::Interrupted;
pub use solver_error::SolverError;
pub use unwind::*;
