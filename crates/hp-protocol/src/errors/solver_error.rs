use miette::Diagnostic;
use thiserror::Error;

/// An ordinary failure of the computation, unrelated to interruption.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum SolverError {
    #[error("Invalid input: {msg}")]
    #[diagnostic(code(hp::solver::invalid_input))]
    InvalidInput { msg: String },

    #[error("Unsupported: {msg}")]
    #[diagnostic(code(hp::solver::unsupported))]
    Unsupported { msg: String },

    #[error("Solver instance was discarded")]
    #[diagnostic(
        code(hp::solver::instance_discarded),
        help("An earlier run left the instance in an inconsistent state. Create a new instance.")
    )]
    InstanceDiscarded,

    #[error("Resource monitor failed: {msg}")]
    #[diagnostic(code(hp::solver::monitor))]
    Monitor { msg: String },
}
