use miette::Diagnostic;
use thiserror::Error;

/// A broken invariant of the interruption machinery itself.
///
/// These never describe a resource limit. [`InternalError::UnbalancedUnsafeRegion`] is raised
/// as a panic because the caller's bookkeeping can no longer be trusted.
/// [`InternalError::LeakedUnsafeRegion`] is reported and the affected instance is discarded.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum InternalError {
    #[error("Haltpoint failed: left an unsafe region that was never entered.")]
    #[diagnostic(
        code(hp::internal::unbalanced_unsafe_region),
        help("Every `leave_unsafe_region` must match an earlier `enter_unsafe_region` of the same run.")
    )]
    UnbalancedUnsafeRegion,

    #[error("Haltpoint failed: run ended with {depth} unsafe region(s) still open.")]
    #[diagnostic(
        code(hp::internal::leaked_unsafe_region),
        help("An `enter_unsafe_region` was never matched by `leave_unsafe_region`. Prefer `unsafe_region()` guards, which are released on every exit path.")
    )]
    LeakedUnsafeRegion { depth: u32 },
}
