use crate::InterruptReason;
use miette::Diagnostic;
use thiserror::Error;

/// The signal raised by a safe-point check once the run has been asked to stop.
///
/// The two variants are never converted into one another. `Safe` means the computation unwound
/// without crossing an unsafe region, so nothing it shares with its caller was left
/// half-updated. `Unsafe` means the check fired inside at least one unsafe region: the instance
/// that raised it must be discarded and none of its partial results may be used.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum Interrupted {
    #[error("{message}")]
    #[diagnostic(
        code(hp::interrupt::safe),
        help("The solver stopped at a safe point. No shared state was left half-updated; the run produced no answer.")
    )]
    Safe {
        message: String,
        reason: InterruptReason,
    },

    #[error("{message}")]
    #[diagnostic(
        code(hp::interrupt::unsafe_state),
        help("The solver stopped inside an unsafe region. Discard the instance; its state and partial results cannot be trusted.")
    )]
    Unsafe {
        message: String,
        reason: InterruptReason,
        /// Unsafe-region nesting depth when the check fired.
        depth: u32,
    },
}

impl Interrupted {
    pub fn safe(reason: InterruptReason) -> Self {
        Interrupted::Safe {
            message: format!("Interrupted at a safe point due to {reason}."),
            reason,
        }
    }

    pub fn unsafe_state(reason: InterruptReason, depth: u32) -> Self {
        Interrupted::Unsafe {
            message: format!("Interrupted in unsafe state due to {reason}."),
            reason,
            depth,
        }
    }

    /// Replaces the diagnostic message, keeping the variant and reason.
    pub fn with_message(self, msg: impl Into<String>) -> Self {
        match self {
            Interrupted::Safe { reason, .. } => Interrupted::Safe {
                message: msg.into(),
                reason,
            },
            Interrupted::Unsafe { reason, depth, .. } => Interrupted::Unsafe {
                message: msg.into(),
                reason,
                depth,
            },
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Interrupted::Safe { message, .. } | Interrupted::Unsafe { message, .. } => message,
        }
    }

    pub fn reason(&self) -> InterruptReason {
        match self {
            Interrupted::Safe { reason, .. } | Interrupted::Unsafe { reason, .. } => *reason,
        }
    }

    pub fn is_safe(&self) -> bool {
        matches!(self, Interrupted::Safe { .. })
    }
}
