use crate::{EngineResult, InternalError, Interrupted, SolverError, Unwind};

/// What a controller gets back from one run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Completed(T),
    SafeInterrupt(Interrupted),
    UnsafeInterrupt(Interrupted),
    Failed(SolverError),
    Internal(InternalError),
}

impl<T> Outcome<T> {
    pub fn from_result(result: EngineResult<T>) -> Self {
        match result {
            Ok(value) => Outcome::Completed(value),
            Err(unwind) => match *unwind {
                Unwind::Interrupted(interrupted) if interrupted.is_safe() => {
                    Outcome::SafeInterrupt(interrupted)
                }
                Unwind::Interrupted(interrupted) => Outcome::UnsafeInterrupt(interrupted),
                Unwind::SolverError(err) => Outcome::Failed(err),
                Unwind::InternalError(err) => Outcome::Internal(err),
            },
        }
    }

    pub fn interrupted(&self) -> Option<&Interrupted> {
        match self {
            Outcome::SafeInterrupt(interrupted) | Outcome::UnsafeInterrupt(interrupted) => {
                Some(interrupted)
            }
            _ => None,
        }
    }

    /// Whether the instance that produced this outcome must be thrown away.
    pub fn must_discard(&self) -> bool {
        matches!(self, Outcome::UnsafeInterrupt(_) | Outcome::Internal(_))
    }

    /// One line for the end user.
    pub fn summary(&self) -> String {
        let stopped = |interrupted: &Interrupted| {
            let reason = interrupted.reason();
            if reason.is_limit() {
                "computation stopped due to resource limit".to_string()
            } else {
                format!("computation stopped due to {reason}")
            }
        };
        match self {
            Outcome::Completed(_) => "computation completed".into(),
            Outcome::SafeInterrupt(interrupted) => format!(
                "{}; no answer, but the solver state is consistent",
                stopped(interrupted)
            ),
            Outcome::UnsafeInterrupt(interrupted) => format!(
                "{}; the solver state is inconsistent and was discarded",
                stopped(interrupted)
            ),
            Outcome::Failed(_) => "computation failed".into(),
            Outcome::Internal(_) => "computation violated an internal invariant".into(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{InterruptReason, ResourceKind};
    use pretty_assertions::assert_eq;

    const TIME: InterruptReason = InterruptReason::LimitExceeded(ResourceKind::Time);

    #[test]
    fn interrupts_keep_their_kind() {
        let safe: Outcome<()> = Outcome::from_result(Err(Interrupted::safe(TIME).into()));
        let unsafe_: Outcome<()> =
            Outcome::from_result(Err(Interrupted::unsafe_state(TIME, 3).into()));

        assert_eq!(safe, Outcome::SafeInterrupt(Interrupted::safe(TIME)));
        assert_eq!(
            unsafe_,
            Outcome::UnsafeInterrupt(Interrupted::unsafe_state(TIME, 3))
        );
        assert!(!safe.must_discard());
        assert!(unsafe_.must_discard());
    }

    #[test]
    fn ordinary_failures_are_not_interrupts() {
        let failed: Outcome<()> = Outcome::from_result(Err(SolverError::InvalidInput {
            msg: "empty clause".into(),
        }
        .into()));
        assert!(failed.interrupted().is_none());
        assert!(!failed.must_discard());
    }

    #[test]
    fn summary_reports_trustworthiness() {
        let safe: Outcome<()> = Outcome::SafeInterrupt(Interrupted::safe(TIME));
        assert_eq!(
            safe.summary(),
            "computation stopped due to resource limit; no answer, but the solver state is consistent"
        );

        let unsafe_: Outcome<()> =
            Outcome::UnsafeInterrupt(Interrupted::unsafe_state(InterruptReason::Requested, 1));
        assert_eq!(
            unsafe_.summary(),
            "computation stopped due to interrupt request; the solver state is inconsistent and was discarded"
        );
    }
}
