use crate::ResourceKind;
use std::{
    fmt::Display,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
};

/// Why a run was asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterruptReason {
    /// The controller (or a Ctrl+C handler acting for it) asked for the run to stop.
    Requested,
    LimitExceeded(ResourceKind),
}

impl InterruptReason {
    fn encode(self) -> u8 {
        match self {
            InterruptReason::Requested => 1,
            InterruptReason::LimitExceeded(ResourceKind::Time) => 2,
            InterruptReason::LimitExceeded(ResourceKind::Memory) => 3,
            InterruptReason::LimitExceeded(ResourceKind::Steps) => 4,
        }
    }

    fn decode(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(InterruptReason::Requested),
            2 => Some(InterruptReason::LimitExceeded(ResourceKind::Time)),
            3 => Some(InterruptReason::LimitExceeded(ResourceKind::Memory)),
            4 => Some(InterruptReason::LimitExceeded(ResourceKind::Steps)),
            _ => None,
        }
    }

    pub fn is_limit(&self) -> bool {
        matches!(self, InterruptReason::LimitExceeded(_))
    }
}

impl Display for InterruptReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterruptReason::Requested => write!(f, "interrupt request"),
            InterruptReason::LimitExceeded(kind) => write!(f, "{kind} limit"),
        }
    }
}

const NOT_SET: u8 = 0;

/// Shared, sticky interrupt state of one session.
///
/// Any thread may [`trip`](InterruptFlag::trip) the flag. Only the first reason is kept, and the
/// flag stays set until the owner of the run [`clear`](InterruptFlag::clear)s the reason it has
/// consumed.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    state: Arc<AtomicU8>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag. Returns `false` if it was already set, in which case the earlier reason
    /// is kept.
    pub fn trip(&self, reason: InterruptReason) -> bool {
        self.state
            .compare_exchange(NOT_SET, reason.encode(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn request(&self) -> bool {
        self.trip(InterruptReason::Requested)
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        // The flag does not publish any other data, so `Ordering::Relaxed` is enough here.
        self.state.load(Ordering::Relaxed) != NOT_SET
    }

    pub fn reason(&self) -> Option<InterruptReason> {
        InterruptReason::decode(self.state.load(Ordering::Acquire))
    }

    /// Clears the flag if it still holds `reason`. Returns `false` if it holds something else,
    /// which is then left in place. Only meant to be called between runs.
    pub fn clear(&self, reason: InterruptReason) -> bool {
        self.state
            .compare_exchange(reason.encode(), NOT_SET, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
