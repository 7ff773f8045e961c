use serde::{Deserialize, Serialize};
use std::{fmt::Display, time::Duration};

/// The resource a [`ResourceLimit`] bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Wall-clock time since the run started.
    Time,
    /// Resident memory of the process.
    Memory,
    /// Abstract resource units spent by the computation at its safe points.
    Steps,
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ResourceKind::Time => "time",
                ResourceKind::Memory => "memory",
                ResourceKind::Steps => "resource",
            }
        )
    }
}

/// A single threshold on one resource.
///
/// A limit is exceeded once the measured value is strictly greater than its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceLimit {
    Time(Duration),
    /// In bytes.
    Memory(u64),
    Steps(u64),
}

impl ResourceLimit {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceLimit::Time(_) => ResourceKind::Time,
            ResourceLimit::Memory(_) => ResourceKind::Memory,
            ResourceLimit::Steps(_) => ResourceKind::Steps,
        }
    }
}

impl Display for ResourceLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceLimit::Time(limit) => write!(f, "time limit of {}ms", limit.as_millis()),
            ResourceLimit::Memory(bytes) => {
                write!(f, "memory limit of {} MiB", bytes / (1024 * 1024))
            }
            ResourceLimit::Steps(steps) => write!(f, "resource limit of {steps} steps"),
        }
    }
}

/// The set of limits configured for a run, at most one per [`ResourceKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Limits {
    time: Option<Duration>,
    memory: Option<u64>,
    steps: Option<u64>,
}

impl Limits {
    /// No limits at all: only an explicit interrupt request can stop the run.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, limit: ResourceLimit) -> Self {
        self.set(limit);
        self
    }

    /// Sets `limit`, replacing any earlier limit of the same kind.
    pub fn set(&mut self, limit: ResourceLimit) {
        match limit {
            ResourceLimit::Time(duration) => self.time = Some(duration),
            ResourceLimit::Memory(bytes) => self.memory = Some(bytes),
            ResourceLimit::Steps(steps) => self.steps = Some(steps),
        }
    }

    pub fn get(&self, kind: ResourceKind) -> Option<ResourceLimit> {
        match kind {
            ResourceKind::Time => self.time.map(ResourceLimit::Time),
            ResourceKind::Memory => self.memory.map(ResourceLimit::Memory),
            ResourceKind::Steps => self.steps.map(ResourceLimit::Steps),
        }
    }

    pub fn time(&self) -> Option<Duration> {
        self.time
    }

    pub fn memory(&self) -> Option<u64> {
        self.memory
    }

    pub fn steps(&self) -> Option<u64> {
        self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_none() && self.memory.is_none() && self.steps.is_none()
    }

    /// Whether any limit has to be observed from outside the computation's thread.
    ///
    /// Step budgets are checked inline at every safe point and never need a watchdog.
    pub fn needs_watchdog(&self) -> bool {
        self.time.is_some() || self.memory.is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = ResourceLimit> + '_ {
        [ResourceKind::Time, ResourceKind::Memory, ResourceKind::Steps]
            .into_iter()
            .filter_map(|kind| self.get(kind))
    }
}

impl Display for Limits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "no limits");
        }
        let limits = self
            .iter()
            .map(|limit| limit.to_string())
            .collect::<Vec<_>>();
        write!(f, "{}", limits.join(", "))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn later_limit_of_same_kind_replaces_earlier() {
        let limits = Limits::none()
            .with(ResourceLimit::Steps(10))
            .with(ResourceLimit::Time(Duration::from_millis(5)))
            .with(ResourceLimit::Steps(20));

        assert_eq!(limits.steps(), Some(20));
        assert_eq!(
            limits.iter().collect::<Vec<_>>(),
            vec![
                ResourceLimit::Time(Duration::from_millis(5)),
                ResourceLimit::Steps(20)
            ]
        );
    }

    #[test]
    fn only_time_and_memory_need_a_watchdog() {
        assert!(!Limits::none().needs_watchdog());
        assert!(!Limits::none()
            .with(ResourceLimit::Steps(1))
            .needs_watchdog());
        assert!(Limits::none()
            .with(ResourceLimit::Memory(1 << 20))
            .needs_watchdog());
    }

    #[test]
    fn display() {
        let limits = Limits::none()
            .with(ResourceLimit::Memory(64 * 1024 * 1024))
            .with(ResourceLimit::Time(Duration::from_millis(250)));

        assert_eq!(
            limits.to_string(),
            "time limit of 250ms, memory limit of 64 MiB"
        );
        assert_eq!(Limits::none().to_string(), "no limits");
    }
}
