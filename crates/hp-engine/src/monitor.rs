use hp_protocol::{InterruptFlag, InterruptReason, Limits, ResourceKind};
use hp_system::MemoryProbe;
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// Tracks one run's resource usage against its limits.
///
/// Configured and started by the controller, then shared (behind an `Arc`) between the
/// computation and the watchdog. After [`start`](ResourceMonitor::start) every field is either
/// immutable or an atomic with a single writer: the step counter is only written by the
/// computation, and the interrupt flag is written by whoever trips it first.
///
/// The monitor never raises anything. It only reports, through the flag, that the run should
/// stop.
pub struct ResourceMonitor {
    limits: Limits,
    flag: InterruptFlag,
    memory: Arc<dyn MemoryProbe>,
    started: Option<Instant>,
    steps: AtomicU64,
}

impl ResourceMonitor {
    pub fn new(flag: InterruptFlag, memory: Arc<dyn MemoryProbe>) -> Self {
        Self {
            limits: Limits::none(),
            flag,
            memory,
            started: None,
            steps: AtomicU64::new(0),
        }
    }

    pub fn configure(&mut self, limits: Limits) {
        self.limits = limits;
    }

    /// Begins a run: clears the step counter and starts the clock.
    ///
    /// The interrupt flag is left alone. A request that is already pending stops this run at its
    /// first safe point.
    pub fn start(&mut self) {
        self.steps.store(0, Ordering::Relaxed);
        self.started = Some(Instant::now());
    }

    /// Returns `true` if the run should stop, tripping the flag if a limit has just been
    /// exceeded. Safe to call from any thread.
    pub fn poll(&self) -> bool {
        if self.flag.is_set() {
            return true;
        }
        match self.exceeded() {
            Some(kind) => {
                if self.flag.trip(InterruptReason::LimitExceeded(kind)) {
                    log::debug!(
                        "{kind} limit exceeded after {:?} and {} steps",
                        self.elapsed(),
                        self.steps()
                    );
                }
                true
            }
            None => false,
        }
    }

    fn exceeded(&self) -> Option<ResourceKind> {
        if let (Some(limit), Some(started)) = (self.limits.time(), self.started) {
            if started.elapsed() > limit {
                return Some(ResourceKind::Time);
            }
        }
        if let Some(limit) = self.limits.memory() {
            if self.memory.resident_bytes().is_some_and(|bytes| bytes > limit) {
                return Some(ResourceKind::Memory);
            }
        }
        if let Some(limit) = self.limits.steps() {
            if self.steps() > limit {
                return Some(ResourceKind::Steps);
            }
        }
        None
    }

    /// Asks the run to stop regardless of its limits.
    pub fn request_interrupt(&self) {
        if self.flag.request() {
            log::debug!("interrupt requested after {:?}", self.elapsed());
        }
    }

    /// Records `units` of work. Trips the flag once the step budget is exceeded.
    ///
    /// Only the computation's own thread calls this. The counter saturates at `u64::MAX`.
    pub fn spend(&self, units: u64) {
        let total = self.steps().saturating_add(units);
        self.steps.store(total, Ordering::Relaxed);
        if let Some(limit) = self.limits.steps() {
            if total > limit {
                self.flag
                    .trip(InterruptReason::LimitExceeded(ResourceKind::Steps));
            }
        }
    }

    pub fn steps(&self) -> u64 {
        self.steps.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.started
            .map(|started| started.elapsed())
            .unwrap_or_default()
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn flag(&self) -> &InterruptFlag {
        &self.flag
    }
}

impl std::fmt::Debug for ResourceMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceMonitor")
            .field("limits", &self.limits)
            .field("flag", &self.flag)
            .field("started", &self.started)
            .field("steps", &self.steps())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hp_protocol::ResourceLimit;
    use hp_system::NoMemoryProbe;
    use pretty_assertions::assert_eq;

    struct FixedMemory(u64);

    impl MemoryProbe for FixedMemory {
        fn resident_bytes(&self) -> Option<u64> {
            Some(self.0)
        }
    }

    fn monitor(limits: Limits, memory: impl MemoryProbe + 'static) -> ResourceMonitor {
        let mut monitor = ResourceMonitor::new(InterruptFlag::new(), Arc::new(memory));
        monitor.configure(limits);
        monitor.start();
        monitor
    }

    #[test]
    fn no_limits_never_trip() {
        let monitor = monitor(Limits::none(), FixedMemory(u64::MAX));
        monitor.spend(1_000_000);
        assert!(!monitor.poll());
    }

    #[test]
    fn step_budget_is_exclusive() {
        let monitor = monitor(Limits::none().with(ResourceLimit::Steps(3)), NoMemoryProbe);
        monitor.spend(3);
        assert!(!monitor.poll());
        monitor.spend(1);
        assert!(monitor.poll());
        assert_eq!(
            monitor.flag().reason(),
            Some(InterruptReason::LimitExceeded(ResourceKind::Steps))
        );
    }

    #[test]
    fn memory_limit() {
        let limits = Limits::none().with(ResourceLimit::Memory(1024));
        assert!(!monitor(limits.clone(), FixedMemory(1024)).poll());

        let over = monitor(limits, FixedMemory(1025));
        assert!(over.poll());
        assert_eq!(
            over.flag().reason(),
            Some(InterruptReason::LimitExceeded(ResourceKind::Memory))
        );
    }

    #[test]
    fn unmeasurable_memory_never_trips() {
        let monitor = monitor(Limits::none().with(ResourceLimit::Memory(1)), NoMemoryProbe);
        assert!(!monitor.poll());
    }

    #[test]
    fn time_limit() {
        let monitor = monitor(
            Limits::none().with(ResourceLimit::Time(Duration::from_millis(1))),
            NoMemoryProbe,
        );
        std::thread::sleep(Duration::from_millis(5));
        assert!(monitor.poll());
        assert_eq!(
            monitor.flag().reason(),
            Some(InterruptReason::LimitExceeded(ResourceKind::Time))
        );
    }

    #[test]
    fn tripped_state_is_sticky() {
        let monitor = monitor(Limits::none(), NoMemoryProbe);
        monitor.request_interrupt();
        for _ in 0..10 {
            assert!(monitor.poll());
        }
        assert_eq!(monitor.flag().reason(), Some(InterruptReason::Requested));
    }

    #[test]
    fn start_clears_steps_but_keeps_a_pending_request() {
        let mut monitor = monitor(Limits::none(), NoMemoryProbe);
        monitor.spend(5);
        monitor.request_interrupt();

        monitor.start();
        assert_eq!(monitor.steps(), 0);
        assert!(monitor.poll());
        assert_eq!(monitor.flag().reason(), Some(InterruptReason::Requested));
    }

    #[test]
    fn steps_saturate() {
        let unlimited = monitor(Limits::none(), NoMemoryProbe);
        unlimited.spend(1);
        unlimited.spend(u64::MAX);
        assert_eq!(unlimited.steps(), u64::MAX);
        assert!(!unlimited.poll());

        let limited = monitor(Limits::none().with(ResourceLimit::Steps(10)), NoMemoryProbe);
        limited.spend(3);
        limited.spend(u64::MAX);
        assert_eq!(limited.steps(), u64::MAX);
        assert_eq!(
            limited.flag().reason(),
            Some(InterruptReason::LimitExceeded(ResourceKind::Steps))
        );
    }
}
