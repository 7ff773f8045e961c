use crate::{Computation, ResourceMonitor, RunContext, Watchdog};
use hp_protocol::{
    config::DEFAULT_POLL_INTERVAL_MS, InternalError, InterruptFlag, Limits, Outcome, SolverError,
};
use hp_system::{MemoryProbe, ProcessMemory};
use std::{sync::Arc, time::Duration};

/// Lets another thread stop the session's current run.
///
/// A request made while no run is in progress stays pending and stops the next run at its first
/// safe point. The flag is only cleared once a run has been stopped by it.
#[derive(Debug, Clone)]
pub struct InterruptHandle {
    flag: InterruptFlag,
}

impl InterruptHandle {
    /// Returns `false` if the run had already been asked to stop.
    pub fn request_interrupt(&self) -> bool {
        self.flag.request()
    }
}

/// The controller side of a computation: owns the instance, its limits and its interrupt state,
/// and turns each run into an [`Outcome`].
///
/// After an [`Outcome::SafeInterrupt`] the instance is kept and can be run again, for example
/// with larger limits. After an [`Outcome::UnsafeInterrupt`] or an [`Outcome::Internal`] the
/// instance is dropped, and every later run fails with [`SolverError::InstanceDiscarded`].
pub struct Session<C> {
    computation: Option<C>,
    limits: Limits,
    flag: InterruptFlag,
    memory: Arc<dyn MemoryProbe>,
    poll_interval: Duration,
    runs: u64,
}

impl<C: Computation> Session<C> {
    pub fn new(computation: C) -> Self {
        Self {
            computation: Some(computation),
            limits: Limits::none(),
            flag: InterruptFlag::new(),
            memory: Arc::new(ProcessMemory::new()),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            runs: 0,
        }
    }

    pub fn with_memory_probe(mut self, probe: impl MemoryProbe + 'static) -> Self {
        self.memory = Arc::new(probe);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn configure_limits(&mut self, limits: Limits) {
        self.limits = limits;
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn interrupt_handle(&self) -> InterruptHandle {
        InterruptHandle {
            flag: self.flag.clone(),
        }
    }

    pub fn request_interrupt(&self) -> bool {
        self.flag.request()
    }

    pub fn is_discarded(&self) -> bool {
        self.computation.is_none()
    }

    pub fn computation(&self) -> Option<&C> {
        self.computation.as_ref()
    }

    pub fn into_inner(self) -> Option<C> {
        self.computation
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Runs the computation once under the configured limits.
    pub fn run(&mut self, input: C::Input) -> Outcome<C::Output> {
        let Some(computation) = self.computation.as_mut() else {
            log::warn!("refusing to run a discarded instance");
            return Outcome::Failed(SolverError::InstanceDiscarded);
        };
        self.runs += 1;
        let name = computation.name().to_string();

        let mut monitor = ResourceMonitor::new(self.flag.clone(), self.memory.clone());
        monitor.configure(self.limits.clone());
        monitor.start();
        let monitor = Arc::new(monitor);

        let watchdog = if self.limits.needs_watchdog() {
            match Watchdog::spawn(monitor.clone(), self.poll_interval) {
                Ok(watchdog) => Some(watchdog),
                Err(err) => {
                    return Outcome::Failed(SolverError::Monitor {
                        msg: format!("could not start watchdog: {err}"),
                    })
                }
            }
        } else {
            None
        };

        log::debug!("run {} of {name} started with {}", self.runs, self.limits);
        let cx = RunContext::new(monitor.clone());
        let result = computation.run(&cx, input);
        if let Some(watchdog) = watchdog {
            watchdog.stop();
        }
        log::debug!(
            "run {} of {name} finished after {:?} and {} steps",
            self.runs,
            monitor.elapsed(),
            monitor.steps()
        );

        let outcome = match Outcome::from_result(result) {
            outcome @ Outcome::UnsafeInterrupt(_) => outcome,
            _ if cx.depth() > 0 => Outcome::Internal(InternalError::LeakedUnsafeRegion {
                depth: cx.depth(),
            }),
            outcome => outcome,
        };
        self.consume_interrupt(&name, &outcome);

        if outcome.must_discard() {
            log::warn!("discarding {name}: {}", outcome.summary());
            self.computation = None;
        } else {
            log::info!("{name}: {}", outcome.summary());
        }
        outcome
    }

    /// Clears the flag once the run is over, unless it holds a request the run never observed.
    ///
    /// A set flag refuses new requests, so clearing a reason that is already there cannot drop a
    /// request that was reported as accepted.
    fn consume_interrupt(&self, name: &str, outcome: &Outcome<C::Output>) {
        let Some(reason) = self.flag.reason() else {
            return;
        };
        if outcome.interrupted().is_some() || reason.is_limit() {
            self.flag.clear(reason);
        } else {
            log::debug!("{name} finished before observing an interrupt request, keeping it pending");
        }
    }
}

impl<C> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("discarded", &self.computation.is_none())
            .field("limits", &self.limits)
            .field("flag", &self.flag)
            .field("poll_interval", &self.poll_interval)
            .field("runs", &self.runs)
            .finish_non_exhaustive()
    }
}
