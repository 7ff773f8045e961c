use crate::{ResourceMonitor, UnsafeRegionGuard, UnsafeRegions};
use hp_protocol::Interrupted;
use std::{sync::Arc, time::Duration};

/// The computation's view of the interruption machinery for one run.
///
/// Algorithm code only needs three calls from here: [`check_interrupt`] at its safe points, and
/// [`enter_unsafe_region`] / [`leave_unsafe_region`] (or the [`unsafe_region`] guard) around
/// mutations that must not be abandoned halfway.
///
/// `RunContext` is `!Sync`: the unsafe-region counter belongs to the computation's thread.
///
/// [`check_interrupt`]: RunContext::check_interrupt
/// [`enter_unsafe_region`]: RunContext::enter_unsafe_region
/// [`leave_unsafe_region`]: RunContext::leave_unsafe_region
/// [`unsafe_region`]: RunContext::unsafe_region
#[derive(Debug)]
pub struct RunContext {
    monitor: Arc<ResourceMonitor>,
    regions: UnsafeRegions,
}

impl RunContext {
    /// Wraps a started monitor.
    pub fn new(monitor: Arc<ResourceMonitor>) -> Self {
        Self {
            monitor,
            regions: UnsafeRegions::new(),
        }
    }

    /// The safe-point check.
    ///
    /// Spends one resource unit, then reads the interrupt flag once. Returns `Ok(())` if no
    /// interrupt is pending. Otherwise returns [`Interrupted::Safe`] outside of any unsafe region
    /// and [`Interrupted::Unsafe`] inside one. Callers must propagate either signal unchanged.
    ///
    /// Never blocks and takes no lock.
    #[inline]
    pub fn check_interrupt(&self) -> Result<(), Interrupted> {
        self.monitor.spend(1);
        match self.monitor.flag().reason() {
            None => Ok(()),
            Some(reason) => match self.regions.depth() {
                0 => Err(Interrupted::safe(reason)),
                depth => Err(Interrupted::unsafe_state(reason, depth)),
            },
        }
    }

    /// Records `units` of extra work, for operations much heavier than one safe point.
    pub fn spend(&self, units: u64) {
        self.monitor.spend(units);
    }

    pub fn enter_unsafe_region(&self) {
        self.regions.enter();
    }

    /// # Panics
    ///
    /// Panics if there is no matching [`enter_unsafe_region`](RunContext::enter_unsafe_region).
    pub fn leave_unsafe_region(&self) {
        self.regions.leave();
    }

    pub fn unsafe_region(&self) -> UnsafeRegionGuard<'_> {
        self.regions.guard()
    }

    pub fn with_unsafe_region<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = self.regions.guard();
        f()
    }

    pub fn is_unsafe(&self) -> bool {
        self.regions.is_unsafe()
    }

    pub fn depth(&self) -> u32 {
        self.regions.depth()
    }

    pub fn elapsed(&self) -> Duration {
        self.monitor.elapsed()
    }

    pub fn steps(&self) -> u64 {
        self.monitor.steps()
    }

    pub fn monitor(&self) -> &ResourceMonitor {
        &self.monitor
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hp_protocol::{InterruptFlag, InterruptReason, Limits, ResourceKind, ResourceLimit};
    use hp_system::NoMemoryProbe;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn context(limits: Limits) -> RunContext {
        let mut monitor = ResourceMonitor::new(InterruptFlag::new(), Arc::new(NoMemoryProbe));
        monitor.configure(limits);
        monitor.start();
        RunContext::new(Arc::new(monitor))
    }

    fn nest(cx: &RunContext, depth: u32) {
        for _ in 0..depth {
            cx.enter_unsafe_region();
        }
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(7)]
    fn quiet_run_never_raises(#[case] depth: u32) {
        let cx = context(Limits::none());
        nest(&cx, depth);
        for _ in 0..1000 {
            assert_eq!(cx.check_interrupt(), Ok(()));
        }
    }

    #[test]
    fn request_outside_unsafe_region_is_safe() {
        let cx = context(Limits::none());
        cx.monitor().request_interrupt();
        assert_eq!(
            cx.check_interrupt(),
            Err(Interrupted::safe(InterruptReason::Requested))
        );
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    fn request_inside_unsafe_region_is_unsafe(#[case] depth: u32) {
        let cx = context(Limits::none());
        nest(&cx, depth);
        cx.monitor().request_interrupt();
        assert_eq!(
            cx.check_interrupt(),
            Err(Interrupted::unsafe_state(InterruptReason::Requested, depth))
        );
    }

    #[test]
    fn exceeded_limit_keeps_raising() {
        let cx = context(Limits::none().with(ResourceLimit::Steps(2)));
        assert_eq!(cx.check_interrupt(), Ok(()));
        assert_eq!(cx.check_interrupt(), Ok(()));

        let steps = InterruptReason::LimitExceeded(ResourceKind::Steps);
        for _ in 0..5 {
            assert_eq!(cx.check_interrupt(), Err(Interrupted::safe(steps)));
        }
        {
            let _guard = cx.unsafe_region();
            assert_eq!(
                cx.check_interrupt(),
                Err(Interrupted::unsafe_state(steps, 1))
            );
        }
        assert_eq!(cx.check_interrupt(), Err(Interrupted::safe(steps)));
    }

    #[test]
    fn spend_counts_towards_the_budget() {
        let cx = context(Limits::none().with(ResourceLimit::Steps(10)));
        cx.spend(10);
        assert!(cx.check_interrupt().is_err());
        assert_eq!(cx.steps(), 11);
    }

    #[test]
    fn huge_spend_after_a_safe_point_saturates() {
        let cx = context(Limits::none());
        assert_eq!(cx.check_interrupt(), Ok(()));
        cx.spend(u64::MAX);
        assert_eq!(cx.steps(), u64::MAX);
        assert_eq!(cx.check_interrupt(), Ok(()));
        assert_eq!(cx.steps(), u64::MAX);
    }

    #[test]
    fn with_unsafe_region_restores_depth() {
        let cx = context(Limits::none());
        let depth = cx.with_unsafe_region(|| cx.depth());
        assert_eq!(depth, 1);
        assert!(!cx.is_unsafe());
    }
}
