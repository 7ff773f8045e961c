use hp_protocol::InternalError;
use std::cell::Cell;

/// Nesting counter of the unsafe regions the computation is currently inside.
///
/// Owned by the computation's thread; it is deliberately `!Sync`.
#[derive(Debug, Default)]
pub struct UnsafeRegions {
    depth: Cell<u32>,
}

impl UnsafeRegions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self) {
        self.depth.set(self.depth.get() + 1);
    }

    /// Leaves the innermost unsafe region.
    ///
    /// # Panics
    ///
    /// Panics with [`InternalError::UnbalancedUnsafeRegion`] if no region is open. That is a
    /// bookkeeping bug in the caller, not an interruption.
    pub fn leave(&self) {
        match self.depth.get().checked_sub(1) {
            Some(depth) => self.depth.set(depth),
            None => panic!("{}", InternalError::UnbalancedUnsafeRegion),
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth.get()
    }

    pub fn is_unsafe(&self) -> bool {
        self.depth.get() > 0
    }

    pub fn guard(&self) -> UnsafeRegionGuard<'_> {
        self.enter();
        UnsafeRegionGuard { regions: self }
    }
}

/// Keeps an unsafe region open for as long as the guard lives.
///
/// The region is left on every exit path, including `?` and unwinding.
#[must_use = "the unsafe region ends as soon as the guard is dropped"]
#[derive(Debug)]
pub struct UnsafeRegionGuard<'a> {
    regions: &'a UnsafeRegions,
}

impl Drop for UnsafeRegionGuard<'_> {
    fn drop(&mut self) {
        self.regions.leave();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    /// A properly nested, fully paired sequence of enters and leaves.
    #[derive(Debug, Clone)]
    struct Nesting(Vec<Nesting>);

    impl Nesting {
        fn replay(&self, regions: &UnsafeRegions, max_depth: &mut u32) {
            regions.enter();
            *max_depth = (*max_depth).max(regions.depth());
            for child in &self.0 {
                child.replay(regions, max_depth);
            }
            regions.leave();
        }
    }

    impl Arbitrary for Nesting {
        fn arbitrary(g: &mut Gen) -> Self {
            let size = g.size();
            let mut smaller = Gen::new(size / 2);
            let children = if size < 2 {
                Vec::new()
            } else {
                let count = usize::arbitrary(g) % 3;
                (0..count).map(|_| Nesting::arbitrary(&mut smaller)).collect()
            };
            Nesting(children)
        }
    }

    #[quickcheck]
    fn paired_sequences_end_safe(sequence: Vec<Nesting>) -> bool {
        let regions = UnsafeRegions::new();
        let mut max_depth = 0;
        for nesting in &sequence {
            nesting.replay(&regions, &mut max_depth);
        }
        regions.depth() == 0 && !regions.is_unsafe() && (sequence.is_empty() || max_depth > 0)
    }

    #[test]
    fn guards_nest() {
        let regions = UnsafeRegions::new();
        {
            let _outer = regions.guard();
            {
                let _inner = regions.guard();
                assert_eq!(regions.depth(), 2);
            }
            assert_eq!(regions.depth(), 1);
            assert!(regions.is_unsafe());
        }
        assert!(!regions.is_unsafe());
    }

    #[test]
    fn guard_is_released_on_early_return() {
        fn fails() -> Result<(), ()> {
            Err(())
        }

        fn bail(regions: &UnsafeRegions) -> Result<(), ()> {
            let _guard = regions.guard();
            fails()?;
            Ok(())
        }

        let regions = UnsafeRegions::new();
        assert!(bail(&regions).is_err());
        assert_eq!(regions.depth(), 0);
    }

    #[test]
    #[should_panic(expected = "left an unsafe region that was never entered")]
    fn leave_without_enter_is_fatal() {
        UnsafeRegions::new().leave();
    }
}
