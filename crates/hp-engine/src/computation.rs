use crate::RunContext;
use hp_protocol::EngineResult;

/// A long-running, CPU-bound computation that can be interrupted at its safe points.
///
/// Implementations call [`RunContext::check_interrupt`] at chosen points and propagate its error
/// with `?`. State that must not be left half-updated is mutated inside
/// [`RunContext::unsafe_region`].
pub trait Computation {
    type Input;
    type Output;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn run(&mut self, cx: &RunContext, input: Self::Input) -> EngineResult<Self::Output>;
}
