//! A small DPLL search used to exercise the interruption machinery on a real workload.
//!
//! Safe points and their worst-case interrupt latency:
//! - top of every search iteration: one full propagation plus one backtrack;
//! - between propagation passes: one pass over all clauses;
//! - inside a backtrack, every [`UNWIND_CHECK_INTERVAL`] unassigned literals. This one sits in an
//!   unsafe region, so tripping there is reported as an unsafe interrupt.

use crate::cnf::{Cnf, Lit};
use hp_engine::{Computation, RunContext};
use hp_protocol::{EngineResult, Interrupted, SolverError};

/// Literals unassigned between two interrupt checks while backtracking.
pub const UNWIND_CHECK_INTERVAL: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Sat(Vec<bool>),
    Unsat,
}

/// Totals over every run of one solver instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
}

#[derive(Debug)]
struct Level {
    /// Trail index of the level's decision literal.
    start: usize,
    flipped: bool,
}

enum Propagation {
    Conflict,
    Fixpoint,
}

/// DPLL with unit propagation and chronological backtracking.
///
/// The trail, the assignment and the decision levels must always describe the same partial
/// assignment; every mutation of them happens inside an unsafe region.
#[derive(Debug, Default)]
pub struct Dpll {
    assignment: Vec<Option<bool>>,
    trail: Vec<Lit>,
    levels: Vec<Level>,
    stats: Stats,
}

impl Dpll {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Whether the trail, the assignment and the decision levels agree.
    pub fn is_consistent(&self) -> bool {
        let assigned = self.assignment.iter().filter(|value| value.is_some()).count();
        assigned == self.trail.len()
            && self
                .trail
                .iter()
                .all(|lit| self.assignment.get(lit.var) == Some(&Some(lit.positive)))
            && self.levels.iter().all(|level| level.start < self.trail.len())
    }

    fn reset(&mut self, num_vars: usize) {
        debug_assert!(self.is_consistent());
        for lit in self.trail.drain(..) {
            self.assignment[lit.var] = None;
        }
        self.levels.clear();
        self.assignment.resize(num_vars, None);
    }

    fn assign(&mut self, cx: &RunContext, lit: Lit) {
        let _region = cx.unsafe_region();
        self.assignment[lit.var] = Some(lit.positive);
        self.trail.push(lit);
    }

    fn decide(&mut self, cx: &RunContext, lit: Lit, flipped: bool) {
        let _region = cx.unsafe_region();
        self.levels.push(Level {
            start: self.trail.len(),
            flipped,
        });
        self.assign(cx, lit);
    }

    fn propagate(&mut self, cx: &RunContext, cnf: &Cnf) -> Result<Propagation, Interrupted> {
        loop {
            let mut changed = false;
            for clause in &cnf.clauses {
                let mut open = 0;
                let mut last_open = None;
                let mut satisfied = false;
                for &lit in clause {
                    match self.assignment[lit.var] {
                        Some(value) if value == lit.positive => {
                            satisfied = true;
                            break;
                        }
                        Some(_) => {}
                        None => {
                            open += 1;
                            last_open = Some(lit);
                        }
                    }
                }
                if satisfied {
                    continue;
                }
                match (open, last_open) {
                    (0, _) => return Ok(Propagation::Conflict),
                    (1, Some(lit)) => {
                        self.stats.propagations += 1;
                        self.assign(cx, lit);
                        changed = true;
                    }
                    _ => {}
                }
            }
            if !changed {
                return Ok(Propagation::Fixpoint);
            }
            cx.check_interrupt()?;
        }
    }

    /// Undoes levels up to the most recent decision that has not been flipped yet, and flips it.
    /// Returns `false` once every decision has been flipped: the formula is unsatisfiable.
    fn flip_last_decision(&mut self, cx: &RunContext) -> Result<bool, Interrupted> {
        let _region = cx.unsafe_region();
        while let Some(level) = self.levels.pop() {
            let decision = self.trail[level.start];
            self.unwind_to(cx, level.start)?;
            if !level.flipped {
                self.decide(cx, !decision, true);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn unwind_to(&mut self, cx: &RunContext, start: usize) -> Result<(), Interrupted> {
        let _region = cx.unsafe_region();
        for (n, lit) in self.trail[start..].iter().rev().enumerate() {
            // Tripping here leaves the trail listing variables that are already unassigned.
            if n > 0 && n % UNWIND_CHECK_INTERVAL == 0 {
                cx.check_interrupt()?;
            }
            self.assignment[lit.var] = None;
        }
        self.trail.truncate(start);
        Ok(())
    }

    fn model(&self) -> Vec<bool> {
        self.assignment
            .iter()
            .map(|value| value.unwrap_or(false))
            .collect()
    }
}

fn validate(cnf: &Cnf) -> Result<(), SolverError> {
    match cnf
        .clauses
        .iter()
        .flatten()
        .find(|lit| lit.var >= cnf.num_vars)
    {
        Some(lit) => Err(SolverError::InvalidInput {
            msg: format!(
                "literal {lit} refers to a variable outside of 1..={}",
                cnf.num_vars
            ),
        }),
        None => Ok(()),
    }
}

impl Computation for Dpll {
    type Input = Cnf;
    type Output = Answer;

    fn name(&self) -> &str {
        "dpll"
    }

    fn run(&mut self, cx: &RunContext, cnf: Cnf) -> EngineResult<Answer> {
        validate(&cnf)?;
        self.reset(cnf.num_vars);
        loop {
            cx.check_interrupt()?;
            match self.propagate(cx, &cnf)? {
                Propagation::Conflict => {
                    self.stats.conflicts += 1;
                    if !self.flip_last_decision(cx)? {
                        return Ok(Answer::Unsat);
                    }
                }
                Propagation::Fixpoint => {
                    match self.assignment.iter().position(Option::is_none) {
                        Some(var) => {
                            self.stats.decisions += 1;
                            self.decide(cx, Lit::pos(var), false);
                        }
                        None => return Ok(Answer::Sat(self.model())),
                    }
                }
            }
        }
    }
}
