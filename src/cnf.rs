use std::{fmt::Display, ops::Not};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lit {
    pub var: usize,
    pub positive: bool,
}

impl Lit {
    pub fn pos(var: usize) -> Self {
        Self {
            var,
            positive: true,
        }
    }

    pub fn neg(var: usize) -> Self {
        Self {
            var,
            positive: false,
        }
    }
}

impl Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        Lit {
            var: self.var,
            positive: !self.positive,
        }
    }
}

impl Display for Lit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.positive { "" } else { "-" };
        write!(f, "{sign}{}", self.var + 1)
    }
}

/// A formula in conjunctive normal form over variables `0..num_vars`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cnf {
    pub num_vars: usize,
    pub clauses: Vec<Vec<Lit>>,
}

impl Cnf {
    /// PHP(pigeons, holes): every pigeon sits in some hole and no hole holds two pigeons.
    /// Unsatisfiable whenever `pigeons > holes`, and hard for plain DPLL.
    pub fn pigeonhole(pigeons: usize, holes: usize) -> Self {
        let var = |pigeon: usize, hole: usize| pigeon * holes + hole;
        let mut clauses = Vec::new();

        for pigeon in 0..pigeons {
            clauses.push((0..holes).map(|hole| Lit::pos(var(pigeon, hole))).collect());
        }
        for hole in 0..holes {
            for a in 0..pigeons {
                for b in a + 1..pigeons {
                    clauses.push(vec![Lit::neg(var(a, hole)), Lit::neg(var(b, hole))]);
                }
            }
        }

        Self {
            num_vars: pigeons * holes,
            clauses,
        }
    }

    pub fn is_satisfied_by(&self, model: &[bool]) -> bool {
        self.clauses.iter().all(|clause| {
            clause
                .iter()
                .any(|lit| model.get(lit.var).is_some_and(|&value| value == lit.positive))
        })
    }
}
