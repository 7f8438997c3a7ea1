use super::{common::*, Mdp, MdpSolver, Solution, DEFAULT_MAX_SWEEPS};
use crate::common::defs::*;
use crate::error::{check_tolerance, Result};
use std::rc::Rc;
use tracing::info;

/// Value Iteration - Sutton & Barto 2018, section 4.4.
#[derive(Clone)]
pub struct ValueIteration {
    mdp: Rc<dyn Mdp>,
    v: ValueFunction,
    pi: PolicyMap,
    iterations: usize,
}

impl ValueIteration {
    pub fn new(mdp: Rc<dyn Mdp>) -> Self {
        Self {
            v: ValueFunction::zeros(mdp.shape()),
            pi: PolicyMap::from_elem(mdp.shape(), None),
            mdp,
            iterations: 0,
        }
    }

    pub fn policy(&self) -> &PolicyMap {
        &self.pi
    }

    pub fn solution(&self) -> Solution {
        Solution::new(&*self.mdp, self.v.clone(), self.pi.clone(), self.iterations)
    }
}

impl MdpSolver<Continous> for ValueIteration {
    fn v_star(&self, s: State) -> Continous {
        self.v[s]
    }

    fn q_star(&self, s: State, a: Action) -> Option<Continous> {
        if self.mdp.is_terminal(s) {
            None
        } else {
            Some(q_value(&*self.mdp, &self.v, s, a))
        }
    }

    fn pi_star(&self, s: State) -> Option<Action> {
        self.pi[s]
    }

    /// Returns the last sweep's largest change and the number of sweeps.
    fn exec(&mut self, theta: Continous, num_iterations: Option<usize>) -> Result<(Continous, usize)> {
        check_tolerance("epsilon", theta)?;
        let mdp = &*self.mdp;

        let (v, outcome) = sweep_to_fixed_point(
            mdp,
            theta,
            Budget::new(num_iterations, DEFAULT_MAX_SWEEPS),
            "value iteration",
            |v, s| greedy(mdp, v, s).1,
        )?;

        // Policy extraction against the final values.
        self.pi = improve_policy(mdp, &v);
        self.v = v;
        self.iterations = outcome.sweeps;

        if outcome.converged {
            info!(sweeps = outcome.sweeps, delta = outcome.delta, "value iteration converged");
        }

        Ok((outcome.delta, outcome.sweeps))
    }
}
