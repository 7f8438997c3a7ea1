use super::{common::*, Mdp, MdpSolver, Solution, DEFAULT_MAX_IMPROVEMENTS};
use crate::common::defs::*;
use crate::error::{check_tolerance, MdpError, Result};
use rand::prelude::*;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Policy Iteration - Sutton & Barto 2018, section 4.3.
///
/// Starts from a seeded random policy and alternates evaluation and greedy
/// improvement until the improved policy equals the one it came from.
#[derive(Clone)]
pub struct PolicyIteration {
    mdp: Rc<dyn Mdp>,
    v: ValueFunction,
    pi: PolicyMap,
    iterations: usize,
}

impl PolicyIteration {
    pub fn new(mdp: Rc<dyn Mdp>, seed: u64) -> Self {
        let rng = &mut StdRng::seed_from_u64(seed);
        let pi = PolicyMap::from_shape_fn(mdp.shape(), |s| {
            if mdp.is_terminal(s) {
                None
            } else {
                Some(Action::ALL[rng.gen_range(0..Action::ALL.len())])
            }
        });

        Self {
            v: ValueFunction::zeros(mdp.shape()),
            mdp,
            pi,
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

impl MdpSolver<bool> for PolicyIteration {
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

    /// Returns whether the policy is stable and the number of improvement steps.
    fn exec(&mut self, theta: Continous, num_iterations: Option<usize>) -> Result<(bool, usize)> {
        check_tolerance("theta", theta)?;
        let budget = Budget::new(num_iterations, DEFAULT_MAX_IMPROVEMENTS);
        let mdp = &*self.mdp;

        let mut steps = 0;
        while steps < budget.limit {
            let (v, outcome) = evaluate_policy(mdp, &self.pi, theta, None)?;
            let pi = improve_policy(mdp, &v);
            steps += 1;

            let stable = pi == self.pi;
            debug!(step = steps, sweeps = outcome.sweeps, stable, "policy evaluated");
            self.v = v;
            self.pi = pi;
            self.iterations = steps;

            if stable {
                info!(steps, "policy iteration converged");
                return Ok((true, steps));
            }
        }

        if budget.strict {
            return Err(MdpError::NonConvergence {
                algorithm: "policy iteration",
                iterations: steps,
            });
        }

        warn!(steps, "policy iteration stopped before the policy was stable");
        Ok((false, steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::grid_world::GridWorld;
    use float_eq::*;

    fn classic() -> Rc<dyn Mdp> {
        Rc::new(
            GridWorld::new(
                &[
                    vec![-1., -1., 10.],
                    vec![-1., -1., -1.],
                    vec![-1., -1., -1.],
                ],
                0.99,
                &[(0, 2)],
            )
            .unwrap(),
        )
    }

    #[test]
    fn initial_policy_is_seeded_and_skips_terminals() {
        let a = PolicyIteration::new(classic(), 2718);
        let b = PolicyIteration::new(classic(), 2718);
        assert_eq!(a.policy(), b.policy());
        assert_eq!(a.pi_star((0, 2)), None);
        assert!(a.pi_star((1, 1)).is_some());
    }

    #[test]
    fn converges_to_stable_policy() {
        let pi = &mut PolicyIteration::new(classic(), 2718);
        let (stable, steps) = pi.exec(1e-8, None).unwrap();
        assert!(stable);
        assert!(steps >= 1);

        assert_eq!(pi.pi_star((0, 1)), Some(Action::Right));
        assert_eq!(pi.pi_star((1, 2)), Some(Action::Up));
        assert_eq!(pi.pi_star((0, 2)), None);
        assert_eq!(pi.q_star((0, 2), Action::Up), None);

        // The stable policy is greedy with respect to its own values.
        for s in [(0, 0), (0, 1), (1, 0), (1, 1), (1, 2), (2, 0), (2, 1), (2, 2)] {
            let best = Action::ALL
                .iter()
                .map(|&a| pi.q_star(s, a).unwrap())
                .fold(Continous::NEG_INFINITY, Continous::max);
            let chosen = pi.q_star(s, pi.pi_star(s).unwrap()).unwrap();
            assert_float_eq!(chosen, best, abs <= 1e-9);
        }
    }

    #[test]
    fn explicit_budget_stops_quietly() {
        let pi = &mut PolicyIteration::new(classic(), 2718);
        let (_, steps) = pi.exec(1e-8, Some(1)).unwrap();
        assert_eq!(steps, 1);
    }

    #[test]
    fn zero_budget_leaves_the_initial_policy() {
        let pi = &mut PolicyIteration::new(classic(), 7);
        let initial = pi.policy().clone();
        assert_eq!(pi.exec(0.01, Some(0)).unwrap(), (false, 0));
        assert_eq!(pi.policy(), &initial);
    }

    #[test]
    fn rejects_non_positive_theta() {
        let pi = &mut PolicyIteration::new(classic(), 2718);
        assert!(matches!(
            pi.exec(0., None),
            Err(MdpError::InvalidParameter { name: "theta", .. })
        ));
    }
}
