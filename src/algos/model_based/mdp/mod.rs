pub mod common;
pub mod pi;
pub mod vi;

use crate::common::defs::*;
use crate::error::Result;
use ndarray::Array2;
use serde::Serialize;
use std::rc::Rc;

pub use pi::PolicyIteration;
pub use vi::ValueIteration;

/// Hard stop for evaluation and value-iteration sweeps when the caller gives no budget.
pub const DEFAULT_MAX_SWEEPS: usize = 1_000_000;

/// Hard stop for policy-improvement steps when the caller gives no budget.
pub const DEFAULT_MAX_IMPROVEMENTS: usize = 10_000;

/// Tolerance used for policy evaluation inside policy iteration.
pub const DEFAULT_THETA: Continous = 0.01;

/// Seed for the random initial policy of policy iteration.
pub const DEFAULT_SEED: u64 = 2718;

/// Markov Decision Process - Sutton & Barto 2018.
///
/// Rewards are collected on entering a state: `r(s')`.
pub trait Mdp {
    fn shape(&self) -> (usize, usize);

    fn states(&self) -> &[State];

    fn gamma(&self) -> Continous;

    fn reward(&self, s: State) -> Continous;

    fn is_terminal(&self, s: State) -> bool;

    fn transition(&self, s: State, a: Action) -> Transitions;
}

pub trait MdpSolver<T> {
    fn v_star(&self, s: State) -> Continous;

    /// `None` for terminal states.
    fn q_star(&self, s: State, a: Action) -> Option<Continous>;

    fn pi_star(&self, s: State) -> Option<Action>;

    /// Runs to convergence within `theta`. With `num_iterations` set the
    /// run stops quietly at that budget; without it a safety cap applies
    /// and exhausting it is an error.
    fn exec(&mut self, theta: Continous, num_iterations: Option<usize>) -> Result<(T, usize)>;
}

/// Converged value function and policy, owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub values: ValueFunction,
    pub policy: PolicyMap,
    pub iterations: usize,
    #[serde(skip)]
    terminal_rewards: Array2<Option<Continous>>,
}

impl Solution {
    pub fn new(mdp: &dyn Mdp, values: ValueFunction, policy: PolicyMap, iterations: usize) -> Self {
        let terminal_rewards = Array2::from_shape_fn(mdp.shape(), |s| {
            mdp.is_terminal(s).then(|| mdp.reward(s))
        });

        Self {
            values,
            policy,
            iterations,
            terminal_rewards,
        }
    }

    /// Terminal cells report their own reward; others their computed value.
    pub fn value_of(&self, s: State) -> Continous {
        self.terminal_rewards[s].unwrap_or(self.values[s])
    }

    pub fn pi_star(&self, s: State) -> Option<Action> {
        self.policy[s]
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }
}

impl Policy for Solution {
    fn policy(&self, s: &State) -> Option<Action> {
        self.pi_star(*s)
    }
}

pub fn solve_policy_iteration(mdp: Rc<dyn Mdp>, seed: u64) -> Result<Solution> {
    let pi = &mut PolicyIteration::new(mdp, seed);
    pi.exec(DEFAULT_THETA, None)?;
    Ok(pi.solution())
}

pub fn solve_value_iteration(mdp: Rc<dyn Mdp>, epsilon: Continous) -> Result<Solution> {
    let vi = &mut ValueIteration::new(mdp);
    vi.exec(epsilon, None)?;
    Ok(vi.solution())
}
