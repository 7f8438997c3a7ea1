use super::{Mdp, DEFAULT_MAX_SWEEPS};
use crate::common::defs::*;
use crate::error::{MdpError, Result};
use tracing::{trace, warn};

/// Iteration limit for a solver loop.
///
/// An explicit caller budget ends the run quietly; the default safety cap
/// turns exhaustion into `MdpError::NonConvergence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub limit: usize,
    pub strict: bool,
}

impl Budget {
    pub fn new(num_iterations: Option<usize>, safety_cap: usize) -> Self {
        match num_iterations {
            Some(limit) => Self {
                limit,
                strict: false,
            },
            None => Self {
                limit: safety_cap,
                strict: true,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepOutcome {
    pub sweeps: usize,
    /// Largest absolute change in the last sweep.
    pub delta: Continous,
    pub converged: bool,
}

/// `Q(s, a) = Σ P(s'|s, a) · (r(s') + γ · V(s'))`.
pub fn q_value(mdp: &dyn Mdp, v: &ValueFunction, s: State, a: Action) -> Continous {
    let gamma = mdp.gamma();
    mdp.transition(s, a)
        .iter()
        .map(|t| t.probability * (mdp.reward(t.next_state) + gamma * v[t.next_state]))
        .sum()
}

/// Best action and its value. Scans `Action::ALL` in order; ties keep the first.
pub fn greedy(mdp: &dyn Mdp, v: &ValueFunction, s: State) -> (Action, Continous) {
    let mut best = (Action::ALL[0], q_value(mdp, v, s, Action::ALL[0]));
    for &a in &Action::ALL[1..] {
        let q = q_value(mdp, v, s, a);
        if q > best.1 {
            best = (a, q);
        }
    }

    best
}

/// Synchronous (Jacobi) sweeps of `backup` over all non-terminal states,
/// starting from zero, until the largest change drops below `theta`.
/// Terminal states keep the value 0.
pub fn sweep_to_fixed_point<F>(
    mdp: &dyn Mdp,
    theta: Continous,
    budget: Budget,
    algorithm: &'static str,
    backup: F,
) -> Result<(ValueFunction, SweepOutcome)>
where
    F: Fn(&ValueFunction, State) -> Continous,
{
    let mut v = ValueFunction::zeros(mdp.shape());
    let mut delta = Continous::INFINITY;
    let mut sweeps = 0;

    while sweeps < budget.limit {
        let mut v_next = v.clone();
        delta = 0.;
        for &s in mdp.states() {
            if mdp.is_terminal(s) {
                continue;
            }

            v_next[s] = backup(&v, s);
            delta = delta.max((v[s] - v_next[s]).abs());
            // inf - inf is NaN, which f64::max would drop from delta.
            if !v_next[s].is_finite() {
                warn!(algorithm, sweeps, row = s.0, col = s.1, "value overflowed");
                return Err(MdpError::NonConvergence {
                    algorithm,
                    iterations: sweeps + 1,
                });
            }
        }

        v = v_next;
        sweeps += 1;
        trace!(algorithm, sweeps, delta, "sweep");

        if delta < theta {
            let outcome = SweepOutcome {
                sweeps,
                delta,
                converged: true,
            };
            return Ok((v, outcome));
        }
    }

    if budget.strict {
        return Err(MdpError::NonConvergence {
            algorithm,
            iterations: sweeps,
        });
    }

    warn!(algorithm, sweeps, delta, "sweep budget exhausted before convergence");
    let outcome = SweepOutcome {
        sweeps,
        delta,
        converged: false,
    };
    Ok((v, outcome))
}

/// Values of a fixed policy. `policy` must hold an action for every non-terminal state.
pub fn evaluate_policy(
    mdp: &dyn Mdp,
    policy: &PolicyMap,
    theta: Continous,
    num_sweeps: Option<usize>,
) -> Result<(ValueFunction, SweepOutcome)> {
    if let Some(&s) = mdp
        .states()
        .iter()
        .find(|&&s| !mdp.is_terminal(s) && policy[s].is_none())
    {
        return Err(MdpError::IncompletePolicy { state: s });
    }

    sweep_to_fixed_point(
        mdp,
        theta,
        Budget::new(num_sweeps, DEFAULT_MAX_SWEEPS),
        "policy evaluation",
        |v, s| match policy[s] {
            Some(a) => q_value(mdp, v, s, a),
            None => unreachable!("policy checked for every non-terminal state"),
        },
    )
}

/// Greedy policy with respect to `v`. Terminal states get `None`.
pub fn improve_policy(mdp: &dyn Mdp, v: &ValueFunction) -> PolicyMap {
    let mut policy = PolicyMap::from_elem(mdp.shape(), None);
    for &s in mdp.states() {
        if !mdp.is_terminal(s) {
            policy[s] = Some(greedy(mdp, v, s).0);
        }
    }

    policy
}
