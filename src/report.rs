use crate::algos::model_based::mdp::{solve_policy_iteration, solve_value_iteration, Mdp, Solution};
use crate::common::defs::*;
use crate::config::{Algorithm, RunConfig};
use crate::error::Result;
use itertools::Itertools;
use serde::Serialize;
use std::rc::Rc;
use tracing::info;

/// One solved (fill reward, algorithm) pair of a sweep.
#[derive(Debug, Clone, Serialize)]
pub struct Run {
    pub fill: Continous,
    pub algorithm: Algorithm,
    pub solution: Solution,
}

/// Solves every fill reward with every configured algorithm, each on a fresh grid.
pub fn run_sweep(config: &RunConfig) -> Result<Vec<Run>> {
    let mut runs = Vec::with_capacity(config.fill_rewards.len() * config.algorithms.len());
    for &fill in &config.fill_rewards {
        let mdp: Rc<dyn Mdp> = Rc::new(config.build(fill)?);
        for &algorithm in &config.algorithms {
            info!(fill, %algorithm, "solving");
            let solution = match algorithm {
                Algorithm::Policy => solve_policy_iteration(Rc::clone(&mdp), config.seed)?,
                Algorithm::Value => solve_value_iteration(Rc::clone(&mdp), config.epsilon)?,
            };
            runs.push(Run {
                fill,
                algorithm,
                solution,
            });
        }
    }

    Ok(runs)
}

/// Action initials per row, `T` for terminal cells.
pub fn render_policy(policy: &dyn Policy, (n_rows, n_cols): (usize, usize)) -> String {
    (0..n_rows)
        .map(|i| {
            (0..n_cols)
                .map(|j| policy.policy(&(i, j)).map_or('T', |a| a.initial()))
                .join(" ")
        })
        .join("\n")
}

/// Values to two decimals. Terminal cells show their own reward.
pub fn render_values(solution: &Solution) -> String {
    let (n_rows, n_cols) = solution.shape();
    (0..n_rows)
        .map(|i| {
            (0..n_cols)
                .map(|j| format!("{:.2}", solution.value_of((i, j))))
                .join(" ")
        })
        .join("\n")
}

pub fn render_run(run: &Run) -> String {
    format!(
        "{} with r = {}\nOptimal Policy:\n{}\n\nState Values:\n{}\n",
        run.algorithm,
        run.fill,
        render_policy(&run.solution, run.solution.shape()),
        render_values(&run.solution)
    )
}
