//! Optimal behaviour for an agent in a stochastic grid world.
//!
//! The world is a finite MDP: a rectangular reward grid, an explicit set of
//! absorbing terminal cells and an actuator that slips sideways 20% of the
//! time. Policy iteration and value iteration solve it to a fixed point.

pub mod algos;
pub mod common;
pub mod config;
pub mod envs;
pub mod error;
pub mod report;

pub use algos::model_based::mdp::{
    solve_policy_iteration, solve_value_iteration, Mdp, MdpSolver, PolicyIteration, Solution,
    ValueIteration,
};
pub use common::defs::*;
pub use envs::grid_world::GridWorld;
pub use error::{MdpError, Result};
