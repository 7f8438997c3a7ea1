//! Run configuration for reward sweeps.
//!
//! A sweep solves the same grid layout once per fill reward. Template cells
//! set to `null` take the fill reward; everything else is fixed. Each fill
//! value gets its own `GridWorld`, nothing is shared between runs.

use crate::algos::model_based::mdp::{DEFAULT_SEED, DEFAULT_THETA};
use crate::common::defs::*;
use crate::envs::grid_world::GridWorld;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid grid template: {0}")]
    Template(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Policy,
    Value,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Policy => f.write_str("Policy Iteration"),
            Algorithm::Value => f.write_str("Value Iteration"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Reward layout; `null` cells take the fill reward of the run.
    pub grid_template: Vec<Vec<Option<Continous>>>,
    pub fill_rewards: Vec<Continous>,
    pub terminals: Vec<State>,
    pub gamma: Continous,
    /// Convergence tolerance for both solvers.
    pub epsilon: Continous,
    /// Seed of the random initial policy for policy iteration.
    pub seed: u64,
    pub algorithms: Vec<Algorithm>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            grid_template: vec![
                vec![None, Some(-1.), Some(10.)],
                vec![Some(-1.), Some(-1.), Some(-1.)],
                vec![Some(-1.), Some(-1.), Some(-1.)],
            ],
            fill_rewards: vec![100., 3., 0., -3.],
            terminals: vec![(0, 0), (0, 2)],
            gamma: 0.99,
            epsilon: DEFAULT_THETA,
            seed: DEFAULT_SEED,
            algorithms: vec![Algorithm::Policy, Algorithm::Value],
        }
    }
}

impl RunConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        if config.grid_template.is_empty() {
            return Err(ConfigError::Template("grid_template has no rows".into()));
        }

        Ok(config)
    }

    pub fn grid_for(&self, fill: Continous) -> Vec<Vec<Continous>> {
        self.grid_template
            .iter()
            .map(|row| row.iter().map(|cell| cell.unwrap_or(fill)).collect())
            .collect()
    }

    pub fn build(&self, fill: Continous) -> crate::error::Result<GridWorld> {
        GridWorld::new(&self.grid_for(fill), self.gamma, &self.terminals)
    }
}
