use crate::algos::model_based::mdp::Mdp;
use crate::common::defs::*;
use crate::error::{MdpError, Result};
use itertools::iproduct;
use ndarray::Array2;

/// Probability that the actuator moves in the intended direction.
pub const INTENDED_PROBABILITY: Continous = 0.8;

/// Probability of slipping into each of the two orthogonal directions.
pub const SLIP_PROBABILITY: Continous = 0.1;

/// Rectangular grid world with a noisy actuator.
/// Ref: Russell & Norvig, AIMA 4th ed., ch. 17.
///
/// Moving off the grid leaves the agent in place. Terminal cells are
/// absorbing and never have an action evaluated.
#[derive(Debug, Clone)]
pub struct GridWorld {
    rewards: Array2<Continous>,
    terminals: Array2<bool>,
    gamma: Continous,
    states: Vec<State>,
}

impl GridWorld {
    pub fn new(grid: &[Vec<Continous>], gamma: Continous, terminals: &[State]) -> Result<Self> {
        let n_rows = grid.len();
        let n_cols = grid.first().map_or(0, Vec::len);
        if n_rows == 0 || n_cols == 0 {
            return Err(MdpError::configuration("grid is empty"));
        }

        if let Some(r) = grid.iter().position(|row| row.len() != n_cols) {
            return Err(MdpError::configuration(format!(
                "grid is not rectangular: row {r} has {} cells, expected {n_cols}",
                grid[r].len()
            )));
        }

        if !(gamma > 0. && gamma < 1.) {
            return Err(MdpError::configuration(format!(
                "discount factor {gamma} is outside (0, 1)"
            )));
        }

        let rewards = Array2::from_shape_fn((n_rows, n_cols), |(i, j)| grid[i][j]);
        if let Some(((i, j), r)) = rewards.indexed_iter().find(|(_, r)| !r.is_finite()) {
            return Err(MdpError::configuration(format!(
                "reward at ({i}, {j}) is not finite: {r}"
            )));
        }

        let mut terminal_mask = Array2::from_elem((n_rows, n_cols), false);
        for &(i, j) in terminals {
            if i >= n_rows || j >= n_cols {
                return Err(MdpError::configuration(format!(
                    "terminal ({i}, {j}) is outside the {n_rows}x{n_cols} grid"
                )));
            }
            terminal_mask[(i, j)] = true;
        }

        Ok(Self {
            rewards,
            terminals: terminal_mask,
            gamma,
            states: iproduct!(0..n_rows, 0..n_cols).collect(),
        })
    }

    pub fn n_rows(&self) -> usize {
        self.rewards.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.rewards.ncols()
    }

    /// # Panics
    /// If `s` lies outside the grid.
    pub fn reward_of(&self, s: State) -> Continous {
        self.rewards[s]
    }

    /// # Panics
    /// If `s` lies outside the grid.
    pub fn is_terminal(&self, s: State) -> bool {
        self.terminals[s]
    }

    /// Deterministic move with wall clamping.
    pub fn next_state(&self, (i, j): State, a: Action) -> State {
        match a {
            Action::Up => (i.saturating_sub(1), j),
            Action::Down => ((i + 1).min(self.n_rows() - 1), j),
            Action::Left => (i, j.saturating_sub(1)),
            Action::Right => (i, (j + 1).min(self.n_cols() - 1)),
        }
    }
}

impl Mdp for GridWorld {
    fn shape(&self) -> (usize, usize) {
        self.rewards.dim()
    }

    fn states(&self) -> &[State] {
        &self.states
    }

    fn gamma(&self) -> Continous {
        self.gamma
    }

    fn reward(&self, s: State) -> Continous {
        self.reward_of(s)
    }

    fn is_terminal(&self, s: State) -> bool {
        GridWorld::is_terminal(self, s)
    }

    fn transition(&self, s: State, a: Action) -> Transitions {
        if self.is_terminal(s) {
            return vec![Transition {
                next_state: s,
                probability: 1.,
            }];
        }

        let [side_a, side_b] = a.orthogonal();
        let outcomes = [
            (a, INTENDED_PROBABILITY),
            (side_a, SLIP_PROBABILITY),
            (side_b, SLIP_PROBABILITY),
        ];

        // Clamped moves can land on the same cell; their mass is merged.
        let mut ts: Transitions = Vec::with_capacity(outcomes.len());
        for (dir, p) in outcomes {
            let next_state = self.next_state(s, dir);
            match ts.iter_mut().find(|t| t.next_state == next_state) {
                Some(t) => t.probability += p,
                None => ts.push(Transition {
                    next_state,
                    probability: p,
                }),
            }
        }

        ts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::*;
    use rstest::rstest;

    fn classic() -> GridWorld {
        GridWorld::new(
            &[
                vec![-1., -1., 10.],
                vec![-1., -1., -1.],
                vec![-1., -1., -1.],
            ],
            0.99,
            &[(0, 2)],
        )
        .unwrap()
    }

    fn as_pairs(ts: &Transitions) -> Vec<(State, Continous)> {
        ts.iter().map(|t| (t.next_state, t.probability)).collect()
    }

    #[test]
    fn states_are_row_major() {
        let gw = classic();
        assert_eq!(gw.states().len(), 9);
        assert_eq!(gw.states()[0], (0, 0));
        assert_eq!(gw.states()[1], (0, 1));
        assert_eq!(gw.states()[8], (2, 2));
        assert!(gw.is_terminal((0, 2)));
    }

    #[test]
    fn probability_mass_sums_to_one_everywhere() {
        let gw = classic();
        for &s in gw.states() {
            for a in Action::ALL {
                let ts = gw.transition(s, a);
                let total: Continous = ts.iter().map(|t| t.probability).sum();
                assert_float_eq!(total, 1., abs <= 1e-9);
                assert!(ts.iter().all(|t| t.probability > 0.));

                let mut seen = ts.iter().map(|t| t.next_state).collect::<Vec<_>>();
                seen.sort();
                seen.dedup();
                assert_eq!(seen.len(), ts.len(), "duplicate outcome for {s:?} {a}");
            }
        }
    }

    #[rstest]
    #[case(Action::Up)]
    #[case(Action::Down)]
    #[case(Action::Left)]
    #[case(Action::Right)]
    fn terminal_states_absorb(#[case] a: Action) {
        let gw = classic();
        assert_eq!(
            gw.transition((0, 2), a),
            vec![Transition {
                next_state: (0, 2),
                probability: 1.
            }]
        );
    }

    #[test]
    fn corner_up_merges_clamped_mass() {
        let gw = classic();
        // Up and Left both bump into walls; only Right moves.
        let ts = as_pairs(&gw.transition((0, 0), Action::Up));
        assert_eq!(ts.len(), 2);
        assert_eq!(ts[0].0, (0, 0));
        assert_float_eq!(ts[0].1, 0.9, abs <= 1e-12);
        assert_eq!(ts[1].0, (0, 1));
        assert_float_eq!(ts[1].1, 0.1, abs <= 1e-12);
    }

    #[test]
    fn corner_left_merges_clamped_mass() {
        let gw = classic();
        let ts = as_pairs(&gw.transition((0, 0), Action::Left));
        assert_eq!(ts.len(), 2);
        assert_eq!(ts[0].0, (0, 0));
        assert_float_eq!(ts[0].1, 0.9, abs <= 1e-12);
        assert_eq!(ts[1].0, (1, 0));
        assert_float_eq!(ts[1].1, 0.1, abs <= 1e-12);
    }

    #[test]
    fn interior_move_has_three_outcomes() {
        let gw = classic();
        let ts = as_pairs(&gw.transition((1, 1), Action::Right));
        assert_eq!(
            ts,
            vec![((1, 2), 0.8), ((0, 1), 0.1), ((2, 1), 0.1)]
        );
    }

    #[test]
    fn single_column_merges_both_slips() {
        let gw = GridWorld::new(&[vec![0.], vec![0.], vec![0.]], 0.9, &[]).unwrap();
        let ts = as_pairs(&gw.transition((1, 0), Action::Up));
        assert_eq!(ts.len(), 2);
        assert_eq!(ts[0], ((0, 0), 0.8));
        assert_eq!(ts[1].0, (1, 0));
        assert_float_eq!(ts[1].1, 0.2, abs <= 1e-12);
    }

    #[test]
    fn terminality_is_explicit_not_reward_based() {
        let gw = GridWorld::new(&[vec![10., 10.]], 0.5, &[(0, 1)]).unwrap();
        assert!(!gw.is_terminal((0, 0)));
        assert!(gw.is_terminal((0, 1)));
        assert_eq!(gw.reward_of((0, 0)), 10.);
    }

    #[rstest]
    #[case(vec![], 0.9, vec![])]
    #[case(vec![vec![]], 0.9, vec![])]
    #[case(vec![vec![1., 2.], vec![3.]], 0.9, vec![])]
    #[case(vec![vec![1.]], 1., vec![])]
    #[case(vec![vec![1.]], 0., vec![])]
    #[case(vec![vec![1.]], -0.5, vec![])]
    #[case(vec![vec![1.]], f64::NAN, vec![])]
    #[case(vec![vec![f64::NAN]], 0.9, vec![])]
    #[case(vec![vec![1.]], 0.9, vec![(0, 1)])]
    fn malformed_inputs_are_configuration_errors(
        #[case] grid: Vec<Vec<Continous>>,
        #[case] gamma: Continous,
        #[case] terminals: Vec<State>,
    ) {
        assert!(matches!(
            GridWorld::new(&grid, gamma, &terminals),
            Err(MdpError::Configuration { .. })
        ));
    }
}
