use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type Continous = f64;

/// Grid cell as (row, column). Row 0 is the top row.
pub type State = (usize, usize);

/// Expected discounted return for every cell.
pub type ValueFunction = Array2<Continous>;

/// Chosen action for every cell. Terminal cells hold `None`.
pub type PolicyMap = Array2<Option<Action>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    /// Enumeration order. Argmax ties resolve to the earliest entry.
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// The two directions an actuator can slip into.
    pub fn orthogonal(&self) -> [Action; 2] {
        match self {
            Action::Up | Action::Down => [Action::Left, Action::Right],
            Action::Left | Action::Right => [Action::Up, Action::Down],
        }
    }

    pub fn initial(&self) -> char {
        match self {
            Action::Up => 'U',
            Action::Down => 'D',
            Action::Left => 'L',
            Action::Right => 'R',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub next_state: State,
    pub probability: Continous,
}

/// Outcome distribution of a single (state, action), in first-seen order.
pub type Transitions = Vec<Transition>;

pub trait Policy {
    fn policy(&self, s: &State) -> Option<Action>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Action::Up, [Action::Left, Action::Right])]
    #[case(Action::Down, [Action::Left, Action::Right])]
    #[case(Action::Left, [Action::Up, Action::Down])]
    #[case(Action::Right, [Action::Up, Action::Down])]
    fn orthogonal_never_contains_intended_or_opposite(
        #[case] a: Action,
        #[case] expected: [Action; 2],
    ) {
        assert_eq!(a.orthogonal(), expected);
        assert!(!a.orthogonal().contains(&a));
    }

    #[test]
    fn actions_serialize_lowercase() {
        let json = serde_json::to_string(&Action::ALL).unwrap();
        assert_eq!(json, r#"["up","down","left","right"]"#);
    }
}
