//! Action selection for rollouts.
//!
//! Training lives outside this crate; a trained policy plugs in through the
//! [`Policy`] trait (a checkpointed model would implement it the same way the
//! built-in heuristics do).

use crate::env::{Action, DISCRETE_ACTIONS};
use crate::spaces::{BoxSpace, Discrete, Space};
use crate::utils::rng::{RngStream, rng_from_seed};
use crate::world::{Agent, Vec2};

/// Queries an action for one agent given its current batched observation.
pub trait Policy {
    fn act(&mut self, obs: &[Vec<f32>], agent: &Agent, continuous: bool) -> Action;
}

/// The fixed heuristic used by the rollout driver: full negative control on
/// both axes in continuous mode, control index 1 (-x) in discrete mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConstantPolicy;

impl Policy for ConstantPolicy {
    fn act(&mut self, obs: &[Vec<f32>], agent: &Agent, continuous: bool) -> Action {
        let batch_dim = obs.len();
        if continuous {
            let u = agent.u_range;
            Action::Continuous(vec![Vec2::new(-u, -u); batch_dim])
        } else {
            Action::Discrete(vec![1; batch_dim])
        }
    }
}

/// Samples every replica's control uniformly from the agent's action space.
pub struct RandomPolicy {
    rng: RngStream,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self { rng: rng_from_seed(seed) }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, obs: &[Vec<f32>], agent: &Agent, continuous: bool) -> Action {
        let batch_dim = obs.len();
        if continuous {
            let space = BoxSpace::control(agent.u_range);
            Action::Continuous(
                (0..batch_dim)
                    .map(|_| {
                        let [x, y] = space.sample(&mut self.rng);
                        Vec2::new(x, y)
                    })
                    .collect(),
            )
        } else {
            let space = Discrete::new(DISCRETE_ACTIONS);
            Action::Discrete((0..batch_dim).map(|_| space.sample(&mut self.rng)).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_agent() -> Agent {
        Agent::new("a0").with_u_range(0.8)
    }

    #[test]
    fn constant_policy_matches_the_driver_heuristic() {
        let agent = dummy_agent();
        let obs = vec![vec![0.0; 4]; 3];
        let mut p = ConstantPolicy;
        match p.act(&obs, &agent, true) {
            Action::Continuous(f) => {
                assert_eq!(f.len(), 3);
                assert!(f.iter().all(|v| *v == Vec2::new(-0.8, -0.8)));
            }
            other => panic!("expected continuous, got {other:?}"),
        }
        match p.act(&obs, &agent, false) {
            Action::Discrete(a) => assert_eq!(a, vec![1, 1, 1]),
            other => panic!("expected discrete, got {other:?}"),
        }
    }

    #[test]
    fn random_policy_is_bounded_and_seed_deterministic() {
        let agent = dummy_agent();
        let obs = vec![vec![0.0; 4]; 8];
        let mut p1 = RandomPolicy::new(5);
        let mut p2 = RandomPolicy::new(5);
        match (p1.act(&obs, &agent, true), p2.act(&obs, &agent, true)) {
            (Action::Continuous(a), Action::Continuous(b)) => {
                assert_eq!(a, b);
                assert!(a.iter().all(|v| v.x.abs() <= 0.8 && v.y.abs() <= 0.8));
            }
            _ => panic!("expected continuous"),
        }
        match p1.act(&obs, &agent, false) {
            Action::Discrete(a) => assert!(a.iter().all(|c| *c < DISCRETE_ACTIONS)),
            _ => panic!("expected discrete"),
        }
    }
}
