//! Cohesion scenario: agents scattered across the world are paid to pull
//! together without touching.
//!
//! The reward is per agent and depends only on the minimum and maximum
//! surface distance to the other agents: an exponential term fires when the
//! nearest neighbor is closer than sigma, and a linear cohesion term pulls
//! in the farthest neighbor once the nearest is clear of sigma.

use crate::core::{Result, Scenario, SimError};
use crate::registry::{KwArgs, parse_kwarg};
use crate::scenarios::placement::Placement;
use crate::utils::render2d::GREEN;
use crate::utils::rng::RngStream;
use crate::world::{Agent, Vec2, World};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CohesionConfig {
    pub n_agents: usize,
    pub agent_radius: f32,
    /// Distance scale separating the collision and cohesion regimes.
    pub sigma: f32,
    pub placement: Placement,
}

impl Default for CohesionConfig {
    fn default() -> Self {
        Self {
            n_agents: 9,
            agent_radius: 0.1,
            sigma: 0.15,
            placement: Placement::Fixed(corner_grid()),
        }
    }
}

impl CohesionConfig {
    pub fn from_kwargs(kwargs: &KwArgs) -> Self {
        let d = Self::default();
        Self {
            n_agents: parse_kwarg(kwargs, "n_agents", d.n_agents),
            agent_radius: parse_kwarg(kwargs, "agent_radius", d.agent_radius),
            sigma: parse_kwarg(kwargs, "sigma", d.sigma),
            placement: super::placement_from_kwargs(kwargs, d.placement),
        }
    }
}

/// The scattered start: world center plus the eight compass extremes.
pub fn corner_grid() -> Vec<Vec2> {
    vec![
        Vec2::new(-1.0, -1.0),
        Vec2::new(0.0, -1.0),
        Vec2::new(0.0, 1.0),
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, -1.0),
        Vec2::new(-1.0, 1.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(-1.0, 0.0),
    ]
}

/// Exponential crowding term: 0 once the nearest neighbor is beyond sigma,
/// otherwise exp(-min/sigma) (largest when the pair is touching).
pub fn collision_factor(min_distance: f32, sigma: f32) -> f32 {
    if min_distance > sigma { 0.0 } else { (-(min_distance / sigma)).exp() }
}

/// Cohesion term: 0 while the nearest neighbor is inside sigma, otherwise
/// negative in proportion to how far the farthest neighbor has strayed.
pub fn cohesion_factor(min_distance: f32, max_distance: f32, sigma: f32) -> f32 {
    if min_distance < sigma { 0.0 } else { -(max_distance - sigma) }
}

pub struct CohesionScenario {
    cfg: CohesionConfig,
}

impl CohesionScenario {
    pub fn new(cfg: CohesionConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &CohesionConfig { &self.cfg }

    /// Surface distances from one agent to every other agent in one replica.
    fn neighbor_distances(world: &World, agent: usize, e: usize) -> Vec<f32> {
        (0..world.n_agents())
            .filter(|j| *j != agent)
            .map(|j| world.agent_distance(agent, j, e))
            .collect()
    }
}

impl Scenario for CohesionScenario {
    fn make_world(&mut self, batch_dim: usize) -> Result<World> {
        if self.cfg.n_agents < 2 {
            return Err(SimError::InvalidConfig(
                "cohesion needs at least 2 agents".into(),
            ));
        }
        self.cfg.placement.validate(self.cfg.n_agents)?;
        let mut world = World::new(batch_dim);
        for i in 0..self.cfg.n_agents {
            world.add_agent(
                Agent::new(format!("agent{i}"))
                    .with_collide(true)
                    .with_color(GREEN)
                    .with_radius(self.cfg.agent_radius),
            );
        }
        Ok(world)
    }

    fn reset_world(&mut self, world: &mut World, env_index: Option<usize>, rng: &mut RngStream) {
        // Capacity was checked in make_world; the draw cannot fail for a
        // world built through this scenario.
        let positions = self
            .cfg
            .placement
            .positions(world.n_agents(), rng)
            .unwrap_or_else(|_| vec![Vec2::ZERO; world.n_agents()]);
        for (i, pos) in positions.into_iter().enumerate() {
            world.set_agent_pos(i, pos, env_index);
        }
    }

    fn reward(&mut self, world: &mut World, agent: usize) -> Vec<f32> {
        let sigma = self.cfg.sigma;
        (0..world.batch_dim())
            .map(|e| {
                let dists = Self::neighbor_distances(world, agent, e);
                let min = dists.iter().copied().fold(f32::INFINITY, f32::min);
                let max = dists.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                collision_factor(min, sigma) + cohesion_factor(min, max, sigma)
            })
            .collect()
    }

    fn observation(&self, world: &World, agent: usize) -> Vec<Vec<f32>> {
        let state = &world.agents()[agent].state;
        (0..world.batch_dim())
            .map(|e| vec![state.pos[e].x, state.pos[e].y, state.vel[e].x, state.vel[e].y])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::rng::rng_from_seed;

    fn scenario_with_world(cfg: CohesionConfig, batch_dim: usize) -> (CohesionScenario, World) {
        let mut s = CohesionScenario::new(cfg);
        let mut world = s.make_world(batch_dim).unwrap();
        let mut rng = rng_from_seed(0);
        s.reset_world(&mut world, None, &mut rng);
        (s, world)
    }

    #[test]
    fn collision_factor_zero_beyond_sigma_and_decaying_inside() {
        let sigma = 0.15;
        assert_eq!(collision_factor(0.2, sigma), 0.0);
        assert_eq!(collision_factor(sigma + 1e-6, sigma), 0.0);
        // At contact the term peaks at 1, decaying toward e^-1 at sigma.
        assert!((collision_factor(0.0, sigma) - 1.0).abs() < 1e-6);
        let near = collision_factor(0.05, sigma);
        let far = collision_factor(0.10, sigma);
        assert!(near > far && far > (-1.0f32).exp() - 1e-6);
    }

    #[test]
    fn cohesion_factor_zero_inside_sigma_else_linear_in_max() {
        let sigma = 0.15;
        assert_eq!(cohesion_factor(0.1, 2.0, sigma), 0.0);
        let v = cohesion_factor(0.2, 2.0, sigma);
        assert!((v + (2.0 - sigma)).abs() < 1e-6);
        // A tight but clear swarm pays almost nothing.
        assert!(cohesion_factor(0.16, 0.16, sigma).abs() < 0.02);
    }

    #[test]
    fn exactly_one_regime_is_active() {
        let sigma = 0.15;
        for min in [0.0, 0.05, 0.14, 0.16, 0.5, 1.0] {
            let c = collision_factor(min, sigma);
            let h = cohesion_factor(min, 2.0, sigma);
            assert!(c == 0.0 || h == 0.0);
        }
    }

    #[test]
    fn oversized_team_is_rejected_at_world_construction() {
        // The default corner grid only seats 9 agents.
        let cfg = CohesionConfig { n_agents: 10, ..CohesionConfig::default() };
        let mut s = CohesionScenario::new(cfg);
        assert!(matches!(s.make_world(1), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn default_reset_uses_the_corner_grid() {
        let (_s, world) = scenario_with_world(CohesionConfig::default(), 2);
        assert_eq!(world.n_agents(), 9);
        for e in 0..2 {
            assert_eq!(world.agents()[0].state.pos[e], Vec2::new(-1.0, -1.0));
            assert_eq!(world.agents()[4].state.pos[e], Vec2::new(1.0, 1.0));
        }
    }

    #[test]
    fn scattered_agents_get_cohesion_penalty() {
        let (mut s, mut world) = scenario_with_world(CohesionConfig::default(), 1);
        // On the corner grid every nearest neighbor is 1.0 - 0.2 = 0.8 away,
        // well beyond sigma: pure cohesion regime, strictly negative.
        for a in 0..world.n_agents() {
            let r = s.reward(&mut world, a);
            assert!(r[0] < 0.0);
        }
    }

    #[test]
    fn crowded_agents_get_collision_term() {
        let cfg = CohesionConfig {
            n_agents: 3,
            placement: Placement::Fixed(vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(0.25, 0.0),
                Vec2::new(-0.25, 0.0),
            ]),
            ..CohesionConfig::default()
        };
        let (mut s, mut world) = scenario_with_world(cfg, 1);
        // Surface gaps are 0.05 < sigma: the exponential term dominates and
        // the cohesion term is silent.
        let r = s.reward(&mut world, 0);
        let expected = collision_factor(0.05, 0.15);
        assert!((r[0] - expected).abs() < 1e-5);
    }

    #[test]
    fn observation_is_own_pos_and_vel() {
        let (s, world) = scenario_with_world(CohesionConfig::default(), 3);
        let obs = s.observation(&world, 4);
        assert_eq!(obs.len(), 3);
        for per_replica in &obs {
            assert_eq!(per_replica.len(), 4);
            assert_eq!(per_replica[0], 1.0);
            assert_eq!(per_replica[1], 1.0);
        }
    }

    #[test]
    fn done_never_trips() {
        let (s, world) = scenario_with_world(CohesionConfig::default(), 4);
        assert!(s.done(&world).iter().all(|d| !d));
    }
}
