//! Goal-seeking scenario: a team of agents drives toward a shared goal
//! landmark while holding a target spacing and avoiding each other and a
//! static obstacle.
//!
//! The reward is collective: one scalar per replica, recomputed once per step
//! and handed to every agent. Per agent it sums four terms: shaped progress
//! toward the goal (with an on-goal bonus), a spacing shaping delta, a fixed
//! penalty per colliding teammate, and an obstacle-proximity penalty.

use crate::core::{Info, InfoValue, Result, Scenario, SimError};
use crate::registry::{KwArgs, parse_kwarg};
use crate::scenarios::placement::{Placement, cross};
use crate::utils::render2d::{BLACK, GREEN, RED};
use crate::utils::rng::RngStream;
use crate::world::{Agent, Landmark, Vec2, World};

const GOAL: usize = 0;
const OBSTACLE: usize = 1;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoToPositionConfig {
    pub n_agents: usize,
    pub pos_shaping_factor: f32,
    pub dist_shaping_factor: f32,
    pub agent_radius: f32,
    /// Target inter-agent spacing for the shaping term.
    pub desired_distance: f32,
    /// Surface-distance threshold below which contact penalties fire.
    pub min_collision_distance: f32,
    pub agent_collision_penalty: f32,
    pub obstacle_collision_penalty: f32,
    pub on_goal_bonus: f32,
    pub goal_radius: f32,
    pub goal_pos: Vec2,
    pub obstacle_pos: Vec2,
    pub placement: Placement,
}

impl Default for GoToPositionConfig {
    fn default() -> Self {
        Self {
            n_agents: 5,
            pos_shaping_factor: 10.0,
            dist_shaping_factor: 10.0,
            agent_radius: 0.1,
            desired_distance: 0.15,
            min_collision_distance: 0.005,
            agent_collision_penalty: -1.0,
            obstacle_collision_penalty: -10.0,
            on_goal_bonus: 20.0,
            goal_radius: 0.05,
            goal_pos: Vec2::new(-0.8, 0.8),
            obstacle_pos: Vec2::new(-0.1, 0.1),
            placement: Placement::Fixed(cross(Vec2::new(0.6, -0.6), 0.15)),
        }
    }
}

impl GoToPositionConfig {
    /// Build a config from stringly-typed kwargs, falling back to defaults
    /// for anything absent.
    pub fn from_kwargs(kwargs: &KwArgs) -> Self {
        let d = Self::default();
        Self {
            n_agents: parse_kwarg(kwargs, "n_agents", d.n_agents),
            pos_shaping_factor: parse_kwarg(kwargs, "pos_shaping_factor", d.pos_shaping_factor),
            dist_shaping_factor: parse_kwarg(kwargs, "dist_shaping_factor", d.dist_shaping_factor),
            agent_radius: parse_kwarg(kwargs, "agent_radius", d.agent_radius),
            desired_distance: parse_kwarg(kwargs, "desired_distance", d.desired_distance),
            min_collision_distance: parse_kwarg(
                kwargs,
                "min_collision_distance",
                d.min_collision_distance,
            ),
            agent_collision_penalty: parse_kwarg(
                kwargs,
                "agent_collision_penalty",
                d.agent_collision_penalty,
            ),
            obstacle_collision_penalty: parse_kwarg(
                kwargs,
                "obstacle_collision_penalty",
                d.obstacle_collision_penalty,
            ),
            on_goal_bonus: parse_kwarg(kwargs, "on_goal_bonus", d.on_goal_bonus),
            goal_radius: parse_kwarg(kwargs, "goal_radius", d.goal_radius),
            goal_pos: Vec2::new(
                parse_kwarg(kwargs, "goal_x", d.goal_pos.x),
                parse_kwarg(kwargs, "goal_y", d.goal_pos.y),
            ),
            obstacle_pos: Vec2::new(
                parse_kwarg(kwargs, "obstacle_x", d.obstacle_pos.x),
                parse_kwarg(kwargs, "obstacle_y", d.obstacle_pos.y),
            ),
            placement: super::placement_from_kwargs(kwargs, d.placement),
        }
    }
}

/// Shaped progress toward a target: reward is previous scaled distance minus
/// current scaled distance. Returns the reward delta and the new buffer value.
pub fn shaped_progress(prev_shaped: f32, distance: f32, shaping_factor: f32) -> (f32, f32) {
    let shaped = distance * shaping_factor;
    (prev_shaped - shaped, shaped)
}

/// Mean squared deviation of pairwise distances from the desired spacing.
/// Symmetric under any reordering of the other agents; zero exactly when all
/// distances equal `desired`.
pub fn spacing_score(distances: &[f32], desired: f32) -> f32 {
    if distances.is_empty() {
        return 0.0;
    }
    let sum: f32 = distances.iter().map(|d| (d - desired) * (d - desired)).sum();
    sum / distances.len() as f32
}

/// Fixed penalty contributed once per distance at or below the threshold.
pub fn collision_penalty(distances: &[f32], threshold: f32, penalty: f32) -> f32 {
    distances.iter().filter(|d| **d <= threshold).count() as f32 * penalty
}

pub struct GoToPositionScenario {
    cfg: GoToPositionConfig,
    /// Previous scaled distance to goal, [agent][replica]. Valid only for
    /// the step being computed.
    prev_goal_dist: Vec<Vec<f32>>,
    /// Previous scaled spacing score, [agent][replica].
    prev_spacing: Vec<Vec<f32>>,
    /// Collective reward cache, refreshed when agent 0 is queried.
    collective: Vec<f32>,
    /// Last goal-progress term per agent (replica 0), surfaced via info.
    last_pos_rew: Vec<f32>,
}

impl GoToPositionScenario {
    pub fn new(cfg: GoToPositionConfig) -> Self {
        Self {
            cfg,
            prev_goal_dist: Vec::new(),
            prev_spacing: Vec::new(),
            collective: Vec::new(),
            last_pos_rew: Vec::new(),
        }
    }

    pub fn config(&self) -> &GoToPositionConfig { &self.cfg }

    fn goal_center_distance(&self, world: &World, agent: usize, e: usize) -> f32 {
        world.landmark_center_distance(agent, GOAL, e)
    }

    fn spacing_distances(&self, world: &World, agent: usize, e: usize) -> Vec<f32> {
        (0..world.n_agents())
            .filter(|j| *j != agent)
            .map(|j| world.agent_center_distance(agent, j, e))
            .collect()
    }

    /// Seed both shaping buffers for one replica from current positions.
    fn seed_buffers(&mut self, world: &World, e: usize) {
        for a in 0..world.n_agents() {
            self.prev_goal_dist[a][e] =
                self.goal_center_distance(world, a, e) * self.cfg.pos_shaping_factor;
            let dists = self.spacing_distances(world, a, e);
            self.prev_spacing[a][e] =
                spacing_score(&dists, self.cfg.desired_distance) * self.cfg.dist_shaping_factor;
        }
    }

    /// One agent's reward terms for one replica, updating shaping buffers.
    fn agent_reward(&mut self, world: &World, a: usize, e: usize) -> f32 {
        let cfg = &self.cfg;

        let goal_dist = self.goal_center_distance(world, a, e);
        let (mut pos_rew, shaped) =
            shaped_progress(self.prev_goal_dist[a][e], goal_dist, cfg.pos_shaping_factor);
        self.prev_goal_dist[a][e] = shaped;
        if goal_dist < cfg.goal_radius {
            pos_rew += cfg.on_goal_bonus;
        }
        if e == 0 {
            self.last_pos_rew[a] = pos_rew;
        }

        let spacing = spacing_score(&self.spacing_distances(world, a, e), cfg.desired_distance)
            * cfg.dist_shaping_factor;
        let dist_rew = self.prev_spacing[a][e] - spacing;
        self.prev_spacing[a][e] = spacing;

        let contact_dists: Vec<f32> = (0..world.n_agents())
            .filter(|j| *j != a)
            .map(|j| world.agent_distance(a, j, e))
            .collect();
        let collision_rew = collision_penalty(
            &contact_dists,
            cfg.min_collision_distance,
            cfg.agent_collision_penalty,
        );

        let obstacle_rew = if world.landmark_distance(a, OBSTACLE, e) <= cfg.min_collision_distance
        {
            cfg.obstacle_collision_penalty
        } else {
            0.0
        };

        pos_rew + dist_rew + collision_rew + obstacle_rew
    }
}

impl Scenario for GoToPositionScenario {
    fn make_world(&mut self, batch_dim: usize) -> Result<World> {
        if self.cfg.n_agents == 0 {
            return Err(SimError::InvalidConfig("n_agents must be > 0".into()));
        }
        self.cfg.placement.validate(self.cfg.n_agents)?;
        let mut world = World::new(batch_dim);

        world.add_landmark(
            Landmark::new("goal")
                .with_collide(false)
                .with_color(BLACK)
                .with_radius(self.cfg.goal_radius),
        );
        world.add_landmark(Landmark::new("obstacle").with_collide(true).with_color(RED));

        for i in 0..self.cfg.n_agents {
            world.add_agent(
                Agent::new(format!("agent{i}"))
                    .with_collide(true)
                    .with_color(GREEN)
                    .with_radius(self.cfg.agent_radius),
            );
        }

        self.prev_goal_dist = vec![vec![0.0; batch_dim]; self.cfg.n_agents];
        self.prev_spacing = vec![vec![0.0; batch_dim]; self.cfg.n_agents];
        self.collective = vec![0.0; batch_dim];
        self.last_pos_rew = vec![0.0; self.cfg.n_agents];
        Ok(world)
    }

    fn reset_world(&mut self, world: &mut World, env_index: Option<usize>, rng: &mut RngStream) {
        world.set_landmark_pos(GOAL, self.cfg.goal_pos, env_index);
        world.set_landmark_pos(OBSTACLE, self.cfg.obstacle_pos, env_index);

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

        match env_index {
            Some(e) => self.seed_buffers(world, e),
            None => {
                for e in 0..world.batch_dim() {
                    self.seed_buffers(world, e);
                }
            }
        }
    }

    fn reward(&mut self, world: &mut World, agent: usize) -> Vec<f32> {
        // The team shares one reward; recompute it when the first agent in
        // the query order asks, then serve the cached value to the rest.
        if agent == 0 {
            let batch_dim = world.batch_dim();
            let mut collective = vec![0.0; batch_dim];
            for e in 0..batch_dim {
                for a in 0..world.n_agents() {
                    collective[e] += self.agent_reward(world, a, e);
                }
            }
            self.collective = collective;
        }
        self.collective.clone()
    }

    fn observation(&self, world: &World, agent: usize) -> Vec<Vec<f32>> {
        let state = &world.agents()[agent].state;
        let goal = &world.landmarks()[GOAL].pos;
        (0..world.batch_dim())
            .map(|e| {
                vec![
                    state.pos[e].x,
                    state.pos[e].y,
                    state.vel[e].x,
                    state.vel[e].y,
                    goal[e].x,
                    goal[e].y,
                ]
            })
            .collect()
    }

    fn info(&self, _world: &World, agent: usize) -> Info {
        let mut info = Info::new();
        info.insert("pos_rew", InfoValue::from(self.last_pos_rew[agent]));
        info.insert("final_rew", InfoValue::from(0.0f32));
        info
    }
}
