//! The vectorized environment wrapping a scenario: action mapping, world
//! stepping, reward/observation assembly, truncation, and rendering.

use crate::core::{MultiStep, RenderFrame, Result, Scenario, SimError};
use crate::spaces::{BoxSpace, Discrete};
use crate::utils::render2d::{BLACK, Canvas, world_to_pixels, world_to_screen};
use crate::utils::rng::{RngStream, SeedSequence};
use crate::world::{Vec2, World};

/// Number of discrete controls: stay, -x, +x, -y, +y.
pub const DISCRETE_ACTIONS: u32 = 5;

/// One agent's action across all replicas.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// One force per replica; clamped per axis to the agent's u_range.
    Continuous(Vec<Vec2>),
    /// One control index per replica in [0, DISCRETE_ACTIONS).
    Discrete(Vec<u32>),
}

/// Synchronous vectorized environment: one world, `batch_dim` replicas, all
/// stepped together through the scenario callbacks.
pub struct ScenarioEnv<S: Scenario> {
    scenario: S,
    world: World,
    /// Root seed expander; every RNG stream the env hands out is a sub-stream
    /// of this, so single-replica resets stay reproducible under the seed.
    seeds: SeedSequence,
    rng: RngStream,
    continuous_actions: bool,
    max_steps: Option<u32>,
    steps: u32,
    render_enabled: bool,
    render_size: u32,
}

impl<S: Scenario> ScenarioEnv<S> {
    /// Build the world via the scenario and perform the initial full reset.
    pub fn new(
        mut scenario: S,
        batch_dim: usize,
        seed: Option<u64>,
        continuous_actions: bool,
    ) -> Result<Self> {
        if batch_dim == 0 {
            return Err(SimError::InvalidConfig("batch_dim must be > 0".into()));
        }
        let mut world = scenario.make_world(batch_dim)?;
        let mut seeds = SeedSequence::new(seed.unwrap_or(42));
        let mut rng = seeds.next_rng();
        scenario.reset_world(&mut world, None, &mut rng);
        Ok(Self {
            scenario,
            world,
            seeds,
            rng,
            continuous_actions,
            max_steps: None,
            steps: 0,
            render_enabled: false,
            render_size: 400,
        })
    }

    /// Truncate every replica after this many steps.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Enable top-down rendering of replica 0.
    pub fn with_render(mut self, side: u32) -> Self {
        self.render_enabled = true;
        self.render_size = side;
        self
    }

    pub fn set_render(&mut self, enabled: bool) { self.render_enabled = enabled; }
    pub fn render_enabled(&self) -> bool { self.render_enabled }

    pub fn world(&self) -> &World { &self.world }
    pub fn batch_dim(&self) -> usize { self.world.batch_dim() }
    pub fn n_agents(&self) -> usize { self.world.n_agents() }
    pub fn continuous_actions(&self) -> bool { self.continuous_actions }

    pub fn agent_names(&self) -> Vec<&str> {
        self.world.agents().iter().map(|a| a.name.as_str()).collect()
    }

    /// The planar control box for one agent.
    pub fn continuous_action_space(&self, agent: usize) -> BoxSpace<f32, 2> {
        BoxSpace::control(self.world.agents()[agent].u_range)
    }

    /// The 5-way discrete control space shared by all agents.
    pub fn discrete_action_space(&self) -> Discrete {
        Discrete::new(DISCRETE_ACTIONS)
    }

    /// Reset every replica. A provided seed re-seeds the RNG stream first.
    /// Returns per-agent batched observations.
    pub fn reset(&mut self, seed: Option<u64>) -> Vec<Vec<Vec<f32>>> {
        if let Some(s) = seed {
            self.seeds = SeedSequence::new(s);
            self.rng = self.seeds.next_rng();
        }
        self.steps = 0;
        self.scenario.reset_world(&mut self.world, None, &mut self.rng);
        self.observations()
    }

    /// Reset a single replica, leaving the others untouched. Returns that
    /// replica's observation per agent.
    pub fn reset_at(&mut self, env_index: usize) -> Result<Vec<Vec<f32>>> {
        if env_index >= self.world.batch_dim() {
            return Err(SimError::Other(format!(
                "env_index {} out of range for batch_dim {}",
                env_index,
                self.world.batch_dim()
            )));
        }
        // Each single-replica reset draws its own sub-stream from the root
        // seed, leaving the full-reset stream untouched.
        let mut rng = self.seeds.next_rng();
        self.scenario.reset_world(&mut self.world, Some(env_index), &mut rng);
        Ok((0..self.world.n_agents())
            .map(|a| self.scenario.observation(&self.world, a)[env_index].clone())
            .collect())
    }

    fn observations(&self) -> Vec<Vec<Vec<f32>>> {
        (0..self.world.n_agents())
            .map(|a| self.scenario.observation(&self.world, a))
            .collect()
    }

    fn discrete_force(control: u32, u_range: f32) -> Result<Vec2> {
        match control {
            0 => Ok(Vec2::ZERO),
            1 => Ok(Vec2::new(-u_range, 0.0)),
            2 => Ok(Vec2::new(u_range, 0.0)),
            3 => Ok(Vec2::new(0.0, -u_range)),
            4 => Ok(Vec2::new(0.0, u_range)),
            other => Err(SimError::InvalidAction(format!(
                "discrete control {other} out of range (< {DISCRETE_ACTIONS})"
            ))),
        }
    }

    fn forces_from_actions(&self, actions: &[Action]) -> Result<Vec<Vec<Vec2>>> {
        let batch_dim = self.world.batch_dim();
        actions
            .iter()
            .zip(self.world.agents())
            .map(|(action, agent)| match (action, self.continuous_actions) {
                (Action::Continuous(f), true) => {
                    if f.len() != batch_dim {
                        return Err(SimError::InvalidAction(format!(
                            "agent {}: expected {} replicas, got {}",
                            agent.name,
                            batch_dim,
                            f.len()
                        )));
                    }
                    Ok(f.clone())
                }
                (Action::Discrete(a), false) => {
                    if a.len() != batch_dim {
                        return Err(SimError::InvalidAction(format!(
                            "agent {}: expected {} replicas, got {}",
                            agent.name,
                            batch_dim,
                            a.len()
                        )));
                    }
                    a.iter()
                        .map(|c| Self::discrete_force(*c, agent.u_range))
                        .collect()
                }
                (Action::Continuous(_), false) => Err(SimError::InvalidAction(format!(
                    "agent {}: env expects discrete actions",
                    agent.name
                ))),
                (Action::Discrete(_), true) => Err(SimError::InvalidAction(format!(
                    "agent {}: env expects continuous actions",
                    agent.name
                ))),
            })
            .collect()
    }

    /// Advance every replica by one step: apply actions, then query the
    /// scenario for rewards (agent order preserved), observations, done and
    /// info. Reaching `max_steps` reports truncation for every replica.
    pub fn step(&mut self, actions: Vec<Action>) -> Result<MultiStep> {
        if actions.len() != self.world.n_agents() {
            return Err(SimError::InvalidAction(format!(
                "expected actions for {} agents, got {}",
                self.world.n_agents(),
                actions.len()
            )));
        }
        let forces = self.forces_from_actions(&actions)?;
        self.world.step(&forces)?;
        self.steps += 1;

        let n = self.world.n_agents();
        let rewards: Vec<Vec<f32>> = (0..n)
            .map(|a| self.scenario.reward(&mut self.world, a))
            .collect();
        let observations = self.observations();
        let terminated = self.scenario.done(&self.world);
        let truncated = match self.max_steps {
            Some(m) if self.steps >= m => vec![true; self.world.batch_dim()],
            _ => vec![false; self.world.batch_dim()],
        };
        let infos = (0..n).map(|a| self.scenario.info(&self.world, a)).collect();

        Ok(MultiStep { observations, rewards, terminated, truncated, infos })
    }

    /// Top-down view of replica 0: landmarks first, then agents with a
    /// velocity whisker. Errors unless rendering was enabled.
    pub fn render(&self) -> Result<RenderFrame> {
        if !self.render_enabled {
            return Err(SimError::NotSupported(
                "rendering is disabled; enable it before rendering".into(),
            ));
        }
        let side = self.render_size.max(64);
        let semidim = self.world.semidim() * 1.1; // small margin around the arena
        let mut canvas = Canvas::new(side, side);

        for landmark in self.world.landmarks() {
            let (x, y) = world_to_screen(landmark.pos[0].x, landmark.pos[0].y, semidim, side);
            let r = world_to_pixels(landmark.radius, semidim, side).max(2);
            canvas.fill_circle(x, y, r, landmark.color);
        }
        for agent in self.world.agents() {
            let pos = agent.state.pos[0];
            let vel = agent.state.vel[0];
            let (x, y) = world_to_screen(pos.x, pos.y, semidim, side);
            let r = world_to_pixels(agent.radius, semidim, side).max(2);
            canvas.fill_circle(x, y, r, agent.color);
            let tip = pos + vel * 0.5;
            let (tx, ty) = world_to_screen(tip.x, tip.y, semidim, side);
            canvas.draw_line(x, y, tx, ty, BLACK);
        }
        Ok(canvas.into_render_frame())
    }
}
