//! Batched 2D world: entities with one state slot per parallel replica.
//!
//! Replicas share nothing but the batched arrays; there is no logical state
//! spanning them. The integrator is deliberately minimal: holonomic point
//! agents driven by clamped forces, no collision response, no rotation.

use crate::core::{Result, SimError};
use crate::utils::render2d::{Color, BLACK, GREEN};

/// A plain 2D vector. Observation payloads stay flat `f32` slices; optional
/// nalgebra/ndarray conversions live in `spaces::interop`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self { Self { x, y } }

    /// Euclidean norm.
    pub fn norm(self) -> f32 { (self.x * self.x + self.y * self.y).sqrt() }

    /// Distance to another point.
    pub fn dist(self, other: Vec2) -> f32 { (self - other).norm() }

    /// Dot product.
    pub fn dot(self, other: Vec2) -> f32 { self.x * other.x + self.y * other.y }

    /// Clamp the vector's length to `max`, preserving direction.
    pub fn clamp_norm(self, max: f32) -> Vec2 {
        let n = self.norm();
        if n > max && n > 0.0 { self * (max / n) } else { self }
    }

    /// Clamp each component into [-bound, bound].
    pub fn clamp_components(self, bound: f32) -> Vec2 {
        Vec2::new(self.x.clamp(-bound, bound), self.y.clamp(-bound, bound))
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 { Vec2::new(self.x + rhs.x, self.y + rhs.y) }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 { Vec2::new(self.x - rhs.x, self.y - rhs.y) }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 { Vec2::new(self.x * rhs, self.y * rhs) }
}

/// Per-replica position and velocity for one entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchState {
    pub pos: Vec<Vec2>,
    pub vel: Vec<Vec2>,
}

impl BatchState {
    fn zeros(batch_dim: usize) -> Self {
        Self { pos: vec![Vec2::ZERO; batch_dim], vel: vec![Vec2::ZERO; batch_dim] }
    }
}

/// A controllable disc-shaped entity.
#[derive(Clone, Debug)]
pub struct Agent {
    pub name: String,
    pub radius: f32,
    pub mass: f32,
    pub collide: bool,
    pub color: Color,
    /// Maximum per-axis control magnitude.
    pub u_range: f32,
    pub max_speed: f32,
    pub state: BatchState,
}

impl Agent {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            radius: 0.05,
            mass: 1.0,
            collide: true,
            color: GREEN,
            u_range: 1.0,
            max_speed: 0.5,
            state: BatchState::default(),
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self { self.radius = radius; self }
    pub fn with_color(mut self, color: Color) -> Self { self.color = color; self }
    pub fn with_collide(mut self, collide: bool) -> Self { self.collide = collide; self }
    pub fn with_u_range(mut self, u_range: f32) -> Self { self.u_range = u_range; self }
    pub fn with_max_speed(mut self, max_speed: f32) -> Self { self.max_speed = max_speed; self }
}

/// A static disc-shaped entity (goal or obstacle).
#[derive(Clone, Debug)]
pub struct Landmark {
    pub name: String,
    pub radius: f32,
    pub collide: bool,
    pub color: Color,
    pub pos: Vec<Vec2>,
}

impl Landmark {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            radius: 0.05,
            collide: false,
            color: BLACK,
            pos: Vec::new(),
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self { self.radius = radius; self }
    pub fn with_color(mut self, color: Color) -> Self { self.color = color; self }
    pub fn with_collide(mut self, collide: bool) -> Self { self.collide = collide; self }
}

/// The batched world: all entities across all parallel replicas.
#[derive(Clone, Debug)]
pub struct World {
    batch_dim: usize,
    dt: f32,
    drag: f32,
    semidim: f32,
    agents: Vec<Agent>,
    landmarks: Vec<Landmark>,
}

impl World {
    pub fn new(batch_dim: usize) -> Self {
        Self {
            batch_dim,
            dt: 0.1,
            drag: 0.25,
            semidim: 1.0,
            agents: Vec::new(),
            landmarks: Vec::new(),
        }
    }

    pub fn batch_dim(&self) -> usize { self.batch_dim }
    pub fn dt(&self) -> f32 { self.dt }
    pub fn semidim(&self) -> f32 { self.semidim }

    pub fn agents(&self) -> &[Agent] { &self.agents }
    pub fn agents_mut(&mut self) -> &mut [Agent] { &mut self.agents }
    pub fn landmarks(&self) -> &[Landmark] { &self.landmarks }
    pub fn n_agents(&self) -> usize { self.agents.len() }

    /// Add an agent; its batched state is sized to this world.
    pub fn add_agent(&mut self, mut agent: Agent) {
        agent.state = BatchState::zeros(self.batch_dim);
        self.agents.push(agent);
    }

    /// Add a landmark; its batched position is sized to this world.
    pub fn add_landmark(&mut self, mut landmark: Landmark) {
        landmark.pos = vec![Vec2::ZERO; self.batch_dim];
        self.landmarks.push(landmark);
    }

    /// Set an agent's position in one replica, or in all when `env_index` is
    /// None. Velocity is zeroed alongside.
    pub fn set_agent_pos(&mut self, agent: usize, pos: Vec2, env_index: Option<usize>) {
        let state = &mut self.agents[agent].state;
        match env_index {
            Some(e) => {
                state.pos[e] = pos;
                state.vel[e] = Vec2::ZERO;
            }
            None => {
                for e in 0..state.pos.len() {
                    state.pos[e] = pos;
                    state.vel[e] = Vec2::ZERO;
                }
            }
        }
    }

    /// Set a landmark's position in one replica, or in all when None.
    pub fn set_landmark_pos(&mut self, landmark: usize, pos: Vec2, env_index: Option<usize>) {
        let slots = &mut self.landmarks[landmark].pos;
        match env_index {
            Some(e) => slots[e] = pos,
            None => {
                for p in slots.iter_mut() {
                    *p = pos;
                }
            }
        }
    }

    /// Center distance between two agents in one replica.
    pub fn agent_center_distance(&self, a: usize, b: usize, env_index: usize) -> f32 {
        self.agents[a].state.pos[env_index].dist(self.agents[b].state.pos[env_index])
    }

    /// Surface distance between two agents (center distance minus both
    /// radii). Negative values mean overlap.
    pub fn agent_distance(&self, a: usize, b: usize, env_index: usize) -> f32 {
        self.agent_center_distance(a, b, env_index) - self.agents[a].radius - self.agents[b].radius
    }

    /// Center distance between an agent and a landmark in one replica.
    pub fn landmark_center_distance(&self, agent: usize, landmark: usize, env_index: usize) -> f32 {
        self.agents[agent].state.pos[env_index].dist(self.landmarks[landmark].pos[env_index])
    }

    /// Surface distance between an agent and a landmark.
    pub fn landmark_distance(&self, agent: usize, landmark: usize, env_index: usize) -> f32 {
        self.landmark_center_distance(agent, landmark, env_index)
            - self.agents[agent].radius
            - self.landmarks[landmark].radius
    }

    /// Advance every replica by one step under the given forces.
    ///
    /// `forces[a][e]` drives agent `a` in replica `e`. Forces are clamped per
    /// axis to the agent's `u_range`, velocities decay with linear drag and
    /// are clamped to `max_speed`, positions stay inside the world square.
    /// Landmarks are static.
    pub fn step(&mut self, forces: &[Vec<Vec2>]) -> Result<()> {
        if forces.len() != self.agents.len() {
            return Err(SimError::InvalidAction(format!(
                "expected forces for {} agents, got {}",
                self.agents.len(),
                forces.len()
            )));
        }
        for (agent, f) in self.agents.iter_mut().zip(forces.iter()) {
            if f.len() != self.batch_dim {
                return Err(SimError::InvalidAction(format!(
                    "agent {}: expected {} force slots, got {}",
                    agent.name,
                    self.batch_dim,
                    f.len()
                )));
            }
            for e in 0..self.batch_dim {
                let force = f[e].clamp_components(agent.u_range);
                let mut vel =
                    (agent.state.vel[e] + force * (self.dt / agent.mass)) * (1.0 - self.drag);
                vel = vel.clamp_norm(agent.max_speed);
                let pos = (agent.state.pos[e] + vel * self.dt).clamp_components(self.semidim);
                agent.state.vel[e] = vel;
                agent.state.pos[e] = pos;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_agent_world(batch_dim: usize) -> World {
        let mut w = World::new(batch_dim);
        w.add_agent(Agent::new("a0").with_radius(0.1));
        w.add_agent(Agent::new("a1").with_radius(0.1));
        w
    }

    #[test]
    fn set_pos_all_replicas_or_one() {
        let mut w = two_agent_world(3);
        w.set_agent_pos(0, Vec2::new(0.5, -0.5), None);
        assert!(w.agents()[0].state.pos.iter().all(|p| *p == Vec2::new(0.5, -0.5)));

        w.set_agent_pos(0, Vec2::new(-0.2, 0.2), Some(1));
        assert_eq!(w.agents()[0].state.pos[0], Vec2::new(0.5, -0.5));
        assert_eq!(w.agents()[0].state.pos[1], Vec2::new(-0.2, 0.2));
        assert_eq!(w.agents()[0].state.pos[2], Vec2::new(0.5, -0.5));
    }

    #[test]
    fn surface_distance_subtracts_radii() {
        let mut w = two_agent_world(1);
        w.set_agent_pos(0, Vec2::new(0.0, 0.0), None);
        w.set_agent_pos(1, Vec2::new(0.5, 0.0), None);
        assert!((w.agent_center_distance(0, 1, 0) - 0.5).abs() < 1e-6);
        assert!((w.agent_distance(0, 1, 0) - 0.3).abs() < 1e-6);

        // Overlapping discs report a negative surface distance.
        w.set_agent_pos(1, Vec2::new(0.05, 0.0), None);
        assert!(w.agent_distance(0, 1, 0) < 0.0);
    }

    #[test]
    fn step_clamps_force_speed_and_bounds() {
        let mut w = two_agent_world(1);
        w.set_agent_pos(0, Vec2::new(0.9, 0.0), None);
        let forces = vec![vec![Vec2::new(1e3, 0.0)]; 2];
        for _ in 0..100 {
            w.step(&forces).unwrap();
            let a = &w.agents()[0];
            assert!(a.state.vel[0].norm() <= a.max_speed + 1e-6);
            assert!(a.state.pos[0].x <= w.semidim());
        }
        // Driven hard toward the wall, the agent ends pinned at the boundary.
        assert!((w.agents()[0].state.pos[0].x - w.semidim()).abs() < 1e-6);
    }

    #[test]
    fn step_rejects_wrong_arity() {
        let mut w = two_agent_world(2);
        assert!(w.step(&[vec![Vec2::ZERO; 2]]).is_err());
        assert!(w.step(&[vec![Vec2::ZERO; 1], vec![Vec2::ZERO; 2]]).is_err());
    }

    #[test]
    fn landmarks_do_not_move() {
        let mut w = two_agent_world(1);
        w.add_landmark(Landmark::new("goal"));
        w.set_landmark_pos(0, Vec2::new(-0.8, 0.8), None);
        w.step(&[vec![Vec2::new(1.0, 1.0)], vec![Vec2::new(1.0, 1.0)]]).unwrap();
        assert_eq!(w.landmarks()[0].pos[0], Vec2::new(-0.8, 0.8));
    }
}
