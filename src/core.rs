// Core types and the scenario callback contract.

use crate::utils::rng::RngStream;
use crate::world::World;

/// A minimal, serde-friendly info map (without pulling serde as a dependency).
/// Scenarios use it to expose per-agent diagnostics such as reward terms.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Info {
    entries: Vec<(String, InfoValue)>,
}

impl Info {
    /// Create an empty Info map.
    pub fn new() -> Self { Self { entries: Vec::new() } }

    /// Insert or replace a key with the given value.
    pub fn insert<K: Into<String>>(&mut self, key: K, value: InfoValue) {
        let k = key.into();
        if let Some((_, v)) = self.entries.iter_mut().find(|(kk, _)| kk == &k) {
            *v = value;
        } else {
            self.entries.push((k, value));
        }
    }

    /// Get a reference to a value by key.
    pub fn get(&self, key: &str) -> Option<&InfoValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterate over entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InfoValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Number of entries.
    pub fn len(&self) -> usize { self.entries.len() }
}

/// A small set of value types commonly used in info maps.
#[derive(Clone, Debug, PartialEq)]
pub enum InfoValue {
    Bool(bool),
    I64(i64),
    F64(f64),
    Str(String),
}

impl From<bool> for InfoValue { fn from(v: bool) -> Self { InfoValue::Bool(v) } }
impl From<i64> for InfoValue { fn from(v: i64) -> Self { InfoValue::I64(v) } }
impl From<i32> for InfoValue { fn from(v: i32) -> Self { InfoValue::I64(v as i64) } }
impl From<f64> for InfoValue { fn from(v: f64) -> Self { InfoValue::F64(v) } }
impl From<f32> for InfoValue { fn from(v: f32) -> Self { InfoValue::F64(v as f64) } }
impl From<&str> for InfoValue { fn from(v: &str) -> Self { InfoValue::Str(v.to_string()) } }
impl From<String> for InfoValue { fn from(v: String) -> Self { InfoValue::Str(v) } }

/// A frame returned by `ScenarioEnv::render`.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderFrame {
    /// Textual representation of a frame (e.g., a debug string).
    Text(String),
    /// Raw pixel buffer in row-major RGB or RGBA format.
    Pixels {
        width: u32,
        height: u32,
        /// Pixel data. Convention: RGB uses 3 bytes per pixel, RGBA uses 4.
        data: Vec<u8>,
    },
}

/// Recoverable errors across the simulator APIs.
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Environment not ready: {0}")]
    NotReady(String),
    #[error("Operation not supported: {0}")]
    NotSupported(String),
    #[error("Other error: {0}")]
    Other(String),
}

/// Convenience alias for results using SimError.
pub type Result<T> = std::result::Result<T, SimError>;

/// The result of stepping every agent across every parallel replica.
///
/// Observations and rewards are indexed agent-first: `observations[a][e]` is
/// the flat feature vector for agent `a` in replica `e`, and `rewards[a][e]`
/// the matching scalar. `terminated` and `truncated` are per replica.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiStep {
    pub observations: Vec<Vec<Vec<f32>>>,
    pub rewards: Vec<Vec<f32>>,
    pub terminated: Vec<bool>,
    pub truncated: Vec<bool>,
    pub infos: Vec<Info>,
}

/// The scenario callback contract consumed by [`crate::env::ScenarioEnv`].
///
/// A scenario decides what the world contains, where everything starts each
/// episode, and how rewards and observations are assembled. It owns any
/// transient shaping state (e.g., previous distances used for frame-to-frame
/// reward deltas); such state is only valid for the current step.
pub trait Scenario {
    /// Construct the world for `batch_dim` parallel replicas.
    fn make_world(&mut self, batch_dim: usize) -> Result<World>;

    /// Reset every replica, or exactly the one named by `env_index`.
    /// Implementations reseed their shaping buffers here as well.
    fn reset_world(&mut self, world: &mut World, env_index: Option<usize>, rng: &mut RngStream);

    /// Per-replica reward for one agent. Called once per agent per step, in
    /// agent order. May update scenario-owned shaping state as a side effect.
    fn reward(&mut self, world: &mut World, agent: usize) -> Vec<f32>;

    /// Per-replica flat observation vector for one agent.
    fn observation(&self, world: &World, agent: usize) -> Vec<Vec<f32>>;

    /// Per-replica termination flags. Episodes in this crate never terminate
    /// early; time limits are reported as truncation by the env instead.
    fn done(&self, world: &World) -> Vec<bool> {
        vec![false; world.batch_dim()]
    }

    /// Per-agent diagnostics for the current step.
    fn info(&self, _world: &World, _agent: usize) -> Info {
        Info::new()
    }
}

impl Scenario for Box<dyn Scenario> {
    fn make_world(&mut self, batch_dim: usize) -> Result<World> {
        (**self).make_world(batch_dim)
    }
    fn reset_world(&mut self, world: &mut World, env_index: Option<usize>, rng: &mut RngStream) {
        (**self).reset_world(world, env_index, rng)
    }
    fn reward(&mut self, world: &mut World, agent: usize) -> Vec<f32> {
        (**self).reward(world, agent)
    }
    fn observation(&self, world: &World, agent: usize) -> Vec<Vec<f32>> {
        (**self).observation(world, agent)
    }
    fn done(&self, world: &World) -> Vec<bool> {
        (**self).done(world)
    }
    fn info(&self, world: &World, agent: usize) -> Info {
        (**self).info(world, agent)
    }
}
