//! Minimal registry system to construct environments by scenario id with an
//! associated ScenarioSpec and stringly-typed kwargs.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};

use crate::core::{Result, Scenario, SimError};
use crate::env::ScenarioEnv;
use crate::scenarios::{CohesionConfig, CohesionScenario, GoToPositionConfig, GoToPositionScenario};

/// Key-value kwargs for make_env(). Stringly-typed; scenarios parse what
/// they recognize and fall back to defaults for the rest.
pub type KwArgs = HashMap<String, String>;

/// Parse one kwarg, falling back to `default` when the key is absent or the
/// value does not parse.
pub fn parse_kwarg<T: FromStr>(kwargs: &KwArgs, key: &str, default: T) -> T {
    kwargs.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Scenario specification metadata.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenarioSpec {
    /// Unique identifier like "cohesion".
    pub id: String,
    /// Suggested max episode steps; applied as truncation by make_env.
    pub max_episode_steps: Option<u32>,
    /// Team size the scenario defaults to.
    pub default_agents: usize,
    /// Version string (free-form for now).
    pub version: Option<String>,
}

impl ScenarioSpec {
    pub fn new<S: Into<String>>(id: S, default_agents: usize) -> Self {
        Self {
            id: id.into(),
            max_episode_steps: Some(100),
            default_agents,
            version: None,
        }
    }
}

/// Factory closure type for constructing scenarios with kwargs.
pub type FactoryFn = Box<dyn Fn(&KwArgs) -> Box<dyn Scenario> + Send + Sync>;

#[derive(Default)]
struct RegistryInner {
    specs: HashMap<String, ScenarioSpec>,
    factories: HashMap<String, FactoryFn>,
}

struct Registry {
    inner: RwLock<RegistryInner>,
}

impl Registry {
    fn new() -> Self { Self { inner: RwLock::new(RegistryInner::default()) } }

    fn register(&self, spec: ScenarioSpec, factory: FactoryFn) -> Result<()> {
        let mut g = self
            .inner
            .write()
            .map_err(|_| SimError::Other("registry poisoned".into()))?;
        if g.specs.contains_key(&spec.id) {
            return Err(SimError::Other(format!("Scenario id already registered: {}", spec.id)));
        }
        g.factories.insert(spec.id.clone(), factory);
        g.specs.insert(spec.id.clone(), spec);
        Ok(())
    }

    fn register_if_absent(&self, spec: ScenarioSpec, factory: FactoryFn) -> Result<()> {
        let mut g = self
            .inner
            .write()
            .map_err(|_| SimError::Other("registry poisoned".into()))?;
        if !g.specs.contains_key(&spec.id) {
            g.factories.insert(spec.id.clone(), factory);
            g.specs.insert(spec.id.clone(), spec);
        }
        Ok(())
    }

    fn get_spec(&self, id: &str) -> Option<ScenarioSpec> {
        let g = self.inner.read().ok()?;
        g.specs.get(id).cloned()
    }

    fn make_scenario(&self, id: &str, kwargs: &KwArgs) -> Result<Box<dyn Scenario>> {
        let guard = self
            .inner
            .read()
            .map_err(|_| SimError::Other("registry poisoned".into()))?;
        match guard.factories.get(id) {
            Some(f) => Ok((f)(kwargs)),
            None => Err(SimError::Other(format!("Unknown scenario id: {}", id))),
        }
    }
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Register a scenario spec and its factory globally.
pub fn register(spec: ScenarioSpec, factory: FactoryFn) -> Result<()> {
    registry().register(spec, factory)
}

/// Fetch a registered ScenarioSpec by id.
pub fn get_spec(id: &str) -> Option<ScenarioSpec> {
    registry().get_spec(id)
}

/// Construct a boxed scenario by id with kwargs.
pub fn make_scenario<S: AsRef<str>>(id: S, kwargs: &KwArgs) -> Result<Box<dyn Scenario>> {
    registry().make_scenario(id.as_ref(), kwargs)
}

/// Construct a ready-to-step environment by scenario id. The spec's
/// max_episode_steps (overridable via the "max_steps" kwarg) becomes the
/// env's truncation limit.
pub fn make_env<S: AsRef<str>>(
    id: S,
    num_envs: usize,
    seed: Option<u64>,
    continuous_actions: bool,
    kwargs: &KwArgs,
) -> Result<ScenarioEnv<Box<dyn Scenario>>> {
    let id = id.as_ref();
    let spec = get_spec(id).ok_or_else(|| SimError::Other(format!("Unknown scenario id: {id}")))?;
    let scenario = make_scenario(id, kwargs)?;
    let mut env = ScenarioEnv::new(scenario, num_envs, seed, continuous_actions)?;
    let max_steps = kwargs
        .get("max_steps")
        .and_then(|v| v.parse().ok())
        .or(spec.max_episode_steps);
    if let Some(m) = max_steps {
        env = env.with_max_steps(m);
    }
    Ok(env)
}

/// Register the built-in scenarios. Safe to call more than once.
pub fn register_builtin() -> Result<()> {
    let r = registry();
    r.register_if_absent(
        ScenarioSpec::new("go_to_position", GoToPositionConfig::default().n_agents),
        Box::new(|kwargs: &KwArgs| {
            Box::new(GoToPositionScenario::new(GoToPositionConfig::from_kwargs(kwargs)))
                as Box<dyn Scenario>
        }),
    )?;
    r.register_if_absent(
        ScenarioSpec::new("cohesion", CohesionConfig::default().n_agents),
        Box::new(|kwargs: &KwArgs| {
            Box::new(CohesionScenario::new(CohesionConfig::from_kwargs(kwargs)))
                as Box<dyn Scenario>
        }),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Action;

    #[test]
    fn parse_kwarg_falls_back_on_missing_or_bad_values() {
        let mut kwargs = KwArgs::new();
        kwargs.insert("n_agents".into(), "7".into());
        kwargs.insert("sigma".into(), "not-a-number".into());
        assert_eq!(parse_kwarg(&kwargs, "n_agents", 5usize), 7);
        assert_eq!(parse_kwarg(&kwargs, "sigma", 0.15f32), 0.15);
        assert_eq!(parse_kwarg(&kwargs, "absent", 3u32), 3);
    }

    #[test]
    fn register_and_make_builtin_env() {
        register_builtin().expect("register ok");
        // Idempotent.
        register_builtin().expect("second register ok");

        let spec = get_spec("cohesion").expect("spec exists");
        assert_eq!(spec.default_agents, 9);

        let mut kwargs = KwArgs::new();
        kwargs.insert("n_agents".into(), "4".into());
        kwargs.insert("placement".into(), "circle".into());
        let mut env =
            make_env("cohesion", 2, Some(0), false, &kwargs).expect("make ok");
        assert_eq!(env.n_agents(), 4);
        assert_eq!(env.batch_dim(), 2);
        let actions = vec![Action::Discrete(vec![0, 0]); 4];
        let s = env.step(actions).expect("step ok");
        assert_eq!(s.rewards.len(), 4);
    }

    #[test]
    fn oversized_team_kwarg_is_rejected() {
        register_builtin().unwrap();
        // 7 agents cannot fit the default 5-slot cross formation; the config
        // error must surface through make_env, not degrade the reset.
        let mut kwargs = KwArgs::new();
        kwargs.insert("n_agents".into(), "7".into());
        let err = make_env("go_to_position", 1, Some(0), false, &kwargs);
        assert!(matches!(err, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn unknown_scenario_is_an_error() {
        register_builtin().unwrap();
        assert!(make_env("nope", 1, None, false, &KwArgs::new()).is_err());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        register_builtin().unwrap();
        let err = register(
            ScenarioSpec::new("cohesion", 9),
            Box::new(|kwargs: &KwArgs| {
                Box::new(CohesionScenario::new(CohesionConfig::from_kwargs(kwargs)))
                    as Box<dyn Scenario>
            }),
        );
        assert!(err.is_err());
    }
}
