pub mod core;
pub mod env;
pub mod policy;
pub mod registry;
pub mod scenarios;
pub mod spaces;
pub mod utils;
pub mod world;

pub use crate::core::{Info, InfoValue, MultiStep, RenderFrame, Result, Scenario, SimError};
pub use crate::env::{Action, DISCRETE_ACTIONS, ScenarioEnv};
pub use crate::policy::{ConstantPolicy, Policy, RandomPolicy};
pub use crate::registry::{KwArgs, ScenarioSpec, make_env, make_scenario, register, register_builtin};
pub use crate::scenarios::{
    CohesionConfig, CohesionScenario, GoToPositionConfig, GoToPositionScenario, Placement,
};
pub use crate::spaces::{BoxSpace, Discrete, MultiDiscrete, Space};
pub use crate::utils::{encode_png, save_frames, save_png};
pub use crate::world::{Agent, Landmark, Vec2, World};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::rng::rng_from_seed;

    /// A tiny scenario to validate the callback contract end to end: one
    /// agent chasing the origin, reward = -distance.
    struct HomingScenario;

    impl Scenario for HomingScenario {
        fn make_world(&mut self, batch_dim: usize) -> Result<World> {
            let mut world = World::new(batch_dim);
            world.add_agent(Agent::new("agent0"));
            Ok(world)
        }

        fn reset_world(
            &mut self,
            world: &mut World,
            env_index: Option<usize>,
            _rng: &mut crate::utils::rng::RngStream,
        ) {
            world.set_agent_pos(0, Vec2::new(0.5, 0.5), env_index);
        }

        fn reward(&mut self, world: &mut World, agent: usize) -> Vec<f32> {
            let state = &world.agents()[agent].state;
            state.pos.iter().map(|p| -p.norm()).collect()
        }

        fn observation(&self, world: &World, agent: usize) -> Vec<Vec<f32>> {
            let state = &world.agents()[agent].state;
            (0..world.batch_dim())
                .map(|e| vec![state.pos[e].x, state.pos[e].y])
                .collect()
        }
    }

    #[test]
    fn custom_scenario_runs_through_the_env() {
        let mut env = ScenarioEnv::new(HomingScenario, 2, Some(0), true).unwrap();
        let obs = env.reset(Some(0));
        assert_eq!(obs[0][0], vec![0.5, 0.5]);

        // Push toward the origin; reward improves monotonically.
        let mut last = f32::NEG_INFINITY;
        for _ in 0..5 {
            let push = vec![Action::Continuous(vec![Vec2::new(-1.0, -1.0); 2])];
            let s = env.step(push).unwrap();
            assert!(s.rewards[0][0] > last);
            last = s.rewards[0][0];
            assert!(s.terminated.iter().all(|d| !d));
        }
    }

    #[test]
    fn builtin_scenarios_build_and_step() {
        register_builtin().unwrap();
        for id in ["go_to_position", "cohesion"] {
            let mut env = make_env(id, 2, Some(3), true, &KwArgs::new()).unwrap();
            let n = env.n_agents();
            let actions =
                vec![Action::Continuous(vec![Vec2::new(0.1, -0.1); 2]); n];
            let s = env.step(actions).unwrap();
            assert_eq!(s.observations.len(), n);
            assert_eq!(s.rewards.len(), n);
            assert_eq!(s.terminated, vec![false, false]);
        }
    }

    #[test]
    fn spaces_sample_within_bounds() {
        let mut rng = rng_from_seed(42);
        let d = Discrete::new(DISCRETE_ACTIONS);
        for _ in 0..100 {
            let v = d.sample(&mut rng);
            assert!(d.contains(&v));
        }

        let b = BoxSpace::control(1.0);
        for _ in 0..100 {
            let v = b.sample(&mut rng);
            assert!(b.contains(&v));
        }

        let md = MultiDiscrete::joint(4, DISCRETE_ACTIONS);
        for _ in 0..50 {
            let v = md.sample(&mut rng);
            assert!(md.contains(&v));
            assert_eq!(v.len(), 4);
        }
    }

    #[test]
    fn render_frame_encodes_under_the_image_feature() {
        register_builtin().unwrap();
        let mut env = make_env("cohesion", 1, Some(0), false, &KwArgs::new()).unwrap();
        env.set_render(true);
        let frame = env.render().unwrap();

        #[cfg(feature = "image")]
        {
            let bytes = encode_png(&frame).expect("PNG encoding should succeed");
            assert_eq!(&bytes[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
        }
        #[cfg(not(feature = "image"))]
        {
            let err = encode_png(&frame).unwrap_err();
            assert!(matches!(err, SimError::NotSupported(_)));
        }
    }
}
