//! Rollout driver: build a registered scenario env, roll it with a heuristic
//! or random policy, and optionally render the episode.
//!
//! Usage:
//!   cargo run --example run_scenario -- [scenario] [--random] [--render]
//!       [--save] [--window]
//!
//! `--save` writes the rendered frames as a PNG sequence (needs the `image`
//! feature and `--render`); `--window` opens a live minifb view.

use std::time::Instant;

use minifb::{Key, Window, WindowOptions};
use rust_swarmsim::{
    Action, ConstantPolicy, KwArgs, Policy, RandomPolicy, RenderFrame, register_builtin,
    registry::make_env, save_frames,
};

fn rgba_to_u32(a: u8, r: u8, g: u8, b: u8) -> u32 {
    // Minifb expects ARGB on most platforms; construct accordingly.
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

fn main() -> rust_swarmsim::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let scenario_name = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .unwrap_or_else(|| "cohesion".to_string());
    let random_action = args.iter().any(|a| a == "--random");
    let render = args.iter().any(|a| a == "--render" || a == "--window");
    let save_render = args.iter().any(|a| a == "--save");
    let window_view = args.iter().any(|a| a == "--window");

    assert!(!(save_render && !render), "To save the rollout you have to render it");

    let num_envs = 4;
    let n_steps = 100;
    let continuous_actions = false;
    let seed = Some(0);

    register_builtin()?;
    let mut kwargs = KwArgs::new();
    kwargs.insert("max_steps".into(), n_steps.to_string());
    let mut env = make_env(&scenario_name, num_envs, seed, continuous_actions, &kwargs)?;
    env.set_render(render);

    let mut policy: Box<dyn Policy> = if random_action {
        Box::new(RandomPolicy::new(0))
    } else {
        Box::new(ConstantPolicy)
    };

    let mut obs = env.reset(seed);
    let mut returns = vec![0.0f32; env.n_agents()];
    let mut frames: Vec<RenderFrame> = Vec::new();
    let start = Instant::now();

    let mut window = if window_view {
        Some(
            Window::new("rust-swarmsim: run_scenario", 400, 400, WindowOptions::default())
                .expect("Unable to open window"),
        )
    } else {
        None
    };
    let mut buffer: Vec<u32> = Vec::new();

    for step in 0..n_steps {
        let actions: Vec<Action> = (0..env.n_agents())
            .map(|a| policy.act(&obs[a], &env.world().agents()[a], continuous_actions))
            .collect();
        let s = env.step(actions)?;
        for (agent, rew) in s.rewards.iter().enumerate() {
            // Track replica 0's return per agent.
            returns[agent] += rew[0];
        }
        obs = s.observations;

        if step % 10 == 0 {
            println!(
                "step {step:3}  rewards: {:?}",
                s.rewards.iter().map(|r| r[0]).collect::<Vec<_>>()
            );
        }

        if render {
            let frame = env.render()?;
            if let Some(w) = window.as_mut() {
                if !w.is_open() || w.is_key_down(Key::Escape) {
                    break;
                }
                if let RenderFrame::Pixels { width, height, data } = &frame {
                    let (width, height) = (*width as usize, *height as usize);
                    buffer.resize(width * height, 0);
                    for i in 0..width * height {
                        let idx = i * 4;
                        buffer[i] =
                            rgba_to_u32(data[idx + 3], data[idx], data[idx + 1], data[idx + 2]);
                    }
                    w.update_with_buffer(&buffer, width, height)
                        .expect("Failed to update window buffer");
                }
            }
            if save_render {
                frames.push(frame);
            }
        }
    }

    let elapsed = start.elapsed().as_secs_f64();
    println!(
        "It took {elapsed:.3}s for {n_steps} steps of {num_envs} parallel replicas \
         for the {scenario_name} scenario."
    );
    for (agent, ret) in env.agent_names().iter().zip(&returns) {
        println!("  {agent}: return {ret:.3}");
    }

    if save_render {
        save_frames("out", &scenario_name, &frames)?;
        println!("Saved {} frames under out/", frames.len());
    }

    Ok(())
}
