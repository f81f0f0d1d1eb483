//! Staggered Trail Demo
//!
//! Runs a chain of trailing values on a real clock:
//! - The leader springs toward its target with a preset loaded from TOML
//! - Each follower chases the one before it
//! - The group reports completion once the last follower settles
//!
//! Run with: RUST_LOG=motive_animation=debug cargo run -p motive_animation --example staggered_trail

use motive_animation::{AnimationConfig, Controller, FrameLoop, MotionPresets, SharedController};
use motive_core::SystemHost;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const PRESETS: &str = r#"
[presets.lead]
preset = "wobbly"

[presets.follow]
preset = "stiff"
friction = 24.0
"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let presets = MotionPresets::from_toml_str(PRESETS)?;
    let lead_motion = presets
        .get("lead")
        .ok_or_else(|| anyhow::anyhow!("missing preset 'lead'"))?;
    let follow_motion = presets
        .get("follow")
        .ok_or_else(|| anyhow::anyhow!("missing preset 'follow'"))?;

    let host = Arc::new(SystemHost::new());
    let frame_loop = FrameLoop::new(host.clone());

    let lead = AnimationConfig::builder("x")
        .from(0.0)
        .to(240.0)
        .motion(lead_motion)?
        .build()?;
    let mut chain: Vec<SharedController> = vec![Controller::new(vec![lead])?.into_shared()];

    for index in 1..5 {
        let trail = chain[index - 1]
            .lock()
            .map_err(|_| anyhow::anyhow!("controller lock poisoned"))?
            .config("x")
            .and_then(|config| config.trail(0))
            .ok_or_else(|| anyhow::anyhow!("leader has no 'x' cell"))?;
        let config = AnimationConfig::builder("x")
            .from(0.0)
            .trail_to(trail)
            .motion(follow_motion)?
            .build()?;
        let controller = Controller::new(vec![config])?
            .on_frame(move |props| {
                if let Some(x) = props.get("x").and_then(|v| v.as_number()) {
                    tracing::trace!(index, x, "follower frame");
                }
            })
            .on_end(move |result| tracing::info!(index, ?result, "follower settled"))
            .into_shared();
        chain.push(controller);
    }

    for controller in &chain {
        frame_loop.start(controller);
    }

    while host.take_needs_redraw() {
        std::thread::sleep(Duration::from_millis(16));
        host.run_frame();
    }

    tracing::info!(frames = frame_loop.frame_count(), "animation finished");
    Ok(())
}
