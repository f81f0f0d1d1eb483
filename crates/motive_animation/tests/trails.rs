//! Integration tests for trailing values
//!
//! A follower's target is another controller's live cell. These tests check
//! that followers chase the leader, never finish ahead of it, and settle on
//! the leader's final value.

use motive_animation::{
    AnimationConfig, Controller, FrameLoop, RangeMap, SharedController, SpringConfig,
};
use motive_core::{ManualHost, PropValue, Scalar};
use std::sync::Arc;

const FRAME_MS: f64 = 16.0;

fn leader(to: f64) -> SharedController {
    let config = AnimationConfig::builder("x")
        .from(0.0)
        .to(to)
        .spring(SpringConfig::gentle())
        .build()
        .unwrap();
    Controller::new(vec![config]).unwrap().into_shared()
}

fn follower_of(leader: &SharedController) -> SharedController {
    let trail = leader.lock().unwrap().config("x").unwrap().trail(0).unwrap();
    let config = AnimationConfig::builder("x")
        .from(0.0)
        .trail_to(trail)
        .spring(SpringConfig::stiff())
        .build()
        .unwrap();
    Controller::new(vec![config]).unwrap().into_shared()
}

fn number(controller: &SharedController) -> f64 {
    controller.lock().unwrap().values("x").unwrap()[0]
        .as_number()
        .unwrap()
}

fn is_done(controller: &SharedController) -> bool {
    controller.lock().unwrap().is_done()
}

#[test]
fn test_follower_never_finishes_before_leader() {
    let host = Arc::new(ManualHost::new(0.0));
    let frame_loop = FrameLoop::new(host.clone());

    let lead = leader(200.0);
    let chain: Vec<SharedController> = std::iter::successors(Some(lead.clone()), |prev| {
        Some(follower_of(prev))
    })
    .take(4)
    .collect();

    for controller in &chain {
        frame_loop.start(controller);
    }

    let mut frames = 0;
    while host.pending_frames() > 0 && frames < 2000 {
        host.step(FRAME_MS);
        frames += 1;
        for pair in chain.windows(2) {
            if is_done(&pair[1]) {
                assert!(is_done(&pair[0]), "follower finished ahead of its leader");
            }
        }
    }

    assert!(frames < 2000);
    for controller in &chain {
        assert_eq!(number(controller), 200.0);
    }
}

#[test]
fn test_follower_lags_its_leader() {
    let host = Arc::new(ManualHost::new(0.0));
    let frame_loop = FrameLoop::new(host.clone());
    let lead = leader(100.0);
    let follow = follower_of(&lead);
    frame_loop.start(&lead);
    frame_loop.start(&follow);

    for _ in 0..4 {
        host.step(FRAME_MS);
    }
    let (l, f) = (number(&lead), number(&follow));
    assert!(l > 0.0);
    assert!(f < l, "follower {f} should trail leader {l}");
}

#[test]
fn test_follower_settles_after_leader_is_dropped() {
    let host = Arc::new(ManualHost::new(0.0));
    let frame_loop = FrameLoop::new(host.clone());
    let lead = leader(100.0);
    let follow = follower_of(&lead);
    frame_loop.start(&lead);
    frame_loop.start(&follow);

    for _ in 0..3 {
        host.step(FRAME_MS);
    }
    let abandoned_at = number(&lead);
    frame_loop.remove_controller(&lead);
    drop(lead);

    let mut frames = 0;
    while host.pending_frames() > 0 && frames < 2000 {
        host.step(FRAME_MS);
        frames += 1;
    }
    assert!(is_done(&follow));
    assert_eq!(number(&follow), abandoned_at);
}

#[test]
fn test_trail_at_same_value_still_waits_for_leader() {
    let host = Arc::new(ManualHost::new(0.0));
    let frame_loop = FrameLoop::new(host.clone());

    // Leader sits still until its delay passes
    let config = AnimationConfig::builder("x")
        .from(0.0)
        .to(10.0)
        .duration(32.0)
        .delay(48.0)
        .build()
        .unwrap();
    let lead = Controller::new(vec![config]).unwrap().into_shared();
    let follow = follower_of(&lead);
    frame_loop.start(&lead);
    frame_loop.start(&follow);

    host.step(FRAME_MS);
    host.step(FRAME_MS);
    assert!(!is_done(&follow));
    assert_eq!(number(&follow), 0.0);

    let mut frames = 0;
    while host.pending_frames() > 0 && frames < 2000 {
        host.step(FRAME_MS);
        frames += 1;
    }
    assert_eq!(number(&follow), 10.0);
}

#[test]
fn test_interpolated_props_follow_cells() {
    let host = Arc::new(ManualHost::new(0.0));
    let frame_loop = FrameLoop::new(host.clone());
    let config = AnimationConfig::builder("width")
        .from(0.0)
        .to(1.0)
        .duration(32.0)
        .interpolation(RangeMap::new((0.0, 1.0), (0.0, 320.0)))
        .build()
        .unwrap();
    let controller = Controller::new(vec![config]).unwrap().into_shared();
    frame_loop.start(&controller);

    host.step(FRAME_MS);
    assert_eq!(
        controller.lock().unwrap().animated_props().get("width"),
        Some(&PropValue::Scalar(Scalar::Number(160.0)))
    );
    host.step(FRAME_MS);
    assert_eq!(
        controller.lock().unwrap().animated_props().get("width"),
        Some(&PropValue::Scalar(Scalar::Number(320.0)))
    );
}
