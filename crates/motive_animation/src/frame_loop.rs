//! Frame loop
//!
//! Drives every registered controller once per host frame. Each tick steps
//! every unfinished cell with its motion model, pushes the interpolated
//! props to observers, retires finished controllers, and re-arms the host's
//! frame request while anything is still moving.
//!
//! The loop owns no clock and no thread. Time and scheduling come from the
//! `FrameHost` it was created with, so the same loop runs under a real event
//! loop (`SystemHost`) or a caller-driven clock (`ManualHost`).
//!
//! # Example
//!
//! ```rust
//! use motive_animation::{AnimationConfig, Controller, FrameLoop};
//! use motive_core::ManualHost;
//! use std::sync::Arc;
//!
//! let host = Arc::new(ManualHost::new(0.0));
//! let frame_loop = FrameLoop::new(host.clone());
//!
//! let opacity = AnimationConfig::builder("opacity")
//!     .from(0.0)
//!     .to(1.0)
//!     .duration(100.0)
//!     .build()
//!     .unwrap();
//! let controller = Controller::new(vec![opacity]).unwrap().into_shared();
//!
//! frame_loop.start(&controller);
//! while host.pending_frames() > 0 {
//!     host.step(16.0);
//! }
//! assert!(controller.lock().unwrap().is_done());
//! ```

use crate::animated::Target;
use crate::config::AnimationConfig;
use crate::controller::{
    AnimatedProps, Controller, ControllerId, EndHandler, EndResult, FrameHandler, SharedController,
    UpdateHandler,
};
use crate::motion::{decay_position, eased_position, Motion, DECAY_REST_DELTA};
use crate::spring::{spring_settled, sub_steps};
use indexmap::IndexMap;
use motive_core::{FrameHost, Scalar};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

// ============================================================================
// Loop State
// ============================================================================

struct LoopState {
    controllers: IndexMap<ControllerId, SharedController>,
    /// Set from the first registration until the loop drains
    driving: bool,
    /// A host frame callback is outstanding
    frame_requested: bool,
    frames: u64,
}

struct Shared {
    state: Mutex<LoopState>,
    host: Arc<dyn FrameHost>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, LoopState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn contains(&self, id: ControllerId) -> bool {
        self.lock().controllers.contains_key(&id)
    }

    fn add(self: &Arc<Self>, controller: &SharedController) -> bool {
        let id = lock_controller(controller).id();
        let arm = {
            let mut state = self.lock();
            if state.controllers.contains_key(&id) {
                return false;
            }
            state.controllers.insert(id, Arc::clone(controller));
            tracing::debug!(%id, active = state.controllers.len(), "FrameLoop: controller added");
            if state.driving {
                false
            } else {
                tracing::debug!("FrameLoop: idle -> active");
                state.driving = true;
                true
            }
        };
        if arm {
            self.request_frame();
        }
        true
    }

    fn remove(&self, id: ControllerId) -> bool {
        let mut state = self.lock();
        let removed = state.controllers.shift_remove(&id).is_some();
        if removed {
            tracing::debug!(%id, active = state.controllers.len(), "FrameLoop: controller removed");
        }
        removed
    }

    fn stop(&self, controller: &SharedController) -> bool {
        let (id, on_end, result) = {
            let guard = lock_controller(controller);
            (guard.id(), guard.on_end.clone(), guard.end_result(false))
        };
        if !self.remove(id) {
            return false;
        }
        if let Some(on_end) = on_end {
            on_end(result);
        }
        true
    }

    /// Ask the host for a frame unless one is already outstanding
    fn request_frame(self: &Arc<Self>) {
        {
            let mut state = self.lock();
            if state.frame_requested {
                return;
            }
            state.frame_requested = true;
        }
        let weak = Arc::downgrade(self);
        self.host.request_frame(Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.lock().frame_requested = false;
                let time = shared.host.now();
                shared.tick(time);
            }
        }));
    }

    fn tick(self: &Arc<Self>, time: f64) {
        let snapshot: Vec<(ControllerId, SharedController)> = {
            let mut state = self.lock();
            state.frames += 1;
            state
                .controllers
                .iter()
                .map(|(id, controller)| (*id, Arc::clone(controller)))
                .collect()
        };
        tracing::trace!(time, controllers = snapshot.len(), "FrameLoop: tick");

        for (id, controller) in snapshot {
            // Removed by a callback earlier in this pass
            if !self.contains(id) {
                continue;
            }

            let frame = {
                let mut guard = lock_controller(&controller);
                step_controller(&mut guard, time)
            };

            if let Some(on_update) = frame.on_update {
                on_update();
            }
            if let Some((on_frame, props)) = frame.on_frame {
                on_frame(&props);
            }
            if let Some(result) = frame.finished {
                if self.remove(id) {
                    tracing::debug!(%id, no_change = result.no_change, "FrameLoop: controller finished");
                    if let Some(on_end) = frame.on_end {
                        on_end(result);
                    }
                }
            }
        }

        let rearm = {
            let mut state = self.lock();
            if state.controllers.is_empty() {
                if state.driving {
                    tracing::debug!(frames = state.frames, "FrameLoop: active -> idle");
                }
                state.driving = false;
                false
            } else {
                true
            }
        };
        if rearm {
            self.request_frame();
        }
    }
}

fn lock_controller(controller: &SharedController) -> MutexGuard<'_, Controller> {
    controller.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Frame Loop
// ============================================================================

/// Steps registered controllers once per host frame
///
/// Cloning yields another handle to the same loop.
#[derive(Clone)]
pub struct FrameLoop {
    shared: Arc<Shared>,
}

impl FrameLoop {
    pub fn new(host: Arc<dyn FrameHost>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(LoopState {
                    controllers: IndexMap::new(),
                    driving: false,
                    frame_requested: false,
                    frames: 0,
                }),
                host,
            }),
        }
    }

    /// Get a weak handle for use in callbacks and components
    pub fn handle(&self) -> FrameLoopHandle {
        FrameLoopHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Register a controller, arming the host frame if the loop was idle
    ///
    /// Returns false if it was already registered. The controller's lock must
    /// not be held by the caller.
    pub fn add_controller(&self, controller: &SharedController) -> bool {
        self.shared.add(controller)
    }

    /// Unregister a controller without notifying it; idempotent
    pub fn remove_controller(&self, controller: &SharedController) -> bool {
        let id = lock_controller(controller).id();
        self.shared.remove(id)
    }

    /// Stamp the controller's start time with the host clock and register it
    pub fn start(&self, controller: &SharedController) -> bool {
        let now = self.shared.host.now();
        lock_controller(controller).set_start_time(now);
        self.shared.add(controller)
    }

    /// Unregister a controller and report `finished: false` to its `on_end`
    ///
    /// Does nothing if the controller was not registered.
    pub fn stop(&self, controller: &SharedController) -> bool {
        self.shared.stop(controller)
    }

    /// Run one pass at the host's current time
    pub fn tick(&self) {
        let time = self.shared.host.now();
        self.shared.tick(time);
    }

    /// Run one pass at `time_ms`
    pub fn tick_at(&self, time_ms: f64) {
        self.shared.tick(time_ms);
    }

    /// Whether the loop is between its first registration and draining
    pub fn is_active(&self) -> bool {
        self.shared.lock().driving
    }

    pub fn controller_count(&self) -> usize {
        self.shared.lock().controllers.len()
    }

    pub fn contains(&self, id: ControllerId) -> bool {
        self.shared.contains(id)
    }

    /// Number of passes run so far
    pub fn frame_count(&self) -> u64 {
        self.shared.lock().frames
    }
}

/// Weak handle to a `FrameLoop`
///
/// Holds no strong reference, so controllers and callbacks can keep one
/// without keeping the loop alive. Every operation is a no-op returning
/// false once the loop is dropped.
#[derive(Clone)]
pub struct FrameLoopHandle {
    shared: Weak<Shared>,
}

impl FrameLoopHandle {
    pub fn add_controller(&self, controller: &SharedController) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.add(controller))
    }

    pub fn remove_controller(&self, controller: &SharedController) -> bool {
        let Some(shared) = self.shared.upgrade() else {
            return false;
        };
        let id = lock_controller(controller).id();
        shared.remove(id)
    }

    pub fn start(&self, controller: &SharedController) -> bool {
        let Some(shared) = self.shared.upgrade() else {
            return false;
        };
        let now = shared.host.now();
        lock_controller(controller).set_start_time(now);
        shared.add(controller)
    }

    pub fn stop(&self, controller: &SharedController) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.stop(controller))
    }

    /// Check if the loop is still alive
    pub fn is_alive(&self) -> bool {
        self.shared.strong_count() > 0
    }
}

// ============================================================================
// Stepping
// ============================================================================

/// Callbacks owed after stepping a controller, run once its lock is released
#[derive(Default)]
struct Frame {
    on_update: Option<UpdateHandler>,
    on_frame: Option<(FrameHandler, AnimatedProps)>,
    on_end: Option<EndHandler>,
    finished: Option<EndResult>,
}

/// Outcome of stepping one cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CellStep {
    /// Concluded on an earlier frame
    Idle,
    /// Jumped to its target without motion
    Snapped,
    /// Still inside its delay window
    Waiting,
    /// Took a real step
    Moved { done: bool },
}

fn step_controller(controller: &mut Controller, time: f64) -> Frame {
    let push = controller.wants_push();
    let start_time = controller.start_time;
    let mut all_done = true;

    for config in controller.configs.iter_mut() {
        let motion = config.motion();
        for index in 0..config.animated_values.len() {
            match step_cell(config, index, motion, time, start_time) {
                CellStep::Idle | CellStep::Snapped => {}
                CellStep::Waiting => all_done = false,
                CellStep::Moved { done } => {
                    controller.changed = true;
                    if !done {
                        all_done = false;
                    }
                }
            }
        }

        if push {
            let value = config.interpolated();
            match controller.animated_props.get_mut(&config.name) {
                Some(slot) => *slot = value,
                None => {
                    controller.animated_props.insert(config.name.clone(), value);
                }
            }
        }
    }

    let mut frame = Frame::default();
    if push {
        if !controller.props.native {
            frame.on_update = controller.on_update.clone();
        }
        if let Some(ref on_frame) = controller.props.on_frame {
            frame.on_frame = Some((Arc::clone(on_frame), controller.animated_props.clone()));
        }
    }
    if all_done {
        frame.finished = Some(controller.end_result(true));
        frame.on_end = controller.on_end.clone();
    }
    frame
}

fn step_cell(
    config: &mut AnimationConfig,
    index: usize,
    motion: Motion,
    time: f64,
    start_time: f64,
) -> CellStep {
    let AnimationConfig {
        from_values,
        to_values,
        animated_values,
        immediate,
        delay,
        easing,
        decay,
        precision,
        clamp,
        velocity,
        ..
    } = config;
    let cell = &mut animated_values[index];
    if cell.is_done() {
        return CellStep::Idle;
    }

    let from = &from_values[index];
    let target = &to_values[index];
    let to = target.resolve();
    let initial_velocity = velocity.at(index);

    if *immediate || (!target.is_trail() && !*decay && *from == to) {
        cell.set_value(to);
        cell.finish();
        return CellStep::Snapped;
    }

    if *delay > 0.0 && time - start_time < *delay {
        return CellStep::Waiting;
    }

    let (Some(from), Some(mut to)) = (from.as_number(), to.as_number()) else {
        cell.set_value(to);
        cell.finish();
        return CellStep::Moved { done: true };
    };

    let (position, mut end) = match motion {
        Motion::Duration(duration) => {
            let position = eased_position(from, to, easing, time - start_time - *delay, duration);
            (position, time >= start_time + *delay + duration)
        }
        Motion::Decay => {
            let position = decay_position(from, initial_velocity, time - start_time);
            let end = (cell.last_position() - position).abs() < DECAY_REST_DELTA;
            if end {
                to = position;
            }
            (position, end)
        }
        Motion::Spring(spring) => {
            let last_time = cell.last_time().unwrap_or(time);
            let velocity = cell.last_velocity().unwrap_or(initial_velocity);
            let steps = sub_steps(last_time, time);
            let (position, velocity) =
                spring.integrate(cell.last_position(), velocity, to, steps);
            let end = spring_settled(&spring, *precision, *clamp, from, to, position, velocity);
            cell.set_spring_state(velocity, time);
            (position, end)
        }
    };

    if let Target::Trail(leader) = target {
        if !leader.is_done() {
            end = false;
        }
    }

    let position = if end { to } else { position };
    cell.set_value(Scalar::Number(position));
    cell.set_last_position(position);
    if end {
        cell.finish();
    }
    CellStep::Moved { done: end }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motive_core::{ManualHost, PropValue};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup() -> (Arc<ManualHost>, FrameLoop) {
        let host = Arc::new(ManualHost::new(0.0));
        let frame_loop = FrameLoop::new(host.clone());
        (host, frame_loop)
    }

    fn shared(configs: Vec<AnimationConfig>) -> SharedController {
        Controller::new(configs).unwrap().into_shared()
    }

    fn value_of(controller: &SharedController, name: &str) -> Scalar {
        controller.lock().unwrap().values(name).unwrap()[0].clone()
    }

    #[test]
    fn test_add_arms_once() {
        let (host, frame_loop) = setup();
        let a = shared(vec![AnimationConfig::builder("x").from(0.0).to(1.0).build().unwrap()]);
        let b = shared(vec![AnimationConfig::builder("y").from(0.0).to(1.0).build().unwrap()]);

        assert!(frame_loop.add_controller(&a));
        assert!(!frame_loop.add_controller(&a));
        assert!(frame_loop.add_controller(&b));

        assert_eq!(host.frame_requests(), 1);
        assert_eq!(frame_loop.controller_count(), 2);
        assert!(frame_loop.is_active());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_host, frame_loop) = setup();
        let a = shared(vec![]);
        frame_loop.add_controller(&a);
        assert!(frame_loop.remove_controller(&a));
        assert!(!frame_loop.remove_controller(&a));
        assert_eq!(frame_loop.controller_count(), 0);
    }

    #[test]
    fn test_immediate_snaps_on_first_tick() {
        let (_host, frame_loop) = setup();
        let config = AnimationConfig::builder("x")
            .from(0.0)
            .to(50.0)
            .immediate(true)
            .build()
            .unwrap();
        let controller = shared(vec![config]);
        frame_loop.add_controller(&controller);
        frame_loop.tick_at(5.0);

        assert_eq!(value_of(&controller, "x"), Scalar::Number(50.0));
        assert!(controller.lock().unwrap().is_done());
        assert_eq!(frame_loop.controller_count(), 0);
        assert!(!frame_loop.is_active());
    }

    #[test]
    fn test_text_endpoint_snaps_after_delay() {
        let (_host, frame_loop) = setup();
        let config = AnimationConfig::builder("display")
            .from("none")
            .to("block")
            .delay(100.0)
            .build()
            .unwrap();
        let ended = Arc::new(Mutex::new(None));
        let e = ended.clone();
        let controller = Controller::new(vec![config])
            .unwrap()
            .on_end(move |result| *e.lock().unwrap() = Some(result))
            .into_shared();
        frame_loop.add_controller(&controller);

        frame_loop.tick_at(50.0);
        assert_eq!(value_of(&controller, "display"), Scalar::from("none"));

        frame_loop.tick_at(100.0);
        assert_eq!(value_of(&controller, "display"), Scalar::from("block"));
        assert_eq!(
            *ended.lock().unwrap(),
            Some(EndResult {
                finished: true,
                no_change: false
            })
        );
    }

    #[test]
    fn test_duration_hits_midpoint_and_end() {
        let (_host, frame_loop) = setup();
        let config = AnimationConfig::builder("x")
            .from(0.0)
            .to(100.0)
            .duration(100.0)
            .build()
            .unwrap();
        let controller = shared(vec![config]);
        frame_loop.add_controller(&controller);

        frame_loop.tick_at(50.0);
        assert_eq!(value_of(&controller, "x"), Scalar::Number(50.0));
        frame_loop.tick_at(100.0);
        assert_eq!(value_of(&controller, "x"), Scalar::Number(100.0));
        assert!(!frame_loop.contains(controller.lock().unwrap().id()));
    }

    #[test]
    fn test_native_controller_skips_push() {
        let (_host, frame_loop) = setup();
        let updates = Arc::new(AtomicUsize::new(0));
        let u = updates.clone();
        let config = AnimationConfig::builder("x")
            .from(0.0)
            .to(10.0)
            .duration(100.0)
            .build()
            .unwrap();
        let controller = Controller::new(vec![config])
            .unwrap()
            .native(true)
            .on_update(move || {
                u.fetch_add(1, Ordering::Relaxed);
            })
            .into_shared();
        frame_loop.add_controller(&controller);
        frame_loop.tick_at(50.0);

        assert_eq!(updates.load(Ordering::Relaxed), 0);
        // Cells moved but the observed props were not recomputed
        assert_eq!(value_of(&controller, "x"), Scalar::Number(5.0));
        assert_eq!(
            controller.lock().unwrap().animated_props().get("x"),
            Some(&PropValue::Scalar(Scalar::Number(0.0)))
        );
    }

    #[test]
    fn test_on_frame_sees_props_in_config_order() {
        let (_host, frame_loop) = setup();
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let configs = vec![
            AnimationConfig::builder("b").from(0.0).to(1.0).build().unwrap(),
            AnimationConfig::builder("a").from(0.0).to(1.0).build().unwrap(),
        ];
        let controller = Controller::new(configs)
            .unwrap()
            .native(true)
            .on_frame(move |props: &AnimatedProps| {
                *s.lock().unwrap() = props.keys().cloned().collect();
            })
            .into_shared();
        frame_loop.add_controller(&controller);
        frame_loop.tick_at(16.0);

        assert_eq!(*seen.lock().unwrap(), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_stop_reports_unfinished() {
        let (_host, frame_loop) = setup();
        let ended = Arc::new(Mutex::new(Vec::new()));
        let e = ended.clone();
        let config = AnimationConfig::builder("x").from(0.0).to(1.0).build().unwrap();
        let controller = Controller::new(vec![config])
            .unwrap()
            .on_end(move |result| e.lock().unwrap().push(result))
            .into_shared();

        frame_loop.add_controller(&controller);
        assert!(frame_loop.stop(&controller));
        assert!(!frame_loop.stop(&controller));
        assert_eq!(
            *ended.lock().unwrap(),
            vec![EndResult {
                finished: false,
                no_change: true
            }]
        );
    }

    #[test]
    fn test_handle_outlives_loop() {
        let (_host, frame_loop) = setup();
        let handle = frame_loop.handle();
        let controller = shared(vec![]);
        assert!(handle.is_alive());
        assert!(handle.add_controller(&controller));

        drop(frame_loop);
        assert!(!handle.is_alive());
        assert!(!handle.remove_controller(&controller));
    }

    #[test]
    fn test_start_stamps_host_time() {
        let (host, frame_loop) = setup();
        host.set_time(250.0);
        let controller = shared(vec![]);
        frame_loop.start(&controller);
        assert_eq!(controller.lock().unwrap().start_time(), 250.0);
    }
}
