//! Animation controllers
//!
//! A `Controller` owns one animation group: its configs, the time the group
//! started, the observed props, and the callbacks fired by the frame loop.
//! The client and the frame loop share it as a `SharedController`.

use crate::config::AnimationConfig;
use crate::error::{AnimationError, Result};
use indexmap::IndexMap;
use motive_core::{PropValue, Scalar};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Observed value of every property, in config order
pub type AnimatedProps = IndexMap<String, PropValue>;

/// A controller shared between its owner and the frame loop
pub type SharedController = Arc<Mutex<Controller>>;

/// Called with the current props after every frame that pushes output
pub type FrameHandler = Arc<dyn Fn(&AnimatedProps) + Send + Sync>;

/// Host redraw hook
pub type UpdateHandler = Arc<dyn Fn() + Send + Sync>;

/// Called once when the group stops
pub type EndHandler = Arc<dyn Fn(EndResult) + Send + Sync>;

static NEXT_CONTROLLER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(u64);

impl ControllerId {
    fn next() -> Self {
        ControllerId(NEXT_CONTROLLER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "controller#{}", self.0)
    }
}

/// How a controller's animation ended
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EndResult {
    /// Every value reached its end; false when the group was stopped
    pub finished: bool,
    /// No value ever took a real step (all snapped or were already in place)
    pub no_change: bool,
}

/// Output flags of a controller
#[derive(Clone, Default)]
pub struct ControllerProps {
    pub on_frame: Option<FrameHandler>,
    /// Output is consumed natively by the host; skip per-frame push
    /// unless `on_frame` asks for it
    pub native: bool,
}

/// Owner of one animation group
pub struct Controller {
    pub(crate) id: ControllerId,
    pub(crate) configs: Vec<AnimationConfig>,
    pub(crate) start_time: f64,
    pub(crate) props: ControllerProps,
    pub(crate) animated_props: AnimatedProps,
    pub(crate) on_update: Option<UpdateHandler>,
    pub(crate) on_end: Option<EndHandler>,
    /// Set once any value takes a real step
    pub(crate) changed: bool,
}

impl Controller {
    /// Create a controller over `configs`
    ///
    /// Property names must be unique within a controller.
    pub fn new(configs: Vec<AnimationConfig>) -> Result<Self> {
        let mut animated_props = AnimatedProps::with_capacity(configs.len());
        for config in &configs {
            if animated_props.contains_key(config.name()) {
                return Err(AnimationError::InvalidParameter {
                    name: config.name().to_string(),
                    parameter: "name",
                    reason: "duplicate property in controller".into(),
                });
            }
            animated_props.insert(config.name().to_string(), config.interpolated());
        }

        Ok(Self {
            id: ControllerId::next(),
            configs,
            start_time: 0.0,
            props: ControllerProps::default(),
            animated_props,
            on_update: None,
            on_end: None,
            changed: false,
        })
    }

    /// Wrap in a `SharedController`
    pub fn into_shared(self) -> SharedController {
        Arc::new(Mutex::new(self))
    }

    /// Time (ms) that delays, durations and decays are measured from
    pub fn with_start_time(mut self, time_ms: f64) -> Self {
        self.start_time = time_ms;
        self
    }

    pub fn native(mut self, native: bool) -> Self {
        self.props.native = native;
        self
    }

    pub fn on_frame<F>(mut self, handler: F) -> Self
    where
        F: Fn(&AnimatedProps) + Send + Sync + 'static,
    {
        self.props.on_frame = Some(Arc::new(handler));
        self
    }

    pub fn on_update<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_update = Some(Arc::new(handler));
        self
    }

    pub fn on_end<F>(mut self, handler: F) -> Self
    where
        F: Fn(EndResult) + Send + Sync + 'static,
    {
        self.on_end = Some(Arc::new(handler));
        self
    }

    pub fn id(&self) -> ControllerId {
        self.id
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub(crate) fn set_start_time(&mut self, time_ms: f64) {
        self.start_time = time_ms;
    }

    pub fn props(&self) -> &ControllerProps {
        &self.props
    }

    pub fn configs(&self) -> &[AnimationConfig] {
        &self.configs
    }

    pub fn config(&self, name: &str) -> Option<&AnimationConfig> {
        self.configs.iter().find(|c| c.name() == name)
    }

    /// Current cell values of the property `name`
    pub fn values(&self, name: &str) -> Option<Vec<Scalar>> {
        self.config(name).map(AnimationConfig::values)
    }

    /// Props as of the last pushed frame
    pub fn animated_props(&self) -> &AnimatedProps {
        &self.animated_props
    }

    /// Whether every value of every config has concluded
    pub fn is_done(&self) -> bool {
        self.configs.iter().all(AnimationConfig::is_done)
    }

    /// Whether the frame loop recomputes props and fires callbacks per frame
    pub fn wants_push(&self) -> bool {
        self.props.on_frame.is_some() || !self.props.native
    }

    pub(crate) fn end_result(&self, finished: bool) -> EndResult {
        EndResult {
            finished,
            no_change: !self.changed,
        }
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("id", &self.id)
            .field("configs", &self.configs)
            .field("start_time", &self.start_time)
            .field("native", &self.props.native)
            .field("animated_props", &self.animated_props)
            .finish_non_exhaustive()
    }
}
