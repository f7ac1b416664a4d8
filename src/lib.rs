//! Waypoint - tutorial step sequencing and target indexing
//!
//! Drives a player through a chained sequence of tutorial steps
//! (pointer highlights, text callouts, dialogue, image reveals,
//! animations, camera pans) overlaid on an application whose screens
//! load and unload independently of the tutorial's own progress.
//!
//! The engine decides which step runs next, whether its prerequisites
//! (an open screen, located target widgets) are satisfied, and how to
//! reconcile progress when the tutorial and the screen-loading
//! lifecycle race. Rendering, screen lifecycle, the scene graph and
//! persistence stay on the host side, reached through the narrow
//! traits in [`events`] and [`scene`].

pub mod config;
pub mod events;
pub mod index;
pub mod logging;
pub mod manager;
pub mod scene;
pub mod sequencer;
pub mod step;

pub use config::{ConfigError, GuideConfig};
pub use events::{EventSink, GuideSignal, NullSink};
pub use index::{HighlightNode, HighlightSet, TargetBinding, TargetIndex};
pub use manager::GuideManager;
pub use scene::{NodeId, SceneOps, WidgetTree};
pub use sequencer::{Phase, StepSequencer};
pub use step::{HighlightScope, StepConfig, StepKind, StepPool, StepRecord};
