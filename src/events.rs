//! Lifecycle signals emitted by the sequencer and the observer trait
//! the host implements to receive them.
//!
//! Signals are fire-and-forget: every sequencer operation returns the
//! list of signals it produced, and [`crate::manager::GuideManager`]
//! forwards them to the host's [`EventSink`] as direct method calls.

/// A signal produced by a sequencer transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuideSignal {
    /// A step began presenting. Its highlight set (if any) is resolved
    /// before this signal reaches the sink.
    StepStart(String),
    /// A step finished. Hosts persist the id as the recovery cursor.
    StepComplete(String),
    /// The group is exhausted or was skipped; carries the last step id.
    GuideOver(String),
    /// The active step was skipped via `skip_all`.
    GuideSkip(String),
    /// The host should mount the guide overlay surface.
    ShowSurface,
    /// Show the dimmer for the given screen id (may be empty for
    /// steps with no screen dependency).
    ShowDimmer(String),
    HideDimmer,
}

/// Observer implemented by the host. All methods default to no-ops so
/// hosts only override what they present.
///
/// `on_step_complete` doubles as the persistence callback: the id it
/// carries is the recovery cursor for the next launch.
pub trait EventSink {
    fn on_step_start(&mut self, _step_id: &str) {}
    fn on_step_complete(&mut self, _step_id: &str) {}
    fn on_guide_over(&mut self, _step_id: &str) {}
    fn on_guide_skip(&mut self, _step_id: &str) {}
    fn on_show_surface(&mut self) {}
    fn on_show_dimmer(&mut self, _screen_id: &str) {}
    fn on_hide_dimmer(&mut self) {}
}

/// Sink that drops every signal. Useful for headless hosts and tests.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {}
