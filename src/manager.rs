//! The facade the host application talks to.
//!
//! `GuideManager` wires the sequencer, the target index and the host's
//! event sink together. It forwards each transition's signals as
//! direct method calls, resolving a step's highlight set before its
//! start signal is delivered so the rendering layer can assume the
//! highlight data is ready.

use crate::config::GuideConfig;
use crate::events::{EventSink, GuideSignal};
use crate::index::{HighlightNode, HighlightSet, TargetBinding, TargetIndex};
use crate::scene::{NodeId, SceneOps, WidgetTree};
use crate::sequencer::{Phase, StepSequencer};
use crate::step::{HighlightScope, StepConfig, StepRecord};

pub struct GuideManager {
    config: GuideConfig,
    sequencer: StepSequencer,
    index: TargetIndex,
    sink: Box<dyn EventSink>,
    /// Highlight nodes currently moved onto the overlay layer,
    /// with the data needed to put them back verbatim.
    raised: Vec<HighlightNode>,
}

impl GuideManager {
    pub fn new(config: GuideConfig, sink: Box<dyn EventSink>) -> Self {
        Self {
            config,
            sequencer: StepSequencer::new(),
            index: TargetIndex::new(),
            sink,
            raised: Vec::new(),
        }
    }

    /// Load a step-group. Must be called before `launch`.
    pub fn init_group(&mut self, configs: &[StepConfig]) {
        self.sequencer.init_group(configs);
        self.index.set_group(configs);
    }

    /// Start the group from a recovery cursor (empty for a fresh run).
    pub fn launch(&mut self, recovery_id: &str) {
        let signals = self.sequencer.launch(recovery_id, &self.index);
        self.dispatch(signals);
    }

    /// Report the active step complete and advance the chain. Called
    /// by the rendering layer when a step's interaction finishes.
    pub fn continue_guide(&mut self) {
        let signals = self.sequencer.continue_guide(&self.index);
        self.dispatch(signals);
    }

    /// Per-frame tick from the host: re-attempts a parked start.
    pub fn poll(&mut self) {
        if !self.sequencer.is_waiting() {
            return;
        }
        let signals = self.sequencer.retry_start(&self.index);
        self.dispatch(signals);
    }

    /// Move the step pointer without side effects.
    pub fn rollback(&mut self, to_step_id: &str) {
        self.sequencer.rollback(to_step_id);
    }

    /// Clear the paused state and ask the host to mount the guide
    /// surface if the group can still serve the cursor.
    pub fn open(&mut self, recovery_id: &str) {
        let signals = self.sequencer.open(recovery_id);
        self.dispatch(signals);
    }

    pub fn pause(&mut self) {
        self.sequencer.pause();
    }

    pub fn resume(&mut self) {
        let signals = self.sequencer.resume(&self.index);
        self.dispatch(signals);
    }

    /// User-facing "skip tutorial": tear down the group immediately.
    pub fn skip_all(&mut self) {
        let signals = self.sequencer.skip_all();
        self.dispatch(signals);
    }

    /// Notification that a screen opened: index its widget subtree.
    /// The parked start attempt (if any) is retried on the next poll.
    pub fn register_screen(
        &mut self,
        screen_id: &str,
        root: NodeId,
        scope: HighlightScope,
        tree: &dyn WidgetTree,
    ) {
        self.index.register_screen(screen_id, root, scope, tree);
    }

    pub fn unregister_screen(&mut self, screen_id: &str, scope: HighlightScope) {
        self.index.unregister_screen(screen_id, scope);
    }

    /// Reparent the active step's highlight targets under an overlay
    /// layer. Screen roots (entire-screen highlights) are left alone.
    pub fn raise_highlights(&mut self, ops: &mut dyn SceneOps, layer: NodeId) {
        let Some(id) = self.sequencer.current_step_id().map(str::to_string) else {
            return;
        };
        self.index.ensure_highlight(&id);
        let Some(set) = self.index.highlight_set(&id).cloned() else {
            return;
        };
        for (position, node) in set.nodes.iter().enumerate() {
            if node.original_parent.is_none() {
                continue;
            }
            ops.reparent(node.node, layer, position);
            self.raised.push(node.clone());
        }
    }

    /// Return every raised node to its original parent at its original
    /// sibling index. Call before reporting the step complete.
    pub fn restore_highlights(&mut self, ops: &mut dyn SceneOps) {
        for raised in std::mem::take(&mut self.raised) {
            if let Some(parent) = raised.original_parent {
                ops.reparent(raised.node, parent, raised.original_index);
            }
        }
    }

    pub fn is_guiding(&self) -> bool {
        self.sequencer.is_guiding()
    }

    pub fn is_closed(&self) -> bool {
        self.sequencer.is_closed()
    }

    pub fn is_launched(&self) -> bool {
        self.sequencer.is_launched()
    }

    pub fn is_waiting(&self) -> bool {
        self.sequencer.is_waiting()
    }

    pub fn phase(&self) -> Phase {
        self.sequencer.phase()
    }

    pub fn current_step(&self) -> Option<&StepRecord> {
        self.sequencer.current_record()
    }

    pub fn last_screen_id(&self) -> &str {
        self.sequencer.last_screen_id()
    }

    pub fn has_remaining(&self, recovery_id: &str) -> bool {
        self.sequencer.has_remaining(recovery_id)
    }

    pub fn is_screen_open(&self, screen_id: &str) -> bool {
        self.index.is_screen_open(screen_id)
    }

    pub fn is_full_screen_highlight(&self, screen_id: &str) -> bool {
        self.index.is_full_screen_highlight(screen_id)
    }

    pub fn resolve_targets(&self, step_id: &str) -> Vec<&TargetBinding> {
        self.index.resolve_targets(step_id)
    }

    pub fn highlight_set(&self, step_id: &str) -> Option<&HighlightSet> {
        self.index.highlight_set(step_id)
    }

    pub fn config(&self) -> &GuideConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut GuideConfig {
        &mut self.config
    }

    /// Forward signals to the sink. Highlight resolution for a
    /// starting step happens here, before the start signal is
    /// delivered; the step's cached set is consumed when its
    /// completion signal passes through.
    fn dispatch(&mut self, signals: Vec<GuideSignal>) {
        for signal in signals {
            match signal {
                GuideSignal::StepStart(id) => {
                    let needs_highlights = self
                        .sequencer
                        .current_record()
                        .is_some_and(|r| r.kind().needs_highlights());
                    if needs_highlights {
                        self.index.ensure_highlight(&id);
                    }
                    self.sink.on_step_start(&id);
                }
                GuideSignal::StepComplete(id) => {
                    self.index.take_highlight(&id);
                    self.sink.on_step_complete(&id);
                }
                GuideSignal::GuideOver(id) => {
                    self.index.clear();
                    self.raised.clear();
                    self.sink.on_guide_over(&id);
                }
                GuideSignal::GuideSkip(id) => self.sink.on_guide_skip(&id),
                GuideSignal::ShowSurface => self.sink.on_show_surface(),
                GuideSignal::ShowDimmer(screen_id) => self.sink.on_show_dimmer(&screen_id),
                GuideSignal::HideDimmer => self.sink.on_hide_dimmer(),
            }
        }
    }
}
