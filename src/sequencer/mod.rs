//! The step state machine: owns the current step pointer, the group
//! map and the record pool, and decides every transition.
//!
//! Each public operation executes to completion and returns the
//! signals it emitted, so the machine is always observed in a stable
//! state between calls and is unit-testable with no rendering or
//! timing collaborator. The facade forwards the signals to the host.

use std::collections::HashMap;

use crate::events::GuideSignal;
use crate::index::TargetIndex;
use crate::step::{StepConfig, StepPool, StepRecord};

/// Coarse phase of the machine. The `closed` flag is orthogonal: it
/// gates every transition without being a phase of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No group loaded, or the group is exhausted.
    Idle,
    /// A step wants to run but its screen is not open yet. The host
    /// re-attempts the start via the per-frame poll.
    Waiting,
    /// A step is actively being presented.
    Guiding,
}

#[derive(Debug, Default)]
pub struct StepSequencer {
    pool: StepPool,
    /// Step id -> pool slot.
    group: HashMap<String, usize>,
    /// Group-insertion order, for the fresh-launch fallback.
    order: Vec<String>,
    valid: bool,
    closed: bool,
    launched: bool,
    guiding: bool,
    /// The "again execute" flag: a step wants to start but its screen
    /// is not open. Cleared once the step successfully starts.
    pending_relaunch: bool,
    /// Screen the previous step ran on. Informational only; the host
    /// uses it to decide whether to play a screen transition.
    last_screen_id: String,
    current: Option<String>,
}

impl StepSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a new step-group, recycling the previous group's records.
    ///
    /// An empty group marks the sequencer invalid and no step will
    /// ever start. The `closed` flag is deliberately left alone;
    /// pausing and resuming are the caller's decision.
    pub fn init_group(&mut self, configs: &[StepConfig]) {
        self.launched = false;
        self.guiding = false;
        self.pending_relaunch = false;
        self.last_screen_id.clear();
        self.current = None;

        for slot in self.group.values() {
            self.pool.release(*slot);
        }
        self.group.clear();
        self.order.clear();

        for config in configs {
            if self.group.contains_key(&config.id) {
                tracing::warn!(step = %config.id, "duplicate step id in group, keeping first");
                continue;
            }
            let slot = self.pool.acquire(config.clone());
            self.group.insert(config.id.clone(), slot);
            self.order.push(config.id.clone());
        }

        self.valid = !self.group.is_empty();
        if self.valid {
            tracing::debug!(steps = self.group.len(), "step-group loaded");
        } else {
            tracing::warn!("empty step-group, sequencer marked invalid");
        }
    }

    /// Start the group from a recovery cursor.
    ///
    /// A known `recovery_id` is treated as "last completed": the group
    /// resumes at its `next_id`, or transitions straight to over if
    /// there is no next step. An unknown cursor (fresh group, or a
    /// stale cursor from a previous group) starts from the first
    /// record in group-insertion order.
    pub fn launch(&mut self, recovery_id: &str, index: &TargetIndex) -> Vec<GuideSignal> {
        let mut signals = Vec::new();
        if !self.valid || self.closed {
            tracing::debug!(
                valid = self.valid,
                closed = self.closed,
                "launch ignored"
            );
            return signals;
        }
        if self.guiding {
            tracing::warn!("launch requested while a step is already guiding, ignoring");
            return signals;
        }

        if let Some(record) = self.record_by_id(recovery_id) {
            let next = record.next_id().to_string();
            let screen = record.screen_id().to_string();
            if next.is_empty() {
                // The stored cursor is the last step of the chain; the
                // group already finished on a previous run.
                self.set_current(Some(recovery_id.to_string()));
                self.finish(&mut signals);
            } else {
                self.launched = true;
                self.last_screen_id = screen;
                self.set_current(Some(next));
                self.try_start(index, &mut signals);
            }
        } else {
            self.launched = true;
            let first = self.order.first().cloned();
            self.set_current(first);
            self.try_start(index, &mut signals);
        }
        signals
    }

    /// Report the active step complete and advance the chain.
    ///
    /// Late completion reports (after `pause` or `skip_all`) find
    /// `guiding` false and are silently ignored.
    pub fn continue_guide(&mut self, index: &TargetIndex) -> Vec<GuideSignal> {
        let mut signals = Vec::new();
        if !self.guiding || self.closed {
            tracing::debug!("stale or gated completion report, ignoring");
            return signals;
        }
        let Some(record) = self.current_record() else {
            return signals;
        };
        let id = record.id().to_string();
        let next = record.next_id().to_string();
        let screen = record.screen_id().to_string();

        signals.push(GuideSignal::StepComplete(id));
        if next.is_empty() {
            self.finish(&mut signals);
        } else {
            self.last_screen_id = screen;
            self.set_current(Some(next));
            if self.current_is_valid() && !self.closed {
                self.try_start(index, &mut signals);
            }
        }
        signals
    }

    /// Re-attempt the pending start. Called by the host's per-frame
    /// poll; a no-op unless a step is actually parked waiting.
    pub fn retry_start(&mut self, index: &TargetIndex) -> Vec<GuideSignal> {
        let mut signals = Vec::new();
        if self.pending_relaunch && !self.closed {
            self.try_start(index, &mut signals);
        }
        signals
    }

    /// Force the current pointer to a known step without emitting any
    /// completion or start signals. Used to re-enter the engine at a
    /// known point after an external reset.
    pub fn rollback(&mut self, to_step_id: &str) {
        if self.group.contains_key(to_step_id) {
            self.set_current(Some(to_step_id.to_string()));
            if let Some(&slot) = self.group.get(to_step_id) {
                if let Some(record) = self.pool.get_mut(slot) {
                    record.revalidate();
                }
            }
        } else {
            tracing::warn!(step = to_step_id, "rollback to unknown step ignored");
        }
    }

    /// Clear the closed flag and, if no step is currently presentable
    /// but the group can still serve the cursor, ask the host to mount
    /// the guide surface. Does not itself start a step.
    pub fn open(&mut self, recovery_id: &str) -> Vec<GuideSignal> {
        self.closed = false;
        let mut signals = Vec::new();
        if !self.current_is_valid() && self.has_remaining(recovery_id) {
            tracing::debug!("requesting guide surface");
            signals.push(GuideSignal::ShowSurface);
        }
        signals
    }

    /// Pause all guiding. Idempotent.
    pub fn pause(&mut self) {
        self.closed = true;
        self.launched = false;
        self.guiding = false;
    }

    /// Resume from a pause by continuing past the step that finished
    /// before the pause (its `next_id` is already known). Not meant to
    /// re-attempt the current step.
    pub fn resume(&mut self, index: &TargetIndex) -> Vec<GuideSignal> {
        self.closed = false;
        self.launched = true;
        self.guiding = true;
        self.continue_guide(index)
    }

    /// Tear the group down exactly like reaching the end of the chain,
    /// without waiting for the active step's completion criteria.
    pub fn skip_all(&mut self) -> Vec<GuideSignal> {
        let mut signals = Vec::new();
        if !self.valid {
            return signals;
        }
        if let Some(id) = self.current.clone() {
            signals.push(GuideSignal::GuideSkip(id));
        }
        self.finish(&mut signals);
        signals
    }

    /// Whether the group still has unexecuted steps for a given
    /// recovery cursor. An empty cursor means nothing ran yet; an
    /// unknown cursor against a non-empty group is a stale cursor from
    /// a previous group and the new group counts as unexecuted.
    pub fn has_remaining(&self, recovery_id: &str) -> bool {
        if recovery_id.is_empty() {
            return true;
        }
        if let Some(record) = self.record_by_id(recovery_id) {
            return !record.next_id().is_empty();
        }
        !self.group.is_empty()
    }

    pub fn phase(&self) -> Phase {
        if self.guiding {
            Phase::Guiding
        } else if self.pending_relaunch {
            Phase::Waiting
        } else {
            Phase::Idle
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_launched(&self) -> bool {
        self.launched
    }

    pub fn is_guiding(&self) -> bool {
        self.guiding
    }

    pub fn is_waiting(&self) -> bool {
        self.pending_relaunch
    }

    pub fn current_step_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_record(&self) -> Option<&StepRecord> {
        self.record_by_id(self.current.as_deref()?)
    }

    pub fn last_screen_id(&self) -> &str {
        &self.last_screen_id
    }

    fn record_by_id(&self, id: &str) -> Option<&StepRecord> {
        let slot = *self.group.get(id)?;
        self.pool.get(slot)
    }

    fn current_is_valid(&self) -> bool {
        self.current_record().is_some_and(StepRecord::is_valid)
    }

    /// Shared start attempt. Screen-independent kinds (and steps with
    /// no screen id) start unconditionally; screen-dependent steps
    /// start only once their screen is open, otherwise the machine
    /// parks in the waiting phase. Idempotent while already parked.
    fn try_start(&mut self, index: &TargetIndex, signals: &mut Vec<GuideSignal>) {
        let Some(record) = self.current_record() else {
            return;
        };
        let id = record.id().to_string();
        let screen = record.screen_id().to_string();
        let kind = record.kind();

        if !kind.needs_screen() || screen.is_empty() || index.is_screen_open(&screen) {
            self.guiding = true;
            self.pending_relaunch = false;
            tracing::debug!(step = %id, "step starting");
            signals.push(GuideSignal::ShowDimmer(screen));
            signals.push(GuideSignal::StepStart(id));
        } else {
            if !self.pending_relaunch {
                tracing::debug!(step = %id, screen = %screen, "screen not open, parking");
            }
            self.guiding = false;
            self.pending_relaunch = true;
        }
    }

    /// Track the new current step, invalidating the record the pointer
    /// leaves behind.
    fn set_current(&mut self, id: Option<String>) {
        if let Some(prev) = self.current.take() {
            if id.as_deref() != Some(prev.as_str()) {
                if let Some(&slot) = self.group.get(&prev) {
                    if let Some(record) = self.pool.get_mut(slot) {
                        record.invalidate();
                    }
                }
            }
        }
        self.current = id;
    }

    /// End of the chain (or a skip): recycle the group, emit teardown
    /// signals. The facade clears the target index when it sees
    /// `GuideOver`.
    fn finish(&mut self, signals: &mut Vec<GuideSignal>) {
        let id = self.current.clone().unwrap_or_default();
        tracing::debug!(step = %id, "guide group over");
        self.guiding = false;
        self.valid = false;
        self.launched = false;
        self.pending_relaunch = false;

        for slot in self.group.values() {
            self.pool.release(*slot);
        }
        self.group.clear();
        self.order.clear();

        signals.push(GuideSignal::HideDimmer);
        signals.push(GuideSignal::GuideOver(id));
    }
}
