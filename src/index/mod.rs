//! Target indexing: which screens are open, which live nodes carry
//! widget identifiers that steps reference, and the highlight sets a
//! step needs raised out of normal draw order.
//!
//! Registration walks the screen's subtree depth-first in sibling
//! order, assigning each visited node its draw-order index as a side
//! effect. That index (plus the original parent) is exactly what the
//! restore path needs to put a reparented highlight target back in
//! its original sibling position.

use std::collections::HashMap;

use crate::scene::{NodeId, WidgetTree};
use crate::step::{HighlightScope, StepConfig};

/// Per-step reference data extracted from the loaded group, used to
/// match widget identifiers against the steps that reference them.
#[derive(Debug, Clone)]
struct StepRef {
    screen_id: String,
    target_ids: Vec<String>,
}

/// A live node discovered during indexing, together with the steps
/// that reference its widget identifier. A widget may legitimately be
/// referenced by zero, one, or many steps; zero-match widgets produce
/// no binding.
#[derive(Debug, Clone)]
pub struct TargetBinding {
    pub widget_id: String,
    pub node: NodeId,
    pub screen_id: String,
    /// Parent at the time of indexing.
    pub original_parent: NodeId,
    /// Draw-order (sibling) index at the time of indexing.
    pub original_index: usize,
    /// Step ids whose target list names this widget.
    pub step_ids: Vec<String>,
}

/// One node of a resolved highlight set with the data needed to
/// restore it verbatim after the step completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightNode {
    pub node: NodeId,
    /// `None` for a screen root (never reparented, nothing to restore).
    pub original_parent: Option<NodeId>,
    pub original_index: usize,
}

/// The ordered set of live nodes a step raises above normal draw
/// order. Empty sets signal "nothing to highlight", not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSet {
    pub nodes: Vec<HighlightNode>,
}

impl HighlightSet {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug)]
struct ScreenEntry {
    root: NodeId,
    scope: HighlightScope,
}

/// Open-screen registry plus the widget-identifier index for the
/// currently loaded step-group.
#[derive(Debug, Default)]
pub struct TargetIndex {
    screens: HashMap<String, ScreenEntry>,
    /// In indexing order.
    bindings: Vec<TargetBinding>,
    refs: HashMap<String, StepRef>,
    /// Lazily resolved highlight sets, keyed by step id. Consumed when
    /// the step's completion is reported.
    highlights: HashMap<String, HighlightSet>,
}

impl TargetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the group catalog. Called whenever a new step-group is
    /// loaded; existing bindings refer to the old group and are dropped.
    pub fn set_group(&mut self, configs: &[StepConfig]) {
        self.refs = configs
            .iter()
            .map(|c| {
                (
                    c.id.clone(),
                    StepRef {
                        screen_id: c.screen_id.clone(),
                        target_ids: c.target_ids.clone(),
                    },
                )
            })
            .collect();
        self.bindings.clear();
        self.highlights.clear();
    }

    /// Record an opened screen and index its widget subtree.
    ///
    /// A repeated registration with `PartialScreen` scope re-walks the
    /// given subtree additively, without clearing prior bindings; this
    /// supports screens that load sub-panels incrementally. A repeated
    /// registration with `EntireScreen` scope is ignored.
    pub fn register_screen(
        &mut self,
        screen_id: &str,
        root: NodeId,
        scope: HighlightScope,
        tree: &dyn WidgetTree,
    ) {
        if self.screens.contains_key(screen_id) {
            if scope == HighlightScope::PartialScreen {
                tracing::debug!(screen = screen_id, "indexing sub-panel subtree");
                self.walk(screen_id, root, tree);
            }
            return;
        }
        tracing::debug!(screen = screen_id, ?scope, "screen registered");
        self.screens
            .insert(screen_id.to_string(), ScreenEntry { root, scope });
        self.walk(screen_id, root, tree);
    }

    /// Remove a screen from the open registry. Only an `EntireScreen`
    /// unregister closes the screen; sub-panels don't own the screen's
    /// open/closed status, so a partial unregister is a no-op.
    pub fn unregister_screen(&mut self, screen_id: &str, scope: HighlightScope) {
        if scope != HighlightScope::EntireScreen {
            return;
        }
        if self.screens.remove(screen_id).is_some() {
            tracing::debug!(screen = screen_id, "screen unregistered");
            self.bindings.retain(|b| b.screen_id != screen_id);
        }
    }

    pub fn is_screen_open(&self, screen_id: &str) -> bool {
        self.screens.contains_key(screen_id)
    }

    /// True if the screen was registered with `EntireScreen` scope, in
    /// which case the presentation layer dims the whole screen instead
    /// of per-widget highlighting.
    pub fn is_full_screen_highlight(&self, screen_id: &str) -> bool {
        self.screens
            .get(screen_id)
            .is_some_and(|e| e.scope == HighlightScope::EntireScreen)
    }

    /// Bindings referenced by `step_id`, in indexing order.
    pub fn resolve_targets(&self, step_id: &str) -> Vec<&TargetBinding> {
        self.bindings
            .iter()
            .filter(|b| b.step_ids.iter().any(|id| id == step_id))
            .collect()
    }

    /// Resolve (and cache) the highlight set for a step. Computed
    /// lazily the first time a step needs it.
    pub fn ensure_highlight(&mut self, step_id: &str) {
        if self.highlights.contains_key(step_id) {
            return;
        }
        let set = self.compute_highlight(step_id);
        if set.is_empty() {
            tracing::debug!(step = step_id, "nothing to highlight");
        }
        self.highlights.insert(step_id.to_string(), set);
    }

    pub fn highlight_set(&self, step_id: &str) -> Option<&HighlightSet> {
        self.highlights.get(step_id)
    }

    /// Consume the step's highlight set (called when its completion is
    /// reported).
    pub fn take_highlight(&mut self, step_id: &str) -> Option<HighlightSet> {
        self.highlights.remove(step_id)
    }

    /// Drop all registries and bindings. Called when a tutorial group
    /// ends.
    pub fn clear(&mut self) {
        self.screens.clear();
        self.bindings.clear();
        self.refs.clear();
        self.highlights.clear();
    }

    fn compute_highlight(&self, step_id: &str) -> HighlightSet {
        let Some(step) = self.refs.get(step_id) else {
            tracing::warn!(step = step_id, "highlight requested for unknown step");
            return HighlightSet::default();
        };
        let Some(screen) = self.screens.get(&step.screen_id) else {
            return HighlightSet::default();
        };

        if screen.scope == HighlightScope::EntireScreen {
            return HighlightSet {
                nodes: vec![HighlightNode {
                    node: screen.root,
                    original_parent: None,
                    original_index: 0,
                }],
            };
        }

        let nodes = self
            .bindings
            .iter()
            .filter(|b| {
                b.screen_id == step.screen_id && step.target_ids.contains(&b.widget_id)
            })
            .map(|b| HighlightNode {
                node: b.node,
                original_parent: Some(b.original_parent),
                original_index: b.original_index,
            })
            .collect();
        HighlightSet { nodes }
    }

    /// Depth-first walk in sibling order. The enumeration index is the
    /// child's draw-order index, recorded on any binding made for it.
    fn walk(&mut self, screen_id: &str, parent: NodeId, tree: &dyn WidgetTree) {
        for (index, child) in tree.children(parent).into_iter().enumerate() {
            self.bind(screen_id, child, parent, index, tree);
            self.walk(screen_id, child, tree);
        }
    }

    fn bind(
        &mut self,
        screen_id: &str,
        node: NodeId,
        parent: NodeId,
        index: usize,
        tree: &dyn WidgetTree,
    ) {
        let Some(widget_id) = tree.widget_id(node) else {
            return;
        };
        let step_ids: Vec<String> = self
            .refs
            .iter()
            .filter(|(_, r)| r.target_ids.contains(&widget_id))
            .map(|(id, _)| id.clone())
            .collect();
        if step_ids.is_empty() {
            return;
        }

        // Re-walks may visit a node already bound; refresh in place so
        // the recorded position tracks the latest indexing pass.
        if let Some(existing) = self.bindings.iter_mut().find(|b| b.node == node) {
            existing.original_parent = parent;
            existing.original_index = index;
            existing.step_ids = step_ids;
            return;
        }
        self.bindings.push(TargetBinding {
            widget_id,
            node,
            screen_id: screen_id.to_string(),
            original_parent: parent,
            original_index: index,
            step_ids,
        });
    }
}
