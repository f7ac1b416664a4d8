//! End-to-end scenarios for the guide engine: a host-side fake scene
//! graph, a recording event sink, and full launch/continue/poll flows
//! racing against screen registration.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use waypoint::{
    EventSink, GuideConfig, GuideManager, HighlightScope, NodeId, SceneOps, StepConfig, StepKind,
    WidgetTree,
};

/// In-memory scene graph standing in for the host's UI tree.
#[derive(Default)]
struct FakeScene {
    children: HashMap<NodeId, Vec<NodeId>>,
    parents: HashMap<NodeId, NodeId>,
    widget_ids: HashMap<NodeId, String>,
}

impl FakeScene {
    fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.children.entry(parent).or_default().push(child);
        self.parents.insert(child, parent);
    }

    fn tag(&mut self, node: NodeId, widget_id: &str) {
        self.widget_ids.insert(node, widget_id.to_string());
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied()
    }

    fn sibling_index(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent_of(node)?;
        self.children.get(&parent)?.iter().position(|n| *n == node)
    }
}

impl WidgetTree for FakeScene {
    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.children.get(&node).cloned().unwrap_or_default()
    }

    fn widget_id(&self, node: NodeId) -> Option<String> {
        self.widget_ids.get(&node).cloned()
    }
}

impl SceneOps for FakeScene {
    fn reparent(&mut self, node: NodeId, parent: NodeId, index: usize) {
        if let Some(old_parent) = self.parents.get(&node).copied() {
            if let Some(siblings) = self.children.get_mut(&old_parent) {
                siblings.retain(|n| *n != node);
            }
        }
        let siblings = self.children.entry(parent).or_default();
        let index = index.min(siblings.len());
        siblings.insert(index, node);
        self.parents.insert(node, parent);
    }
}

/// Sink that records every signal as a compact string.
#[derive(Clone, Default)]
struct Recorder {
    events: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    fn take(&self) -> Vec<String> {
        self.events.borrow_mut().drain(..).collect()
    }

    fn all(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl EventSink for Recorder {
    fn on_step_start(&mut self, step_id: &str) {
        self.events.borrow_mut().push(format!("start:{step_id}"));
    }

    fn on_step_complete(&mut self, step_id: &str) {
        self.events.borrow_mut().push(format!("complete:{step_id}"));
    }

    fn on_guide_over(&mut self, step_id: &str) {
        self.events.borrow_mut().push(format!("over:{step_id}"));
    }

    fn on_guide_skip(&mut self, step_id: &str) {
        self.events.borrow_mut().push(format!("skip:{step_id}"));
    }

    fn on_show_surface(&mut self) {
        self.events.borrow_mut().push("surface".to_string());
    }

    fn on_show_dimmer(&mut self, screen_id: &str) {
        self.events.borrow_mut().push(format!("dim:{screen_id}"));
    }

    fn on_hide_dimmer(&mut self) {
        self.events.borrow_mut().push("undim".to_string());
    }
}

fn step(id: &str, kind: StepKind, next: &str, screen: &str, targets: &[&str]) -> StepConfig {
    StepConfig {
        id: id.to_string(),
        kind,
        next_id: next.to_string(),
        screen_id: screen.to_string(),
        target_ids: targets.iter().map(|t| (*t).to_string()).collect(),
        scope: HighlightScope::default(),
        payload: serde_json::Value::Null,
    }
}

fn manager_with_recorder() -> (GuideManager, Recorder) {
    let recorder = Recorder::default();
    let manager = GuideManager::new(GuideConfig::default(), Box::new(recorder.clone()));
    (manager, recorder)
}

/// Screen S1: root(1) -> panel(2) -> [spacer(3), btn(4)]
fn screen_s1() -> FakeScene {
    let mut scene = FakeScene::default();
    scene.add_child(NodeId(1), NodeId(2));
    scene.add_child(NodeId(2), NodeId(3));
    scene.add_child(NodeId(2), NodeId(4));
    scene.tag(NodeId(4), "btn1");
    scene
}

#[test]
fn test_text_then_finger_races_screen_load() {
    let (mut manager, recorder) = manager_with_recorder();
    manager.init_group(&[
        step("a", StepKind::Text, "b", "", &[]),
        step("b", StepKind::Finger, "", "S1", &["btn1"]),
    ]);

    // Step a has no screen dependency and starts immediately.
    manager.launch("");
    assert_eq!(recorder.take(), vec!["dim:", "start:a"]);
    assert!(manager.is_guiding());

    // Step b's screen is not registered yet: the engine parks.
    manager.continue_guide();
    assert_eq!(recorder.take(), vec!["complete:a"]);
    assert!(manager.is_waiting());
    assert!(!manager.is_guiding());

    // Polling while the screen is still closed changes nothing.
    manager.poll();
    assert!(recorder.take().is_empty());

    // The screen opens; the next poll tick starts the parked step.
    let scene = screen_s1();
    manager.register_screen("S1", NodeId(1), HighlightScope::EntireScreen, &scene);
    manager.poll();
    assert_eq!(recorder.take(), vec!["dim:S1", "start:b"]);
    assert!(manager.is_guiding());
    assert!(!manager.is_waiting());

    manager.continue_guide();
    assert_eq!(recorder.take(), vec!["complete:b", "undim", "over:b"]);
    assert!(!manager.is_guiding());
}

#[test]
fn test_no_second_poll_needed_when_screen_already_open() {
    let (mut manager, recorder) = manager_with_recorder();
    manager.init_group(&[step("b", StepKind::Finger, "", "S1", &["btn1"])]);

    let scene = screen_s1();
    manager.register_screen("S1", NodeId(1), HighlightScope::EntireScreen, &scene);

    manager.launch("");
    assert_eq!(recorder.take(), vec!["dim:S1", "start:b"]);
    assert!(manager.is_guiding());
}

#[test]
fn test_skip_all_while_guiding() {
    let (mut manager, recorder) = manager_with_recorder();
    manager.init_group(&[
        step("a", StepKind::Text, "b", "", &[]),
        step("b", StepKind::Finger, "", "S1", &["btn1"]),
    ]);

    let scene = screen_s1();
    manager.register_screen("S1", NodeId(1), HighlightScope::EntireScreen, &scene);
    manager.launch("");
    manager.continue_guide();
    assert_eq!(manager.current_step().unwrap().id(), "b");
    recorder.take();

    manager.skip_all();
    assert_eq!(recorder.take(), vec!["skip:b", "undim", "over:b"]);

    // The skipped step's own completion report is stale.
    manager.continue_guide();
    assert!(recorder.all().is_empty());
}

#[test]
fn test_chain_walk_emits_completion_for_persistence() {
    let (mut manager, recorder) = manager_with_recorder();
    manager.init_group(&[
        step("a", StepKind::Dialogue, "b", "", &[]),
        step("b", StepKind::Image, "c", "", &[]),
        step("c", StepKind::Animation, "", "", &[]),
    ]);

    manager.launch("");
    manager.continue_guide();
    manager.continue_guide();
    manager.continue_guide();

    let completions: Vec<String> = recorder
        .all()
        .into_iter()
        .filter(|e| e.starts_with("complete:"))
        .collect();
    assert_eq!(completions, vec!["complete:a", "complete:b", "complete:c"]);
}

#[test]
fn test_launch_recovery_from_persisted_cursor() {
    let group = [
        step("a", StepKind::Dialogue, "b", "", &[]),
        step("b", StepKind::Dialogue, "c", "", &[]),
        step("c", StepKind::Dialogue, "", "", &[]),
    ];

    // Recovery at the second-to-last step resumes at the last.
    let (mut manager, recorder) = manager_with_recorder();
    manager.init_group(&group);
    manager.launch("b");
    assert_eq!(recorder.take(), vec!["dim:", "start:c"]);

    // Recovery at the last step is immediately over.
    let (mut manager, recorder) = manager_with_recorder();
    manager.init_group(&group);
    manager.launch("c");
    assert_eq!(recorder.take(), vec!["undim", "over:c"]);
}

#[test]
fn test_open_requests_surface_when_paused_with_work_left() {
    let (mut manager, recorder) = manager_with_recorder();
    manager.init_group(&[
        step("a", StepKind::Dialogue, "b", "", &[]),
        step("b", StepKind::Dialogue, "", "", &[]),
    ]);

    manager.pause();
    manager.launch("");
    assert!(recorder.take().is_empty());

    manager.open("a");
    assert_eq!(recorder.take(), vec!["surface"]);
    assert!(!manager.is_closed());

    manager.launch("a");
    assert_eq!(recorder.take(), vec!["dim:", "start:b"]);
}

#[test]
fn test_highlight_raise_and_restore_round_trip() {
    // Parent panel(2) with the target btn(10) at sibling index 3.
    let mut scene = FakeScene::default();
    scene.add_child(NodeId(1), NodeId(2));
    for child in [20, 21, 22, 10, 23] {
        scene.add_child(NodeId(2), NodeId(child));
    }
    scene.tag(NodeId(10), "btn1");
    let overlay = NodeId(99);
    scene.add_child(NodeId(1), overlay);

    let (mut manager, recorder) = manager_with_recorder();
    manager.init_group(&[{
        let mut s = step("f", StepKind::Finger, "", "S1", &["btn1"]);
        s.scope = HighlightScope::PartialScreen;
        s
    }]);
    manager.register_screen("S1", NodeId(1), HighlightScope::PartialScreen, &scene);

    manager.launch("");
    assert_eq!(recorder.take(), vec!["dim:S1", "start:f"]);

    // Highlight data is resolved before the start signal fired.
    let set = manager.highlight_set("f").unwrap();
    assert_eq!(set.nodes.len(), 1);
    assert_eq!(set.nodes[0].node, NodeId(10));

    manager.raise_highlights(&mut scene, overlay);
    assert_eq!(scene.parent_of(NodeId(10)), Some(overlay));

    manager.restore_highlights(&mut scene);
    assert_eq!(scene.parent_of(NodeId(10)), Some(NodeId(2)));
    assert_eq!(scene.sibling_index(NodeId(10)), Some(3));

    manager.continue_guide();
    assert_eq!(recorder.take(), vec!["complete:f", "undim", "over:f"]);
    // The consumed highlight set is gone after completion.
    assert!(manager.highlight_set("f").is_none());
}

#[test]
fn test_full_screen_scope_highlights_screen_root() {
    let scene = screen_s1();
    let (mut manager, _recorder) = manager_with_recorder();
    manager.init_group(&[step("f", StepKind::Finger, "", "S1", &["btn1"])]);
    manager.register_screen("S1", NodeId(1), HighlightScope::EntireScreen, &scene);

    manager.launch("");
    assert!(manager.is_full_screen_highlight("S1"));

    let set = manager.highlight_set("f").unwrap();
    assert_eq!(set.nodes.len(), 1);
    assert_eq!(set.nodes[0].node, NodeId(1));
    assert_eq!(set.nodes[0].original_parent, None);
}

#[test]
fn test_missing_widget_yields_empty_highlight_set() {
    let scene = screen_s1();
    let (mut manager, recorder) = manager_with_recorder();
    manager.init_group(&[{
        let mut s = step("f", StepKind::Finger, "", "S1", &["never-rendered"]);
        s.scope = HighlightScope::PartialScreen;
        s
    }]);
    manager.register_screen("S1", NodeId(1), HighlightScope::PartialScreen, &scene);

    // Nothing to highlight is not an error: the step still starts.
    manager.launch("");
    assert_eq!(recorder.take(), vec!["dim:S1", "start:f"]);
    assert!(manager.highlight_set("f").unwrap().is_empty());
}

#[test]
fn test_screen_close_and_reopen_between_steps() {
    let (mut manager, recorder) = manager_with_recorder();
    manager.init_group(&[
        step("a", StepKind::Finger, "b", "S1", &["btn1"]),
        step("b", StepKind::Finger, "", "S1", &["btn1"]),
    ]);

    let scene = screen_s1();
    manager.register_screen("S1", NodeId(1), HighlightScope::EntireScreen, &scene);
    manager.launch("");
    recorder.take();

    // The screen closes while step a is presenting; its completion
    // still advances, but step b must wait for the reopen.
    manager.unregister_screen("S1", HighlightScope::EntireScreen);
    manager.continue_guide();
    assert_eq!(recorder.take(), vec!["complete:a"]);
    assert!(manager.is_waiting());

    manager.register_screen("S1", NodeId(1), HighlightScope::EntireScreen, &scene);
    manager.poll();
    assert_eq!(recorder.take(), vec!["dim:S1", "start:b"]);
    assert_eq!(manager.last_screen_id(), "S1");
}
