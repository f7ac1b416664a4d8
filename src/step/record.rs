use serde::{Deserialize, Serialize};

/// What a step presents. Only the sequencer's screen-dependency and
/// highlight decisions look at this; everything else is up to the
/// rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Animated pointer over a target widget.
    Finger,
    /// Character dialogue overlay.
    Dialogue,
    /// Text callout anchored to a target widget.
    Text,
    /// Image reveal overlay.
    Image,
    /// Animation playback overlay.
    Animation,
    /// Camera pan toward a target widget.
    Camera,
}

impl StepKind {
    /// Dialogue, image and animation steps are pure overlays: they run
    /// on no particular screen and start unconditionally.
    pub fn needs_screen(self) -> bool {
        !matches!(
            self,
            StepKind::Dialogue | StepKind::Image | StepKind::Animation
        )
    }

    /// Whether a highlight set must be resolved before the step's
    /// start signal is emitted.
    pub fn needs_highlights(self) -> bool {
        matches!(self, StepKind::Finger | StepKind::Text | StepKind::Camera)
    }
}

/// Whether highlighting exempts the whole screen from the dimmer or
/// only the step's target widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightScope {
    #[default]
    EntireScreen,
    PartialScreen,
}

/// Host-supplied description of one tutorial step. Groups are loaded
/// as an ordered slice of these; slice order is group-insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Unique within a step-group. Opaque, host-assigned.
    pub id: String,
    pub kind: StepKind,
    /// Id of the step that runs after this one completes. Empty means
    /// this is the last step of the group.
    #[serde(default)]
    pub next_id: String,
    /// Logical id of the screen this step depends on being open.
    /// Empty for steps with no screen dependency.
    #[serde(default)]
    pub screen_id: String,
    /// Widget identifiers this step highlights.
    #[serde(default)]
    pub target_ids: Vec<String>,
    #[serde(default)]
    pub scope: HighlightScope,
    /// Kind-specific data (text, timings, easing, ...). Never
    /// interpreted by the sequencer, handed through to the renderer.
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// A pooled step record: a [`StepConfig`] plus the liveness flag that
/// marks whether the record currently belongs to a loaded group.
#[derive(Debug, Clone)]
pub struct StepRecord {
    config: StepConfig,
    valid: bool,
}

impl StepRecord {
    pub fn new(config: StepConfig) -> Self {
        Self {
            config,
            valid: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn kind(&self) -> StepKind {
        self.config.kind
    }

    pub fn next_id(&self) -> &str {
        &self.config.next_id
    }

    pub fn screen_id(&self) -> &str {
        &self.config.screen_id
    }

    pub fn target_ids(&self) -> &[String] {
        &self.config.target_ids
    }

    pub fn scope(&self) -> HighlightScope {
        self.config.scope
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.config.payload
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub(crate) fn invalidate(&mut self) {
        self.valid = false;
    }

    pub(crate) fn revalidate(&mut self) {
        self.valid = true;
    }

    /// Reuse this record for a new configuration.
    pub(crate) fn reconfigure(&mut self, config: StepConfig) {
        self.config = config;
        self.valid = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(id: &str, kind: StepKind) -> StepConfig {
        StepConfig {
            id: id.to_string(),
            kind,
            next_id: String::new(),
            screen_id: String::new(),
            target_ids: Vec::new(),
            scope: HighlightScope::default(),
            payload: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_screen_dependency_by_kind() {
        assert!(StepKind::Finger.needs_screen());
        assert!(StepKind::Text.needs_screen());
        assert!(StepKind::Camera.needs_screen());
        assert!(!StepKind::Dialogue.needs_screen());
        assert!(!StepKind::Image.needs_screen());
        assert!(!StepKind::Animation.needs_screen());
    }

    #[test]
    fn test_highlight_kinds() {
        assert!(StepKind::Finger.needs_highlights());
        assert!(StepKind::Camera.needs_highlights());
        assert!(!StepKind::Dialogue.needs_highlights());
    }

    #[test]
    fn test_record_liveness() {
        let mut record = StepRecord::new(config("a", StepKind::Text));
        assert!(record.is_valid());

        record.invalidate();
        assert!(!record.is_valid());

        record.reconfigure(config("b", StepKind::Finger));
        assert!(record.is_valid());
        assert_eq!(record.id(), "b");
        assert_eq!(record.kind(), StepKind::Finger);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let json = r#"{"id": "s1", "kind": "dialogue"}"#;
        let config: StepConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.id, "s1");
        assert_eq!(config.kind, StepKind::Dialogue);
        assert!(config.next_id.is_empty());
        assert!(config.screen_id.is_empty());
        assert!(config.target_ids.is_empty());
        assert_eq!(config.scope, HighlightScope::EntireScreen);
        assert!(config.payload.is_null());
    }
}
