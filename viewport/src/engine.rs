//! Engine core: routes host input to the camera or the scene and keeps
//! selection consistent with the store.
//!
//! `EngineCore` owns one `SceneStore`, one `OrbitCamera`, and the interaction
//! state. Nothing here touches a render engine, so every rule (tool routing,
//! lock enforcement, dangling-selection cleanup) is testable in isolation.
//! Handlers return [`Action`]s describing what changed, for the host to mirror
//! into its side panels.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::BTreeMap;

use tracing::debug;

use crate::camera::OrbitCamera;
use crate::config::ViewportConfig;
use crate::error::{ViewportError, ViewportResult};
use crate::geom::{Point, Vec3};
use crate::input::{Button, DragTarget, InputState, Key, Tool, UiState, WheelDelta};
use crate::scene::{Category, ObjectDraft, ObjectId, ObjectPatch, SceneObject, SceneStore};

/// Changes produced by input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ObjectCreated(ObjectId),
    ObjectUpdated { id: ObjectId, fields: ObjectPatch },
    ObjectDeleted { id: ObjectId },
    SelectionChanged(Option<ObjectId>),
    CameraChanged,
    Measured { from: ObjectId, to: ObjectId, distance: f64 },
}

/// Core viewport state. All logic that doesn't depend on a render engine.
pub struct EngineCore {
    pub scene: SceneStore,
    pub camera: OrbitCamera,
    pub ui: UiState,
    pub input: InputState,
    pub viewport_width: f64,
    pub viewport_height: f64,
    config: ViewportConfig,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: ViewportConfig) -> Self {
        let config = config.normalized();
        Self {
            scene: SceneStore::new(),
            camera: OrbitCamera::new(&config),
            ui: UiState::default(),
            input: InputState::default(),
            viewport_width: 0.0,
            viewport_height: 0.0,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    // --- Data inputs ---

    /// Place a new object from a draft.
    pub fn create_object(&mut self, draft: ObjectDraft) -> ObjectId {
        self.scene.create(draft)
    }

    /// Ingest a batch of externally produced drafts.
    pub fn ingest(&mut self, drafts: Vec<ObjectDraft>) -> Vec<ObjectId> {
        self.scene.ingest(drafts)
    }

    /// Ingest a JSON array of drafts from a generation service.
    ///
    /// Drafts without a category are filed under `ai-generated`. Unknown
    /// categories or malformed numbers reject the whole batch.
    ///
    /// # Errors
    ///
    /// Returns `MalformedBatch` if `json` is not an array of drafts.
    pub fn ingest_generated(&mut self, json: &str) -> ViewportResult<Vec<ObjectId>> {
        let mut drafts: Vec<ObjectDraft> =
            serde_json::from_str(json).map_err(|e| ViewportError::MalformedBatch(e.to_string()))?;
        for draft in &mut drafts {
            draft.category.get_or_insert(Category::AiGenerated);
        }
        let ids = self.ingest(drafts);
        debug!(count = ids.len(), "ingested generated objects");
        Ok(ids)
    }

    /// Apply an explicit edit. Lock does not apply here; it guards pointer
    /// manipulation only.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not in the store.
    pub fn update_object(&mut self, id: &ObjectId, patch: &ObjectPatch) -> ViewportResult<()> {
        self.scene.update(id, patch)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not in the store.
    pub fn rename(&mut self, id: &ObjectId, name: impl Into<String>) -> ViewportResult<()> {
        self.scene.update(id, &ObjectPatch { name: Some(name.into()), ..Default::default() })
    }

    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not in the store.
    pub fn set_visible(&mut self, id: &ObjectId, visible: bool) -> ViewportResult<()> {
        self.scene.update(id, &ObjectPatch { visible: Some(visible), ..Default::default() })
    }

    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not in the store.
    pub fn set_locked(&mut self, id: &ObjectId, locked: bool) -> ViewportResult<()> {
        self.scene.update(id, &ObjectPatch { locked: Some(locked), ..Default::default() })
    }

    /// Delete an object and drop every interaction reference to it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not in the store.
    pub fn delete_object(&mut self, id: &ObjectId) -> ViewportResult<()> {
        self.scene.delete(id)?;
        if self.ui.selected_id.as_ref() == Some(id) {
            self.ui.selected_id = None;
        }
        if self.ui.measure_from.as_ref() == Some(id) {
            self.ui.measure_from = None;
        }
        if matches!(self.input, InputState::Dragging { target: DragTarget::Object(drag_id), .. } if drag_id == *id) {
            self.input = InputState::Idle;
        }
        Ok(())
    }

    // --- Tool / camera ---

    /// Set the active tool. Selection and camera pose are left alone.
    pub fn set_tool(&mut self, tool: Tool) {
        if tool != Tool::Measure {
            self.ui.measure_from = None;
        }
        self.ui.tool = tool;
    }

    /// Aim the camera at the centroid of visible objects, or the origin.
    pub fn frame_scene(&mut self) -> Action {
        let target = self.scene.visible_centroid().unwrap_or(Vec3::ZERO);
        if let Err(e) = self.camera.set_target(target) {
            debug!(error = %e, "ignoring non-finite scene centroid");
        }
        Action::CameraChanged
    }

    pub fn reset_camera(&mut self) -> Action {
        self.camera.reset();
        Action::CameraChanged
    }

    /// Record new layout dimensions. Camera and scene are untouched.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Width over height, or `1.0` for a collapsed viewport.
    #[must_use]
    pub fn aspect(&self) -> f64 {
        if self.viewport_width > 0.0 && self.viewport_height > 0.0 {
            self.viewport_width / self.viewport_height
        } else {
            1.0
        }
    }

    // --- Input events ---

    /// Begin a gesture. `hit` is the object under the pointer, as picked by
    /// the render engine.
    pub fn on_pointer_down(&mut self, screen: Point, button: Button, hit: Option<ObjectId>) -> Vec<Action> {
        if self.input.is_dragging() || !screen.is_finite() {
            return Vec::new();
        }
        let hit = hit.filter(|id| self.scene.contains(id));
        let tool = self.ui.tool;
        let mut actions = Vec::new();

        if button != Button::Primary {
            self.begin_drag(tool, DragTarget::Camera, screen);
            return actions;
        }

        if let Tool::Create(shape) = tool {
            let pose = self.camera.pose();
            let ground = Vec3::new(pose.target.x, 0.0, pose.target.z);
            let id = self.scene.create(ObjectDraft::new(shape.kind(), shape.category()).at(ground));
            actions.push(Action::ObjectCreated(id));
            self.select(Some(id), &mut actions);
        } else if tool.orbits_camera() {
            self.select(hit, &mut actions);
            let target = match hit {
                Some(id) if tool.manipulates_objects() => DragTarget::Object(id),
                _ => DragTarget::Camera,
            };
            self.begin_drag(tool, target, screen);
        } else {
            self.select(hit, &mut actions);
            self.measure(hit, &mut actions);
        }
        actions
    }

    /// Continue a gesture. Ignored while idle.
    pub fn on_pointer_move(&mut self, screen: Point) -> Vec<Action> {
        let InputState::Dragging { target, last_screen, .. } = &mut self.input else {
            return Vec::new();
        };
        if !screen.is_finite() {
            debug!("discarding non-finite pointer position");
            return Vec::new();
        }
        let dx = screen.x - last_screen.x;
        let dy = screen.y - last_screen.y;
        *last_screen = screen;
        let target = *target;

        match target {
            DragTarget::Camera => match self.camera.apply_drag(dx, dy) {
                Ok(()) => vec![Action::CameraChanged],
                Err(_) => Vec::new(),
            },
            DragTarget::Object(id) => self.drag_object(id, dx, dy),
        }
    }

    /// End any gesture, whatever the tool.
    pub fn on_pointer_up(&mut self, _screen: Point) -> Vec<Action> {
        self.input = InputState::Idle;
        Vec::new()
    }

    /// Zoom by the vertical wheel delta.
    pub fn on_wheel(&mut self, delta: WheelDelta) -> Vec<Action> {
        match self.camera.apply_zoom(delta.dy) {
            Ok(()) => vec![Action::CameraChanged],
            Err(_) => Vec::new(),
        }
    }

    /// `Delete`/`Backspace` remove the selected (unlocked) object; `Escape`
    /// clears selection and cancels the current gesture.
    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        match key.0.as_str() {
            "Delete" | "Backspace" => self.delete_selected(),
            "Escape" => {
                self.input = InputState::Idle;
                self.ui.measure_from = None;
                let mut actions = Vec::new();
                self.select(None, &mut actions);
                actions
            }
            _ => Vec::new(),
        }
    }

    /// Abandon any gesture in progress. The pointer-up that would end it can
    /// no longer arrive once the host's listeners are gone.
    pub fn cancel_gesture(&mut self) {
        if self.input.is_dragging() {
            debug!("cancelling gesture in progress");
        }
        self.input = InputState::Idle;
    }

    // --- Queries ---

    /// The currently selected object, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ObjectId> {
        self.ui.selected_id
    }

    /// Look up an object by id.
    #[must_use]
    pub fn object(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.scene.get(id)
    }

    /// Side-panel listing grouped by category.
    #[must_use]
    pub fn grouped(&self) -> BTreeMap<Category, Vec<ObjectId>> {
        self.scene.group_by_category()
    }

    // --- Internals ---

    fn begin_drag(&mut self, tool: Tool, target: DragTarget, screen: Point) {
        self.input = InputState::Dragging { tool, target, last_screen: screen };
    }

    fn select(&mut self, id: Option<ObjectId>, actions: &mut Vec<Action>) {
        if self.ui.selected_id != id {
            self.ui.selected_id = id;
            actions.push(Action::SelectionChanged(id));
        }
    }

    fn measure(&mut self, hit: Option<ObjectId>, actions: &mut Vec<Action>) {
        let Some(to) = hit else {
            self.ui.measure_from = None;
            return;
        };
        let Some(from) = self.ui.measure_from.take() else {
            self.ui.measure_from = Some(to);
            return;
        };
        if let (Some(a), Some(b)) = (self.scene.get(&from), self.scene.get(&to)) {
            let distance = a.position.distance(b.position);
            actions.push(Action::Measured { from, to, distance });
        } else {
            self.ui.measure_from = Some(to);
        }
    }

    fn drag_object(&mut self, id: ObjectId, dx: f64, dy: f64) -> Vec<Action> {
        let Some(obj) = self.scene.get(&id) else {
            self.input = InputState::Idle;
            return Vec::new();
        };
        if obj.locked {
            debug!(%id, "ignoring drag on locked object");
            return Vec::new();
        }

        // Screen right maps to the camera's ground-plane right vector, screen
        // down maps toward the camera.
        let (sin_t, cos_t) = self.camera.pose().theta.sin_cos();
        let right = Vec3::new(sin_t, 0.0, -cos_t);
        let toward_eye = Vec3::new(cos_t, 0.0, sin_t);
        let step = (right * dx + toward_eye * dy) * self.config.move_sensitivity;
        let position = obj.position + step;
        if !position.is_finite() {
            return Vec::new();
        }

        let fields = ObjectPatch { position: Some(position), ..Default::default() };
        match self.scene.update(&id, &fields) {
            Ok(()) => vec![Action::ObjectUpdated { id, fields }],
            Err(_) => Vec::new(),
        }
    }

    fn delete_selected(&mut self) -> Vec<Action> {
        let Some(id) = self.ui.selected_id else {
            return Vec::new();
        };
        if self.scene.get(&id).is_some_and(|o| o.locked) {
            debug!(%id, "ignoring delete of locked object");
            return Vec::new();
        }
        match self.delete_object(&id) {
            Ok(()) => vec![Action::ObjectDeleted { id }, Action::SelectionChanged(None)],
            Err(_) => {
                self.ui.selected_id = None;
                vec![Action::SelectionChanged(None)]
            }
        }
    }
}
