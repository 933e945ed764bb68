//! Render synchronization: the in-memory contract with the external render
//! engine and the per-frame reconcile step.
//!
//! Each frame, [`FramePacket::capture`] takes one consistent snapshot of the
//! scene and camera, and [`Synchronizer::apply`] diffs it against what the
//! engine already holds: new ids become primitives, changed ones are updated,
//! vanished ones are removed. Hidden objects keep their primitive with
//! `visible = false` so toggling visibility never rebuilds geometry.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::{HashMap, HashSet};

use crate::camera::ViewTransform;
use crate::engine::EngineCore;
use crate::geom::Vec3;
use crate::scene::{ObjectId, SceneObject};

/// Failure reported by a render engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("render backend error: {0}")]
pub struct BackendError(pub String);

/// Render surface dimensions in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn aspect(self) -> f64 {
        if self.width == 0 || self.height == 0 {
            return 1.0;
        }
        f64::from(self.width) / f64::from(self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

/// One object as the render engine sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub id: ObjectId,
    pub kind: String,
    pub color: &'static str,
    pub transform: Transform,
    pub visible: bool,
    pub selected: bool,
}

impl Primitive {
    fn from_object(obj: &SceneObject, selected: bool) -> Self {
        Self {
            id: obj.id,
            kind: obj.kind.clone(),
            color: obj.category.color(),
            transform: Transform { position: obj.position, rotation: obj.rotation, scale: obj.scale },
            visible: obj.visible,
            selected,
        }
    }
}

/// Camera parameters for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub view: ViewTransform,
    pub fov_y_deg: f64,
    pub aspect: f64,
}

/// Everything the render engine needs for one frame, captured at once.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePacket {
    /// Primitives in scene insertion order.
    pub primitives: Vec<Primitive>,
    pub camera: CameraFrame,
}

impl FramePacket {
    #[must_use]
    pub fn capture(core: &EngineCore, size: SurfaceSize) -> Self {
        let selected = core.selection();
        let primitives = core
            .scene
            .list()
            .into_iter()
            .map(|obj| Primitive::from_object(obj, selected == Some(obj.id)))
            .collect();
        let camera = CameraFrame {
            view: core.camera.to_view_transform(),
            fov_y_deg: core.config().fov_y_deg,
            aspect: size.aspect(),
        };
        Self { primitives, camera }
    }
}

/// The external retained-mode engine, seen from the viewport.
pub trait RenderBackend {
    /// Build a primitive for an id the engine has not seen.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the engine cannot allocate the primitive.
    fn create_primitive(&mut self, primitive: &Primitive) -> Result<(), BackendError>;

    /// Replace transform, visibility, or styling of an existing primitive.
    fn update_primitive(&mut self, primitive: &Primitive);

    fn remove_primitive(&mut self, id: ObjectId);

    fn set_camera(&mut self, camera: &CameraFrame);

    fn resize(&mut self, size: SurfaceSize);

    /// Draw the current primitives.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the frame could not be presented.
    fn draw(&mut self) -> Result<(), BackendError>;

    /// Free buffers, textures, and the context. Called exactly once.
    fn release(&mut self);
}

/// Counts from one reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub hidden: usize,
}

/// Tracks which primitives the engine holds and what was last sent.
#[derive(Debug, Default)]
pub struct Synchronizer {
    live: HashMap<ObjectId, Primitive>,
}

impl Synchronizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile the engine with `packet`, apply the camera, and draw.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if primitive creation or the draw fails.
    pub fn apply<B: RenderBackend>(&mut self, packet: &FramePacket, backend: &mut B) -> Result<FrameStats, BackendError> {
        let mut stats = FrameStats::default();

        let current: HashSet<ObjectId> = packet.primitives.iter().map(|p| p.id).collect();
        let stale: Vec<ObjectId> = self.live.keys().filter(|id| !current.contains(id)).copied().collect();
        for id in stale {
            backend.remove_primitive(id);
            self.live.remove(&id);
            stats.removed += 1;
        }

        for primitive in &packet.primitives {
            match self.live.get(&primitive.id) {
                None => {
                    backend.create_primitive(primitive)?;
                    stats.created += 1;
                }
                Some(previous) if previous != primitive => {
                    backend.update_primitive(primitive);
                    stats.updated += 1;
                }
                Some(_) => {}
            }
            if !primitive.visible {
                stats.hidden += 1;
            }
            self.live.insert(primitive.id, primitive.clone());
        }

        backend.set_camera(&packet.camera);
        backend.draw()?;
        Ok(stats)
    }

    /// Number of primitives the engine currently holds.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
