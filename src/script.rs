//! Session scripts: a JSON list of steps replayed against a headless viewport.
//!
//! Objects are referred to by alias (`"as": "sofa"` on the step that creates
//! them) or by raw UUID. `hit` on a pointer-down names the object the host's
//! picking would have reported under the pointer.

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;
use viewport::engine::Action;
use viewport::geom::{Point, Vec3};
use viewport::headless::{HeadlessProvider, ManualScheduler, RecordingHost, RenderLog};
use viewport::input::{Button, Key, Tool, UnknownTool, WheelDelta};
use viewport::render::SurfaceSize;
use viewport::scene::{ObjectDraft, ObjectId, ObjectPatch};
use viewport::{Viewport, ViewportConfig, ViewportError, ViewportStatus};

pub type HeadlessViewport = Viewport<HeadlessProvider, RecordingHost, ManualScheduler>;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("invalid script: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("step {index}: {source}")]
    Step {
        index: usize,
        #[source]
        source: StepError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("unknown object `{0}`")]
    UnknownObject(String),
    #[error(transparent)]
    Tool(#[from] UnknownTool),
    #[error(transparent)]
    Viewport(#[from] ViewportError),
}

// =============================================================
// Script format
// =============================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn parse(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

impl From<ScriptButton> for Button {
    fn from(button: ScriptButton) -> Self {
        match button {
            ScriptButton::Primary => Self::Primary,
            ScriptButton::Middle => Self::Middle,
            ScriptButton::Secondary => Self::Secondary,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Create {
        #[serde(default, rename = "as")]
        alias: Option<String>,
        #[serde(default)]
        draft: ObjectDraft,
    },
    /// A generated batch; decoded by the viewport, so malformed input surfaces
    /// as a viewport error.
    Ingest {
        #[serde(default, rename = "as")]
        aliases: Vec<String>,
        batch: serde_json::Value,
    },
    Update {
        target: String,
        patch: ObjectPatch,
    },
    Delete {
        target: String,
    },
    Tool {
        tool: String,
    },
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: ScriptButton,
        #[serde(default)]
        hit: Option<String>,
        /// Alias for an object created by this press.
        #[serde(default, rename = "as")]
        alias: Option<String>,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
    Wheel {
        #[serde(default)]
        dx: f64,
        dy: f64,
    },
    Key {
        key: String,
    },
    Resize {
        width: u32,
        height: u32,
    },
    Tick {
        #[serde(default = "one")]
        count: u32,
    },
    FrameScene,
    ResetCamera,
    /// Make the next draw fail, as a lost GPU context would.
    LoseContext {
        reason: String,
    },
    Mount,
    Unmount,
}

fn one() -> u32 {
    1
}

// =============================================================
// Report
// =============================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraReport {
    pub radius: f64,
    /// Wrapped into `[0, 2π)`.
    pub theta: f64,
    pub phi: f64,
    pub target: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub from: String,
    pub to: String,
    pub distance: f64,
}

/// Final state of a replayed session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    pub frames: u64,
    pub draws: u64,
    pub live_primitives: usize,
    pub tool: String,
    pub selection: Option<String>,
    pub camera: CameraReport,
    /// Object names per category, in listing order.
    pub groups: BTreeMap<String, Vec<String>>,
    pub measurements: Vec<Measurement>,
}

// =============================================================
// Session
// =============================================================

/// A headless viewport plus the bookkeeping needed to replay scripts.
pub struct Session {
    viewport: HeadlessViewport,
    log: Rc<RefCell<RenderLog>>,
    scheduler: ManualScheduler,
    size: SurfaceSize,
    aliases: HashMap<String, ObjectId>,
    measurements: Vec<Measurement>,
}

impl Session {
    /// Build a session and mount it at `size`. A provider that cannot supply a
    /// render context leaves the session in fallback; scene edits still apply.
    pub fn new(config: ViewportConfig, provider: HeadlessProvider, size: SurfaceSize) -> Self {
        let log = provider.log();
        let scheduler = ManualScheduler::new();
        let viewport = Viewport::new(config, provider, RecordingHost::new(), scheduler.clone());
        let mut session = Self {
            viewport,
            log,
            scheduler,
            size,
            aliases: HashMap::new(),
            measurements: Vec::new(),
        };
        session.mount();
        session
    }

    pub fn viewport(&self) -> &HeadlessViewport {
        &self.viewport
    }

    /// Replay every step in order, stopping at the first failure.
    pub fn run(&mut self, script: &Script) -> Result<(), ScriptError> {
        for (index, step) in script.steps.iter().enumerate() {
            self.step(step).map_err(|source| ScriptError::Step { index, source })?;
        }
        info!(steps = script.steps.len(), frames = self.viewport.frames_rendered(), "script replayed");
        Ok(())
    }

    fn step(&mut self, step: &Step) -> Result<(), StepError> {
        debug!(?step, "replaying step");
        match step {
            Step::Create { alias, draft } => {
                let id = self.viewport.core_mut().create_object(draft.clone());
                self.bind(alias.as_deref(), id);
            }
            Step::Ingest { aliases, batch } => {
                let ids = self.viewport.core_mut().ingest_generated(&batch.to_string())?;
                for (alias, id) in aliases.iter().zip(ids) {
                    self.bind(Some(alias), id);
                }
            }
            Step::Update { target, patch } => {
                let id = self.resolve(target)?;
                self.viewport.core_mut().update_object(&id, patch)?;
            }
            Step::Delete { target } => {
                let id = self.resolve(target)?;
                self.viewport.core_mut().delete_object(&id)?;
            }
            Step::Tool { tool } => {
                let tool: Tool = tool.parse()?;
                self.viewport.core_mut().set_tool(tool);
            }
            Step::PointerDown { x, y, button, hit, alias } => {
                let hit = hit.as_deref().map(|name| self.resolve(name)).transpose()?;
                let actions = self.viewport.on_pointer_down(Point::new(*x, *y), (*button).into(), hit);
                if let Some(id) = created(&actions) {
                    self.bind(alias.as_deref(), id);
                }
                self.record(&actions);
            }
            Step::PointerMove { x, y } => {
                let actions = self.viewport.on_pointer_move(Point::new(*x, *y));
                self.record(&actions);
            }
            Step::PointerUp { x, y } => {
                let actions = self.viewport.on_pointer_up(Point::new(*x, *y));
                self.record(&actions);
            }
            Step::Wheel { dx, dy } => {
                let actions = self.viewport.on_wheel(WheelDelta { dx: *dx, dy: *dy });
                self.record(&actions);
            }
            Step::Key { key } => {
                let actions = self.viewport.on_key_down(&Key(key.clone()));
                self.record(&actions);
            }
            Step::Resize { width, height } => {
                self.size = SurfaceSize::new(*width, *height);
                self.viewport.resize(*width, *height);
            }
            Step::Tick { count } => self.tick(*count),
            Step::FrameScene => {
                self.viewport.core_mut().frame_scene();
            }
            Step::ResetCamera => {
                self.viewport.core_mut().reset_camera();
            }
            Step::LoseContext { reason } => {
                self.log.borrow_mut().fail_next_draw = Some(reason.clone());
            }
            Step::Mount => self.mount(),
            Step::Unmount => self.viewport.unmount(),
        }
        Ok(())
    }

    /// Fire up to `count` due frames. Stops early once nothing is scheduled.
    fn tick(&mut self, count: u32) {
        for _ in 0..count {
            let Some(due) = self.scheduler.next_due() else {
                debug!("no frame scheduled");
                return;
            };
            self.viewport.on_frame(due);
        }
    }

    fn mount(&mut self) {
        if let Err(e) = self.viewport.mount(self.size) {
            warn!(error = %e, code = e.error_code(), "session continuing without render context");
        }
    }

    fn bind(&mut self, alias: Option<&str>, id: ObjectId) {
        if let Some(alias) = alias {
            self.aliases.insert(alias.to_owned(), id);
        }
    }

    fn resolve(&self, name: &str) -> Result<ObjectId, StepError> {
        if let Some(id) = self.aliases.get(name) {
            return Ok(*id);
        }
        Uuid::parse_str(name).map_err(|_| StepError::UnknownObject(name.to_owned()))
    }

    fn record(&mut self, actions: &[Action]) {
        for action in actions {
            if let Action::Measured { from, to, distance } = action {
                let measurement = Measurement { from: self.label(from), to: self.label(to), distance: *distance };
                info!(from = %measurement.from, to = %measurement.to, distance, "measured");
                self.measurements.push(measurement);
            }
        }
    }

    fn label(&self, id: &ObjectId) -> String {
        self.viewport.core().object(id).map_or_else(|| id.to_string(), |obj| obj.name.clone())
    }

    /// Snapshot the session for output.
    pub fn report(&self) -> Report {
        let core = self.viewport.core();
        let pose = core.camera.pose();
        let (status, fallback) = match self.viewport.status() {
            ViewportStatus::Unmounted => ("unmounted", None),
            ViewportStatus::Running => ("running", None),
            ViewportStatus::Fallback(_) => ("fallback", self.viewport.fallback_text()),
        };
        let groups = core
            .grouped()
            .into_iter()
            .map(|(category, ids)| (category.to_string(), ids.iter().map(|id| self.label(id)).collect()))
            .collect();
        let log = self.log.borrow();
        Report {
            status: status.to_owned(),
            fallback,
            frames: self.viewport.frames_rendered(),
            draws: log.draws,
            live_primitives: log.primitives.len(),
            tool: core.ui.tool.to_string(),
            selection: core.selection().map(|id| self.label(&id)),
            camera: CameraReport {
                radius: pose.radius,
                theta: pose.display_theta(),
                phi: pose.phi,
                target: pose.target,
            },
            groups,
            measurements: self.measurements.clone(),
        }
    }
}

fn created(actions: &[Action]) -> Option<ObjectId> {
    actions.iter().find_map(|action| match action {
        Action::ObjectCreated(id) => Some(*id),
        _ => None,
    })
}
