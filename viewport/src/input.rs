//! Input model: tools, placeable shapes, and the drag state machine.
//!
//! `Tool` captures the user's intent at the time of a pointer event.
//! `InputState` is the gesture tracked between pointer-down and pointer-up,
//! carrying the last pointer position needed to compute incremental deltas.
//! `UiState` is the persistent selection/tool state visible to the host.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::fmt;
use std::str::FromStr;

use crate::geom::Point;
use crate::scene::{Category, ObjectId};

/// A placeable primitive offered by the create tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Cube,
    Sphere,
    Cylinder,
    Cone,
    Wall,
    Door,
    Window,
    Table,
    Chair,
    Sofa,
    Tree,
    Rock,
}

impl Shape {
    /// Toolbar order.
    pub const ALL: [Self; 12] = [
        Self::Cube,
        Self::Sphere,
        Self::Cylinder,
        Self::Cone,
        Self::Wall,
        Self::Door,
        Self::Window,
        Self::Table,
        Self::Chair,
        Self::Sofa,
        Self::Tree,
        Self::Rock,
    ];

    /// The `type` tag stored on created objects.
    #[must_use]
    pub fn kind(self) -> &'static str {
        match self {
            Self::Cube => "cube",
            Self::Sphere => "sphere",
            Self::Cylinder => "cylinder",
            Self::Cone => "cone",
            Self::Wall => "wall",
            Self::Door => "door",
            Self::Window => "window",
            Self::Table => "table",
            Self::Chair => "chair",
            Self::Sofa => "sofa",
            Self::Tree => "tree",
            Self::Rock => "rock",
        }
    }

    /// The category a freshly placed shape belongs to.
    #[must_use]
    pub fn category(self) -> Category {
        match self {
            Self::Cube | Self::Sphere | Self::Cylinder | Self::Cone => Category::Basic,
            Self::Wall | Self::Door | Self::Window => Category::Architecture,
            Self::Table | Self::Chair | Self::Sofa => Category::Furniture,
            Self::Tree | Self::Rock => Category::Landscape,
        }
    }
}

/// A tool or shape name that matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tool: {0}")]
pub struct UnknownTool(pub String);

impl FromStr for Shape {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|shape| shape.kind() == s)
            .ok_or_else(|| UnknownTool(s.to_owned()))
    }
}

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Click selects, drag on an object moves it, drag on empty space orbits (default).
    #[default]
    Select,
    /// Every drag orbits the camera.
    Orbit,
    /// Click places a new object of the given shape.
    Create(Shape),
    /// Two successive object clicks report the distance between them.
    Measure,
}

impl Tool {
    /// Whether a drag on empty space with this tool steers the camera.
    #[must_use]
    pub fn orbits_camera(self) -> bool {
        matches!(self, Self::Select | Self::Orbit)
    }

    /// Whether this tool can pick up and move objects.
    #[must_use]
    pub fn manipulates_objects(self) -> bool {
        matches!(self, Self::Select)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => f.write_str("select"),
            Self::Orbit => f.write_str("orbit"),
            Self::Create(shape) => write!(f, "create:{}", shape.kind()),
            Self::Measure => f.write_str("measure"),
        }
    }
}

/// Parses `select`, `orbit`, `measure`, or `create:<shape>`.
impl FromStr for Tool {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "select" => Ok(Self::Select),
            "orbit" => Ok(Self::Orbit),
            "measure" => Ok(Self::Measure),
            _ => match s.strip_prefix("create:") {
                Some(kind) => kind.parse().map(Self::Create).map_err(|_| UnknownTool(s.to_owned())),
                None => Err(UnknownTool(s.to_owned())),
            },
        }
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the host (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta. Positive `dy` scrolls down (zooms out).
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    pub dx: f64,
    pub dy: f64,
}

/// What an in-progress drag is steering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Camera,
    Object(ObjectId),
}

/// Persistent UI state visible to the host.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// The id of the currently selected object, if any. Always live or `None`.
    pub selected_id: Option<ObjectId>,
    /// First object picked by the measure tool, awaiting a second click.
    pub measure_from: Option<ObjectId>,
}

/// Gesture state between pointer-down and pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A drag started with `tool` is steering `target`.
    Dragging {
        tool: Tool,
        target: DragTarget,
        /// Screen position of the previous pointer event. Only valid while dragging.
        last_screen: Point,
    },
}

impl InputState {
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    #[must_use]
    pub fn last_pointer(&self) -> Option<Point> {
        match self {
            Self::Idle => None,
            Self::Dragging { last_screen, .. } => Some(*last_screen),
        }
    }
}
