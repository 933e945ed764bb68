//! Interactive scene viewport for the design dashboard.
//!
//! This crate owns the viewport's core: the scene graph of placed objects,
//! selection/visibility/lock bookkeeping, the orbit camera that turns pointer
//! and wheel input into a view transform, and the frame loop that keeps an
//! external render engine in sync with both. The host UI is responsible only
//! for delivering events, firing frame callbacks, and providing a render
//! context; everything else is decided here.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`viewport`] | Lifecycle manager: mount, resize, unmount, fallback |
//! | [`engine`] | Testable [`engine::EngineCore`]: tool routing and selection |
//! | [`scene`] | Scene objects, categories, and the insertion-ordered store |
//! | [`camera`] | Orbit camera pose and view transform |
//! | [`input`] | Tools, shapes, and the drag state machine |
//! | [`render`] | Render-engine contract and per-frame reconcile |
//! | [`frame_loop`] | Self-rescheduling frame loop and scheduler trait |
//! | [`headless`] | In-memory render engine, event host, and scheduler |
//! | [`config`] | Sensitivities and clamp bounds, from env or JSON |
//! | [`error`] | Error taxonomy |
//! | [`geom`] | `Point` and `Vec3` |
//! | [`consts`] | Shared numeric defaults |

pub mod camera;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod frame_loop;
pub mod geom;
pub mod headless;
pub mod input;
pub mod render;
pub mod scene;
pub mod viewport;

pub use config::ViewportConfig;
pub use error::{ViewportError, ViewportResult};
pub use viewport::{Viewport, ViewportStatus};
