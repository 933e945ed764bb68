//! Viewport lifecycle: acquire on mount, release on unmount.
//!
//! `Viewport` owns the engine core plus the three host collaborators (render
//! context provider, event host, frame scheduler). Every resource taken in
//! [`Viewport::mount`] (render backend, listeners, the pending frame request)
//! is returned in [`Viewport::unmount`], which also runs from `Drop`, so an
//! early teardown on any path leaves nothing behind.
//!
//! A failed mount or a failed frame puts the viewport into
//! [`ViewportStatus::Fallback`]: resources are released, input is ignored,
//! and the host shows [`Viewport::fallback_text`] instead of a canvas.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use tracing::{debug, error, info, warn};

use crate::config::ViewportConfig;
use crate::consts::MIN_SURFACE_PX;
use crate::engine::{Action, EngineCore};
use crate::error::{ViewportError, ViewportResult};
use crate::frame_loop::{FrameLoop, FrameRequest, FrameScheduler};
use crate::geom::Point;
use crate::input::{Button, Key, WheelDelta};
use crate::render::{BackendError, FramePacket, FrameStats, RenderBackend, SurfaceSize, Synchronizer};
use crate::scene::ObjectId;

/// Input listeners a mounted viewport registers with its host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    PointerDown,
    PointerMove,
    PointerUp,
    Wheel,
    KeyDown,
}

impl ListenerKind {
    pub const ALL: [Self; 5] = [Self::PointerDown, Self::PointerMove, Self::PointerUp, Self::Wheel, Self::KeyDown];
}

/// Handle returned by [`EventHost::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Host element that delivers input events.
pub trait EventHost {
    fn attach(&mut self, kind: ListenerKind) -> ListenerId;
    fn detach(&mut self, id: ListenerId);
}

/// Host capability to create a render surface.
pub trait RenderContextProvider {
    type Backend: RenderBackend;

    /// Create a render surface of `size` cleared to `background`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if no context can be created (no GPU, lost
    /// context, zero-sized element).
    fn acquire(&mut self, size: SurfaceSize, background: &str) -> Result<Self::Backend, BackendError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewportStatus {
    Unmounted,
    Running,
    /// Rendering failed; the reason is shown to the user.
    Fallback(String),
}

/// Resources held only while mounted.
struct Session<B> {
    backend: B,
    listeners: Vec<ListenerId>,
    sync: Synchronizer,
}

pub struct Viewport<P, H, S>
where
    P: RenderContextProvider,
    H: EventHost,
    S: FrameScheduler,
{
    core: EngineCore,
    provider: P,
    host: H,
    scheduler: S,
    frame_loop: FrameLoop,
    session: Option<Session<P::Backend>>,
    status: ViewportStatus,
    size: SurfaceSize,
}

impl<P, H, S> Viewport<P, H, S>
where
    P: RenderContextProvider,
    H: EventHost,
    S: FrameScheduler,
{
    #[must_use]
    pub fn new(config: ViewportConfig, provider: P, host: H, scheduler: S) -> Self {
        Self {
            core: EngineCore::new(config),
            provider,
            host,
            scheduler,
            frame_loop: FrameLoop::new(),
            session: None,
            status: ViewportStatus::Unmounted,
            size: SurfaceSize::new(MIN_SURFACE_PX, MIN_SURFACE_PX),
        }
    }

    // --- Lifecycle ---

    /// Acquire a surface of `size`, attach listeners, and start the frame loop.
    ///
    /// Mounting an already running viewport is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RenderContextUnavailable` if the provider fails; the viewport
    /// is then in the fallback state.
    pub fn mount(&mut self, size: SurfaceSize) -> ViewportResult<()> {
        if self.session.is_some() {
            return Ok(());
        }
        self.set_size(size);

        let background = self.core.config().background.clone();
        let backend = match self.provider.acquire(self.size, &background) {
            Ok(backend) => backend,
            Err(e) => {
                warn!(error = %e, width = self.size.width, height = self.size.height, "render context unavailable");
                self.status = ViewportStatus::Fallback(e.0.clone());
                return Err(ViewportError::RenderContextUnavailable(e.0));
            }
        };

        let listeners = ListenerKind::ALL.into_iter().map(|kind| self.host.attach(kind)).collect::<Vec<_>>();
        self.session = Some(Session { backend, listeners, sync: Synchronizer::new() });
        self.frame_loop.start(&mut self.scheduler);
        self.status = ViewportStatus::Running;
        info!(width = self.size.width, height = self.size.height, "viewport mounted");
        Ok(())
    }

    /// Stop the loop, detach listeners, and release the backend. Idempotent.
    pub fn unmount(&mut self) {
        self.teardown();
        if self.status == ViewportStatus::Running {
            self.status = ViewportStatus::Unmounted;
        }
    }

    /// Apply new layout dimensions. Camera pose and scene are preserved.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.set_size(SurfaceSize::new(width, height));
        if let Some(session) = self.session.as_mut() {
            session.backend.resize(self.size);
        }
        debug!(width = self.size.width, height = self.size.height, "viewport resized");
    }

    /// Run one frame for a fired scheduler request.
    ///
    /// Returns `None` when the request is stale (cancelled, superseded, or
    /// arriving after unmount) or the frame failed.
    pub fn on_frame(&mut self, request: FrameRequest) -> Option<FrameStats> {
        if !self.frame_loop.begin_frame(request) {
            return None;
        }
        let session = self.session.as_mut()?;
        let packet = FramePacket::capture(&self.core, self.size);
        match session.sync.apply(&packet, &mut session.backend) {
            Ok(stats) => {
                self.frame_loop.end_frame(&mut self.scheduler);
                Some(stats)
            }
            Err(e) => {
                error!(error = %e, "frame failed; falling back");
                self.teardown();
                self.status = ViewportStatus::Fallback(e.0);
                None
            }
        }
    }

    // --- Input (ignored unless running) ---

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, hit: Option<ObjectId>) -> Vec<Action> {
        if !self.is_running() {
            return Vec::new();
        }
        self.core.on_pointer_down(screen, button, hit)
    }

    pub fn on_pointer_move(&mut self, screen: Point) -> Vec<Action> {
        if !self.is_running() {
            return Vec::new();
        }
        self.core.on_pointer_move(screen)
    }

    pub fn on_pointer_up(&mut self, screen: Point) -> Vec<Action> {
        if !self.is_running() {
            return Vec::new();
        }
        self.core.on_pointer_up(screen)
    }

    pub fn on_wheel(&mut self, delta: WheelDelta) -> Vec<Action> {
        if !self.is_running() {
            return Vec::new();
        }
        self.core.on_wheel(delta)
    }

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        if !self.is_running() {
            return Vec::new();
        }
        self.core.on_key_down(key)
    }

    // --- Queries ---

    #[must_use]
    pub fn core(&self) -> &EngineCore {
        &self.core
    }

    /// Scene and camera access for host-side edits (panels, generators).
    pub fn core_mut(&mut self) -> &mut EngineCore {
        &mut self.core
    }

    #[must_use]
    pub fn status(&self) -> &ViewportStatus {
        &self.status
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == ViewportStatus::Running
    }

    #[must_use]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// The pending next-frame request, if the loop is waiting on one.
    #[must_use]
    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.frame_loop.pending()
    }

    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frame_loop.frames()
    }

    /// Text for the host to display in place of the canvas after a failure.
    #[must_use]
    pub fn fallback_text(&self) -> Option<String> {
        match &self.status {
            ViewportStatus::Fallback(reason) => Some(format!("3D viewport unavailable: {reason}")),
            _ => None,
        }
    }

    #[must_use]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    // --- Internals ---

    fn set_size(&mut self, size: SurfaceSize) {
        self.size = SurfaceSize::new(size.width.max(MIN_SURFACE_PX), size.height.max(MIN_SURFACE_PX));
        self.core.set_viewport(f64::from(self.size.width), f64::from(self.size.height));
    }

    fn teardown(&mut self) {
        self.frame_loop.stop(&mut self.scheduler);
        self.core.cancel_gesture();
        let Some(mut session) = self.session.take() else {
            return;
        };
        for id in session.listeners.drain(..) {
            self.host.detach(id);
        }
        session.backend.release();
        info!(primitives = session.sync.live_count(), "viewport unmounted");
    }
}

impl<P, H, S> Drop for Viewport<P, H, S>
where
    P: RenderContextProvider,
    H: EventHost,
    S: FrameScheduler,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
