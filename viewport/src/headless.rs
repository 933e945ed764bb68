//! In-memory host collaborators: a render engine that records what it is
//! given, an event host that tracks attached listeners, and a frame scheduler
//! driven by hand.
//!
//! Each collaborator shares its state through an `Rc<RefCell<_>>` handle, so
//! the caller can keep a clone and inspect teardown after the viewport that
//! owns the original is gone.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::rc::Rc;

use crate::frame_loop::{FrameRequest, FrameScheduler};
use crate::render::{BackendError, CameraFrame, Primitive, RenderBackend, SurfaceSize};
use crate::scene::ObjectId;
use crate::viewport::{EventHost, ListenerId, ListenerKind, RenderContextProvider};

// =============================================================
// Render engine
// =============================================================

/// Everything the headless engine has been told.
#[derive(Debug, Default)]
pub struct RenderLog {
    pub primitives: BTreeMap<ObjectId, Primitive>,
    pub camera: Option<CameraFrame>,
    pub size: Option<SurfaceSize>,
    pub background: String,
    pub draws: u64,
    pub contexts_acquired: u64,
    pub contexts_released: u64,
    /// When set, the next `draw` fails with this message.
    pub fail_next_draw: Option<String>,
}

/// Provider that hands out [`HeadlessBackend`]s, or refuses to.
#[derive(Debug, Clone, Default)]
pub struct HeadlessProvider {
    log: Rc<RefCell<RenderLog>>,
    unavailable: Option<String>,
}

impl HeadlessProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every `acquire` fails with `reason`.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self { log: Rc::default(), unavailable: Some(reason.into()) }
    }

    /// Shared view of the render log.
    #[must_use]
    pub fn log(&self) -> Rc<RefCell<RenderLog>> {
        Rc::clone(&self.log)
    }
}

impl RenderContextProvider for HeadlessProvider {
    type Backend = HeadlessBackend;

    fn acquire(&mut self, size: SurfaceSize, background: &str) -> Result<HeadlessBackend, BackendError> {
        if let Some(reason) = &self.unavailable {
            return Err(BackendError(reason.clone()));
        }
        let mut log = self.log.borrow_mut();
        log.contexts_acquired += 1;
        log.size = Some(size);
        background.clone_into(&mut log.background);
        Ok(HeadlessBackend { log: Rc::clone(&self.log) })
    }
}

#[derive(Debug)]
pub struct HeadlessBackend {
    log: Rc<RefCell<RenderLog>>,
}

impl RenderBackend for HeadlessBackend {
    fn create_primitive(&mut self, primitive: &Primitive) -> Result<(), BackendError> {
        self.log.borrow_mut().primitives.insert(primitive.id, primitive.clone());
        Ok(())
    }

    fn update_primitive(&mut self, primitive: &Primitive) {
        self.log.borrow_mut().primitives.insert(primitive.id, primitive.clone());
    }

    fn remove_primitive(&mut self, id: ObjectId) {
        self.log.borrow_mut().primitives.remove(&id);
    }

    fn set_camera(&mut self, camera: &CameraFrame) {
        self.log.borrow_mut().camera = Some(*camera);
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.log.borrow_mut().size = Some(size);
    }

    fn draw(&mut self) -> Result<(), BackendError> {
        let mut log = self.log.borrow_mut();
        if let Some(reason) = log.fail_next_draw.take() {
            return Err(BackendError(reason));
        }
        log.draws += 1;
        Ok(())
    }

    fn release(&mut self) {
        let mut log = self.log.borrow_mut();
        log.primitives.clear();
        log.contexts_released += 1;
    }
}

// =============================================================
// Event host
// =============================================================

#[derive(Debug, Default)]
pub struct ListenerLog {
    pub attached: BTreeMap<u64, ListenerKind>,
    pub next_id: u64,
}

/// Event host that only records attach/detach.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    log: Rc<RefCell<ListenerLog>>,
}

impl RecordingHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of listeners currently attached.
    #[must_use]
    pub fn attached(&self) -> usize {
        self.log.borrow().attached.len()
    }

    /// Kinds of the listeners currently attached, in attach order.
    #[must_use]
    pub fn attached_kinds(&self) -> Vec<ListenerKind> {
        self.log.borrow().attached.values().copied().collect()
    }
}

impl EventHost for RecordingHost {
    fn attach(&mut self, kind: ListenerKind) -> ListenerId {
        let mut log = self.log.borrow_mut();
        log.next_id += 1;
        let id = log.next_id;
        log.attached.insert(id, kind);
        ListenerId(id)
    }

    fn detach(&mut self, id: ListenerId) {
        self.log.borrow_mut().attached.remove(&id.0);
    }
}

// =============================================================
// Frame scheduler
// =============================================================

#[derive(Debug, Default)]
struct SchedulerState {
    queue: VecDeque<FrameRequest>,
    cancelled: HashSet<FrameRequest>,
    next_id: u64,
}

/// Scheduler whose callbacks fire only when the caller pops them.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next due request, skipping cancelled ones.
    #[must_use]
    pub fn next_due(&self) -> Option<FrameRequest> {
        let mut state = self.state.borrow_mut();
        while let Some(request) = state.queue.pop_front() {
            if !state.cancelled.remove(&request) {
                return Some(request);
            }
        }
        None
    }

    /// Requests waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        let state = self.state.borrow();
        state.queue.iter().filter(|r| !state.cancelled.contains(*r)).count()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let request = FrameRequest(state.next_id);
        state.queue.push_back(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let mut state = self.state.borrow_mut();
        if state.queue.contains(&request) {
            state.cancelled.insert(request);
        }
    }
}
