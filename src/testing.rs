//! In-memory [`WindowEnvironment`] shared by the registry and controller
//! tests.

use crate::command::WindowId;
use crate::geometry::{Geometry, WorkspaceSize};
use crate::traits::{Notification, Subscription, WindowEnvironment};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct FakeWindow {
    geometry: Geometry,
    desktop: bool,
}

/// Record-keeping fake host.
///
/// Windows live in a table, geometry writes are applied and logged, and
/// live subscriptions are tracked so tests can assert they were disposed.
/// Individual host calls can be made to fail.
#[derive(Debug)]
pub(crate) struct FakeEnv {
    windows: RefCell<HashMap<WindowId, FakeWindow>>,
    focused: RefCell<Option<WindowId>>,
    workspace: WorkspaceSize,
    pub writes: RefCell<Vec<(WindowId, Geometry)>>,
    live: RefCell<HashMap<u64, (WindowId, Notification)>>,
    next_id: Cell<u64>,
    pub unsubscribe_calls: Cell<usize>,
    pub fail_set_geometry: Cell<bool>,
    /// Apply the size of a write, then fail before moving.
    pub fail_move_after_resize: Cell<bool>,
    pub fail_subscribe: Cell<Option<Notification>>,
    pub fail_unsubscribe: Cell<bool>,
}

#[derive(Debug, thiserror::Error)]
#[error("fake host error: {0}")]
pub(crate) struct FakeError(pub String);

impl FakeEnv {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            windows: RefCell::new(HashMap::new()),
            focused: RefCell::new(None),
            workspace: WorkspaceSize::new(width, height),
            writes: RefCell::new(Vec::new()),
            live: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
            unsubscribe_calls: Cell::new(0),
            fail_set_geometry: Cell::new(false),
            fail_move_after_resize: Cell::new(false),
            fail_subscribe: Cell::new(None),
            fail_unsubscribe: Cell::new(false),
        }
    }

    /// Add a regular window and focus it.
    pub fn add_window(&self, id: &str, geometry: Geometry) -> WindowId {
        self.insert(id, geometry, false)
    }

    /// Add a desktop surface and focus it.
    pub fn add_desktop(&self, id: &str, geometry: Geometry) -> WindowId {
        self.insert(id, geometry, true)
    }

    fn insert(&self, id: &str, geometry: Geometry, desktop: bool) -> WindowId {
        let window = WindowId::new(id);
        self.windows
            .borrow_mut()
            .insert(window.clone(), FakeWindow { geometry, desktop });
        self.focus(Some(&window));
        window
    }

    pub fn focus(&self, window: Option<&WindowId>) {
        *self.focused.borrow_mut() = window.cloned();
    }

    /// Simulate the user dragging the window somewhere else.
    pub fn user_moves(&self, window: &WindowId, geometry: Geometry) {
        if let Some(w) = self.windows.borrow_mut().get_mut(window) {
            w.geometry = geometry;
        }
    }

    pub fn current(&self, window: &WindowId) -> Geometry {
        self.windows.borrow()[window].geometry
    }

    /// Kinds of the live subscriptions for `window`, sorted for comparison.
    pub fn live_for(&self, window: &WindowId) -> Vec<Notification> {
        let mut kinds: Vec<Notification> = self
            .live
            .borrow()
            .values()
            .filter(|(w, _)| w == window)
            .map(|(_, k)| *k)
            .collect();
        kinds.sort_by_key(|k| *k as u8);
        kinds
    }

    pub fn live_count(&self) -> usize {
        self.live.borrow().len()
    }
}

impl WindowEnvironment for FakeEnv {
    type Error = FakeError;

    fn focused_window(&self) -> Result<Option<WindowId>, FakeError> {
        Ok(self.focused.borrow().clone())
    }

    fn geometry(&self, window: &WindowId) -> Result<Geometry, FakeError> {
        self.windows
            .borrow()
            .get(window)
            .map(|w| w.geometry)
            .ok_or_else(|| FakeError(format!("no such window {}", window)))
    }

    fn set_geometry(&self, window: &WindowId, geometry: Geometry) -> Result<(), FakeError> {
        if self.fail_set_geometry.get() {
            return Err(FakeError("geometry write rejected".into()));
        }
        let mut windows = self.windows.borrow_mut();
        let w = windows
            .get_mut(window)
            .ok_or_else(|| FakeError(format!("no such window {}", window)))?;
        if self.fail_move_after_resize.get() {
            w.geometry = w.geometry.with_size_of(&geometry);
            return Err(FakeError("move rejected".into()));
        }
        w.geometry = geometry;
        self.writes.borrow_mut().push((window.clone(), geometry));
        Ok(())
    }

    fn is_desktop_surface(&self, window: &WindowId) -> Result<bool, FakeError> {
        Ok(self
            .windows
            .borrow()
            .get(window)
            .map(|w| w.desktop)
            .unwrap_or(false))
    }

    fn workspace_size(&self) -> Result<WorkspaceSize, FakeError> {
        Ok(self.workspace)
    }

    fn subscribe(&self, window: &WindowId, kind: Notification) -> Result<Subscription, FakeError> {
        if self.fail_subscribe.get() == Some(kind) {
            return Err(FakeError(format!("cannot subscribe to {}", kind)));
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.live.borrow_mut().insert(id, (window.clone(), kind));
        Ok(Subscription::new(id, window.clone(), kind))
    }

    fn unsubscribe(&self, subscription: Subscription) -> Result<(), FakeError> {
        self.unsubscribe_calls.set(self.unsubscribe_calls.get() + 1);
        if self.fail_unsubscribe.get() {
            return Err(FakeError("unsubscribe rejected".into()));
        }
        self.live
            .borrow_mut()
            .remove(&subscription.id())
            .map(|_| ())
            .ok_or_else(|| FakeError(format!("subscription {} disposed twice", subscription.id())))
    }
}
