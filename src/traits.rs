//! Core traits that decouple winzo from any specific window manager or
//! transport mechanism.
//!
//! Every concrete backend (Hyprland, a Unix-socket listener, a test harness,
//! …) implements one of these traits.  The
//! [`ControlRegistry`](crate::registry::ControlRegistry) and the
//! [`Controller`](crate::controller::Controller) only depend on these
//! abstractions.

use crate::command::{Command, WindowId};
use crate::geometry::{Geometry, WorkspaceSize};
use std::fmt;
use std::sync::mpsc;

/// Kinds of per-window notifications a controller can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    /// The frame geometry changed.
    Geometry,
    /// An interactive move/resize started or finished.
    MoveResize,
    /// The window was closed.
    Closed,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Geometry => write!(f, "geometry"),
            Notification::MoveResize => write!(f, "move-resize"),
            Notification::Closed => write!(f, "closed"),
        }
    }
}

/// A live subscription handed out by [`WindowEnvironment::subscribe`].
///
/// The token is intentionally not `Clone`: [`WindowEnvironment::unsubscribe`]
/// consumes it, so a subscription can be disposed at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
    window: WindowId,
    kind: Notification,
}

impl Subscription {
    /// Create a token.  Only environments should call this.
    pub fn new(id: u64, window: WindowId, kind: Notification) -> Self {
        Self { id, window, kind }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn window(&self) -> &WindowId {
        &self.window
    }

    pub fn kind(&self) -> Notification {
        self.kind
    }
}

/// Abstraction over the host window environment.
///
/// An implementation might talk to Hyprland via IPC, or it might be an
/// in-memory double used in tests.  All methods take `&self`; backends that
/// need to record state use interior mutability.
pub trait WindowEnvironment {
    /// The error type produced by this environment.
    type Error: std::error::Error + Send + 'static;

    /// Return the currently focused window, or `None` if nothing is focused.
    fn focused_window(&self) -> Result<Option<WindowId>, Self::Error>;

    /// Return the current frame geometry of `window`.
    fn geometry(&self, window: &WindowId) -> Result<Geometry, Self::Error>;

    /// Move and resize `window` to `geometry`.
    fn set_geometry(&self, window: &WindowId, geometry: Geometry) -> Result<(), Self::Error>;

    /// Whether `window` is a desktop/background surface that must never be
    /// managed.
    fn is_desktop_surface(&self, window: &WindowId) -> Result<bool, Self::Error>;

    /// Size of the workspace presets are computed against.
    fn workspace_size(&self) -> Result<WorkspaceSize, Self::Error>;

    /// Start delivering `kind` notifications for `window`.
    fn subscribe(&self, window: &WindowId, kind: Notification)
        -> Result<Subscription, Self::Error>;

    /// Stop delivering the notifications behind `subscription`.
    fn unsubscribe(&self, subscription: Subscription) -> Result<(), Self::Error>;
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport (a Unix socket, Hyprland's
/// event socket, an in-memory channel, …) and forward parsed commands
/// into the provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    ///
    /// This method blocks the calling thread.  To run multiple sources
    /// concurrently, spawn each one on its own thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
