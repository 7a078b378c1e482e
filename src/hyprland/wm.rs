//! [`WindowEnvironment`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`,
//! avoiding any shell command invocation or third-party crate for socket
//! discovery.

use crate::command::WindowId;
use crate::geometry::{Geometry, WorkspaceSize};
use crate::traits::{Notification, Subscription, WindowEnvironment};
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::sync::{Arc, Mutex, MutexGuard};

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandEnvError(String);

//  Subscription table

#[derive(Debug, Default)]
struct TableInner {
    next_id: u64,
    live: HashMap<u64, (WindowId, Notification)>,
}

/// Live subscriptions, shared between the environment (which hands them
/// out) and the [`HyprlandEventSource`](super::events::HyprlandEventSource)
/// (which only forwards events someone subscribed to).
#[derive(Debug, Clone, Default)]
pub struct SubscriptionTable {
    inner: Arc<Mutex<TableInner>>,
}

impl SubscriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TableInner> {
        // A panic while holding the lock leaves the map itself consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn insert(&self, window: &WindowId, kind: Notification) -> u64 {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.live.insert(id, (window.clone(), kind));
        id
    }

    fn remove(&self, id: u64) -> bool {
        self.lock().live.remove(&id).is_some()
    }

    /// Whether anyone listens to `kind` notifications of `window`.
    pub fn contains(&self, window: &WindowId, kind: Notification) -> bool {
        self.lock()
            .live
            .values()
            .any(|(w, k)| w == window && *k == kind)
    }

    pub fn len(&self) -> usize {
        self.lock().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//  Environment

/// Hyprland-backed window environment.
///
/// All communication happens over Hyprland's IPC socket.  No child processes
/// are spawned.
pub struct HyprlandEnv {
    desktop_classes: Vec<String>,
    subscriptions: SubscriptionTable,
}

impl HyprlandEnv {
    /// Create a new handle.
    ///
    /// Clients whose class is listed in `desktop_classes` are reported as
    /// desktop surfaces.  No connection is opened eagerly; each method call
    /// opens a short-lived IPC request.
    pub fn new(desktop_classes: Vec<String>) -> Self {
        Self {
            desktop_classes,
            subscriptions: SubscriptionTable::new(),
        }
    }

    /// The subscription table, to be shared with the event source.
    pub fn subscriptions(&self) -> SubscriptionTable {
        self.subscriptions.clone()
    }

    fn client(&self, window: &WindowId) -> Result<ClientJson, HyprlandEnvError> {
        let json = ipc_json("clients")?;
        let clients: Vec<ClientJson> =
            serde_json::from_str(&json).map_err(|e| HyprlandEnvError(format!("parse: {}", e)))?;
        clients
            .into_iter()
            .find(|c| c.address == window.as_str())
            .ok_or_else(|| HyprlandEnvError(format!("unknown window: {}", window)))
    }
}

//  Direct Hyprland IPC helpers

/// Send a raw command to the Hyprland command socket and return the
/// response as a string.
fn ipc_request(command: &str) -> Result<String, HyprlandEnvError> {
    let path = super::socket_path(".socket.sock").map_err(HyprlandEnvError)?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandEnvError(format!("connect to {}: {}", path.display(), e)))?;

    stream
        .write_all(command.as_bytes())
        .map_err(|e| HyprlandEnvError(format!("write: {}", e)))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandEnvError(format!("read: {}", e)))?;

    String::from_utf8(response).map_err(|e| HyprlandEnvError(format!("utf-8: {}", e)))
}

/// Send a JSON data query (`j/<command>`) and return the raw JSON string.
fn ipc_json(data_command: &str) -> Result<String, HyprlandEnvError> {
    ipc_request(&format!("j/{}", data_command))
}

/// Send a dispatch command and check for `"ok"`.
fn ipc_dispatch(args: &str) -> Result<(), HyprlandEnvError> {
    debug!("dispatch {}", args);
    let response = ipc_request(&format!("/dispatch {}", args))?;
    if response.trim() == "ok" {
        Ok(())
    } else {
        Err(HyprlandEnvError(format!("dispatch error: {}", response)))
    }
}

//  Minimal serde structs for the JSON we care about

/// Subset of the JSON object returned by `j/clients` and `j/activewindow`.
#[derive(Deserialize)]
struct ClientJson {
    address: String,
    at: [f64; 2],
    size: [f64; 2],
    #[serde(default)]
    class: String,
    #[serde(default)]
    floating: bool,
}

impl ClientJson {
    fn geometry(&self) -> Geometry {
        Geometry::new(self.at[0], self.at[1], self.size[0], self.size[1])
    }
}

/// Subset of the JSON object returned by `j/monitors`.
#[derive(Deserialize)]
struct MonitorJson {
    width: u32,
    height: u32,
    #[serde(default = "unit_scale")]
    scale: f64,
    #[serde(default)]
    focused: bool,
}

fn unit_scale() -> f64 {
    1.0
}

/// Logical size of the focused monitor, or of the first one if none is
/// marked focused.
fn focused_workspace(monitors: &[MonitorJson]) -> Option<WorkspaceSize> {
    let m = monitors
        .iter()
        .find(|m| m.focused)
        .or_else(|| monitors.first())?;
    let scale = if m.scale > 0.0 { m.scale } else { 1.0 };
    Some(WorkspaceSize::new(
        m.width as f64 / scale,
        m.height as f64 / scale,
    ))
}

/// Dispatch arguments that resize and then move `window` to `geometry`.
///
/// Tiled windows ignore pixel moves and resizes, so they are made floating
/// first.
fn geometry_dispatches(window: &WindowId, geometry: Geometry, floating: bool) -> Vec<String> {
    let mut dispatches = Vec::with_capacity(3);
    if !floating {
        dispatches.push(format!("setfloating address:{}", window));
    }
    dispatches.push(format!(
        "resizewindowpixel exact {} {},address:{}",
        geometry.width.round() as i64,
        geometry.height.round() as i64,
        window
    ));
    dispatches.push(format!(
        "movewindowpixel exact {} {},address:{}",
        geometry.x.round() as i64,
        geometry.y.round() as i64,
        window
    ));
    dispatches
}

//  WindowEnvironment implementation

impl WindowEnvironment for HyprlandEnv {
    type Error = HyprlandEnvError;

    fn focused_window(&self) -> Result<Option<WindowId>, Self::Error> {
        let json = ipc_json("activewindow")?;
        // Hyprland returns an empty object `{}` when no window is focused.
        if json.trim() == "{}" {
            return Ok(None);
        }
        let w: ClientJson =
            serde_json::from_str(&json).map_err(|e| HyprlandEnvError(format!("parse: {}", e)))?;
        Ok(Some(WindowId::new(w.address)))
    }

    fn geometry(&self, window: &WindowId) -> Result<Geometry, Self::Error> {
        Ok(self.client(window)?.geometry())
    }

    fn set_geometry(&self, window: &WindowId, geometry: Geometry) -> Result<(), Self::Error> {
        let floating = self.client(window)?.floating;
        for args in geometry_dispatches(window, geometry, floating) {
            ipc_dispatch(&args)?;
        }
        Ok(())
    }

    fn is_desktop_surface(&self, window: &WindowId) -> Result<bool, Self::Error> {
        if self.desktop_classes.is_empty() {
            return Ok(false);
        }
        let client = self.client(window)?;
        Ok(self.desktop_classes.iter().any(|c| *c == client.class))
    }

    fn workspace_size(&self) -> Result<WorkspaceSize, Self::Error> {
        let json = ipc_json("monitors")?;
        let monitors: Vec<MonitorJson> =
            serde_json::from_str(&json).map_err(|e| HyprlandEnvError(format!("parse: {}", e)))?;
        focused_workspace(&monitors).ok_or_else(|| HyprlandEnvError("no monitors".into()))
    }

    fn subscribe(
        &self,
        window: &WindowId,
        kind: Notification,
    ) -> Result<Subscription, Self::Error> {
        let id = self.subscriptions.insert(window, kind);
        debug!("subscribed #{} to {} of {}", id, kind, window);
        Ok(Subscription::new(id, window.clone(), kind))
    }

    fn unsubscribe(&self, subscription: Subscription) -> Result<(), Self::Error> {
        if self.subscriptions.remove(subscription.id()) {
            debug!("unsubscribed #{}", subscription.id());
            Ok(())
        } else {
            Err(HyprlandEnvError(format!(
                "subscription #{} is not live",
                subscription.id()
            )))
        }
    }
}

//  Tests
