//! Commands and types used throughout winzo.
//!
//! This module defines the vocabulary that all components share:
//! [`Command`] describes every input the controller reacts to, both
//! user-initiated preset toggles and notifications forwarded by the host,
//! and [`WindowId`] identifies the window they concern.

use crate::geometry::Geometry;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque identity of a window, stable for the window's lifetime.
///
/// On Hyprland this is the client address (e.g. `"0x55d1c0a8e2f0"`).
/// On the wire either a string or a non-negative integer is accepted;
/// integers are normalised to their decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct WindowId(pub String);

impl WindowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'de> Deserialize<'de> for WindowId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = WindowId;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "window id as string or non-negative integer")
            }
            fn visit_u64<E>(self, n: u64) -> Result<WindowId, E> {
                Ok(WindowId(n.to_string()))
            }
            fn visit_str<E>(self, s: &str) -> Result<WindowId, E>
            where
                E: DeError,
            {
                let s = s.trim();
                if s.is_empty() {
                    return Err(DeError::custom("window id must not be empty"));
                }
                Ok(WindowId(s.to_string()))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// Every input the [`Controller`](crate::controller::Controller) handles.
///
/// Commands are produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations and consumed on a single thread, one at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Toggle the named preset on the focused window.
    ///
    /// The first invocation snaps the window to the preset geometry, a
    /// second invocation of the same preset restores the window, and a
    /// different preset retargets the window without losing the restore
    /// point.
    Toggle(String),

    /// The frame geometry of `window` changed, for any reason.
    GeometryChanged { window: WindowId, geometry: Geometry },

    /// An interactive move/resize of `window` started (`active: true`) or
    /// finished (`active: false`).
    MoveResizeChanged { window: WindowId, active: bool },

    /// `window` was closed.
    WindowClosed(WindowId),
}
