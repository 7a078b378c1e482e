//! Window geometry and the presets that compute target geometries.
//!
//! A [`Geometry`] is a plain value in desktop coordinates.  A [`Preset`]
//! turns the current [`WorkspaceSize`] into the geometry a managed window
//! should snap to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position and size of a window frame in desktop coordinates.
///
/// Equality compares exactly the four fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Keep this geometry's position but take the size of `other`.
    pub fn with_size_of(self, other: &Geometry) -> Self {
        Self {
            width: other.width,
            height: other.height,
            ..self
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.x, self.y
        )
    }
}

/// Usable size of the current workspace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSize {
    pub width: f64,
    pub height: f64,
}

impl WorkspaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A named way of computing a target geometry from the workspace size.
///
/// # Example
///
/// ```json
/// { "kind": "padded", "padding": 100 }
/// { "kind": "fixed", "width": 1280, "height": 720 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Preset {
    /// Workspace size minus `padding` on each axis, centered.
    ///
    /// `dock_offset` additionally shrinks the height and shifts the window
    /// up by that amount, leaving room for a dock along the bottom edge.
    Padded {
        padding: f64,
        #[serde(default)]
        dock_offset: f64,
    },

    /// An explicit size, centered in the workspace.
    Fixed { width: f64, height: f64 },
}

impl Preset {
    /// Compute the target geometry for a workspace of the given size.
    pub fn geometry(&self, workspace: WorkspaceSize) -> Geometry {
        match *self {
            Preset::Padded {
                padding,
                dock_offset,
            } => {
                let width = workspace.width - padding;
                let height = workspace.height - padding - dock_offset;
                Geometry {
                    x: (workspace.width - width) / 2.0,
                    y: (workspace.height - height) / 2.0 - dock_offset,
                    width,
                    height,
                }
            }
            Preset::Fixed { width, height } => Geometry {
                x: (workspace.width - width) / 2.0,
                y: (workspace.height - height) / 2.0,
                width,
                height,
            },
        }
    }
}
