//! Hyprland-specific implementations.
//!
//! This module provides concrete backends for the
//! [`WindowEnvironment`](crate::traits::WindowEnvironment) and
//! [`CommandSource`](crate::traits::CommandSource) traits, powered by
//! Hyprland's IPC sockets.
//!
//! Nothing outside this module should reference Hyprland directly.

pub mod events;
pub mod wm;

use std::path::PathBuf;

/// Resolve one of Hyprland's sockets by file name.
///
/// Hyprland ≥ 0.40 stores its sockets at
/// `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/<name>`.
pub(crate) fn socket_path(name: &str) -> Result<PathBuf, String> {
    let runtime_dir =
        std::env::var("XDG_RUNTIME_DIR").map_err(|_| "XDG_RUNTIME_DIR not set".to_string())?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| "HYPRLAND_INSTANCE_SIGNATURE not set".to_string())?;
    Ok(PathBuf::from(format!("{}/hypr/{}/{}", runtime_dir, his, name)))
}

/// Normalise a client address to the `0x…` form used by `j/clients`.
///
/// The event socket reports addresses without the prefix.
pub(crate) fn normalise_address(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("0x") {
        raw.to_string()
    } else {
        format!("0x{}", raw)
    }
}
