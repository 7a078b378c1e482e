//! IPC listener that accepts commands over a Unix socket.
//!
//! Key-bind helpers send preset toggles here; compositor scripts or plugins
//! forward window notifications (geometry changes, move/resize state) the
//! Hyprland event socket does not provide.

pub mod listener;
