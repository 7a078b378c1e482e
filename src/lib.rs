//! **winzo**: toggle the focused window into a managed geometry and back.
//!
//! Pressing a shortcut snaps the focused window to a preset geometry
//! (padded-maximized, a fixed resolution, …).  Pressing it again restores
//! the geometry the window had before.  Moving, resizing or closing a
//! managed window hands control back to the user.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::WindowEnvironment`]: abstracts geometry queries, geometry
//!   writes and per-window notification subscriptions so the state machine
//!   is not coupled to any specific compositor.
//! * [`traits::CommandSource`]: abstracts the transport that delivers
//!   toggles and notifications (a Unix socket, a compositor event stream,
//!   …) so the main loop is not coupled to any specific IPC mechanism.
//!
//! The state machine itself lives in [`registry`]; [`controller`] resolves
//! presets and routes commands to it.  Concrete implementations live in
//! [`hyprland`] (Hyprland IPC) and [`ipc`] (Unix-socket command listener).

pub mod command;
pub mod config;
pub mod controller;
pub mod geometry;
pub mod hyprland;
pub mod ipc;
pub mod registry;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;
