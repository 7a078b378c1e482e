//! The orchestrator that ties the registry, the window environment, and the
//! configured presets together.
//!
//! [`Controller`] owns the [`ControlRegistry`] and reacts to [`Command`]s by
//! resolving presets and forwarding host notifications to the registry.

use crate::command::{Command, WindowId};
use crate::config::Config;
use crate::geometry::Preset;
use crate::registry::{ControlRegistry, Outcome, RegistryError, ReleasePolicy};
use crate::traits::WindowEnvironment;
use log::{debug, error, info};
use std::collections::BTreeMap;

/// Possible errors from the controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// No preset with this name is configured.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// The window environment returned an error.
    #[error("window environment error: {0}")]
    Environment(String),

    /// A registry transition failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Handles commands and notifications for one window environment.
///
/// The controller is generic over any [`WindowEnvironment`] implementation,
/// making it independent of Hyprland or any other concrete backend.
///
/// # Typical usage
///
/// ```ignore
/// let env = HyprlandEnv::new(vec![]);
/// let mut controller = Controller::from_config(env, &Config::default());
/// controller.dispatch(Command::Toggle("almost_maximize".into()));
/// ```
pub struct Controller<E: WindowEnvironment> {
    env: E,
    registry: ControlRegistry,
    presets: BTreeMap<String, Preset>,
}

impl<E: WindowEnvironment> Controller<E> {
    /// Create a controller with an empty registry.
    pub fn new(env: E, presets: BTreeMap<String, Preset>, policy: ReleasePolicy) -> Self {
        Self {
            env,
            registry: ControlRegistry::new(policy),
            presets,
        }
    }

    /// Create a controller using the presets and release policy of `config`.
    pub fn from_config(env: E, config: &Config) -> Self {
        Self::new(env, config.presets.clone(), config.release_policy)
    }

    /// Return a shared reference to the registry.
    pub fn registry(&self) -> &ControlRegistry {
        &self.registry
    }

    /// Return a shared reference to the window environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Names of all configured presets, sorted.
    pub fn preset_names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    /// Process a single [`Command`], logging instead of returning failures.
    ///
    /// This is the outermost boundary of the event loop: a bad invocation
    /// must not stop later commands from being handled.
    pub fn dispatch(&mut self, cmd: Command) {
        let desc = format!("{:?}", cmd);
        match self.handle(cmd) {
            Ok(outcome) => debug!("{} -> {:?}", desc, outcome),
            Err(e) => error!("{} failed: {}", desc, e),
        }
    }

    /// Process a single [`Command`].
    ///
    /// If the host fails midway the registry keeps the state it had before
    /// the call.
    pub fn handle(&mut self, cmd: Command) -> Result<Outcome, ControllerError> {
        match cmd {
            Command::Toggle(preset) => self.toggle(&preset),

            Command::GeometryChanged { window, geometry } => Ok(self
                .registry
                .on_geometry_changed(&self.env, &window, geometry)?),

            Command::MoveResizeChanged { window, active } => Ok(self
                .registry
                .on_move_resize_changed(&self.env, &window, active)?),

            Command::WindowClosed(window) => Ok(self.registry.on_window_closed(&self.env, &window)),
        }
    }

    /// Toggle `preset` on the focused window.
    pub fn toggle(&mut self, preset: &str) -> Result<Outcome, ControllerError> {
        let geometry_of = self
            .presets
            .get(preset)
            .ok_or_else(|| ControllerError::UnknownPreset(preset.to_string()))?;

        let Some(window) = self.focused_window()? else {
            debug!("no focused window, nothing to toggle");
            return Ok(Outcome::Ignored);
        };

        let workspace = self
            .env
            .workspace_size()
            .map_err(|e| ControllerError::Environment(e.to_string()))?;
        let target = geometry_of.geometry(workspace);
        info!("toggle {} on {}", preset, window);

        Ok(self.registry.apply_target(&self.env, &window, target)?)
    }

    fn focused_window(&self) -> Result<Option<WindowId>, ControllerError> {
        self.env
            .focused_window()
            .map_err(|e| ControllerError::Environment(e.to_string()))
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::testing::FakeEnv;

    fn presets() -> BTreeMap<String, Preset> {
        Config::default().presets
    }

    fn make_controller(policy: ReleasePolicy) -> (Controller<FakeEnv>, WindowId) {
        let env = FakeEnv::new(1920.0, 1080.0);
        let w = env.add_window("0xbeef", Geometry::new(10.0, 10.0, 800.0, 600.0));
        (Controller::new(env, presets(), policy), w)
    }

    #[test]
    fn toggle_twice_restores_focused_window() {
        let (mut c, w) = make_controller(ReleasePolicy::default());
        let out = c.handle(Command::Toggle("almost_maximize".into())).unwrap();
        assert_eq!(out, Outcome::Engaged);
        assert_eq!(c.env().current(&w), Geometry::new(50.0, 50.0, 1820.0, 980.0));

        let out = c.handle(Command::Toggle("almost_maximize".into())).unwrap();
        assert_eq!(out, Outcome::Released);
        assert_eq!(c.env().current(&w), Geometry::new(10.0, 10.0, 800.0, 600.0));
        assert!(c.registry().is_empty());
    }

    #[test]
    fn different_preset_retargets() {
        let (mut c, w) = make_controller(ReleasePolicy::default());
        c.handle(Command::Toggle("almost_maximize".into())).unwrap();
        let out = c.handle(Command::Toggle("hd".into())).unwrap();
        assert_eq!(out, Outcome::Retargeted);
        assert_eq!(c.env().current(&w), Geometry::new(320.0, 180.0, 1280.0, 720.0));
        assert_eq!(
            c.registry().record(&w).unwrap().original(),
            Geometry::new(10.0, 10.0, 800.0, 600.0)
        );
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let (mut c, _) = make_controller(ReleasePolicy::default());
        let res = c.handle(Command::Toggle("nope".into()));
        assert!(matches!(res, Err(ControllerError::UnknownPreset(name)) if name == "nope"));
        assert!(c.env().writes.borrow().is_empty());
    }

    #[test]
    fn no_focused_window_is_ignored() {
        let (mut c, _) = make_controller(ReleasePolicy::default());
        c.env().focus(None);
        let out = c.handle(Command::Toggle("almost_maximize".into())).unwrap();
        assert_eq!(out, Outcome::Ignored);
        assert!(c.registry().is_empty());
    }

    #[test]
    fn toggle_follows_focus() {
        let (mut c, a) = make_controller(ReleasePolicy::default());
        c.handle(Command::Toggle("almost_maximize".into())).unwrap();
        let b = c.env().add_window("0xcafe", Geometry::new(0.0, 0.0, 300.0, 200.0));

        // Same preset, different window: engages b instead of releasing a.
        let out = c.handle(Command::Toggle("almost_maximize".into())).unwrap();
        assert_eq!(out, Outcome::Engaged);
        assert!(c.registry().is_managed(&a));
        assert!(c.registry().is_managed(&b));
    }

    #[test]
    fn notifications_are_routed_to_the_registry() {
        let (mut c, w) = make_controller(ReleasePolicy::MoveResize);
        c.handle(Command::Toggle("almost_maximize".into())).unwrap();
        let out = c
            .handle(Command::MoveResizeChanged {
                window: w.clone(),
                active: false,
            })
            .unwrap();
        assert_eq!(out, Outcome::Released);
        assert_eq!(c.env().live_count(), 0);
    }

    #[test]
    fn geometry_notification_releases_under_geometry_policy() {
        let (mut c, w) = make_controller(ReleasePolicy::GeometryFromManaged);
        c.handle(Command::Toggle("almost_maximize".into())).unwrap();
        let out = c
            .handle(Command::GeometryChanged {
                window: w.clone(),
                geometry: Geometry::new(500.0, 400.0, 1820.0, 980.0),
            })
            .unwrap();
        assert_eq!(out, Outcome::Released);
        assert_eq!(c.env().current(&w), Geometry::new(500.0, 400.0, 800.0, 600.0));
    }

    #[test]
    fn close_then_stale_notifications() {
        let (mut c, w) = make_controller(ReleasePolicy::default());
        c.handle(Command::Toggle("almost_maximize".into())).unwrap();
        assert_eq!(
            c.handle(Command::WindowClosed(w.clone())).unwrap(),
            Outcome::Released
        );
        assert_eq!(
            c.handle(Command::WindowClosed(w.clone())).unwrap(),
            Outcome::Ignored
        );
        assert_eq!(
            c.handle(Command::MoveResizeChanged {
                window: w,
                active: false
            })
            .unwrap(),
            Outcome::Ignored
        );
    }

    #[test]
    fn dispatch_survives_host_failures() {
        let (mut c, w) = make_controller(ReleasePolicy::default());
        c.env().fail_set_geometry.set(true);
        c.dispatch(Command::Toggle("almost_maximize".into()));
        assert!(c.registry().is_empty());

        c.env().fail_set_geometry.set(false);
        c.dispatch(Command::Toggle("almost_maximize".into()));
        assert!(c.registry().is_managed(&w));
    }

    #[test]
    fn preset_names_are_sorted() {
        let (c, _) = make_controller(ReleasePolicy::default());
        let names: Vec<&str> = c.preset_names().collect();
        assert_eq!(names, vec!["almost_maximize", "hd"]);
    }
}
