//! The window control registry.
//!
//! [`ControlRegistry`] is the state machine behind every toggle.  A window is
//! either *unmanaged* (no record) or *managed* (a [`ControlRecord`] holding
//! the geometry to restore, the geometry last applied, and the live
//! subscriptions for the session).  A record exists exactly as long as its
//! subscriptions do; every path that removes a record also disposes them.
//!
//! All operations are synchronous and run to completion on the caller's
//! thread.  Host failures leave the registry as it was before the call.

use crate::command::WindowId;
use crate::geometry::Geometry;
use crate::traits::{Notification, Subscription, WindowEnvironment};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Possible errors from registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The window environment returned an error.
    #[error("host error: {0}")]
    Host(String),
}

fn host<E: std::error::Error>(e: E) -> RegistryError {
    RegistryError::Host(e.to_string())
}

/// How a managed window is released when the user takes over.
///
/// # Example
///
/// ```json
/// { "release_policy": "geometry_from_managed" }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleasePolicy {
    /// Release without restoring when an interactive move/resize finishes.
    #[default]
    MoveResize,
    /// Release when the geometry differs from the last applied geometry.
    GeometryFromManaged,
    /// Release when the geometry differs from the geometry captured before
    /// control began.  The controller's own write also counts as different.
    GeometryFromOriginal,
}

impl ReleasePolicy {
    /// Notifications a managed session subscribes to under this policy.
    pub fn notifications(self) -> &'static [Notification] {
        match self {
            ReleasePolicy::MoveResize => &[Notification::MoveResize, Notification::Closed],
            ReleasePolicy::GeometryFromManaged | ReleasePolicy::GeometryFromOriginal => {
                &[Notification::Geometry, Notification::Closed]
            }
        }
    }
}

/// Per-window state while the window is managed.
#[derive(Debug)]
pub struct ControlRecord {
    original: Geometry,
    managed: Geometry,
    subscriptions: Vec<Subscription>,
}

impl ControlRecord {
    /// Geometry captured when control began; the restore target.
    pub fn original(&self) -> Geometry {
        self.original
    }

    /// Geometry the controller applied most recently.
    pub fn managed(&self) -> Geometry {
        self.managed
    }

    /// Whether this session holds a subscription of `kind`.
    pub fn listens_to(&self, kind: Notification) -> bool {
        self.subscriptions.iter().any(|s| s.kind() == kind)
    }
}

/// What an operation did to the window's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to do: stale notification, unmanaged window, desktop surface.
    Ignored,
    /// The window became managed.
    Engaged,
    /// A managed window was moved to a different target.
    Retargeted,
    /// A managed window stays managed; nothing changed.
    Retained,
    /// The window was released and its record deleted.
    Released,
}

/// Table of managed windows plus the transitions between states.
#[derive(Debug, Default)]
pub struct ControlRegistry {
    policy: ReleasePolicy,
    records: HashMap<WindowId, ControlRecord>,
}

impl ControlRegistry {
    /// Create an empty registry releasing windows according to `policy`.
    pub fn new(policy: ReleasePolicy) -> Self {
        Self {
            policy,
            records: HashMap::new(),
        }
    }

    pub fn policy(&self) -> ReleasePolicy {
        self.policy
    }

    pub fn is_managed(&self, window: &WindowId) -> bool {
        self.records.contains_key(window)
    }

    pub fn record(&self, window: &WindowId) -> Option<&ControlRecord> {
        self.records.get(window)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Apply `target` to `window`, or toggle it off.
    ///
    /// * unmanaged → capture the current geometry, subscribe, apply
    ///   `target` ([`Outcome::Engaged`]);
    /// * managed with a different target → apply `target`, keep the
    ///   original ([`Outcome::Retargeted`]);
    /// * managed with the same target → restore the original geometry and
    ///   release ([`Outcome::Released`]).
    ///
    /// Desktop surfaces are ignored.
    pub fn apply_target<E: WindowEnvironment>(
        &mut self,
        env: &E,
        window: &WindowId,
        target: Geometry,
    ) -> Result<Outcome, RegistryError> {
        if env.is_desktop_surface(window).map_err(host)? {
            debug!("{} is a desktop surface, ignoring", window);
            return Ok(Outcome::Ignored);
        }

        let current = self.records.get(window).map(|r| (r.original, r.managed));
        match current {
            None => self.engage(env, window, target),
            Some((_, managed)) if managed != target => {
                env.set_geometry(window, target).map_err(host)?;
                if let Some(record) = self.records.get_mut(window) {
                    record.managed = target;
                }
                info!("{} retargeted to {}", window, target);
                Ok(Outcome::Retargeted)
            }
            Some((original, _)) => {
                info!("{} toggled off", window);
                self.release(env, window, Some(original))
            }
        }
    }

    /// React to a geometry change of `window`.
    ///
    /// A change away from the policy's baseline is treated as the user
    /// taking over: the window keeps its new position, gets its original
    /// size back, and is released.
    pub fn on_geometry_changed<E: WindowEnvironment>(
        &mut self,
        env: &E,
        window: &WindowId,
        geometry: Geometry,
    ) -> Result<Outcome, RegistryError> {
        let Some(record) = self.records.get(window) else {
            debug!("geometry change for unmanaged {}, ignoring", window);
            return Ok(Outcome::Ignored);
        };
        if !record.listens_to(Notification::Geometry) {
            return Ok(Outcome::Ignored);
        }

        let baseline = match self.policy {
            ReleasePolicy::GeometryFromOriginal => record.original,
            _ => record.managed,
        };
        if geometry == baseline {
            return Ok(Outcome::Retained);
        }

        let restore = geometry.with_size_of(&record.original);
        info!("{} changed to {} by the user, releasing", window, geometry);
        self.release(env, window, Some(restore))
    }

    /// React to an interactive move/resize of `window` starting or
    /// finishing.  A finished move/resize releases the window where the user
    /// left it.
    pub fn on_move_resize_changed<E: WindowEnvironment>(
        &mut self,
        env: &E,
        window: &WindowId,
        active: bool,
    ) -> Result<Outcome, RegistryError> {
        let Some(record) = self.records.get(window) else {
            debug!("move/resize for unmanaged {}, ignoring", window);
            return Ok(Outcome::Ignored);
        };
        if !record.listens_to(Notification::MoveResize) {
            return Ok(Outcome::Ignored);
        }
        if active {
            debug!("{} move/resize started", window);
            return Ok(Outcome::Retained);
        }

        info!("{} moved/resized by the user, releasing", window);
        self.release(env, window, None)
    }

    /// Forget `window` after it was closed.  Closing an unmanaged window is
    /// a no-op.
    pub fn on_window_closed<E: WindowEnvironment>(&mut self, env: &E, window: &WindowId) -> Outcome {
        match self.records.remove(window) {
            Some(record) => {
                info!("{} closed, releasing", window);
                dispose(env, record.subscriptions);
                Outcome::Released
            }
            None => {
                debug!("close for unmanaged {}, ignoring", window);
                Outcome::Ignored
            }
        }
    }

    /// Subscribe, apply `target`, and only then insert the record.
    fn engage<E: WindowEnvironment>(
        &mut self,
        env: &E,
        window: &WindowId,
        target: Geometry,
    ) -> Result<Outcome, RegistryError> {
        let original = env.geometry(window).map_err(host)?;

        let mut subscriptions = Vec::with_capacity(self.policy.notifications().len());
        for &kind in self.policy.notifications() {
            match env.subscribe(window, kind) {
                Ok(s) => subscriptions.push(s),
                Err(e) => {
                    warn!("subscribing to {} of {} failed, rolling back", kind, window);
                    dispose(env, subscriptions);
                    return Err(host(e));
                }
            }
        }

        if let Err(e) = env.set_geometry(window, target) {
            // The write may have been partially applied.
            if let Err(restore_err) = env.set_geometry(window, original) {
                warn!("restoring {} to {} failed: {}", window, original, restore_err);
            }
            dispose(env, subscriptions);
            return Err(host(e));
        }

        info!("{} engaged: {} -> {}", window, original, target);
        self.records.insert(
            window.clone(),
            ControlRecord {
                original,
                managed: target,
                subscriptions,
            },
        );
        Ok(Outcome::Engaged)
    }

    /// Optionally write `restore`, then delete the record and dispose its
    /// subscriptions.  A failed write keeps the record.
    fn release<E: WindowEnvironment>(
        &mut self,
        env: &E,
        window: &WindowId,
        restore: Option<Geometry>,
    ) -> Result<Outcome, RegistryError> {
        if let Some(geometry) = restore {
            env.set_geometry(window, geometry).map_err(host)?;
        }
        if let Some(record) = self.records.remove(window) {
            dispose(env, record.subscriptions);
        }
        Ok(Outcome::Released)
    }
}

/// Unsubscribe every token.  Failures are logged; the host drops listeners
/// of windows that disappear anyway.
fn dispose<E: WindowEnvironment>(env: &E, subscriptions: Vec<Subscription>) {
    for subscription in subscriptions {
        let kind = subscription.kind();
        let window = subscription.window().clone();
        if let Err(e) = env.unsubscribe(subscription) {
            warn!("unsubscribing from {} of {} failed: {}", kind, window, e);
        }
    }
}

//  Tests
