//! Orbit camera: spherical pose around a look-at target, driven by drag and
//! wheel deltas.
//!
//! The eye position is always re-derived from `(radius, theta, phi)` rather
//! than accumulated, so long sessions cannot drift. Every mutating call clamps
//! `radius` into `[min_radius, max_radius]` and `phi` into `[ε, π − ε]`, and
//! non-finite input is rejected before any field is touched.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use std::f64::consts::{PI, TAU};

use tracing::debug;

use crate::config::ViewportConfig;
use crate::error::{ViewportError, ViewportResult};
use crate::geom::Vec3;

/// Spherical camera pose. Derived state; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Distance from the target.
    pub radius: f64,
    /// Azimuth in radians. Unbounded; consumers treat it as periodic.
    pub theta: f64,
    /// Polar angle in radians, measured from +Y.
    pub phi: f64,
    /// Look-at point.
    pub target: Vec3,
}

impl CameraPose {
    /// `theta` wrapped into `[0, 2π)` for display.
    #[must_use]
    pub fn display_theta(&self) -> f64 {
        self.theta.rem_euclid(TAU)
    }
}

/// View parameters handed to the render engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub eye: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
}

/// Orbit controller with clamp bounds and sensitivities taken from config.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pose: CameraPose,
    initial: CameraPose,
    sensitivity_theta: f64,
    sensitivity_phi: f64,
    zoom_sensitivity: f64,
    min_radius: f64,
    max_radius: f64,
    phi_epsilon: f64,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(&ViewportConfig::default())
    }
}

impl OrbitCamera {
    /// Build a controller at the configured initial pose, aimed at the origin.
    #[must_use]
    pub fn new(config: &ViewportConfig) -> Self {
        let cfg = config.clone().normalized();
        let initial = CameraPose {
            radius: cfg.initial_radius,
            theta: cfg.initial_theta,
            phi: cfg.initial_phi,
            target: Vec3::ZERO,
        };
        Self {
            pose: initial,
            initial,
            sensitivity_theta: cfg.sensitivity_theta,
            sensitivity_phi: cfg.sensitivity_phi,
            zoom_sensitivity: cfg.zoom_sensitivity,
            min_radius: cfg.min_radius,
            max_radius: cfg.max_radius,
            phi_epsilon: cfg.phi_epsilon,
        }
    }

    #[must_use]
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    #[must_use]
    pub fn radius_bounds(&self) -> (f64, f64) {
        (self.min_radius, self.max_radius)
    }

    #[must_use]
    pub fn phi_bounds(&self) -> (f64, f64) {
        (self.phi_epsilon, PI - self.phi_epsilon)
    }

    /// Rotate around the target by a pointer-drag delta in pixels.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` and leaves the pose untouched if either delta is
    /// not finite.
    pub fn apply_drag(&mut self, dx: f64, dy: f64) -> ViewportResult<()> {
        if !dx.is_finite() || !dy.is_finite() {
            debug!(dx, dy, "discarding non-finite drag delta");
            return Err(ViewportError::InvalidInput("non-finite drag delta"));
        }
        let theta = self.pose.theta - dx * self.sensitivity_theta;
        let phi = self.pose.phi + dy * self.sensitivity_phi;
        if !theta.is_finite() || !phi.is_finite() {
            debug!(dx, dy, "discarding drag delta that overflows the pose");
            return Err(ViewportError::InvalidInput("drag delta overflows pose"));
        }
        self.pose.theta = theta;
        self.pose.phi = self.clamp_phi(phi);
        Ok(())
    }

    /// Move toward (negative) or away from (positive) the target.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` and leaves the pose untouched if the delta is not
    /// finite.
    pub fn apply_zoom(&mut self, delta_scroll: f64) -> ViewportResult<()> {
        if !delta_scroll.is_finite() {
            debug!(delta_scroll, "discarding non-finite zoom delta");
            return Err(ViewportError::InvalidInput("non-finite zoom delta"));
        }
        let radius = self.pose.radius + delta_scroll * self.zoom_sensitivity;
        if !radius.is_finite() {
            debug!(delta_scroll, "discarding zoom delta that overflows the pose");
            return Err(ViewportError::InvalidInput("zoom delta overflows pose"));
        }
        let (lo, hi) = self.radius_bounds();
        self.pose.radius = radius.clamp(lo, hi);
        Ok(())
    }

    /// Re-aim at a new look-at point without changing radius or angles.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any component is not finite.
    pub fn set_target(&mut self, target: Vec3) -> ViewportResult<()> {
        if !target.is_finite() {
            return Err(ViewportError::InvalidInput("non-finite camera target"));
        }
        self.pose.target = target;
        Ok(())
    }

    /// Restore the configured initial pose (target included).
    pub fn reset(&mut self) {
        self.pose = self.initial;
    }

    /// Eye, look-at, and up derived from the current pose.
    ///
    /// Uses the physics convention `x = r sinφ cosθ`, `y = r cosφ`,
    /// `z = r sinφ sinθ`, offset by the target.
    #[must_use]
    pub fn to_view_transform(&self) -> ViewTransform {
        let CameraPose { radius, theta, phi, target } = self.pose;
        let (sin_phi, cos_phi) = phi.sin_cos();
        let (sin_theta, cos_theta) = theta.sin_cos();
        let offset = Vec3::new(radius * sin_phi * cos_theta, radius * cos_phi, radius * sin_phi * sin_theta);
        ViewTransform { eye: target + offset, look_at: target, up: Vec3::UP }
    }

    fn clamp_phi(&self, phi: f64) -> f64 {
        let (lo, hi) = self.phi_bounds();
        phi.clamp(lo, hi)
    }
}
