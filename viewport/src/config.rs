//! Viewport tuning: camera sensitivities, clamp bounds, and surface defaults.
//!
//! Values come from three places, in increasing priority: compiled defaults
//! (`consts`), `VIEWPORT_*` environment variables, and an explicit JSON document
//! supplied by the host. Whatever the source, [`ViewportConfig::normalized`] is
//! applied before a camera is built so the clamp invariants always hold.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BACKGROUND, DEFAULT_FOV_Y_DEG, DEFAULT_INITIAL_PHI, DEFAULT_INITIAL_RADIUS, DEFAULT_INITIAL_THETA,
    DEFAULT_MAX_RADIUS, DEFAULT_MIN_RADIUS, DEFAULT_MOVE_SENSITIVITY, DEFAULT_PHI_EPSILON, DEFAULT_SENSITIVITY_PHI,
    DEFAULT_SENSITIVITY_THETA, DEFAULT_ZOOM_SENSITIVITY,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub sensitivity_theta: f64,
    pub sensitivity_phi: f64,
    pub zoom_sensitivity: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    pub phi_epsilon: f64,
    pub initial_radius: f64,
    pub initial_theta: f64,
    pub initial_phi: f64,
    pub fov_y_deg: f64,
    pub move_sensitivity: f64,
    pub background: String,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            sensitivity_theta: DEFAULT_SENSITIVITY_THETA,
            sensitivity_phi: DEFAULT_SENSITIVITY_PHI,
            zoom_sensitivity: DEFAULT_ZOOM_SENSITIVITY,
            min_radius: DEFAULT_MIN_RADIUS,
            max_radius: DEFAULT_MAX_RADIUS,
            phi_epsilon: DEFAULT_PHI_EPSILON,
            initial_radius: DEFAULT_INITIAL_RADIUS,
            initial_theta: DEFAULT_INITIAL_THETA,
            initial_phi: DEFAULT_INITIAL_PHI,
            fov_y_deg: DEFAULT_FOV_Y_DEG,
            move_sensitivity: DEFAULT_MOVE_SENSITIVITY,
            background: DEFAULT_BACKGROUND.to_owned(),
        }
    }
}

impl ViewportConfig {
    /// Build a config from `VIEWPORT_*` environment variables.
    ///
    /// Missing or unparsable variables keep their compiled default.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sensitivity_theta: env_parse("VIEWPORT_SENSITIVITY_THETA", defaults.sensitivity_theta),
            sensitivity_phi: env_parse("VIEWPORT_SENSITIVITY_PHI", defaults.sensitivity_phi),
            zoom_sensitivity: env_parse("VIEWPORT_ZOOM_SENSITIVITY", defaults.zoom_sensitivity),
            min_radius: env_parse("VIEWPORT_MIN_RADIUS", defaults.min_radius),
            max_radius: env_parse("VIEWPORT_MAX_RADIUS", defaults.max_radius),
            phi_epsilon: env_parse("VIEWPORT_PHI_EPSILON", defaults.phi_epsilon),
            initial_radius: env_parse("VIEWPORT_INITIAL_RADIUS", defaults.initial_radius),
            initial_theta: env_parse("VIEWPORT_INITIAL_THETA", defaults.initial_theta),
            initial_phi: env_parse("VIEWPORT_INITIAL_PHI", defaults.initial_phi),
            fov_y_deg: env_parse("VIEWPORT_FOV_Y_DEG", defaults.fov_y_deg),
            move_sensitivity: env_parse("VIEWPORT_MOVE_SENSITIVITY", defaults.move_sensitivity),
            background: std::env::var("VIEWPORT_BACKGROUND").unwrap_or(defaults.background),
        }
    }

    /// Repair inconsistent values so the camera clamp invariants can hold.
    ///
    /// Non-finite fields fall back to their defaults, swapped radius bounds are
    /// reordered, and ε is forced into `(0, π/2)`. Initial pose values are
    /// clamped into the resulting ranges.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();

        let finite_or = |value: f64, fallback: f64| if value.is_finite() { value } else { fallback };
        self.sensitivity_theta = finite_or(self.sensitivity_theta, defaults.sensitivity_theta);
        self.sensitivity_phi = finite_or(self.sensitivity_phi, defaults.sensitivity_phi);
        self.zoom_sensitivity = finite_or(self.zoom_sensitivity, defaults.zoom_sensitivity);
        self.move_sensitivity = finite_or(self.move_sensitivity, defaults.move_sensitivity);
        self.initial_theta = finite_or(self.initial_theta, defaults.initial_theta);

        let mut min_radius = finite_or(self.min_radius, defaults.min_radius);
        let mut max_radius = finite_or(self.max_radius, defaults.max_radius);
        if min_radius > max_radius {
            std::mem::swap(&mut min_radius, &mut max_radius);
        }
        if min_radius <= 0.0 {
            min_radius = f64::EPSILON;
        }
        if max_radius < min_radius {
            max_radius = min_radius;
        }
        self.min_radius = min_radius;
        self.max_radius = max_radius;

        let eps = finite_or(self.phi_epsilon, defaults.phi_epsilon);
        self.phi_epsilon = if eps > 0.0 && eps < FRAC_PI_2 { eps } else { defaults.phi_epsilon };

        self.initial_radius = finite_or(self.initial_radius, defaults.initial_radius).clamp(min_radius, max_radius);
        self.initial_phi = finite_or(self.initial_phi, defaults.initial_phi)
            .clamp(self.phi_epsilon, std::f64::consts::PI - self.phi_epsilon);

        let fov = finite_or(self.fov_y_deg, defaults.fov_y_deg);
        self.fov_y_deg = if fov > 0.0 && fov < 180.0 { fov } else { defaults.fov_y_deg };

        self
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .map_or(default, |v| v.parse::<T>().unwrap_or(default))
}
