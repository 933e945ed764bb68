//! Shared numeric constants for the viewport crate.

use std::f64::consts::FRAC_PI_2;

// ── Orbit camera ────────────────────────────────────────────────

/// Radians of azimuth per pixel of horizontal drag.
pub const DEFAULT_SENSITIVITY_THETA: f64 = 0.01;

/// Radians of polar angle per pixel of vertical drag.
pub const DEFAULT_SENSITIVITY_PHI: f64 = 0.01;

/// World units of radius per unit of wheel delta.
pub const DEFAULT_ZOOM_SENSITIVITY: f64 = 0.01;

/// Closest the camera may get to its target.
pub const DEFAULT_MIN_RADIUS: f64 = 2.0;

/// Farthest the camera may get from its target.
pub const DEFAULT_MAX_RADIUS: f64 = 50.0;

/// Margin kept between the polar angle and either pole.
pub const DEFAULT_PHI_EPSILON: f64 = 0.1;

/// Starting distance from the target.
pub const DEFAULT_INITIAL_RADIUS: f64 = 5.0;

/// Starting azimuth.
pub const DEFAULT_INITIAL_THETA: f64 = 0.0;

/// Starting polar angle (on the horizon).
pub const DEFAULT_INITIAL_PHI: f64 = FRAC_PI_2;

/// Vertical field of view in degrees.
pub const DEFAULT_FOV_Y_DEG: f64 = 60.0;

// ── Manipulation ────────────────────────────────────────────────

/// World units of ground-plane translation per pixel of object drag.
pub const DEFAULT_MOVE_SENSITIVITY: f64 = 0.01;

// ── Surface ─────────────────────────────────────────────────────

/// Background clear color for the render surface.
pub const DEFAULT_BACKGROUND: &str = "#1E1F24";

/// Smallest surface dimension accepted from the host, in pixels.
pub const MIN_SURFACE_PX: u32 = 1;
