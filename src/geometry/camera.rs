//! Camera parameters and the camera-to-world rotation.

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

/// Viewing parameters for a perspective projection, in degrees.
///
/// The camera sits at the cube center; there is no translation. Expected
/// ranges are yaw in [0, 360) measured clockwise from North, pitch in
/// [1, 179] with 90 = horizontal, and fov in [15, 90]. The ranges are a
/// caller contract, not validated here: the projection is a hot numeric
/// kernel and out-of-range angles simply render a garbage view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Horizontal rotation in degrees, [0, 360).
    pub yaw: f64,
    /// Vertical rotation in degrees, [1, 179]; 90 is horizontal.
    pub pitch: f64,
    /// Field of view in degrees, [15, 90].
    pub fov: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 90.0,
            fov: 90.0,
        }
    }
}

impl Camera {
    /// Creates a camera from yaw, pitch and field of view in degrees.
    pub fn new(yaw: f64, pitch: f64, fov: f64) -> Self {
        Self { yaw, pitch, fov }
    }

    /// Perspective scale factor `1 / tan(fov / 2)` relating normalized
    /// device coordinates to ray divergence.
    #[inline]
    pub fn fov_constant(&self) -> f64 {
        1.0 / (self.fov.to_radians() / 2.0).tan()
    }

    /// Builds the 3x3 camera-to-world rotation matrix.
    ///
    /// The public yaw/pitch convention is first re-oriented into the basis
    /// convention of the rotation: azimuth `360 - yaw` (yaw is clockwise)
    /// and elevation `90 - pitch` (90 is horizontal). The columns of the
    /// returned matrix are the camera's right, up and forward basis vectors
    /// in world space, derived from the spherical-to-Cartesian partial
    /// derivatives.
    pub fn world_from_camera(&self) -> DMat3 {
        let azimuth = (360.0 - self.yaw).to_radians();
        let elevation = (90.0 - self.pitch).to_radians();
        let (sa, ca) = azimuth.sin_cos();
        let (se, ce) = elevation.sin_cos();
        DMat3::from_cols(
            DVec3::new(-sa, 0.0, ca),
            DVec3::new(-se * ca, ce, -se * sa),
            DVec3::new(-ce * ca, -se, -ce * sa),
        )
    }
}
