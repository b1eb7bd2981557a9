//! Coordinate math shared by the cube-map builder and the projector.
//!
//! Provides the cube face enumeration with its paired pixel/direction
//! mappings, the camera rotation basis, and the fast arc-tangent
//! approximation used in the cube-map pass.

mod camera;
mod face;
mod fast_atan;

pub use camera::Camera;
pub use face::CubeFace;
pub use fast_atan::fast_atan2;
