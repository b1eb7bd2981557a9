//! Panorama rendering passes.
//!
//! [`build_cubemap`] turns an equirectangular panorama into a six-face cube
//! map; [`project`] renders a perspective view of it. Both are pure,
//! stateless transforms over caller-owned buffers.

mod cubemap;
mod equirect;
mod perspective;

pub use cubemap::{build_cubemap, build_cubemap_into, BuildOutcome, Cubemap, CubemapError};
pub use equirect::{Equirect, EquirectError};
pub use perspective::{
    project, project_equirect, project_equirect_into, project_into, ProjectError,
};
