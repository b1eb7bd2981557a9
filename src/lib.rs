//! Panorama rendering core.
//!
//! This crate converts full equirectangular panoramas into cube maps and
//! renders arbitrary perspective (rectilinear) views of them given a camera
//! yaw, pitch and field of view. All pixel data is raw interleaved RGB;
//! decoding and encoding image files is left to the `export` module and the
//! caller.

pub mod geometry;
pub mod render;
pub mod export;

pub use geometry::{fast_atan2, Camera, CubeFace};
pub use render::{
    build_cubemap, build_cubemap_into, project, project_equirect, project_equirect_into,
    project_into, BuildOutcome, Cubemap, CubemapError, Equirect, EquirectError, ProjectError,
};
