//! Export module for saving rendered buffers to image files.
//!
//! Kept separate from the rendering core, which only produces raw RGB bytes.

mod png;

pub use png::{
    export_cubemap_cross, export_cubemap_faces, save_rgb_png, PngExportError, PngExportOptions,
};
