//! PNG export for rendered buffers and cube maps.
//!
//! The rendering core itself only deals in raw RGB bytes; this module is the
//! encoding collaborator that turns those buffers into files.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::geometry::CubeFace;
use crate::render::Cubemap;

/// Errors that can occur during PNG export.
#[derive(Error, Debug)]
pub enum PngExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("buffer is {actual} bytes, expected {expected} for {width}x{height} RGB")]
    SizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },
}

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// PNG compression type.
    pub compression: CompressionType,
    /// PNG filter type.
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

/// Saves a raw interleaved RGB buffer as a PNG file.
pub fn save_rgb_png(
    data: &[u8],
    width: u32,
    height: u32,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let expected = width as usize * height as usize * 3;
    if data.len() != expected {
        return Err(PngExportError::SizeMismatch {
            actual: data.len(),
            expected,
            width,
            height,
        });
    }

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);
    encoder.write_image(data, width, height, ExtendedColorType::Rgb8)?;
    Ok(())
}

/// Exports each cube-map face as its own PNG.
///
/// Output files are written to `{output_dir}/{base_name}_{face}.png`, one per
/// face (e.g. `pano_front.png`).
pub fn export_cubemap_faces(
    cubemap: &Cubemap,
    output_dir: &Path,
    base_name: &str,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    std::fs::create_dir_all(output_dir)?;
    let edge = cubemap.edge();
    for face in CubeFace::all() {
        let filename = format!("{}_{}.png", base_name, face.short_name());
        let path = output_dir.join(filename);
        save_rgb_png(cubemap.face(face), edge, edge, &path, options)?;
    }
    Ok(())
}

/// Exports the cube map as a single unfolded-cross PNG.
///
/// Layout matches the builder's walk: back, left, front and right form the
/// middle strip, with the bottom and top faces in the row bands before and
/// after the strip, above the front face. Unused regions stay black.
pub fn export_cubemap_cross(
    cubemap: &Cubemap,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let edge = cubemap.edge();
    let width = edge * 4;
    let height = edge * 3;
    let mut cross = vec![0u8; width as usize * height as usize * 3];

    for face in CubeFace::all() {
        // Top-left corner of the face inside the cross.
        let (ox, oy) = match face {
            CubeFace::Back => (0, edge),
            CubeFace::Left => (edge, edge),
            CubeFace::Front => (edge * 2, edge),
            CubeFace::Right => (edge * 3, edge),
            CubeFace::Bottom => (edge * 2, 0),
            CubeFace::Top => (edge * 2, edge * 2),
        };
        let src = cubemap.face(face);
        for j in 0..edge {
            let src_start = (j * edge * 3) as usize;
            let dst_start = (((oy + j) * width + ox) * 3) as usize;
            let row_len = (edge * 3) as usize;
            cross[dst_start..dst_start + row_len]
                .copy_from_slice(&src[src_start..src_start + row_len]);
        }
    }

    save_rgb_png(&cross, width, height, path, options)
}
