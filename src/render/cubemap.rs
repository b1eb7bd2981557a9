//! Cube-map construction from an equirectangular panorama.
//!
//! The build walks the cube map laid out as an unfolded cross: a 4-face
//! horizontal strip (back, left, front, right) with the bottom and top faces
//! stacked below and above the front face. For every destination pixel the
//! face direction is converted to spherical angles with the fast arc-tangent
//! and the panorama is sampled bilinearly there. Panoramas can reach
//! 16384x8192, so the pass polls a cooperative cancel flag once per cross
//! column.

use std::sync::atomic::{AtomicBool, Ordering};

use std::f64::consts::{FRAC_PI_2, PI};

use thiserror::Error;

use crate::geometry::{fast_atan2, CubeFace};
use super::equirect::Equirect;

/// Errors raised by cube-map construction.
#[derive(Error, Debug)]
pub enum CubemapError {
    #[error("panorama width {0} must be a positive multiple of 4")]
    WidthNotDivisible(u32),
    #[error("cube-map buffer is {actual} bytes, expected {expected}")]
    BufferSize { actual: usize, expected: usize },
    #[error("cube-map build cancelled")]
    Cancelled,
}

/// Outcome of a cube-map build into a caller-owned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// All six faces were written.
    Complete,
    /// The cancel flag was observed; `columns_done` cross columns were
    /// written before the poll. The buffer contents are discardable, never
    /// partially valid.
    Cancelled { columns_done: u32 },
}

/// An owned six-face cube map with interleaved RGB pixels.
///
/// Faces are squares of side `edge`, stored contiguously in
/// [`CubeFace`] index order. Built once per panorama and then read many
/// times by the projector; it is immutable after construction, so concurrent
/// projections of the same map need no synchronization.
#[derive(Debug, Clone)]
pub struct Cubemap {
    edge: u32,
    data: Vec<u8>,
}

impl Cubemap {
    /// Wraps an existing buffer as a cube map, checking its length.
    pub fn from_raw(edge: u32, data: Vec<u8>) -> Result<Self, CubemapError> {
        let expected = byte_len(edge);
        if edge == 0 || data.len() != expected {
            return Err(CubemapError::BufferSize {
                actual: data.len(),
                expected,
            });
        }
        Ok(Self { edge, data })
    }

    /// Face side length in pixels.
    pub fn edge(&self) -> u32 {
        self.edge
    }

    /// The whole six-face buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the cube map, returning the raw buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// The bytes of a single face.
    pub fn face(&self, face: CubeFace) -> &[u8] {
        let face_len = self.edge as usize * self.edge as usize * 3;
        let start = face.index() * face_len;
        &self.data[start..start + face_len]
    }

    /// Reads one RGB pixel from a face.
    pub fn pixel(&self, face: CubeFace, x: u32, y: u32) -> [u8; 3] {
        let edge = self.edge as usize;
        let idx = (face.index() * edge * edge + y as usize * edge + x as usize) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }
}

/// Total byte length of a cube map with the given face edge.
pub(crate) fn byte_len(edge: u32) -> usize {
    6 * edge as usize * edge as usize * 3
}

/// Builds a cube map from an equirectangular panorama.
///
/// The panorama width must be a positive multiple of 4; the face edge is a
/// quarter of it. If the cancel flag is observed mid-build the partial
/// buffer is dropped and `CubemapError::Cancelled` is returned.
pub fn build_cubemap(src: &Equirect<'_>, cancel: &AtomicBool) -> Result<Cubemap, CubemapError> {
    let width = src.width();
    if width == 0 || width % 4 != 0 {
        return Err(CubemapError::WidthNotDivisible(width));
    }
    let edge = width / 4;
    let mut data = vec![0u8; byte_len(edge)];
    match build_cubemap_into(src, &mut data, cancel)? {
        BuildOutcome::Complete => Ok(Cubemap { edge, data }),
        BuildOutcome::Cancelled { .. } => Err(CubemapError::Cancelled),
    }
}

/// Builds a cube map into a caller-owned buffer of `6 * (width/4)^2 * 3`
/// bytes.
///
/// The outer loop walks the unfolded-cross columns left to right and polls
/// `cancel` (relaxed load; the caller's threading mechanism provides
/// write-then-read visibility) once per column, bounding abort latency to
/// roughly one column's work. A cancelled result reports how many columns
/// were completed; the buffer must be treated as discardable.
pub fn build_cubemap_into(
    src: &Equirect<'_>,
    out: &mut [u8],
    cancel: &AtomicBool,
) -> Result<BuildOutcome, CubemapError> {
    let width = src.width();
    if width == 0 || width % 4 != 0 {
        return Err(CubemapError::WidthNotDivisible(width));
    }
    let edge = width / 4;
    let expected = byte_len(edge);
    if out.len() != expected {
        return Err(CubemapError::BufferSize {
            actual: out.len(),
            expected,
        });
    }

    let edge_us = edge as usize;
    let edge_f = f64::from(edge);

    for x in 0..width {
        if cancel.load(Ordering::Relaxed) {
            return Ok(BuildOutcome::Cancelled { columns_done: x });
        }
        // The three side-strip bands only cover the middle row of the cross;
        // the front band also carries the bottom and top faces.
        let (strip_face, y_start, y_stop) = match x / edge {
            0 => (CubeFace::Back, edge, edge * 2),
            1 => (CubeFace::Left, edge, edge * 2),
            2 => (CubeFace::Front, 0, edge * 3),
            _ => (CubeFace::Right, edge, edge * 2),
        };
        for y in y_start..y_stop {
            let face = if y < edge {
                CubeFace::Bottom
            } else if y >= edge * 2 {
                CubeFace::Top
            } else {
                strip_face
            };
            let (i, j) = match face {
                CubeFace::Front => (x - edge * 2, y - edge),
                CubeFace::Back => (x, y - edge),
                CubeFace::Top => (x - edge * 2, y - edge * 2),
                CubeFace::Bottom => (x - edge * 2, y),
                CubeFace::Right => (x - edge * 3, y - edge),
                CubeFace::Left => (x - edge, y - edge),
            };

            let dir = face.grid_direction(i, j, edge);
            let theta = fast_atan2(dir.y, dir.x);
            let phi = fast_atan2(dir.z, (dir.x * dir.x + dir.y * dir.y).sqrt());
            let u = 2.0 * edge_f * (theta + PI) / PI;
            let v = 2.0 * edge_f * (FRAC_PI_2 - phi) / PI;
            let rgb = src.sample_bilinear(u, v);

            let idx = (face.index() * edge_us * edge_us
                + j as usize * edge_us
                + i as usize)
                * 3;
            out[idx..idx + 3].copy_from_slice(&rgb);
        }
    }
    Ok(BuildOutcome::Complete)
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: u32 = 64;
    const H: u32 = 32;
    const EDGE: u32 = W / 4;

    fn solid(color: [u8; 3]) -> Vec<u8> {
        color
            .iter()
            .copied()
            .cycle()
            .take(W as usize * H as usize * 3)
            .collect()
    }

    fn set_pixel(data: &mut [u8], x: u32, y: u32, color: [u8; 3]) {
        let idx = (y as usize * W as usize + x as usize) * 3;
        data[idx..idx + 3].copy_from_slice(&color);
    }

    #[test]
    fn test_rejects_bad_width() {
        let data = vec![0u8; 30 * 15 * 3];
        let pano = Equirect::new(&data, 30, 15).unwrap();
        let cancel = AtomicBool::new(false);
        assert!(matches!(
            build_cubemap(&pano, &cancel),
            Err(CubemapError::WidthNotDivisible(30))
        ));
    }

    #[test]
    fn test_rejects_bad_output_buffer() {
        let data = solid([0, 0, 0]);
        let pano = Equirect::new(&data, W, H).unwrap();
        let mut out = vec![0u8; 10];
        let cancel = AtomicBool::new(false);
        assert!(matches!(
            build_cubemap_into(&pano, &mut out, &cancel),
            Err(CubemapError::BufferSize { actual: 10, .. })
        ));
    }

    #[test]
    fn test_output_size_and_face_bounds() {
        let data = solid([1, 2, 3]);
        let pano = Equirect::new(&data, W, H).unwrap();
        let cancel = AtomicBool::new(false);
        let cubemap = build_cubemap(&pano, &cancel).unwrap();
        assert_eq!(cubemap.edge(), EDGE);
        assert_eq!(cubemap.data().len(), byte_len(EDGE));
        for face in CubeFace::all() {
            assert_eq!(cubemap.face(face).len(), (EDGE * EDGE * 3) as usize);
        }
    }

    #[test]
    fn test_solid_panorama_gives_solid_cubemap() {
        // Bilinear blending of a constant image is exact, so every cube-map
        // pixel must carry the panorama color.
        let color = [37, 120, 200];
        let data = solid(color);
        let pano = Equirect::new(&data, W, H).unwrap();
        let cancel = AtomicBool::new(false);
        let cubemap = build_cubemap(&pano, &cancel).unwrap();
        assert!(cubemap.data().chunks_exact(3).all(|p| p == color));
    }

    #[test]
    fn test_front_center_marker_roundtrip() {
        // The front face center points along +x, which lands exactly on the
        // panorama pixel (W/2, H/2); the angles fall on a grid point so the
        // marker must come through without interpolation blur.
        let marker = [255, 0, 0];
        let mut data = solid([0, 0, 0]);
        set_pixel(&mut data, W / 2, H / 2, marker);
        let pano = Equirect::new(&data, W, H).unwrap();
        let cancel = AtomicBool::new(false);
        let cubemap = build_cubemap(&pano, &cancel).unwrap();
        assert_eq!(cubemap.pixel(CubeFace::Front, EDGE / 2, EDGE / 2), marker);
        // A neighboring face center must not see the marker.
        assert_eq!(cubemap.pixel(CubeFace::Right, EDGE / 2, EDGE / 2), [0, 0, 0]);
    }

    #[test]
    fn test_back_center_wraps_the_seam() {
        // The back face center points along -x, i.e. theta = pi, which maps
        // to u = W and must wrap to the panorama's left edge column.
        let marker = [0, 255, 0];
        let mut data = solid([0, 0, 0]);
        set_pixel(&mut data, 0, H / 2, marker);
        let pano = Equirect::new(&data, W, H).unwrap();
        let cancel = AtomicBool::new(false);
        let cubemap = build_cubemap(&pano, &cancel).unwrap();
        assert_eq!(cubemap.pixel(CubeFace::Back, EDGE / 2, EDGE / 2), marker);
    }

    #[test]
    fn test_top_face_zero_x_column_longitude() {
        // On the top face the column j = edge/2 has a zero x component in
        // its grid direction, so theta comes from an arc-tangent with
        // x == 0 and the sign of y alone must pick between opposite
        // panorama longitudes. Color the two candidate columns differently
        // and check the negative-y side lands on u = edge, not u = 3*edge.
        let red = [255, 0, 0];
        let blue = [0, 0, 255];
        let mut data = solid([0, 0, 0]);
        for y in 0..H {
            set_pixel(&mut data, EDGE, y, red);
            set_pixel(&mut data, EDGE * 3, y, blue);
        }
        let pano = Equirect::new(&data, W, H).unwrap();
        let cancel = AtomicBool::new(false);
        let cubemap = build_cubemap(&pano, &cancel).unwrap();
        assert_eq!(cubemap.pixel(CubeFace::Top, EDGE / 4, EDGE / 2), red);
    }

    #[test]
    fn test_midway_cancel_stops_at_next_poll() {
        use std::time::Duration;

        // Large enough that the build comfortably outlasts the cancel
        // delay; the outcome still tolerates a fast machine finishing more
        // columns than expected.
        let width = 4096u32;
        let height = width / 2;
        let edge = width / 4;
        let data = vec![128u8; width as usize * height as usize * 3];
        let pano = Equirect::new(&data, width, height).unwrap();
        let mut out = vec![0u8; byte_len(edge)];
        let cancel = AtomicBool::new(false);

        let outcome = std::thread::scope(|scope| {
            scope.spawn(|| {
                std::thread::sleep(Duration::from_millis(100));
                cancel.store(true, Ordering::Relaxed);
            });
            build_cubemap_into(&pano, &mut out, &cancel).unwrap()
        });

        match outcome {
            BuildOutcome::Cancelled { columns_done } => {
                assert!(
                    columns_done > 0 && columns_done < width,
                    "stopped at column {}",
                    columns_done
                );
                // Columns at and past the poll point are never written. The
                // right face is fed only by the strip band starting at
                // column 3 * edge, so when the build stopped before that
                // band the whole face must still be zeroed.
                if columns_done <= 3 * edge {
                    let face_len = (edge * edge * 3) as usize;
                    let start = CubeFace::Right.index() * face_len;
                    assert!(
                        out[start..start + face_len].iter().all(|&b| b == 0),
                        "face past the cancelled column was written"
                    );
                }
            }
            BuildOutcome::Complete => {
                panic!("build finished before the cancel flag was polled");
            }
        }
    }

    #[test]
    fn test_preset_cancel_writes_nothing() {
        let data = solid([9, 9, 9]);
        let pano = Equirect::new(&data, W, H).unwrap();
        let mut out = vec![0u8; byte_len(EDGE)];
        let cancel = AtomicBool::new(true);
        let outcome = build_cubemap_into(&pano, &mut out, &cancel).unwrap();
        assert_eq!(outcome, BuildOutcome::Cancelled { columns_done: 0 });
        assert!(out.iter().all(|&b| b == 0));
        // The owning entry point surfaces the same condition as an error.
        assert!(matches!(
            build_cubemap(&pano, &cancel),
            Err(CubemapError::Cancelled)
        ));
    }

    #[test]
    fn test_unset_cancel_completes() {
        let data = solid([9, 9, 9]);
        let pano = Equirect::new(&data, W, H).unwrap();
        let mut out = vec![0u8; byte_len(EDGE)];
        let cancel = AtomicBool::new(false);
        let outcome = build_cubemap_into(&pano, &mut out, &cancel).unwrap();
        assert_eq!(outcome, BuildOutcome::Complete);
        assert!(out.chunks_exact(3).all(|p| p == [9, 9, 9]));
    }

    #[test]
    fn test_from_raw_checks_length() {
        assert!(Cubemap::from_raw(4, vec![0u8; 6 * 4 * 4 * 3]).is_ok());
        assert!(matches!(
            Cubemap::from_raw(4, vec![0u8; 7]),
            Err(CubemapError::BufferSize { actual: 7, .. })
        ));
    }
}
