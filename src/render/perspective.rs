//! Perspective (rectilinear) view rendering.
//!
//! Casts one ray per output pixel through the rotated camera basis and reads
//! the cube-map face it hits; a degraded path samples the equirectangular
//! panorama directly when no cube map has been built. A single call is
//! bounded and fast (tens of milliseconds for typical interactive sizes), so
//! unlike the cube-map build there is no cancellation hook.

use std::f64::consts::{FRAC_PI_2, PI};

use glam::DVec3;
use thiserror::Error;

use crate::geometry::{fast_atan2, Camera, CubeFace};
use super::cubemap::Cubemap;
use super::equirect::Equirect;

/// Errors raised by projection entry points.
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("output buffer is {actual} bytes, expected {expected} for {width}x{height} RGB")]
    BufferSize {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },
    #[error("output dimensions {0}x{1} must be nonzero")]
    ZeroDimension(u32, u32),
}

fn check_output(out: &[u8], width: u32, height: u32) -> Result<(), ProjectError> {
    if width == 0 || height == 0 {
        return Err(ProjectError::ZeroDimension(width, height));
    }
    let expected = width as usize * height as usize * 3;
    if out.len() != expected {
        return Err(ProjectError::BufferSize {
            actual: out.len(),
            expected,
            width,
            height,
        });
    }
    Ok(())
}

/// Renders a perspective view of a cube map into a fresh buffer.
pub fn project(
    cubemap: &Cubemap,
    width: u32,
    height: u32,
    camera: Camera,
) -> Result<Vec<u8>, ProjectError> {
    let mut out = vec![0u8; width as usize * height as usize * 3];
    project_into(cubemap, &mut out, width, height, camera)?;
    Ok(out)
}

/// Renders a perspective view of a cube map into a caller-owned buffer.
///
/// One ray is cast per output pixel against a view plane at unit distance
/// along the camera's forward axis. The ray is updated incrementally across
/// each row (the per-pixel delta along the right basis vector is a constant
/// stride), the cube face is picked by dominant axis, and the face pixel is
/// copied to the horizontally mirrored output column. The mirroring is a
/// chirality correction so the rendered view matches the viewer's expected
/// left/right orientation.
pub fn project_into(
    cubemap: &Cubemap,
    out: &mut [u8],
    width: u32,
    height: u32,
    camera: Camera,
) -> Result<(), ProjectError> {
    check_output(out, width, height)?;

    let basis = camera.world_from_camera();
    let right = basis.col(0);
    let up = basis.col(1);
    let forward = basis.col(2);
    let fov_constant = camera.fov_constant();

    let edge = cubemap.edge() as usize;
    let half = f64::from(cubemap.edge() / 2);
    let data = cubemap.data();
    let w = width as usize;

    for y in 0..height {
        let y1 = (f64::from(y) * 2.0 / f64::from(height) - 1.0) / fov_constant;
        let mut dir = y1 * up - forward;
        let mut prev_x1 = 0.0;
        for x in 0..width {
            let x1 = (f64::from(x) * 2.0 / f64::from(width) - 1.0) / fov_constant;
            dir += (x1 - prev_x1) * right;
            prev_x1 = x1;

            let (face, abs_max) = CubeFace::from_ray(dir);
            let scaled = dir * (half / abs_max);
            let (fx, fy) = face.ray_to_pixel(scaled, half);

            let src = (face.index() * edge * edge + fy as usize * edge + fx as usize) * 3;
            let dst = (y as usize * w + (w - 1 - x as usize)) * 3;
            out[dst..dst + 3].copy_from_slice(&data[src..src + 3]);
        }
    }
    Ok(())
}

/// Renders a perspective view straight from the panorama into a fresh buffer.
pub fn project_equirect(
    src: &Equirect<'_>,
    width: u32,
    height: u32,
    camera: Camera,
) -> Result<Vec<u8>, ProjectError> {
    let mut out = vec![0u8; width as usize * height as usize * 3];
    project_equirect_into(src, &mut out, width, height, camera)?;
    Ok(out)
}

/// Renders a perspective view straight from the panorama, without a cube map.
///
/// Degraded mode for when no cube map has been built yet: the ray setup is
/// identical to [`project_into`], but every ray is converted to spherical
/// angles and sampled bilinearly from the equirectangular source. Roughly an
/// order of magnitude more transcendental work per pixel than the cube-map
/// path, which is why repeated rendering precomputes the cube map.
pub fn project_equirect_into(
    src: &Equirect<'_>,
    out: &mut [u8],
    width: u32,
    height: u32,
    camera: Camera,
) -> Result<(), ProjectError> {
    check_output(out, width, height)?;

    let basis = camera.world_from_camera();
    let right = basis.col(0);
    let up = basis.col(1);
    let forward = basis.col(2);
    let fov_constant = camera.fov_constant();

    let quarter = f64::from(src.width()) / 4.0;
    let w = width as usize;

    for y in 0..height {
        let y1 = (f64::from(y) * 2.0 / f64::from(height) - 1.0) / fov_constant;
        let mut dir = y1 * up - forward;
        let mut prev_x1 = 0.0;
        for x in 0..width {
            let x1 = (f64::from(x) * 2.0 / f64::from(width) - 1.0) / fov_constant;
            dir += (x1 - prev_x1) * right;
            prev_x1 = x1;

            // Camera basis -> builder basis, then the builder's angle and
            // panorama coordinate formulas.
            let b = DVec3::new(dir.z, dir.x, -dir.y);
            let theta = fast_atan2(b.y, b.x);
            let phi = fast_atan2(b.z, (b.x * b.x + b.y * b.y).sqrt());
            let u = 2.0 * quarter * (theta + PI) / PI;
            let v = 2.0 * quarter * (FRAC_PI_2 - phi) / PI;
            let rgb = src.sample_bilinear(u, v);

            let dst = (y as usize * w + (w - 1 - x as usize)) * 3;
            out[dst..dst + 3].copy_from_slice(&rgb);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EDGE: u32 = 32;
    const OUT: u32 = 64;

    fn face_color(face: CubeFace) -> [u8; 3] {
        let v = (face.index() as u8) * 40 + 20;
        [v, v.wrapping_add(3), v.wrapping_add(7)]
    }

    fn solid_face_cubemap() -> Cubemap {
        let face_len = (EDGE * EDGE * 3) as usize;
        let mut data = Vec::with_capacity(6 * face_len);
        for face in CubeFace::all() {
            let color = face_color(face);
            for _ in 0..(EDGE * EDGE) {
                data.extend_from_slice(&color);
            }
        }
        Cubemap::from_raw(EDGE, data).unwrap()
    }

    fn out_pixel(out: &[u8], x: u32, y: u32) -> [u8; 3] {
        let idx = (y as usize * OUT as usize + x as usize) * 3;
        [out[idx], out[idx + 1], out[idx + 2]]
    }

    // The center ray at x = OUT/2 lands in the mirrored column OUT/2 - 1.
    const CENTER_COL: u32 = OUT - 1 - OUT / 2;
    const CENTER_ROW: u32 = OUT / 2;

    #[test]
    fn test_rejects_bad_output() {
        let cubemap = solid_face_cubemap();
        let mut out = vec![0u8; 11];
        assert!(matches!(
            project_into(&cubemap, &mut out, OUT, OUT, Camera::default()),
            Err(ProjectError::BufferSize { actual: 11, .. })
        ));
        assert!(matches!(
            project(&cubemap, 0, OUT, Camera::default()),
            Err(ProjectError::ZeroDimension(0, OUT))
        ));
    }

    #[test]
    fn test_center_face_by_yaw() {
        // Horizontal view: the face straight ahead follows the yaw
        // convention fix-up (azimuth = 360 - yaw).
        let cubemap = solid_face_cubemap();
        let cases = [
            (90.0, CubeFace::Back),
            (270.0, CubeFace::Front),
            (0.0, CubeFace::Right),
            (180.0, CubeFace::Left),
        ];
        for (yaw, face) in cases {
            let out = project(&cubemap, OUT, OUT, Camera::new(yaw, 90.0, 90.0)).unwrap();
            assert_eq!(
                out_pixel(&out, CENTER_COL, CENTER_ROW),
                face_color(face),
                "yaw {} should face {:?}",
                yaw,
                face
            );
        }
    }

    #[test]
    fn test_center_face_by_pitch() {
        let cubemap = solid_face_cubemap();
        let out = project(&cubemap, OUT, OUT, Camera::new(0.0, 1.0, 90.0)).unwrap();
        assert_eq!(out_pixel(&out, CENTER_COL, CENTER_ROW), face_color(CubeFace::Top));
        let out = project(&cubemap, OUT, OUT, Camera::new(0.0, 179.0, 90.0)).unwrap();
        assert_eq!(
            out_pixel(&out, CENTER_COL, CENTER_ROW),
            face_color(CubeFace::Bottom)
        );
    }

    #[test]
    fn test_horizontal_mirroring() {
        // Back face split into a red left half and a blue right half; all
        // other faces green. Looking at the back face, the leftmost output
        // column must carry the color a naive (unmirrored) projection would
        // put at the rightmost column, and vice versa.
        let red = [255, 0, 0];
        let blue = [0, 0, 255];
        let half = EDGE / 2;
        let face_len = (EDGE * EDGE * 3) as usize;
        let mut data = vec![0u8; 6 * face_len];
        for chunk in data.chunks_exact_mut(3) {
            chunk.copy_from_slice(&[0, 255, 0]);
        }
        for y in 0..EDGE {
            for x in 0..EDGE {
                let idx = (CubeFace::Back.index() * (EDGE * EDGE) as usize
                    + (y * EDGE + x) as usize)
                    * 3;
                let color = if x < half { red } else { blue };
                data[idx..idx + 3].copy_from_slice(&color);
            }
        }
        let cubemap = Cubemap::from_raw(EDGE, data).unwrap();

        // yaw 90 looks at the back face; fov 60 keeps every ray on it.
        let out = project(&cubemap, OUT, OUT, Camera::new(90.0, 90.0, 60.0)).unwrap();
        assert_eq!(out_pixel(&out, 0, CENTER_ROW), red);
        assert_eq!(out_pixel(&out, OUT - 1, CENTER_ROW), blue);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let cubemap = solid_face_cubemap();
        let camera = Camera::new(123.0, 75.0, 45.0);
        let first = project(&cubemap, OUT, OUT, camera).unwrap();
        let second = project(&cubemap, OUT, OUT, camera).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_equirect_path_matches_on_solid_panorama() {
        use std::sync::atomic::AtomicBool;
        use crate::render::build_cubemap;

        let color = [37, 120, 200];
        let data: Vec<u8> = color.iter().copied().cycle().take(128 * 64 * 3).collect();
        let pano = Equirect::new(&data, 128, 64).unwrap();
        let camera = Camera::new(42.0, 100.0, 70.0);

        let direct = project_equirect(&pano, OUT, OUT, camera).unwrap();
        assert!(direct.chunks_exact(3).all(|p| p == color));

        let cancel = AtomicBool::new(false);
        let cubemap = build_cubemap(&pano, &cancel).unwrap();
        let via_cubemap = project(&cubemap, OUT, OUT, camera).unwrap();
        assert_eq!(direct, via_cubemap);
    }
}
