//! Cube face identification and the per-face coordinate mappings.
//!
//! The discriminant values fix the face order inside a cube-map buffer: each
//! face occupies `edge * edge * 3` bytes at offset `index * edge * edge * 3`.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Identifies one of the six oriented faces of the unit cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CubeFace {
    Front = 0,
    Back = 1,
    Top = 2,
    Bottom = 3,
    Right = 4,
    Left = 5,
}

impl CubeFace {
    /// Returns all six cube faces in buffer order.
    pub const fn all() -> [CubeFace; 6] {
        [
            CubeFace::Front,
            CubeFace::Back,
            CubeFace::Top,
            CubeFace::Bottom,
            CubeFace::Right,
            CubeFace::Left,
        ]
    }

    /// Returns the face index (0-5) used for cube-map buffer offsets.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Creates a face from an index (0-5).
    pub const fn from_index(index: usize) -> Option<CubeFace> {
        match index {
            0 => Some(CubeFace::Front),
            1 => Some(CubeFace::Back),
            2 => Some(CubeFace::Top),
            3 => Some(CubeFace::Bottom),
            4 => Some(CubeFace::Right),
            5 => Some(CubeFace::Left),
            _ => None,
        }
    }

    /// Returns a short lowercase name for the face (e.g., "front").
    pub const fn short_name(self) -> &'static str {
        match self {
            CubeFace::Front => "front",
            CubeFace::Back => "back",
            CubeFace::Top => "top",
            CubeFace::Bottom => "bottom",
            CubeFace::Right => "right",
            CubeFace::Left => "left",
        }
    }

    /// Maps a local face pixel `(i, j)` to its direction on the unit cube.
    ///
    /// This is the builder-side half of the face mapping pair: the cube-map
    /// builder turns each destination pixel into a direction, converts it to
    /// spherical angles and samples the panorama there. The face plane sits at
    /// distance 1 from the cube center along the face's normal axis; the two
    /// remaining components sweep [-1, 1) as `i` and `j` sweep `0..edge`.
    #[inline]
    pub fn grid_direction(self, i: u32, j: u32, edge: u32) -> DVec3 {
        let a = f64::from(i) * 2.0 / f64::from(edge);
        let b = f64::from(j) * 2.0 / f64::from(edge);
        match self {
            CubeFace::Front => DVec3::new(1.0, a - 1.0, 1.0 - b),
            CubeFace::Back => DVec3::new(-1.0, 1.0 - a, 1.0 - b),
            CubeFace::Top => DVec3::new(1.0 - b, a - 1.0, -1.0),
            CubeFace::Bottom => DVec3::new(b - 1.0, a - 1.0, 1.0),
            CubeFace::Right => DVec3::new(1.0 - a, 1.0, 1.0 - b),
            CubeFace::Left => DVec3::new(a - 1.0, -1.0, 1.0 - b),
        }
    }

    /// Selects the face a camera-space ray hits and the dominant magnitude.
    ///
    /// The camera sits at the cube center, so the first face hit is decided by
    /// the axis with the greatest absolute component, its sign picking between
    /// that axis' two faces. Ties fall through to the z branch.
    #[inline]
    pub fn from_ray(dir: DVec3) -> (CubeFace, f64) {
        let abs = dir.abs();
        if abs.x > abs.y && abs.x > abs.z {
            let face = if dir.x > 0.0 {
                CubeFace::Right
            } else {
                CubeFace::Left
            };
            (face, abs.x)
        } else if abs.y > abs.x && abs.y > abs.z {
            let face = if dir.y > 0.0 {
                CubeFace::Top
            } else {
                CubeFace::Bottom
            };
            (face, abs.y)
        } else {
            let face = if dir.z > 0.0 {
                CubeFace::Front
            } else {
                CubeFace::Back
            };
            (face, abs.z)
        }
    }

    /// Maps a ray scaled onto this face's plane to local face pixel coordinates.
    ///
    /// This is the projector-side half of the face mapping pair and the exact
    /// inverse of [`CubeFace::grid_direction`] (through the builder basis
    /// change `(z, x, -y)`); letting the two drift apart produces visible
    /// seams between cube-map construction and projection. `dir` must already
    /// be scaled so its dominant component equals `half` in magnitude. The
    /// clips are one-sided and asymmetric, reflecting discrete pixel centers.
    #[inline]
    pub fn ray_to_pixel(self, dir: DVec3, half: f64) -> (u32, u32) {
        match self {
            CubeFace::Front => {
                let x1 = dir.x.clamp(-half, half - 1.0).round();
                let y1 = dir.y.clamp(-half, half - 1.0).round();
                ((x1 + half) as u32, (y1 + half) as u32)
            }
            CubeFace::Back => {
                let x1 = dir.x.clamp(-half + 1.0, half).round();
                let y1 = dir.y.clamp(-half, half - 1.0).round();
                ((half - x1) as u32, (y1 + half) as u32)
            }
            CubeFace::Top => {
                let x1 = dir.x.clamp(-half, half - 1.0).round();
                let z1 = dir.z.clamp(-half + 1.0, half).round();
                ((x1 + half) as u32, (half - z1) as u32)
            }
            CubeFace::Bottom => {
                let x1 = dir.x.clamp(-half, half - 1.0).round();
                let z1 = dir.z.clamp(-half, half - 1.0).round();
                ((x1 + half) as u32, (z1 + half) as u32)
            }
            CubeFace::Right => {
                let y1 = dir.y.clamp(-half, half - 1.0).round();
                let z1 = dir.z.clamp(-half + 1.0, half).round();
                ((half - z1) as u32, (y1 + half) as u32)
            }
            CubeFace::Left => {
                let y1 = dir.y.clamp(-half, half - 1.0).round();
                let z1 = dir.z.clamp(-half, half - 1.0).round();
                ((z1 + half) as u32, (y1 + half) as u32)
            }
        }
    }
}
