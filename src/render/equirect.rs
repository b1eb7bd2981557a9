//! Borrowed view over an equirectangular panorama buffer.

use thiserror::Error;

/// Errors raised when wrapping a panorama buffer.
#[derive(Error, Debug)]
pub enum EquirectError {
    #[error("buffer is {actual} bytes, expected {expected} for {width}x{height} RGB")]
    SizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },
    #[error("panorama dimensions {0}x{1} must be nonzero")]
    ZeroDimension(u32, u32),
}

/// A dense row-major RGB equirectangular panorama, borrowed from the caller.
///
/// Horizontal position encodes longitude and vertical position latitude; by
/// panorama convention the height is half the width. The buffer length is
/// checked once at construction so the sampling loops can skip per-pixel
/// bounds checks.
#[derive(Debug, Clone, Copy)]
pub struct Equirect<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> Equirect<'a> {
    /// Wraps an interleaved RGB buffer of the given dimensions.
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self, EquirectError> {
        if width == 0 || height == 0 {
            return Err(EquirectError::ZeroDimension(width, height));
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(EquirectError::SizeMismatch {
                actual: data.len(),
                expected,
                width,
                height,
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Panorama width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Panorama height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw interleaved RGB bytes.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let idx = (y * self.width as usize + x) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Bilinearly samples the panorama at fractional coordinates `(u, v)`.
    ///
    /// The panorama covers a full sphere, so `u` wraps modulo the image
    /// width; `v` clamps to the top and bottom rows since the poles are
    /// edges, not periodic.
    #[inline]
    pub fn sample_bilinear(&self, u: f64, v: f64) -> [u8; 3] {
        let width = i64::from(self.width);
        let height = i64::from(self.height);

        let ui = u.floor() as i64;
        let vi = v.floor() as i64;
        let mu = u - ui as f64;
        let nu = v - vi as f64;

        let x0 = ui.rem_euclid(width) as usize;
        let x1 = (ui + 1).rem_euclid(width) as usize;
        let y0 = vi.clamp(0, height - 1) as usize;
        let y1 = (vi + 1).clamp(0, height - 1) as usize;

        let a = self.pixel(x0, y0);
        let b = self.pixel(x1, y0);
        let c = self.pixel(x0, y1);
        let d = self.pixel(x1, y1);

        let mut out = [0u8; 3];
        for ch in 0..3 {
            let blended = f64::from(a[ch]) * (1.0 - mu) * (1.0 - nu)
                + f64::from(b[ch]) * mu * (1.0 - nu)
                + f64::from(c[ch]) * (1.0 - mu) * nu
                + f64::from(d[ch]) * mu * nu;
            out[ch] = blended.round() as u8;
        }
        out
    }
}
