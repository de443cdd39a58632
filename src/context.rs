//! Pixel buffer and derived sample planes shared by the transform stages.

use bytemuck::{Pod, Zeroable};

use crate::{
    color::{rgb_to_ycbcr, ycbcr_to_rgb, Rgb},
    error::{Error, Result},
    subsample::reduce_chrominance_size,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// An RGBA image together with its Y'CbCr planes.
///
/// All planes are row-major. `yp`, `cb` and `cr` have one sample per pixel and are filled by
/// [`Context::convert_colors`]. `n_cb` and `n_cr` hold the subsampled chroma planes produced by
/// [`Context::reduce_chrominance`].
pub struct Context {
    width: usize,
    height: usize,
    rgba: Vec<u8>,

    pub yp: Vec<i32>,
    pub cb: Vec<i32>,
    pub cr: Vec<i32>,

    pub n_cb: Vec<i32>,
    pub n_cr: Vec<i32>,
}

impl Context {
    /// Creates a context from `width * height` RGBA pixels (4 bytes each).
    pub fn new(width: usize, height: usize, rgba: Vec<u8>) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| Error::from(format!("image size {width}x{height} overflows")))?;
        if rgba.len() != expected {
            return Err(Error::from(format!(
                "pixel buffer of {}x{} image should be {} bytes, got {}",
                width,
                height,
                expected,
                rgba.len()
            )));
        }

        Ok(Self {
            width,
            height,
            rgba,
            yp: Vec::new(),
            cb: Vec::new(),
            cr: Vec::new(),
            n_cb: Vec::new(),
            n_cr: Vec::new(),
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixels(&self) -> &[Rgba] {
        bytemuck::cast_slice(&self.rgba)
    }

    /// Fills the full-resolution `yp`, `cb` and `cr` planes from the pixel buffer.
    pub fn convert_colors(&mut self) {
        let n = self.width * self.height;
        let (mut yp, mut cb, mut cr) = (
            Vec::with_capacity(n),
            Vec::with_capacity(n),
            Vec::with_capacity(n),
        );
        for px in self.pixels() {
            let ycc = rgb_to_ycbcr(px.r, px.g, px.b);
            yp.push(ycc.y);
            cb.push(ycc.cb);
            cr.push(ycc.cr);
        }
        self.yp = yp;
        self.cb = cb;
        self.cr = cr;
    }

    /// Fills `n_cb` and `n_cr` by subsampling the full-resolution chroma planes.
    ///
    /// # Panics
    ///
    /// Panics if [`Context::convert_colors`] has not been called, or if a factor is zero.
    pub fn reduce_chrominance(&mut self, x_factor: usize, y_factor: usize) {
        let (w, h) = (self.width, self.height);
        self.n_cb = reduce_chrominance_size(&self.cb, w, h, x_factor, y_factor);
        self.n_cr = reduce_chrominance_size(&self.cr, w, h, x_factor, y_factor);
        log::trace!(
            "reduced chroma planes by {}x{} to {} samples",
            x_factor,
            y_factor,
            self.n_cb.len()
        );
    }

    /// Writes an opaque pixel at pixel index `index`.
    pub fn put_pixel(&mut self, index: usize, rgb: Rgb) {
        let pixels: &mut [Rgba] = bytemuck::cast_slice_mut(&mut self.rgba);
        pixels[index] = Rgba {
            r: rgb.r,
            g: rgb.g,
            b: rgb.b,
            a: 0xFF,
        };
    }

    /// Rebuilds the pixel buffer from the full-resolution Y'CbCr planes.
    ///
    /// Only pixels present in all three planes are written; the rest keep their current value.
    pub fn reconstruct_rgb(&mut self) {
        let count = self.width * self.height;
        let planes = self.yp.iter().zip(&self.cb).zip(&self.cr).take(count);
        let rgb: Vec<Rgb> = planes.map(|((&y, &cb), &cr)| ycbcr_to_rgb(y, cb, cr)).collect();
        for (i, rgb) in rgb.into_iter().enumerate() {
            self.put_pixel(i, rgb);
        }
    }
}
