//! Image primitives and utilities.
//!
//! Chart images are long horizontal strips, so the crate uses a lightweight
//! owned RGB image type (`OwnedImage`) that is cheap to crop column-wise.
//!
//! For read-only operations we borrow a view (`Image<'a>`) instead of copying
//! pixels. Views convert to owned images when a pipeline step needs to mutate
//! (upscaling, blackout, binarization).

use anyhow::{Context, Result};

/// Owned RGB image (no alpha).
#[derive(Clone, Debug)]
pub struct OwnedImage {
    width: u32,
    height: u32,
    data: Vec<Color>,
}

impl OwnedImage {
    /// Solid-color image of the given dimensions.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            data: vec![color; (width as usize) * (height as usize)],
        }
    }

    /// Decode an image file (alpha is discarded).
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("decode image {}", path.display()))?
            .to_rgb8();
        Ok(Self::from_rgb_image(&img))
    }

    /// Decode from in-memory bytes (PNG, JPG, ...).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .context("decode image bytes")?
            .to_rgb8();
        Ok(Self::from_rgb_image(&img))
    }

    fn from_rgb_image(img: &image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let data = img.pixels().map(|p| Color::new(p.0[0], p.0[1], p.0[2])).collect();
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Upscale both dimensions by an integer factor.
    ///
    /// Uses `fast_image_resize` (SIMD-optimized). A factor of 1 is a no-op;
    /// OCR generally performs better on larger glyphs, at a latency cost.
    pub fn upscale(&mut self, factor: u32) {
        if factor <= 1 {
            return;
        }

        let width = self.width * factor;
        let height = self.height * factor;

        // SAFETY: `Color` is `#[repr(C)]` with 3 x `u8`, so it is layout-compatible
        // with `fast_image_resize::pixels::U8x3` (alignment 1).
        let src_pixels = unsafe {
            std::slice::from_raw_parts(
                self.data.as_ptr() as *const fast_image_resize::pixels::U8x3,
                self.data.len(),
            )
        };

        let src = fast_image_resize::images::ImageRef::from_pixels(self.width, self.height, src_pixels)
            .expect("fast_image_resize: ImageRef::from_pixels failed");

        let mut dst = fast_image_resize::images::Image::new(width, height, fast_image_resize::PixelType::U8x3);

        let mut resizer = fast_image_resize::Resizer::new();
        let options = fast_image_resize::ResizeOptions::new().resize_alg(
            fast_image_resize::ResizeAlg::Interpolation(fast_image_resize::FilterType::CatmullRom),
        );

        resizer
            .resize(&src, &mut dst, &Some(options))
            .expect("fast_image_resize: resize failed");

        let bytes: Vec<u8> = dst.into_vec();
        let mut data = Vec::with_capacity((width * height) as usize);
        for px in bytes.chunks_exact(3) {
            data.push(Color::new(px[0], px[1], px[2]));
        }

        self.width = width;
        self.height = height;
        self.data = data;
    }

    /// Fill the bottom `rows` rows with a solid color.
    ///
    /// Charts carry branding/UI chrome at the very bottom edge that would
    /// otherwise confuse OCR, so the scanner blacks it out first.
    pub fn fill_bottom(&mut self, rows: u32, color: Color) {
        let rows = rows.min(self.height);
        let start = ((self.height - rows) * self.width) as usize;
        for px in &mut self.data[start..] {
            *px = color;
        }
    }

    /// Convert to a grayscale `GrayImage` (luma).
    pub fn to_gray_image(&self) -> image::GrayImage {
        use image::{GrayImage, Luma};
        let mut out = GrayImage::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.data[(x + y * self.width) as usize];
                out.put_pixel(x, y, Luma([c.luma()]));
            }
        }
        out
    }

    /// Create an RGB `OwnedImage` from a grayscale image (each pixel repeated into RGB).
    pub fn from_gray_as_rgb(gray: &image::GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let mut data = Vec::with_capacity((w * h) as usize);
        for p in gray.pixels() {
            let v = p.0[0];
            data.push(Color::new(v, v, v));
        }
        Self {
            width: w,
            height: h,
            data,
        }
    }

    /// Global Otsu threshold in inverted-binary mode.
    ///
    /// Measure-number glyphs become white foreground on a black background,
    /// which is what the digit recognizer expects.
    pub fn binarized_inverted(&self) -> Self {
        use imageproc::contrast::{otsu_level, threshold, ThresholdType};

        let gray = self.to_gray_image();
        let level = otsu_level(&gray);
        let bin = threshold(&gray, level, ThresholdType::BinaryInverted);
        Self::from_gray_as_rgb(&bin)
    }

    /// Create a borrowed view of this entire image.
    pub fn as_image<'a>(&'a self) -> Image<'a> {
        Image {
            x1: 0,
            y1: 0,
            x2: self.width,
            y2: self.height,
            true_width: self.width,
            data: &self.data,
        }
    }

    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        self.as_image().save_png(path)
    }

    /// Encode as PNG into an in-memory buffer.
    pub fn png_bytes(&self) -> Result<Vec<u8>> {
        let img = image::RgbImage::from_raw(self.width, self.height, self.as_image().get_bytes())
            .context("RgbImage::from_raw failed")?;
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .context("encode png")?;
        Ok(out.into_inner())
    }
}

// ----------

/// Borrowed image view into an `OwnedImage`.
#[derive(Clone, Copy)]
pub struct Image<'a> {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
    true_width: u32,
    data: &'a [Color],
}

impl<'a> Image<'a> {
    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    #[inline(always)]
    fn pixel(&self, x: u32, y: u32) -> &Color {
        &self.data[(x + y * self.true_width) as usize]
    }

    /// Pixel at view-relative coordinates.
    pub fn pixel_at(&self, x: u32, y: u32) -> Color {
        *self.pixel(self.x1 + x, self.y1 + y)
    }

    pub fn to_owned_image(self) -> OwnedImage {
        let mut data = Vec::with_capacity((self.width() * self.height()) as usize);
        for y in self.y1..self.y2 {
            for x in self.x1..self.x2 {
                data.push(*self.pixel(x, y));
            }
        }

        OwnedImage {
            width: self.width(),
            height: self.height(),
            data,
        }
    }

    /// Tightly packed RGB bytes of the view.
    pub fn get_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0; (self.width() * self.height() * 3) as usize];
        let mut i = 0;
        for y in self.y1..self.y2 {
            for x in self.x1..self.x2 {
                let clr = self.pixel(x, y);
                bytes[i] = clr.r;
                bytes[i + 1] = clr.g;
                bytes[i + 2] = clr.b;
                i += 3;
            }
        }
        bytes
    }

    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let bytes = self.get_bytes();
        let img = image::RgbImage::from_raw(self.width(), self.height(), bytes)
            .context("RgbImage::from_raw failed")?;
        img.save_with_format(path, image::ImageFormat::Png)
            .context("save png")?;
        Ok(())
    }

    /// Create an arbitrary subimage (relative coordinates, clamped to bounds).
    pub fn sub_image(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let width = width.min(self.width() - x);
        let height = height.min(self.height() - y);

        Self {
            x1: self.x1 + x,
            y1: self.y1 + y,
            x2: self.x1 + x + width,
            y2: self.y1 + y + height,
            true_width: self.true_width,
            data: self.data,
        }
    }
}

// ----------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[repr(C)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Compute luma (grayscale intensity).
    pub fn luma(&self) -> u8 {
        let r = self.r as u32;
        let g = self.g as u32;
        let b = self.b as u32;
        ((299 * r + 587 * g + 114 * b) / 1000) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_bottom_blacks_out_rows() {
        let mut img = OwnedImage::filled(4, 4, Color::WHITE);
        img.fill_bottom(2, Color::BLACK);

        let view = img.as_image();
        assert_eq!(view.pixel_at(0, 1), Color::WHITE);
        assert_eq!(view.pixel_at(0, 2), Color::BLACK);
        assert_eq!(view.pixel_at(3, 3), Color::BLACK);
    }

    #[test]
    fn sub_image_clamps_to_bounds() {
        let img = OwnedImage::filled(10, 5, Color::WHITE);
        let view = img.as_image().sub_image(8, 0, 10, 10);
        assert_eq!(view.width(), 2);
        assert_eq!(view.height(), 5);
    }

    #[test]
    fn upscale_doubles_dimensions() {
        let mut img = OwnedImage::filled(7, 3, Color::WHITE);
        img.upscale(2);
        assert_eq!((img.width(), img.height()), (14, 6));
        assert_eq!(img.as_image().pixel_at(0, 0), Color::WHITE);
    }

    #[test]
    fn binarize_inverts_dark_glyphs() {
        // Dark "glyph" pixels on a light background must come out white.
        let mut img = OwnedImage::filled(8, 8, Color::WHITE);
        img.fill_bottom(2, Color::BLACK);
        let bin = img.binarized_inverted();
        assert_eq!(bin.as_image().pixel_at(0, 7), Color::WHITE);
        assert_eq!(bin.as_image().pixel_at(0, 0), Color::BLACK);
    }
}
