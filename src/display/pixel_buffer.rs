use super::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

// ============================================================================
// Utility Functions
// ============================================================================

/// Alpha blend a single color channel
/// Uses fast approximation: (x + 1 + (x >> 8)) >> 8 instead of x / 255
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// Write ABGR pixel to slice (RGBA8888 little-endian byte order)
#[inline]
fn write_pixel(dest: &mut [u8], r: u8, g: u8, b: u8) {
    dest[0] = 255; // A
    dest[1] = b; // B
    dest[2] = g; // G
    dest[3] = r; // R
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8888 pixel buffer for software rendering
/// This is the raster surface the particle field draws into
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a new pixel buffer with default resolution (640x480)
    pub fn new() -> Self {
        Self::with_size(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    /// Create a new pixel buffer with custom resolution
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; (width * height * 4) as usize],
            width,
            height,
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

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    /// Clear to a solid color
    /// Optimized: uses u32 fill for maximum speed
    pub fn clear(&mut self, r: u8, g: u8, b: u8) {
        // Create ABGR u32 pattern
        let pixel = u32::from_ne_bytes([255, b, g, r]);

        // Safety: pixels.len() is always divisible by 4 (width * height * 4).
        // We use write_unaligned to avoid assuming alignment of Vec<u8>.
        let ptr = self.pixels.as_mut_ptr() as *mut u32;
        let len = self.pixels.len() / 4;

        for i in 0..len {
            // Safety: i < len ensures we stay within bounds, and we use
            // write_unaligned for portability across platforms with different
            // alignment requirements.
            unsafe {
                ptr.add(i).write_unaligned(pixel);
            }
        }
    }

    /// Fade the entire buffer (multiply all colors by factor)
    /// factor: 0.0 = black, 1.0 = unchanged
    pub fn fade(&mut self, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        let factor_u16 = (factor * 256.0) as u16;

        for chunk in self.pixels.chunks_exact_mut(4) {
            // Skip alpha (chunk[0]), fade RGB using bit shift instead of division
            chunk[1] = ((chunk[1] as u16 * factor_u16) >> 8) as u8;
            chunk[2] = ((chunk[2] as u16 * factor_u16) >> 8) as u8;
            chunk[3] = ((chunk[3] as u16 * factor_u16) >> 8) as u8;
        }
    }

    /// Set a single pixel (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            write_pixel(&mut self.pixels[idx..idx + 4], r, g, b);
        }
    }

    /// Set pixel with alpha blending
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            let alpha = a as u16;
            self.pixels[idx] = 255; // A - always opaque
            self.pixels[idx + 1] = blend_channel(b, self.pixels[idx + 1], alpha);
            self.pixels[idx + 2] = blend_channel(g, self.pixels[idx + 2], alpha);
            self.pixels[idx + 3] = blend_channel(r, self.pixels[idx + 3], alpha);
        }
    }

    /// Additive blend a pixel (colors saturate at 255)
    /// Used for glow halos
    #[inline]
    pub fn blend_pixel_additive(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            self.pixels[idx + 1] = self.pixels[idx + 1].saturating_add(b);
            self.pixels[idx + 2] = self.pixels[idx + 2].saturating_add(g);
            self.pixels[idx + 3] = self.pixels[idx + 3].saturating_add(r);
        }
    }

    /// Read a pixel from the buffer (bounds checked)
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some((
                self.pixels[idx + 3], // R
                self.pixels[idx + 2], // G
                self.pixels[idx + 1], // B
            ))
        } else {
            None
        }
    }

    /// Draw a horizontal line with alpha blending
    pub fn hline_blend(&mut self, x1: i32, x2: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        if start > end {
            return;
        }

        let alpha = a as u16;
        let mut idx = self.pixel_index(start as u32, y as u32);
        let count = (end - start + 1) as usize;
        for _ in 0..count {
            self.pixels[idx] = 255;
            self.pixels[idx + 1] = blend_channel(b, self.pixels[idx + 1], alpha);
            self.pixels[idx + 2] = blend_channel(g, self.pixels[idx + 2], alpha);
            self.pixels[idx + 3] = blend_channel(r, self.pixels[idx + 3], alpha);
            idx += 4;
        }
    }

    /// Draw a line with alpha blending using Bresenham's algorithm.
    /// Per-pixel bounds checks via blend_pixel; fine for the short
    /// connection segments this renderer draws.
    pub fn line_blend(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, r: u8, g: u8, b: u8, a: u8) {
        let dx = (x1 - x0).abs();
        let dy = -((y1 - y0).abs());
        let sx = if x0 < x1 { 1i32 } else { -1i32 };
        let sy = if y0 < y1 { 1i32 } else { -1i32 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            self.blend_pixel(x, y, r, g, b, a);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Alpha-blended line with per-pixel color interpolation between the
    /// endpoint colors (for hue-gradient connection links).
    pub fn line_blend_gradient(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        c0: (u8, u8, u8),
        c1: (u8, u8, u8),
        a: u8,
    ) {
        let dx = (x1 - x0).abs();
        let dy = -((y1 - y0).abs());
        let steps = dx.max(-dy).max(1) as f32;
        let sx = if x0 < x1 { 1i32 } else { -1i32 };
        let sy = if y0 < y1 { 1i32 } else { -1i32 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;
        let mut step = 0f32;

        loop {
            let t = step / steps;
            let cr = (c0.0 as f32 + (c1.0 as f32 - c0.0 as f32) * t) as u8;
            let cg = (c0.1 as f32 + (c1.1 as f32 - c0.1 as f32) * t) as u8;
            let cb = (c0.2 as f32 + (c1.2 as f32 - c0.2 as f32) * t) as u8;
            self.blend_pixel(x, y, cr, cg, cb, a);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            step += 1.0;
        }
    }

    /// Fill a circle with alpha blending (for soft particle disks)
    pub fn fill_circle_blend(&mut self, cx: i32, cy: i32, radius: i32, r: u8, g: u8, b: u8, a: u8) {
        if radius <= 0 {
            if radius == 0 {
                self.blend_pixel(cx, cy, r, g, b, a);
            }
            return;
        }

        // Midpoint circle algorithm with blended span filling
        let mut xi = radius;
        let mut y = 0;
        let mut err = 1 - radius;

        while xi >= y {
            self.hline_blend(cx - xi, cx + xi, cy + y, r, g, b, a);
            if y != 0 {
                self.hline_blend(cx - xi, cx + xi, cy - y, r, g, b, a);
            }
            if xi != y {
                self.hline_blend(cx - y, cx + y, cy + xi, r, g, b, a);
                if y != 0 {
                    self.hline_blend(cx - y, cx + y, cy - xi, r, g, b, a);
                }
            }

            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                xi -= 1;
                err += 2 * (y - xi) + 1;
            }
        }
    }

    /// Filled circle with radial gradient falloff (the glow halo).
    /// `falloff` controls the curve: 1.0=linear, 2.0=quadratic, 0.5=wide glow.
    /// Uses additive blending so overlapping glows accumulate naturally.
    pub fn fill_circle_gradient(
        &mut self,
        cx: i32,
        cy: i32,
        radius: i32,
        r: u8,
        g: u8,
        b: u8,
        falloff: f32,
    ) {
        if radius <= 0 {
            return;
        }
        let r_sq = (radius * radius) as f32;
        let r_f = radius as f32;

        let y_start = (cy - radius).max(0);
        let y_end = (cy + radius).min(self.height as i32 - 1);
        let x_start = (cx - radius).max(0);
        let x_end = (cx + radius).min(self.width as i32 - 1);

        for y in y_start..=y_end {
            let dy = (y - cy) as f32;
            let dy_sq = dy * dy;
            for x in x_start..=x_end {
                let dx = (x - cx) as f32;
                let dist_sq = dx * dx + dy_sq;
                if dist_sq > r_sq {
                    continue;
                }

                let dist = dist_sq.sqrt();
                let t = (1.0 - dist / r_f).powf(falloff);
                self.blend_pixel_additive(
                    x,
                    y,
                    (r as f32 * t) as u8,
                    (g as f32 * t) as u8,
                    (b as f32 * t) as u8,
                );
            }
        }
    }

    /// Raw bytes for SDL texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new()
    }
}
