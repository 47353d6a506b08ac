/// WEIRD Project
/// `File` viewer/surface.rs
/// `Description` Software framebuffer surface
/// `Author` TioT2
/// `Last changed` 16.10.2026

use weird_map::math::Ext2su;

/// Borrowed 0x00RRGGBB pixel rectangle
pub struct Surface<'a> {
    data: &'a mut [u32],
    width: usize,
    height: usize,
    stride: usize,
} // struct Surface

impl<'a> Surface<'a> {
    /// Surface construction function
    /// * `data` - pixel data, at least `stride * height` long
    /// * `width`, `height` - surface size
    /// * `stride` - pixel distance between neighbour rows
    pub fn new(data: &'a mut [u32], width: usize, height: usize, stride: usize) -> Self {
        let height = if stride == 0 { 0 } else { height.min(data.len() / stride) };

        Self {
            data,
            width: width.min(stride),
            height,
            stride,
        }
    } // fn new

    pub fn get_extent(&self) -> Ext2su {
        Ext2su { width: self.width, height: self.height }
    }

    /// Top-left part of surface
    pub fn sub_surface(&mut self, width: usize, height: usize) -> Surface<'_> {
        Surface {
            width: width.min(self.width),
            height: height.min(self.height),
            stride: self.stride,
            data: &mut *self.data,
        }
    } // fn sub_surface

    pub fn clear(&mut self, color: u32) {
        for y in 0..self.height {
            self.data[y * self.stride..y * self.stride + self.width].fill(color);
        }
    }

    #[inline]
    pub fn put_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.data[y as usize * self.stride + x as usize] = color;
        }
    } // fn put_pixel

    /// Vertical span drawing function
    /// * `x` - column
    /// * `y0`, `y1` - span, `y1` excluded
    pub fn draw_column(&mut self, x: usize, y0: usize, y1: usize, color: u32) {
        if x >= self.width {
            return;
        }

        for y in y0..y1.min(self.height) {
            self.data[y * self.stride + x] = color;
        }
    } // fn draw_column

    /// Bresenham line drawing function
    pub fn draw_line(&mut self, x0: isize, y0: isize, x1: isize, y1: isize, color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };

        let (mut x, mut y) = (x0, y0);
        let mut error = dx + dy;

        loop {
            self.put_pixel(x, y, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = error * 2;
            if e2 >= dy {
                error += dy;
                x += sx;
            }
            if e2 <= dx {
                error += dx;
                y += sy;
            }
        }
    } // fn draw_line

    /// Filled rectangle drawing function, end coordinates excluded
    pub fn draw_bar(&mut self, x0: isize, y0: isize, x1: isize, y1: isize, color: u32) {
        for y in y0.max(0)..y1.min(self.height as isize) {
            for x in x0.max(0)..x1.min(self.width as isize) {
                self.data[y as usize * self.stride + x as usize] = color;
            }
        }
    } // fn draw_bar

    /// Surface contents to PNG file saving function
    /// * `path` - file path
    pub fn save_png(&self, path: &std::path::Path) -> Result<(), png::EncodingError> {
        let file = std::fs::File::create(path)?;
        let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), self.width as u32, self.height as u32);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);

        let mut bytes = Vec::with_capacity(self.width * self.height * 3);
        for y in 0..self.height {
            for pixel in &self.data[y * self.stride..y * self.stride + self.width] {
                bytes.extend_from_slice(&[(pixel >> 16) as u8, (pixel >> 8) as u8, *pixel as u8]);
            }
        }

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&bytes)
    } // fn save_png
} // impl Surface

// file viewer/surface.rs
