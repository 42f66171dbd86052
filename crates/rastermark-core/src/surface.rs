//! Off-screen RGBA pixel buffer.
//!
//! Every layer renders into its own [`Surface`], and the export pipeline
//! scans them. Writes outside the buffer are silently dropped: shapes may
//! legitimately overhang page edges (a thick stroke near a border) and
//! clipping is the defined behaviour, not an error.

use crate::colour::Colour;
use serde::{Deserialize, Serialize};

/// A width x height RGBA8 raster, row-major.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Create a fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Wrap an existing RGBA8 buffer. Returns `None` if the length does not
    /// match the dimensions.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    fn index(&self, x: i64, y: i64) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    pub fn get(&self, x: i64, y: i64) -> Option<Colour> {
        if !self.contains(x, y) {
            return None;
        }
        let i = self.index(x, y);
        Some(Colour::new(
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ))
    }

    /// Write a pixel. Out-of-bounds writes are dropped.
    pub fn put(&mut self, x: i64, y: i64, colour: Colour) {
        if !self.contains(x, y) {
            return;
        }
        let i = self.index(x, y);
        self.data[i] = colour.r;
        self.data[i + 1] = colour.g;
        self.data[i + 2] = colour.b;
        self.data[i + 3] = colour.a;
    }

    /// Clear a pixel to full transparency. Out-of-bounds writes are dropped.
    pub fn clear_pixel(&mut self, x: i64, y: i64) {
        self.put(x, y, Colour::transparent());
    }

    /// Clear the whole surface to transparency.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Whether the pixel at (x, y) has non-zero alpha.
    pub fn is_set(&self, x: i64, y: i64) -> bool {
        self.get(x, y).is_some_and(|c| c.a > 0)
    }

    /// Snapshot a rectangular region as an independent surface.
    ///
    /// The copy never aliases this buffer; pixels outside bounds come back
    /// transparent.
    pub fn copy_region(&self, x0: i64, y0: i64, width: u32, height: u32) -> Surface {
        let mut out = Surface::new(width, height);
        for dy in 0..height as i64 {
            for dx in 0..width as i64 {
                if let Some(c) = self.get(x0 + dx, y0 + dy) {
                    out.put(dx, dy, c);
                }
            }
        }
        out
    }

    /// Copy every non-transparent pixel of `src` onto this surface at the
    /// given offset.
    pub fn blit(&mut self, x0: i64, y0: i64, src: &Surface) {
        src.for_each_set_pixel(&mut |dx, dy, c| {
            self.put(x0 + dx as i64, y0 + dy as i64, c);
        });
    }

    /// Visit every pixel with non-zero alpha in row-major order.
    pub fn for_each_set_pixel(&self, visit: &mut dyn FnMut(u32, u32, Colour)) {
        for y in 0..self.height {
            for x in 0..self.width {
                let i = self.index(x as i64, y as i64);
                if self.data[i + 3] > 0 {
                    let c = Colour::new(
                        self.data[i],
                        self.data[i + 1],
                        self.data[i + 2],
                        self.data[i + 3],
                    );
                    visit(x, y, c);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_transparent() {
        let s = Surface::new(4, 3);
        assert_eq!(s.get(0, 0), Some(Colour::transparent()));
        assert!(!s.is_set(3, 2));
    }

    #[test]
    fn test_put_get() {
        let mut s = Surface::new(4, 4);
        let c = Colour::rgb(10, 20, 30);
        s.put(2, 1, c);
        assert_eq!(s.get(2, 1), Some(c));
        assert!(s.is_set(2, 1));
    }

    #[test]
    fn test_out_of_bounds_is_silent() {
        let mut s = Surface::new(2, 2);
        s.put(-1, 0, Colour::white());
        s.put(2, 0, Colour::white());
        s.put(0, 99, Colour::white());
        assert_eq!(s.get(5, 5), None);
        assert!(s.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_copy_region_is_independent() {
        let mut s = Surface::new(4, 4);
        s.put(1, 1, Colour::white());
        let mut copy = s.copy_region(0, 0, 2, 2);
        copy.put(0, 0, Colour::black());
        // Mutating the copy never touches the source.
        assert_eq!(s.get(0, 0), Some(Colour::transparent()));
        assert_eq!(copy.get(1, 1), Some(Colour::white()));
    }

    #[test]
    fn test_blit_skips_transparent() {
        let mut dst = Surface::new(3, 3);
        dst.put(0, 0, Colour::rgb(1, 2, 3));
        let mut src = Surface::new(2, 2);
        src.put(1, 1, Colour::white());
        dst.blit(0, 0, &src);
        // Transparent source pixels leave the destination untouched.
        assert_eq!(dst.get(0, 0), Some(Colour::rgb(1, 2, 3)));
        assert_eq!(dst.get(1, 1), Some(Colour::white()));
    }

    #[test]
    fn test_from_rgba8_length_check() {
        assert!(Surface::from_rgba8(2, 2, vec![0; 16]).is_some());
        assert!(Surface::from_rgba8(2, 2, vec![0; 15]).is_none());
    }
}
