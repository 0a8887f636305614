use bitvec::prelude::*;

use crate::config::SpriteEdge;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;
pub(crate) const MEM_LENGTH: usize = WIDTH * HEIGHT / 8;

/// An opaque struct holding frame of the display
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Frame([u8; MEM_LENGTH]);

/// A shared view over a `Frame`
///
/// Each pixel is represented either by a corresponding bit being set, or by `true` value.
/// Internally, the data is stored in a form of concatenating rows from top to bottom of the frame.
/// Rows are represented as an individual bits of continuous memory, matching the state of pixels
/// from left to the right.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct FrameView<'a>(&'a [u8; MEM_LENGTH]);

impl<'a> FrameView<'a> {
    /// View the raw memory of a frame, 8 bytes per row, MSB is the leftmost pixel
    pub fn as_raw(&self) -> &'a [u8] {
        self.0
    }

    /// Create an owned copy of a frame
    pub fn copy_frame(self) -> Frame {
        Frame(*self.0)
    }

    /// State of pixel at column `x` and row `y`, `None` outside of the frame
    pub fn pixel(&self, x: usize, y: usize) -> Option<bool> {
        if x < WIDTH && y < HEIGHT {
            Some(self.0.view_bits::<Msb0>()[y * WIDTH + x])
        } else {
            None
        }
    }

    /// Get iterator over rows in a form of a `BitSlice`s
    pub fn iter_rows(&self) -> impl Iterator<Item = &'a BitSlice<u8, Msb0>> {
        self.0.chunks(WIDTH / 8).map(|row| row.view_bits::<Msb0>())
    }

    /// Number of pixels that are on
    pub fn lit_pixels(&self) -> usize {
        self.0.view_bits::<Msb0>().count_ones()
    }
}

impl Frame {
    pub(crate) fn new() -> Self {
        Self([0; MEM_LENGTH])
    }

    /// Get view over frame
    pub fn view(&self) -> FrameView<'_> {
        FrameView(&self.0)
    }

    pub(crate) fn clear(&mut self) {
        self.0 = [0; MEM_LENGTH];
    }

    /// XOR `sprite` rows onto the frame with the top-left corner at (`x`, `y`)
    ///
    /// The origin always wraps around the frame, `edge` decides what happens
    /// to the pixels crossing the right or bottom border. Returns whether any
    /// lit pixel got turned off.
    pub(crate) fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8], edge: SpriteEdge) -> bool {
        let origin_x = x as usize % WIDTH;
        let origin_y = y as usize % HEIGHT;
        let mut collision = false;

        for (row, byte) in sprite.iter().enumerate() {
            for (col, bit) in byte.view_bits::<Msb0>().iter().by_vals().enumerate() {
                if !bit {
                    continue;
                }
                let (px, py) = (origin_x + col, origin_y + row);
                let (px, py) = match edge {
                    SpriteEdge::Wrap => (px % WIDTH, py % HEIGHT),
                    SpriteEdge::Clip if px < WIDTH && py < HEIGHT => (px, py),
                    SpriteEdge::Clip => continue,
                };
                collision |= self.flip(px, py);
            }
        }
        collision
    }

    /// Invert a single pixel, returning its previous state
    fn flip(&mut self, x: usize, y: usize) -> bool {
        let bits = self.0.view_bits_mut::<Msb0>();
        let idx = y * WIDTH + x;
        let was_lit = bits[idx];
        bits.set(idx, !was_lit);
        was_lit
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Frame {
    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

#[cfg(test)]
mod frame_test {
    use super::*;
    use crate::utils::testing::ToMask;

    const GLYPH_0: [u8; 5] = [0xF0, 0x90, 0x90, 0x90, 0xF0];

    #[test]
    fn pixel() {
        let mut frame = Frame::new();
        frame.as_raw_mut()[0] = 0b1000_0000;

        assert_eq!(frame.view().pixel(0, 0), Some(true));
        assert_eq!(frame.view().pixel(1, 0), Some(false));
        assert_eq!(frame.view().pixel(0, 1), Some(false));
        assert_eq!(frame.view().pixel(WIDTH, 0), None);
        assert_eq!(frame.view().pixel(0, HEIGHT), None);
    }

    #[test]
    fn rows_are_msb_first() {
        let mut frame = Frame::new();
        frame.as_raw_mut()[8] = 0b0100_0000;
        let second_row = frame.view().iter_rows().nth(1).unwrap();
        assert_eq!(second_row.len(), WIDTH);
        assert!(second_row[1]);
        assert_eq!(frame.view().iter_rows().count(), HEIGHT);
    }

    #[test]
    fn draw_glyph() {
        let mut frame = Frame::new();
        let collision = frame.draw_sprite(0, 0, &GLYPH_0, SpriteEdge::Wrap);
        assert!(!collision);

        let expected = "
            ####
            #..#
            #..#
            #..#
            ####
        ";
        assert_eq!(frame.view().to_mask(), expected.to_mask());
        assert_eq!(frame.view().lit_pixels(), 14);
    }

    #[test]
    fn draw_offset_glyph() {
        let mut frame = Frame::new();
        frame.draw_sprite(10, 4, &GLYPH_0, SpriteEdge::Wrap);

        let mut expected = "
            ####
            #..#
            #..#
            #..#
            ####
        "
        .to_mask();
        expected.offset(10, 4);
        assert_eq!(frame.view().to_mask(), expected);
    }

    #[test]
    fn redraw_erases_and_collides() {
        let mut frame = Frame::new();
        frame.draw_sprite(3, 7, &GLYPH_0, SpriteEdge::Wrap);
        assert!(frame.draw_sprite(3, 7, &GLYPH_0, SpriteEdge::Wrap));
        assert_eq!(frame.view().lit_pixels(), 0);
    }

    #[test]
    fn partial_overlap_collides() {
        let mut frame = Frame::new();
        frame.draw_sprite(0, 0, &[0b1000_0000], SpriteEdge::Wrap);
        assert!(frame.draw_sprite(0, 0, &[0b1100_0000], SpriteEdge::Wrap));
        assert_eq!(frame.view().pixel(0, 0), Some(false));
        assert_eq!(frame.view().pixel(1, 0), Some(true));
    }

    #[test]
    fn blank_sprite_never_collides() {
        let mut frame = Frame::new();
        frame.draw_sprite(0, 0, &GLYPH_0, SpriteEdge::Wrap);
        assert!(!frame.draw_sprite(0, 0, &[0; 5], SpriteEdge::Wrap));
        assert_eq!(frame.view().lit_pixels(), 14);
    }

    #[test]
    fn wrap_around_edges() {
        let mut frame = Frame::new();
        frame.draw_sprite(62, 31, &[0xFF, 0xFF], SpriteEdge::Wrap);

        assert_eq!(frame.view().lit_pixels(), 16);
        for &x in &[62, 63, 0, 1, 2, 3, 4, 5] {
            assert_eq!(frame.view().pixel(x, 31), Some(true));
            assert_eq!(frame.view().pixel(x, 0), Some(true));
        }
        assert_eq!(frame.view().pixel(6, 0), Some(false));
    }

    #[test]
    fn clip_at_edges() {
        let mut frame = Frame::new();
        frame.draw_sprite(62, 31, &[0xFF, 0xFF], SpriteEdge::Clip);

        assert_eq!(frame.view().lit_pixels(), 2);
        assert_eq!(frame.view().pixel(62, 31), Some(true));
        assert_eq!(frame.view().pixel(63, 31), Some(true));
        assert_eq!(frame.view().pixel(0, 31), Some(false));
        assert_eq!(frame.view().pixel(62, 0), Some(false));
    }

    #[test]
    fn origin_wraps_under_both_policies() {
        for &edge in &[SpriteEdge::Wrap, SpriteEdge::Clip] {
            let mut frame = Frame::new();
            frame.draw_sprite(64 + 2, 32 + 1, &[0x80], edge);
            assert_eq!(frame.view().pixel(2, 1), Some(true));
        }
    }

    #[test]
    fn clear() {
        let mut frame = Frame::new();
        frame.as_raw_mut().iter_mut().for_each(|b| *b = 0xA5);
        frame.clear();
        assert_eq!(frame.view().lit_pixels(), 0);
        assert_eq!(frame, Frame::default());
    }

    #[test]
    fn copy_is_detached() {
        let mut frame = Frame::new();
        frame.draw_sprite(0, 0, &[0x80], SpriteEdge::Wrap);
        let copy = frame.view().copy_frame();
        frame.clear();
        assert_eq!(copy.view().pixel(0, 0), Some(true));
    }
}
