//! Screen slots for track viewports

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Integer pixel rectangle, origin top-left
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w as f32, self.h as f32)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32) + self.size() * 0.5
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

/// Rectangles for `n` slots on a `width` x `height` screen
///
/// Four slots form a grid filled column by column. Five slots add a
/// centered half-size slot on top of the grid.
pub fn slot_rects(width: u32, height: u32, n: usize) -> Vec<Rect> {
    let (hw, hh) = (width / 2, height / 2);
    match n {
        0 => Vec::new(),
        1 => vec![Rect::new(0, 0, width, height)],
        2 => vec![Rect::new(0, 0, width, hh), Rect::new(0, hh, width, hh)],
        4 => vec![
            Rect::new(0, 0, hw, hh),
            Rect::new(0, hh, hw, hh),
            Rect::new(hw, 0, hw, hh),
            Rect::new(hw, hh, hw, hh),
        ],
        5 => {
            let (cw, ch) = (width / 2, height / 2);
            vec![
                Rect::new(0, 0, hw, hh),
                Rect::new(hw, 0, hw, hh),
                Rect::new(0, hh, hw, hh),
                Rect::new(hw, hh, hw, hh),
                Rect::new((width - cw) / 2, (height - ch) / 2, cw, ch),
            ]
        }
        _ => {
            let w = width / n as u32;
            (0..n as u32).map(|i| Rect::new(i * w, 0, w, height)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_is_fullscreen() {
        assert_eq!(slot_rects(1280, 720, 1), vec![Rect::new(0, 0, 1280, 720)]);
    }

    #[test]
    fn test_grid_is_column_major() {
        let rects = slot_rects(1280, 720, 4);
        assert_eq!(rects[1], Rect::new(0, 360, 640, 360));
        assert_eq!(rects[2], Rect::new(640, 0, 640, 360));
    }

    #[test]
    fn test_five_has_centered_slot() {
        let rects = slot_rects(1280, 720, 5);
        assert_eq!(rects[4], Rect::new(320, 180, 640, 360));
        assert_eq!(rects[4].center(), Vec2::new(640.0, 360.0));
    }

    #[test]
    fn test_columns_for_other_counts() {
        let rects = slot_rects(1200, 720, 3);
        assert_eq!(rects.len(), 3);
        assert_eq!(rects[2], Rect::new(800, 0, 400, 720));
        assert!(slot_rects(1280, 720, 0).is_empty());
    }
}
