//! Shared rendering helpers.

pub mod cells;
pub mod modal;
pub mod notice;

use ratatui::layout::Rect;

/// A `width` x `height` rect centered in `area`, clamped to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_fits_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let r = centered(area, 60, 20);
        assert_eq!((r.x, r.y, r.width, r.height), (20, 10, 60, 20));

        let small = centered(Rect::new(0, 0, 30, 10), 60, 20);
        assert_eq!((small.width, small.height), (26, 8));
    }
}
