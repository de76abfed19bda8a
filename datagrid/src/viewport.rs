//! Virtual-scroll window computation.

use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;

/// Scroll position and geometry of the visible area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportState {
    pub scroll_top: u32,
    /// Fixed height of every row.
    pub row_height: u32,
    pub viewport_height: u32,
    /// Extra rows rendered above and below the visible area.
    pub overscan: usize,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scroll_top: 0,
            row_height: 32,
            viewport_height: 480,
            overscan: 3,
        }
    }
}

/// Range of rows to render plus the offset of the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ViewportWindow {
    pub start_index: usize,
    pub end_index: usize,
    pub offset_top: u64,
}

impl ViewportWindow {
    pub fn range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }
}

impl ViewportState {
    pub fn new(row_height: u32, viewport_height: u32) -> Self {
        Self {
            row_height,
            viewport_height,
            ..Self::default()
        }
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_scroll_top(mut self, scroll_top: u32) -> Self {
        self.scroll_top = scroll_top;
        self
    }

    /// Number of rows that fit in the viewport, counting a partial row.
    pub fn rows_per_viewport(&self) -> usize {
        if self.row_height == 0 {
            return 0;
        }
        self.viewport_height.div_ceil(self.row_height) as usize
    }

    /// Window of rows to render out of `total_rows`.
    ///
    /// The start index never passes the end index, so scrolling beyond the
    /// content yields an empty window at the end instead of an inverted one.
    pub fn window(&self, total_rows: usize) -> ViewportWindow {
        if self.row_height == 0 {
            return ViewportWindow::default();
        }
        let first_visible = (self.scroll_top / self.row_height) as usize;
        let start = first_visible.saturating_sub(self.overscan);
        let span = self
            .rows_per_viewport()
            .saturating_add(self.overscan.saturating_mul(2));
        let end = total_rows.min(start.saturating_add(span));
        let start = start.min(end);
        ViewportWindow {
            start_index: start,
            end_index: end,
            offset_top: start as u64 * u64::from(self.row_height),
        }
    }

    /// Height of the full content, for the scroll spacer.
    pub fn total_height(&self, total_rows: usize) -> u64 {
        (total_rows as u64).saturating_mul(u64::from(self.row_height))
    }

    /// Largest meaningful scroll offset for `total_rows`.
    pub fn max_scroll_top(&self, total_rows: usize) -> u32 {
        let max = self
            .total_height(total_rows)
            .saturating_sub(u64::from(self.viewport_height));
        u32::try_from(max).unwrap_or(u32::MAX)
    }

    /// Scroll the minimum distance needed to show row `index` fully.
    pub fn scroll_to_index(&mut self, index: usize) {
        let row_top = (index as u64).saturating_mul(u64::from(self.row_height));
        let row_bottom = row_top.saturating_add(u64::from(self.row_height));
        let top = u64::from(self.scroll_top);
        let bottom = top + u64::from(self.viewport_height);
        let target = if row_top < top {
            row_top
        } else if row_bottom > bottom {
            row_bottom.saturating_sub(u64::from(self.viewport_height))
        } else {
            return;
        };
        self.scroll_top = u32::try_from(target).unwrap_or(u32::MAX);
    }

    /// Clamp the scroll offset after the row count shrank.
    pub fn clamp(&mut self, total_rows: usize) {
        self.scroll_top = self.scroll_top.min(self.max_scroll_top(total_rows));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> ViewportState {
        ViewportState::new(20, 100).with_overscan(2)
    }

    #[test]
    fn test_window_at_top() {
        let window = viewport().window(1000);
        assert_eq!(window.start_index, 0);
        assert_eq!(window.end_index, 9);
        assert_eq!(window.offset_top, 0);
    }

    #[test]
    fn test_window_mid_scroll() {
        let window = viewport().with_scroll_top(410).window(1000);
        assert_eq!(window.range(), 18..27);
        assert_eq!(window.offset_top, 360);
    }

    #[test]
    fn test_window_at_bottom_reaches_total() {
        let vp = viewport();
        let window = vp.with_scroll_top(vp.max_scroll_top(50)).window(50);
        assert_eq!(window.end_index, 50);
    }

    #[test]
    fn test_scroll_past_end_never_inverts() {
        let window = viewport().with_scroll_top(100_000).window(10);
        assert!(window.start_index <= window.end_index);
        assert!(window.is_empty());
        assert_eq!(window.end_index, 10);
    }

    #[test]
    fn test_huge_overscan_covers_everything() {
        let window = ViewportState::new(10, 100)
            .with_overscan(usize::MAX)
            .with_scroll_top(50)
            .window(10);
        assert_eq!(window.range(), 0..10);

        let window = ViewportState::new(10, 100)
            .with_overscan(usize::MAX / 2 + 1)
            .window(10);
        assert_eq!(window.range(), 0..10);
    }

    #[test]
    fn test_zero_row_height_is_empty() {
        let window = ViewportState::new(0, 100).window(100);
        assert!(window.is_empty());
    }

    #[test]
    fn test_window_size_is_bounded() {
        let vp = viewport();
        for top in (0..4000).step_by(37) {
            let window = vp.with_scroll_top(top).window(150);
            assert!(window.len() <= vp.rows_per_viewport() + 2 * vp.overscan);
            assert!(window.end_index <= 150);
        }
    }

    #[test]
    fn test_scroll_to_index() {
        let mut vp = viewport();
        vp.scroll_to_index(10);
        assert_eq!(vp.scroll_top, 120);
        vp.scroll_to_index(7);
        assert_eq!(vp.scroll_top, 120);
        vp.scroll_to_index(2);
        assert_eq!(vp.scroll_top, 40);
    }

    #[test]
    fn test_total_height() {
        assert_eq!(viewport().total_height(7), 140);
    }
}
