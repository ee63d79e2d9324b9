//! Label sheet geometry (PDF points, origin bottom-left).

const POINTS_PER_MM: f32 = 72.0 / 25.4;

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// A grid of equally sized label slots on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub columns: u32,
    pub rows: u32,
    /// Blank border around the whole grid.
    pub margin: f32,
    /// Inset of text from the slot edges.
    pub padding: f32,
    pub title_size: f32,
    pub body_size: f32,
    /// Draw a hairline around each slot as a cutting guide.
    pub outline: bool,
}

/// Position of one slot on its page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub page: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SheetLayout {
    /// A4 portrait, 2 × 4 labels of 105 × 74.25 mm.
    pub fn a4_8_up() -> Self {
        Self {
            page_width: mm_to_pt(210.0),
            page_height: mm_to_pt(297.0),
            columns: 2,
            rows: 4,
            margin: 0.0,
            padding: mm_to_pt(4.0),
            title_size: 11.0,
            body_size: 7.0,
            outline: true,
        }
    }

    pub fn slots_per_page(&self) -> usize {
        (self.columns * self.rows) as usize
    }

    pub fn slot_width(&self) -> f32 {
        (self.page_width - 2.0 * self.margin) / self.columns as f32
    }

    pub fn slot_height(&self) -> f32 {
        (self.page_height - 2.0 * self.margin) / self.rows as f32
    }

    pub fn pages_for(&self, stickers: usize) -> usize {
        stickers.div_ceil(self.slots_per_page())
    }

    /// Slot for the `index`-th sticker, filling rows left to right, top to bottom.
    pub fn slot(&self, index: usize) -> Slot {
        let per_page = self.slots_per_page();
        let within = index % per_page;
        let row = within / self.columns as usize;
        let col = within % self.columns as usize;

        let width = self.slot_width();
        let height = self.slot_height();
        Slot {
            page: index / per_page,
            x: self.margin + col as f32 * width,
            y: self.page_height - self.margin - (row as f32 + 1.0) * height,
            width,
            height,
        }
    }
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self::a4_8_up()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_grid_has_eight_slots() {
        let layout = SheetLayout::a4_8_up();
        assert_eq!(layout.slots_per_page(), 8);
        assert!((layout.slot_width() - mm_to_pt(105.0)).abs() < 0.01);
        assert!((layout.slot_height() - mm_to_pt(74.25)).abs() < 0.01);
    }

    #[test]
    fn page_count_rounds_up() {
        let layout = SheetLayout::a4_8_up();
        assert_eq!(layout.pages_for(0), 0);
        assert_eq!(layout.pages_for(8), 1);
        assert_eq!(layout.pages_for(9), 2);
    }

    #[test]
    fn slots_fill_rows_then_wrap_to_next_page() {
        let layout = SheetLayout::a4_8_up();

        let first = layout.slot(0);
        assert_eq!(first.page, 0);
        assert!(first.x.abs() < 0.01);
        assert!((first.y + first.height - layout.page_height).abs() < 0.01);

        let second = layout.slot(1);
        assert!(second.x > first.x);
        assert!((second.y - first.y).abs() < 0.01);

        let third = layout.slot(2);
        assert!(third.y < first.y);

        assert_eq!(layout.slot(8).page, 1);
        assert_eq!(layout.slot(8).x, first.x);
    }
}
